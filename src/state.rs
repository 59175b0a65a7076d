use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use log::{error, info};

use crate::color::ColorMap;
use crate::config::Config;
use crate::data::export::export_to_path;
use crate::data::filter::{self, FilterOutcome, FilterView};
use crate::data::loader::{ObjectStore, StorageLocation};
use crate::data::model::FilterCriteria;
use crate::remote::{
    AnalysisClient, AnalysisRequest, AnalysisResult, RecommendationClient, RecommendationRequest,
};

// ---------------------------------------------------------------------------
// Collaborators
// ---------------------------------------------------------------------------

/// Storage and remote clients sharing one HTTP connection pool.
pub struct Services {
    pub store: ObjectStore,
    pub analysis: AnalysisClient,
    pub recommendations: RecommendationClient,
}

impl Services {
    pub fn from_config(config: &Config) -> Result<Self> {
        let http = config.http_client().context("building HTTP client")?;
        Ok(Self {
            store: ObjectStore::new(http.clone(), config.storage_url.clone()),
            analysis: AnalysisClient::new(http.clone(), config.analyze_url.clone()),
            recommendations: RecommendationClient::new(http, config.recommend_url.clone()),
        })
    }
}

// ---------------------------------------------------------------------------
// Status line
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLevel {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub level: StatusLevel,
    pub text: String,
}

/// What the filter area currently shows.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterDisplay {
    NotLoaded,
    /// The object had a header but no rows.
    NoData,
    Loaded(FilterView),
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The session context handed to every section of the screen. Nothing here
/// outlives one display cycle unless a section chooses to keep it.
pub struct AppState {
    /// Analysis inputs as typed.
    pub analysis_form: AnalysisRequest,
    /// Last successful analysis, with the request that produced it.
    pub analysis: Option<AnalysisResult>,
    pub selected_recommendation: Option<usize>,
    /// Where the persistence function appends the saved row.
    pub output_key: String,

    /// Object the filter section loads. The bucket follows the analysis
    /// bucket until the user types a different one.
    pub filter_location: StorageLocation,
    filter_bucket_edited: bool,

    /// Selections kept for the next load of the same location.
    pub criteria: Option<FilterCriteria>,
    criteria_location: Option<StorageLocation>,
    /// Selections changed since the last load.
    pub criteria_dirty: bool,

    pub display: FilterDisplay,
    pub color_map: Option<ColorMap>,
    pub status: Option<StatusMessage>,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(&Config::default())
    }
}

impl AppState {
    pub fn new(config: &Config) -> Self {
        Self {
            analysis_form: AnalysisRequest::default(),
            analysis: None,
            selected_recommendation: None,
            output_key: config.output_key.clone(),
            filter_location: StorageLocation::new("", config.output_key.clone()),
            filter_bucket_edited: false,
            criteria: None,
            criteria_location: None,
            criteria_dirty: false,
            display: FilterDisplay::NotLoaded,
            color_map: None,
            status: None,
        }
    }

    // -- status helpers --

    fn set_status(&mut self, level: StatusLevel, text: impl Into<String>) {
        self.status = Some(StatusMessage {
            level,
            text: text.into(),
        });
    }

    fn fail(&mut self, text: String) {
        error!("{text}");
        self.set_status(StatusLevel::Error, text);
    }

    // -- bucket threading --

    /// Copy the analysis bucket into the filter location unless the user
    /// has typed their own.
    pub fn sync_filter_bucket(&mut self) {
        if !self.filter_bucket_edited {
            self.filter_location.bucket = self.analysis_form.bucket.clone();
        }
    }

    /// Called after the user edits the filter bucket. Clearing it links it
    /// back to the analysis bucket.
    pub fn filter_bucket_changed(&mut self) {
        self.filter_bucket_edited = !self.filter_location.bucket.trim().is_empty();
        self.sync_filter_bucket();
    }

    // -- analysis --

    pub fn run_analysis(&mut self, client: &AnalysisClient) {
        let missing = self.analysis_form.missing_fields();
        if !missing.is_empty() {
            self.set_status(
                StatusLevel::Warning,
                format!("Please fill in: {}.", missing.join(", ")),
            );
            return;
        }

        let request = self.analysis_form.clone();
        self.selected_recommendation = None;
        match client.analyze(&request) {
            Ok(summary) => {
                let n = summary.recommendations.len();
                self.analysis = Some(AnalysisResult { request, summary });
                self.sync_filter_bucket();
                self.set_status(
                    StatusLevel::Success,
                    format!("Analysis complete with {n} recommendation(s)."),
                );
            }
            Err(e) => {
                self.analysis = None;
                self.fail(format!("Analysis failed: {e}"));
            }
        }
    }

    pub fn select_recommendation(&mut self, index: usize) {
        let available = self
            .analysis
            .as_ref()
            .map_or(0, |a| a.summary.recommendations.len());
        if index < available {
            self.selected_recommendation = Some(index);
        }
    }

    pub fn save_recommendation(&mut self, client: &RecommendationClient) {
        if self.analysis.is_none() {
            self.set_status(StatusLevel::Warning, "Run an analysis first.");
            return;
        }
        let Some(index) = self.selected_recommendation else {
            self.set_status(StatusLevel::Warning, "Choose a recommendation first.");
            return;
        };
        if self.output_key.trim().is_empty() {
            self.set_status(StatusLevel::Warning, "Please enter an output key.");
            return;
        }
        let Some(analysis) = &self.analysis else {
            return;
        };

        let outcome = RecommendationRequest::new(analysis, index, &self.output_key)
            .and_then(|request| client.save(&request).map(|msg| (request, msg)));
        match outcome {
            Ok((request, msg)) => {
                let text = format!("Saved \"{}\": {msg}", request.selected_text());
                self.set_status(StatusLevel::Success, text);
            }
            Err(e) => self.fail(format!("Saving the recommendation failed: {e}")),
        }
    }

    // -- filtering --

    /// Fresh load of the filter location, reusing kept selections when the
    /// location is unchanged.
    pub fn load_and_filter(&mut self, store: &ObjectStore, today: NaiveDate) {
        if self.filter_location.validate().is_err() {
            self.set_status(
                StatusLevel::Warning,
                "Please enter both bucket and output file key.",
            );
            return;
        }

        let retained = self
            .criteria
            .as_ref()
            .filter(|_| self.criteria_location.as_ref() == Some(&self.filter_location));
        let outcome = filter::load_and_filter(
            store,
            &self.filter_location,
            retained.map(|c| &c.selected_priorities),
            retained.map(|c| c.max_follow_up_date),
            today,
        );

        match outcome {
            Ok(FilterOutcome::Empty) => {
                info!("{} has no rows", self.filter_location);
                self.display = FilterDisplay::NoData;
                self.criteria = None;
                self.criteria_location = None;
                self.color_map = None;
                self.set_status(StatusLevel::Info, "No data found in the file.");
            }
            Ok(FilterOutcome::Matched(view)) => {
                self.color_map = Some(ColorMap::new(&view.options));
                self.criteria = Some(view.criteria.clone());
                self.criteria_location = Some(self.filter_location.clone());
                self.set_status(
                    StatusLevel::Success,
                    format!("{} client(s) match your filters.", view.result.matched_count),
                );
                self.display = FilterDisplay::Loaded(view);
            }
            Err(e) => {
                self.display = FilterDisplay::NotLoaded;
                self.fail(format!("Failed to load or process CSV: {e}"));
            }
        }
        self.criteria_dirty = false;
    }

    /// Labels offered by the last load.
    pub fn priority_options(&self) -> Vec<String> {
        match &self.display {
            FilterDisplay::Loaded(view) => view.options.iter().cloned().collect(),
            _ => Vec::new(),
        }
    }

    pub fn is_priority_selected(&self, label: &str) -> bool {
        self.criteria
            .as_ref()
            .is_some_and(|c| c.selected_priorities.contains(label))
    }

    /// Toggle one label in the kept selection.
    pub fn toggle_priority(&mut self, label: &str) {
        if let Some(criteria) = &mut self.criteria {
            if !criteria.selected_priorities.remove(label) {
                criteria.selected_priorities.insert(label.to_string());
            }
            self.criteria_dirty = true;
        }
    }

    pub fn select_all_priorities(&mut self) {
        let options = self.priority_options();
        if let Some(criteria) = &mut self.criteria {
            criteria.selected_priorities = options.into_iter().collect();
            self.criteria_dirty = true;
        }
    }

    pub fn select_no_priorities(&mut self) {
        if let Some(criteria) = &mut self.criteria {
            criteria.selected_priorities.clear();
            self.criteria_dirty = true;
        }
    }

    pub fn set_max_follow_up_date(&mut self, date: NaiveDate) {
        if let Some(criteria) = &mut self.criteria {
            if criteria.max_follow_up_date != date {
                criteria.max_follow_up_date = date;
                self.criteria_dirty = true;
            }
        }
    }

    /// `(matched, total)` of the last load, if it had rows.
    pub fn counts(&self) -> Option<(usize, usize)> {
        match &self.display {
            FilterDisplay::Loaded(view) => Some((view.result.matched_count, view.total)),
            _ => None,
        }
    }

    /// Write the current matches to `path`.
    pub fn export_matches(&mut self, path: &Path) {
        let FilterDisplay::Loaded(view) = &self.display else {
            self.set_status(StatusLevel::Warning, "Load and filter a dataset first.");
            return;
        };
        match export_to_path(&view.result.records, path) {
            Ok(()) => {
                let text = format!(
                    "Exported {} client(s) to {}",
                    view.result.matched_count,
                    path.display()
                );
                self.set_status(StatusLevel::Success, text);
            }
            Err(e) => self.fail(format!("Export failed: {e:#}")),
        }
    }
}
