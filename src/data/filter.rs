use std::collections::BTreeSet;

use chrono::NaiveDate;
use log::{debug, info};

use super::error::DatasetError;
use super::loader::{load_dataset, ObjectStore, StorageLocation};
use super::model::{ClientRecord, Dataset, FieldValue, FilterCriteria, FOLLOW_UP_DATE};

// ---------------------------------------------------------------------------
// Options and bounds observed in a dataset
// ---------------------------------------------------------------------------

/// Sorted non-null priority labels present in the dataset.
pub fn distinct_priorities(dataset: &Dataset) -> BTreeSet<String> {
    dataset
        .records
        .iter()
        .filter_map(ClientRecord::priority_level)
        .map(str::to_string)
        .collect()
}

/// Coerce every `follow_up_date` cell to a `Date`, or `Null` when it cannot
/// be read as one. Never fails; bad cells only drop out of date filters.
pub fn parse_follow_up_dates(mut dataset: Dataset) -> Dataset {
    let mut unparsed = 0usize;
    for (row, record) in dataset.records.iter_mut().enumerate() {
        let Some(cell) = record.fields.get_mut(FOLLOW_UP_DATE) else {
            continue;
        };
        let coerced = match cell.as_date() {
            Some(date) => FieldValue::Date(date),
            None => {
                if let FieldValue::Text(raw) = cell {
                    debug!("row {row}: follow_up_date {raw:?} is not a date");
                }
                unparsed += 1;
                FieldValue::Null
            }
        };
        *cell = coerced;
    }
    if unparsed > 0 {
        debug!("{unparsed} record(s) without a usable follow-up date");
    }
    dataset
}

/// Earliest and latest follow-up date, or `None` if no record has one.
pub fn date_bounds(dataset: &Dataset) -> Option<(NaiveDate, NaiveDate)> {
    dataset
        .records
        .iter()
        .filter_map(ClientRecord::follow_up_date)
        .fold(None, |bounds, date| match bounds {
            None => Some((date, date)),
            Some((lo, hi)) => Some((lo.min(date), hi.max(date))),
        })
}

/// Every observed priority, bounded by the latest date (or `today`).
pub fn default_criteria(dataset: &Dataset, today: NaiveDate) -> FilterCriteria {
    FilterCriteria {
        selected_priorities: distinct_priorities(dataset),
        max_follow_up_date: date_bounds(dataset).map_or(today, |(_, hi)| hi),
    }
}

// ---------------------------------------------------------------------------
// Filtering
// ---------------------------------------------------------------------------

/// Records that passed one filter pass, with their count for display.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterResult {
    pub records: Dataset,
    pub matched_count: usize,
}

/// A record passes when its priority is selected (exact match) and it has a
/// follow-up date on or before the bound.
pub fn matches(record: &ClientRecord, criteria: &FilterCriteria) -> bool {
    let priority_ok = record
        .priority_level()
        .is_some_and(|p| criteria.selected_priorities.contains(p));

    priority_ok
        && record
            .follow_up_date()
            .is_some_and(|d| d <= criteria.max_follow_up_date)
}

/// Stable, pure filter of `dataset` by `criteria`.
pub fn apply_filter(dataset: &Dataset, criteria: &FilterCriteria) -> FilterResult {
    let records: Vec<ClientRecord> = dataset
        .records
        .iter()
        .filter(|record| matches(record, criteria))
        .cloned()
        .collect();
    let matched_count = records.len();

    FilterResult {
        records: dataset.with_records(records),
        matched_count,
    }
}

// ---------------------------------------------------------------------------
// Load → normalize → filter
// ---------------------------------------------------------------------------

/// Everything the screen shows after one load-and-filter action.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterView {
    /// Selectable priority labels.
    pub options: BTreeSet<String>,
    /// Date range present in the data, if any record has a date.
    pub bounds: Option<(NaiveDate, NaiveDate)>,
    /// The criteria actually applied.
    pub criteria: FilterCriteria,
    /// Total records loaded.
    pub total: usize,
    pub result: FilterResult,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FilterOutcome {
    /// The object held a header but no rows.
    Empty,
    Matched(FilterView),
}

/// Filter an already loaded dataset.
///
/// `selected` is intersected with the observed labels; `None` selects all of
/// them. A missing `max_date` falls back to the latest date, then `today`.
pub fn filter_loaded(
    dataset: Dataset,
    selected: Option<&BTreeSet<String>>,
    max_date: Option<NaiveDate>,
    today: NaiveDate,
) -> FilterOutcome {
    if dataset.is_empty() {
        return FilterOutcome::Empty;
    }

    let dataset = parse_follow_up_dates(dataset);
    let defaults = default_criteria(&dataset, today);
    let options = defaults.selected_priorities.clone();

    let criteria = FilterCriteria {
        selected_priorities: match selected {
            Some(chosen) => options.intersection(chosen).cloned().collect(),
            None => defaults.selected_priorities,
        },
        max_follow_up_date: max_date.unwrap_or(defaults.max_follow_up_date),
    };

    let result = apply_filter(&dataset, &criteria);
    info!(
        "{} of {} client(s) match priorities {:?} up to {}",
        result.matched_count,
        dataset.len(),
        criteria.selected_priorities,
        criteria.max_follow_up_date
    );

    FilterOutcome::Matched(FilterView {
        options,
        bounds: date_bounds(&dataset),
        criteria,
        total: dataset.len(),
        result,
    })
}

/// Fresh load of `location` followed by [`filter_loaded`]. Nothing is cached
/// between calls.
pub fn load_and_filter(
    store: &ObjectStore,
    location: &StorageLocation,
    selected: Option<&BTreeSet<String>>,
    max_date: Option<NaiveDate>,
    today: NaiveDate,
) -> Result<FilterOutcome, DatasetError> {
    let dataset = load_dataset(store, location)?;
    Ok(filter_loaded(dataset, selected, max_date, today))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::parse_csv;
    use crate::testing::test_client;
    use mockito::Server;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sample() -> Dataset {
        parse_csv(
            b"priority_level,follow_up_date,client_id\n\
              High,2024-01-10,c1\n\
              Low,2024-02-01,c2\n\
              High,bad-date,c3\n",
        )
        .unwrap()
    }

    fn criteria(priorities: &[&str], max: NaiveDate) -> FilterCriteria {
        FilterCriteria {
            selected_priorities: priorities.iter().map(|p| p.to_string()).collect(),
            max_follow_up_date: max,
        }
    }

    fn ids(dataset: &Dataset) -> Vec<String> {
        dataset
            .records
            .iter()
            .map(|r| r.get("client_id").map(|v| v.to_string()).unwrap_or_default())
            .collect()
    }

    #[test]
    fn worked_example_keeps_only_first_row() {
        let ds = parse_follow_up_dates(sample());
        let result = apply_filter(&ds, &criteria(&["High"], ymd(2024, 1, 31)));
        assert_eq!(result.matched_count, 1);
        assert_eq!(ids(&result.records), vec!["c1"]);
    }

    #[test]
    fn full_selection_at_max_date_keeps_all_dated_rows() {
        let ds = parse_follow_up_dates(sample());
        let (_, hi) = date_bounds(&ds).unwrap();
        let all = distinct_priorities(&ds);
        let result = apply_filter(
            &ds,
            &FilterCriteria {
                selected_priorities: all,
                max_follow_up_date: hi,
            },
        );
        assert_eq!(ids(&result.records), vec!["c1", "c2"]);
    }

    #[test]
    fn upper_bound_is_inclusive() {
        let ds = parse_follow_up_dates(sample());
        let result = apply_filter(&ds, &criteria(&["Low"], ymd(2024, 2, 1)));
        assert_eq!(ids(&result.records), vec!["c2"]);

        let result = apply_filter(&ds, &criteria(&["Low"], ymd(2024, 1, 31)));
        assert_eq!(result.matched_count, 0);
    }

    #[test]
    fn undated_records_never_pass_a_date_bound() {
        let ds = parse_follow_up_dates(sample());
        let far_future = criteria(&["High", "Low"], ymd(9999, 12, 31));
        let result = apply_filter(&ds, &far_future);
        assert!(!ids(&result.records).contains(&"c3".to_string()));
    }

    #[test]
    fn short_year_dates_respect_the_bound() {
        let ds = parse_follow_up_dates(
            parse_csv(
                b"priority_level,follow_up_date,client_id\n\
                  High,1/5/24,c1\n\
                  High,2024-01-10,c2\n",
            )
            .unwrap(),
        );
        assert_eq!(date_bounds(&ds), Some((ymd(2024, 1, 5), ymd(2024, 1, 10))));

        let result = apply_filter(&ds, &criteria(&["High"], ymd(2023, 12, 31)));
        assert_eq!(result.matched_count, 0);
        let result = apply_filter(&ds, &criteria(&["High"], ymd(2024, 1, 5)));
        assert_eq!(ids(&result.records), vec!["c1"]);
    }

    #[test]
    fn filter_is_a_stable_idempotent_subset() {
        let ds = parse_follow_up_dates(
            parse_csv(
                b"priority_level,follow_up_date,client_id\n\
                  Medium,2024-03-01,a\nHigh,2024-01-05,b\nMedium,2024-01-20,c\n\
                  ,2024-01-01,d\nHigh,2024-04-01,e\nMedium,2023-12-31,f\n",
            )
            .unwrap(),
        );
        let c = criteria(&["Medium", "High"], ymd(2024, 3, 1));
        let once = apply_filter(&ds, &c);
        assert_eq!(ids(&once.records), vec!["a", "b", "c", "f"]);
        for record in &once.records.records {
            assert!(ds.records.contains(record));
        }
        let twice = apply_filter(&once.records, &c);
        assert_eq!(twice, once);
    }

    #[test]
    fn priority_values_are_matched_exactly() {
        let ds = parse_follow_up_dates(
            parse_csv(b"priority_level,follow_up_date\nhigh,2024-01-01\nHigh,2024-01-01\n").unwrap(),
        );
        assert_eq!(
            distinct_priorities(&ds).into_iter().collect::<Vec<_>>(),
            vec!["High", "high"]
        );
        let result = apply_filter(&ds, &criteria(&["High"], ymd(2024, 1, 1)));
        assert_eq!(result.matched_count, 1);
    }

    #[test]
    fn header_spelling_does_not_change_results() {
        let a = parse_csv(b" Priority_Level ,FOLLOW_UP_DATE\nHigh,2024-01-10\n").unwrap();
        let b = parse_csv(b"priority_level,follow_up_date\nHigh,2024-01-10\n").unwrap();
        let c = criteria(&["High"], ymd(2024, 1, 10));
        assert_eq!(apply_filter(&a, &c), apply_filter(&b, &c));
        assert_eq!(apply_filter(&a, &c).matched_count, 1);
    }

    #[test]
    fn bounds_ignore_unparseable_dates() {
        let ds = parse_follow_up_dates(sample());
        assert_eq!(date_bounds(&ds), Some((ymd(2024, 1, 10), ymd(2024, 2, 1))));
        assert_eq!(ds.records[2].get(FOLLOW_UP_DATE), Some(&FieldValue::Null));

        let undated = parse_csv(b"priority_level,follow_up_date\nHigh,nope\n").unwrap();
        assert_eq!(date_bounds(&undated), None);
        let today = ymd(2026, 10, 18);
        assert_eq!(default_criteria(&undated, today).max_follow_up_date, today);
    }

    #[test]
    fn missing_priority_column_yields_no_options() {
        let ds = parse_csv(b"follow_up_date\n2024-01-01\n").unwrap();
        assert!(distinct_priorities(&ds).is_empty());
        assert!(distinct_priorities(&Dataset::default()).is_empty());
    }

    #[test]
    fn retained_selection_is_intersected_with_options() {
        let retained: BTreeSet<String> = ["High", "Urgent"].iter().map(|s| s.to_string()).collect();
        let FilterOutcome::Matched(view) =
            filter_loaded(sample(), Some(&retained), None, ymd(2026, 10, 18))
        else {
            panic!("expected rows");
        };
        assert_eq!(
            view.criteria.selected_priorities,
            ["High".to_string()].into_iter().collect::<BTreeSet<_>>()
        );
        assert_eq!(view.criteria.max_follow_up_date, ymd(2024, 2, 1));
        assert_eq!(view.total, 3);
        assert_eq!(ids(&view.result.records), vec!["c1"]);
    }

    #[test]
    fn header_only_dataset_is_empty_outcome() {
        let ds = parse_csv(b"priority_level,follow_up_date\n").unwrap();
        assert_eq!(
            filter_loaded(ds, None, None, ymd(2026, 10, 18)),
            FilterOutcome::Empty
        );
    }

    #[test]
    fn load_and_filter_over_http() {
        let mut server = Server::new();
        let object_mock = server
            .mock("GET", "/clients/processed_client_data.csv")
            .with_status(200)
            .with_header("content-type", "text/csv")
            .with_body("Priority_Level,Follow_Up_Date\nHigh,2024-01-10\nLow,2024-02-01\nHigh,bad-date\n")
            .create();
        let store = ObjectStore::new(test_client(), format!("{}/{{bucket}}/{{key}}", server.url()));
        let location = StorageLocation::new("clients", "processed_client_data.csv");
        let selected: BTreeSet<String> = ["High".to_string()].into_iter().collect();

        let outcome =
            load_and_filter(&store, &location, Some(&selected), Some(ymd(2024, 1, 31)), ymd(2026, 10, 18))
                .unwrap();
        let FilterOutcome::Matched(view) = outcome else {
            panic!("expected rows");
        };
        assert_eq!(view.result.matched_count, 1);
        assert_eq!(view.options.len(), 2);
        object_mock.assert();
    }
}
