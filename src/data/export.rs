use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};

use super::model::Dataset;

/// Write `dataset` as CSV: canonical headers, nulls as empty cells, dates
/// as `YYYY-MM-DD`.
pub fn write_csv<W: Write>(dataset: &Dataset, writer: W) -> Result<()> {
    let mut out = csv::Writer::from_writer(writer);
    out.write_record(&dataset.columns)
        .context("writing CSV header")?;

    for (row_no, record) in dataset.records.iter().enumerate() {
        let cells = dataset.columns.iter().map(|col| {
            record
                .get(col)
                .map(|v| v.to_csv_field())
                .unwrap_or_default()
        });
        out.write_record(cells)
            .with_context(|| format!("writing CSV row {row_no}"))?;
    }

    out.flush().context("flushing CSV output")?;
    Ok(())
}

/// Save `dataset` to a CSV file at `path`.
pub fn export_to_path(dataset: &Dataset, path: &Path) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("creating {}", path.display()))?;
    write_csv(dataset, file)?;
    log::info!("Exported {} record(s) to {}", dataset.len(), path.display());
    Ok(())
}
