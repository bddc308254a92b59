use std::collections::HashSet;

use chrono::NaiveDate;

use crate::config::InputConfig;
use crate::error::ReviewError;
use crate::model::{ChargePeriod, RawReturnRow, ReturnMatchOutput};

/// Deduplicate raw pairing rows, split matched/unmatched, and collect charge periods.
///
/// A return appears once per charge element it matched, so the first-seen
/// row decides whether it counts as matched. Charge periods come from every
/// row, not the deduplicated list, one per charge version.
pub fn match_returns(rows: &[RawReturnRow]) -> ReturnMatchOutput {
    let mut seen_returns: HashSet<&str> = HashSet::new();
    let mut seen_versions: HashSet<&str> = HashSet::new();
    let mut out = ReturnMatchOutput::default();

    for row in rows {
        if seen_returns.insert(row.return_id.as_str()) {
            out.returns.push(row.clone());
        }

        if seen_versions.insert(row.charge_version_id.as_str()) {
            out.charge_periods.push(ChargePeriod {
                charge_version_id: row.charge_version_id.clone(),
                start_date: row.charge_period_start_date,
                end_date: row.charge_period_end_date,
            });
        }
    }

    let (matched, unmatched): (Vec<_>, Vec<_>) = out
        .returns
        .iter()
        .cloned()
        .partition(|r| r.charge_element_id.is_some());
    out.matched_returns = matched;
    out.unmatched_returns = unmatched;

    out
}

/// Load raw pairing rows from CSV, applying the configured column mapping.
///
/// An empty charge element cell means the return matched nothing.
pub fn load_csv_rows(csv_data: &str, input: &InputConfig) -> Result<Vec<RawReturnRow>, ReviewError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(csv_data.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| ReviewError::Io(e.to_string()))?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let col = &input.columns;

    let idx = |name: &str| -> Result<usize, ReviewError> {
        headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| ReviewError::MissingColumn { column: name.into() })
    };

    let return_idx = idx(&col.return_id)?;
    let element_idx = idx(&col.charge_element_id)?;
    let version_idx = idx(&col.charge_version_id)?;
    let start_idx = idx(&col.start_date)?;
    let end_idx = idx(&col.end_date)?;

    let mut rows = Vec::new();

    for (n, record) in reader.records().enumerate() {
        let record = record.map_err(|e| ReviewError::Io(e.to_string()))?;
        let row_number = n + 1;

        let date = |i: usize, column: &str| -> Result<NaiveDate, ReviewError> {
            let value = record.get(i).unwrap_or("").trim();
            NaiveDate::parse_from_str(value, &input.date_format).map_err(|_| ReviewError::DateParse {
                row: row_number,
                column: column.into(),
                value: value.into(),
            })
        };

        let charge_element_id = match record.get(element_idx).map(str::trim) {
            Some("") | None => None,
            Some(id) => Some(id.to_string()),
        };

        rows.push(RawReturnRow {
            return_id: record.get(return_idx).unwrap_or("").trim().to_string(),
            charge_element_id,
            charge_version_id: record.get(version_idx).unwrap_or("").trim().to_string(),
            charge_period_start_date: date(start_idx, &col.start_date)?,
            charge_period_end_date: date(end_idx, &col.end_date)?,
        });
    }

    Ok(rows)
}
