//! Interval definition loading

use crate::{
    utils::{is_track_line, open_tsv, parse_field},
    CazaError, CazaResult, IntervalRecord,
};
use std::path::Path;

const MIN_COLUMNS: usize = 4;

/// Read all intervals from a BED-like interval table, preserving file order
pub fn read_intervals<P: AsRef<Path>>(path: P) -> CazaResult<Vec<IntervalRecord>> {
    let mut reader = open_tsv(&path)?;
    let mut intervals = Vec::new();

    for result in reader.records() {
        let row = result?;
        if is_track_line(&row) {
            continue;
        }
        let line = row.position().map(|p| p.line()).unwrap_or(0);

        if row.len() < MIN_COLUMNS {
            return Err(CazaError::InvalidRecord(format!(
                "line {}: expected at least {} columns in interval table, found {}",
                line,
                MIN_COLUMNS,
                row.len()
            )));
        }

        let start: u64 = parse_field(&row, 1, "interval start", line)?;
        let end: u64 = parse_field(&row, 2, "interval end", line)?;
        if end < start {
            log::warn!("Interval on line {} ends before it starts ({} > {})", line, start, end);
        }

        intervals.push(IntervalRecord::new(
            row[0].trim().to_string(),
            start,
            end,
            row[3].trim().to_string(),
        ));
    }

    log::debug!("Read {} intervals from {:?}", intervals.len(), path.as_ref());

    Ok(intervals)
}
