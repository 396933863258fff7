//! Coverage table loading and preprocessing

use crate::{
    utils::{is_track_line, open_tsv, parse_field},
    CazaError, CazaResult, CoverageFilter, CoverageRecord,
};
use std::path::Path;

/// Column indices of the coverage table; column 3 holds gene ids and is skipped
const CHROM_COL: usize = 0;
const START_COL: usize = 1;
const END_COL: usize = 2;
const READ_COUNT_COL: usize = 4;
const BASES_COVERED_1_COL: usize = 5;
const BASES_COVERED_2_COL: usize = 6;
const PERCENT_COVERED_COL: usize = 7;

/// Counts collected while preprocessing the coverage table
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CoverageSummary {
    pub loaded: usize,
    pub zero_coverage: usize,
    pub filtered: usize,
    pub retained: usize,
}

/// Read all records from a coverage table
pub fn read_coverage_table<P: AsRef<Path>>(path: P) -> CazaResult<Vec<CoverageRecord>> {
    let mut reader = open_tsv(&path)?;
    let mut records = Vec::new();

    for result in reader.records() {
        let row = result?;
        if is_track_line(&row) {
            continue;
        }
        let line = row.position().map(|p| p.line()).unwrap_or(0);

        if row.len() <= PERCENT_COVERED_COL {
            return Err(CazaError::InvalidRecord(format!(
                "line {}: expected at least {} columns in coverage table, found {}",
                line,
                PERCENT_COVERED_COL + 1,
                row.len()
            )));
        }

        let chrom = row[CHROM_COL].trim().to_string();
        let start = parse_field(&row, START_COL, "start", line)?;
        let end = parse_field(&row, END_COL, "end", line)?;
        let read_count = parse_field(&row, READ_COUNT_COL, "read count", line)?;
        let bases_covered_1 = parse_field(&row, BASES_COVERED_1_COL, "bases covered 1", line)?;
        let bases_covered_2 = parse_field(&row, BASES_COVERED_2_COL, "bases covered 2", line)?;
        let percent_covered = parse_field(&row, PERCENT_COVERED_COL, "percent covered", line)?;

        records.push(CoverageRecord::new(
            chrom,
            start,
            end,
            read_count,
            bases_covered_1,
            bases_covered_2,
            percent_covered,
        ));
    }

    log::debug!(
        "Read {} coverage records from {:?}",
        records.len(),
        path.as_ref()
    );

    Ok(records)
}

/// Drop zero-coverage records and apply the optional quality filter
pub fn preprocess_coverage(
    records: Vec<CoverageRecord>,
    filter: Option<&CoverageFilter>,
) -> (Vec<CoverageRecord>, CoverageSummary) {
    let mut summary = CoverageSummary {
        loaded: records.len(),
        ..Default::default()
    };

    let retained: Vec<CoverageRecord> = records
        .into_iter()
        .filter(|record| {
            if record.bases_covered_1 == 0.0 {
                summary.zero_coverage += 1;
                return false;
            }
            match filter {
                Some(filter) if !filter.accepts(record) => {
                    summary.filtered += 1;
                    false
                }
                _ => true,
            }
        })
        .collect();

    summary.retained = retained.len();
    (retained, summary)
}

/// Load and preprocess a coverage table in one step
pub fn load_coverage<P: AsRef<Path>>(
    path: P,
    filter: Option<&CoverageFilter>,
) -> CazaResult<(Vec<CoverageRecord>, CoverageSummary)> {
    let records = read_coverage_table(path)?;
    Ok(preprocess_coverage(records, filter))
}

/// Validate coverage filter thresholds
pub fn validate_filter(filter: &CoverageFilter) -> CazaResult<()> {
    if !filter.min_percent_covered.is_finite() || filter.min_percent_covered < 0.0 {
        return Err(CazaError::InvalidConfig(
            "min_percent_covered must be a non-negative number".to_string(),
        ));
    }

    if !filter.min_reads_per_base.is_finite() || filter.min_reads_per_base < 0.0 {
        return Err(CazaError::InvalidConfig(
            "min_reads_per_base must be a non-negative number".to_string(),
        ));
    }

    Ok(())
}
