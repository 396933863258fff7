//! Writing annotated intervals

use crate::{CazaResult, IntervalZScore, ZScore};
use serde::Serialize;
use std::path::{Path, PathBuf};

const OUTPUT_SUFFIX: &str = "_zscore.txt";

#[derive(Debug, Serialize)]
struct ZScoreRow<'a> {
    chrom: &'a str,
    start: u64,
    end: u64,
    zscore_sample: ZScore,
    zscore_population: ZScore,
}

impl<'a> From<&'a IntervalZScore> for ZScoreRow<'a> {
    fn from(result: &'a IntervalZScore) -> Self {
        Self {
            chrom: &result.interval.chrom,
            start: result.interval.start,
            end: result.interval.end,
            zscore_sample: result.zscore_sample,
            zscore_population: result.zscore_population,
        }
    }
}

/// Output file for a prefix, dropping a trailing `.bed` from the prefix
pub fn output_path<P: AsRef<Path>>(output_dir: P, output_prefix: &str) -> PathBuf {
    let prefix = output_prefix.strip_suffix(".bed").unwrap_or(output_prefix);
    output_dir
        .as_ref()
        .join(format!("{}{}", prefix, OUTPUT_SUFFIX))
}

/// Write annotated intervals as a headerless TSV, one row per interval
pub fn write_zscore_results<P: AsRef<Path>>(
    results: &[IntervalZScore],
    output_path: P,
) -> CazaResult<()> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .from_path(&output_path)?;

    for result in results {
        writer.serialize(ZScoreRow::from(result))?;
    }
    writer.flush()?;

    log::debug!(
        "Wrote {} rows to {:?}",
        results.len(),
        output_path.as_ref()
    );

    Ok(())
}
