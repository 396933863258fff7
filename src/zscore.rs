//! Per-interval z-score calculation against the genome-wide coverage baseline

use crate::{
    stats::{mean, GenomeBaseline},
    CazaError, CazaResult, CoverageRecord, IntervalRecord, IntervalZScore, ZScore,
};
use rayon::prelude::*;
use std::collections::HashMap;

/// Coverage records grouped by chromosome and sorted by start for overlap lookups
#[derive(Debug)]
pub struct CoverageIndex<'a> {
    by_chrom: HashMap<&'a str, Vec<&'a CoverageRecord>>,
}

impl<'a> CoverageIndex<'a> {
    pub fn build(records: &'a [CoverageRecord]) -> Self {
        let mut by_chrom: HashMap<&'a str, Vec<&'a CoverageRecord>> = HashMap::new();
        for record in records {
            by_chrom.entry(record.chrom.as_str()).or_default().push(record);
        }
        for chrom_records in by_chrom.values_mut() {
            chrom_records.sort_by_key(|r| r.start);
        }
        Self { by_chrom }
    }

    pub fn num_chromosomes(&self) -> usize {
        self.by_chrom.len()
    }

    /// Records on `chrom` overlapping the half-open range `[start, end)`
    pub fn overlapping(&self, chrom: &str, start: u64, end: u64) -> Vec<&'a CoverageRecord> {
        let Some(chrom_records) = self.by_chrom.get(chrom) else {
            return Vec::new();
        };

        // Everything past this point starts at or after `end`
        let candidates = chrom_records.partition_point(|r| r.start < end);

        chrom_records[..candidates]
            .iter()
            .copied()
            .filter(|r| r.overlaps(start, end))
            .collect()
    }
}

/// Read-only state shared by every per-interval computation
pub struct AnnotationContext<'a> {
    pub index: CoverageIndex<'a>,
    pub baseline: GenomeBaseline,
}

impl<'a> AnnotationContext<'a> {
    pub fn new(coverage: &'a [CoverageRecord]) -> Self {
        Self {
            index: CoverageIndex::build(coverage),
            baseline: GenomeBaseline::from_records(coverage),
        }
    }

    /// Annotate a single interval, yielding `na` when no coverage overlaps it
    pub fn interval_zscore(&self, interval: &IntervalRecord) -> CazaResult<IntervalZScore> {
        let overlaps = self
            .index
            .overlapping(&interval.chrom, interval.start, interval.end);

        let values: Vec<f64> = overlaps.iter().map(|r| r.reads_per_base).collect();
        let Some(local_mean) = mean(&values) else {
            return Ok(IntervalZScore::na(interval.clone()));
        };

        let (global_mean, sample_sd, population_sd) =
            self.baseline.checked().map_err(|e| match e {
                CazaError::DegenerateBaseline(msg) => CazaError::DegenerateBaseline(format!(
                    "{} (interval {}:{}-{})",
                    msg, interval.chrom, interval.start, interval.end
                )),
                other => other,
            })?;

        let deviation = local_mean - global_mean;
        Ok(IntervalZScore::new(
            interval.clone(),
            ZScore::Value(deviation / sample_sd),
            ZScore::Value(deviation / population_sd),
        ))
    }
}

/// Annotate every interval, preserving input order; any failure aborts the whole run
pub fn annotate_intervals(
    intervals: &[IntervalRecord],
    coverage: &[CoverageRecord],
    num_processes: usize,
) -> CazaResult<Vec<IntervalZScore>> {
    if intervals.is_empty() {
        return Ok(Vec::new());
    }

    let context = AnnotationContext::new(coverage);
    log::debug!(
        "Coverage index spans {} chromosomes; baseline over {} records",
        context.index.num_chromosomes(),
        context.baseline.count
    );

    let num_processes = num_processes.clamp(1, intervals.len());
    if num_processes == 1 {
        return intervals
            .iter()
            .map(|interval| context.interval_zscore(interval))
            .collect();
    }

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(num_processes)
        .build()
        .map_err(|e| CazaError::InvalidConfig(format!("failed to build thread pool: {}", e)))?;

    pool.install(|| {
        intervals
            .par_iter()
            .map(|interval| context.interval_zscore(interval))
            .collect()
    })
}

/// Summary of an annotation run for logging
#[derive(Debug, Clone, PartialEq)]
pub struct ZScoreSummary {
    pub annotated: usize,
    pub not_covered: usize,
    pub min_sample: Option<f64>,
    pub max_sample: Option<f64>,
}

pub fn summarize(results: &[IntervalZScore]) -> ZScoreSummary {
    let scores: Vec<f64> = results
        .iter()
        .filter_map(|r| r.zscore_sample.value())
        .collect();

    let (min_sample, max_sample) = if scores.is_empty() {
        (None, None)
    } else {
        (
            Some(scores.iter().copied().fold(f64::INFINITY, f64::min)),
            Some(scores.iter().copied().fold(f64::NEG_INFINITY, f64::max)),
        )
    };

    ZScoreSummary {
        annotated: scores.len(),
        not_covered: results.len() - scores.len(),
        min_sample,
        max_sample,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::{population_sd, sample_sd};

    fn coverage(chrom: &str, start: u64, end: u64, reads: f64, bases: f64) -> CoverageRecord {
        CoverageRecord::new(chrom.to_string(), start, end, reads, bases, bases, 1.0)
    }

    fn interval(chrom: &str, start: u64, end: u64) -> IntervalRecord {
        IntervalRecord::new(chrom.to_string(), start, end, "2".to_string())
    }

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn sample_coverage() -> Vec<CoverageRecord> {
        vec![
            coverage("chr1", 0, 100, 10.0, 10.0),
            coverage("chr1", 100, 200, 30.0, 10.0),
            coverage("chr1", 200, 300, 20.0, 10.0),
            coverage("chr2", 0, 100, 40.0, 10.0),
        ]
    }

    #[test]
    fn test_overlap_boundaries_are_exclusive() {
        let records = sample_coverage();
        let index = CoverageIndex::build(&records);

        let hits = index.overlapping("chr1", 100, 200);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].start, 100);

        assert_eq!(index.overlapping("chr1", 99, 101).len(), 2);
        assert!(index.overlapping("chr1", 300, 400).is_empty());
        assert!(index.overlapping("chr3", 0, 1000).is_empty());
    }

    #[test]
    fn test_overlap_with_unsorted_and_nested_records() {
        let records = vec![
            coverage("chr1", 500, 600, 1.0, 1.0),
            coverage("chr1", 0, 1000, 1.0, 1.0),
            coverage("chr1", 50, 60, 1.0, 1.0),
        ];
        let index = CoverageIndex::build(&records);

        let hits = index.overlapping("chr1", 550, 560);
        let starts: Vec<u64> = hits.iter().map(|r| r.start).collect();
        assert_eq!(starts, vec![0, 500]);
    }

    #[test]
    fn test_interval_exactly_covering_one_record() {
        let records = sample_coverage();
        let context = AnnotationContext::new(&records);

        let result = context.interval_zscore(&interval("chr1", 100, 200)).unwrap();

        let values = [1.0, 3.0, 2.0, 4.0];
        let expected_sample = (3.0 - 2.5) / sample_sd(&values).unwrap();
        let expected_population = (3.0 - 2.5) / population_sd(&values).unwrap();
        assert!(approx_eq(result.zscore_sample.value().unwrap(), expected_sample));
        assert!(approx_eq(
            result.zscore_population.value().unwrap(),
            expected_population
        ));
    }

    #[test]
    fn test_interval_uses_mean_of_overlaps() {
        let records = sample_coverage();
        let context = AnnotationContext::new(&records);

        let result = context.interval_zscore(&interval("chr1", 50, 250)).unwrap();

        let values = [1.0, 3.0, 2.0, 4.0];
        let expected = (2.0 - 2.5) / sample_sd(&values).unwrap();
        assert!(approx_eq(result.zscore_sample.value().unwrap(), expected));
    }

    #[test]
    fn test_interval_without_overlap_is_na() {
        let records = sample_coverage();
        let context = AnnotationContext::new(&records);

        let result = context.interval_zscore(&interval("chr1", 300, 400)).unwrap();
        assert!(result.zscore_sample.is_na());
        assert!(result.zscore_population.is_na());

        let result = context.interval_zscore(&interval("chrY", 0, 100)).unwrap();
        assert!(result.zscore_sample.is_na());
    }

    #[test]
    fn test_single_record_baseline_fails() {
        let records = vec![coverage("chr1", 0, 100, 10.0, 10.0)];
        let result = annotate_intervals(&[interval("chr1", 0, 100)], &records, 1);

        match result {
            Err(CazaError::DegenerateBaseline(msg)) => assert!(msg.contains("chr1:0-100")),
            other => panic!("expected DegenerateBaseline, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_coverage_yields_na() {
        let results = annotate_intervals(
            &[interval("chr1", 0, 100), interval("chr2", 0, 100)],
            &[],
            1,
        )
        .unwrap();

        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|r| r.zscore_sample.is_na() && r.zscore_population.is_na()));
    }

    #[test]
    fn test_annotate_preserves_order_in_parallel() {
        let records = sample_coverage();
        let intervals: Vec<IntervalRecord> = (0..50)
            .map(|i| {
                let chrom = if i % 3 == 0 { "chr2" } else { "chr1" };
                interval(chrom, (i % 4) * 100, (i % 4) * 100 + 50)
            })
            .collect();

        let sequential = annotate_intervals(&intervals, &records, 1).unwrap();
        let parallel = annotate_intervals(&intervals, &records, 4).unwrap();

        assert_eq!(parallel.len(), intervals.len());
        assert_eq!(sequential, parallel);
        for (result, input) in parallel.iter().zip(intervals.iter()) {
            assert_eq!(&result.interval, input);
        }
    }

    #[test]
    fn test_summarize() {
        let records = sample_coverage();
        let results = annotate_intervals(
            &[
                interval("chr1", 0, 100),
                interval("chr2", 0, 100),
                interval("chr3", 0, 100),
            ],
            &records,
            1,
        )
        .unwrap();

        let summary = summarize(&results);
        assert_eq!(summary.annotated, 2);
        assert_eq!(summary.not_covered, 1);
        assert!(summary.min_sample.unwrap() < 0.0);
        assert!(summary.max_sample.unwrap() > 0.0);
    }
}
