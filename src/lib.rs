//! # caza-rs - Copy-number z-score annotation
//!
//! Annotates genomic intervals with the normalized read density of the
//! coverage records overlapping them, measured against the genome-wide
//! reads-per-base distribution.

pub mod coverage;
pub mod intervals;
pub mod output;
pub mod stats;
pub mod utils;
pub mod zscore;

use serde::{Serialize, Serializer};
use std::fmt;

/// One region of the coverage table with its read statistics
#[derive(Debug, Clone, PartialEq)]
pub struct CoverageRecord {
    pub chrom: String,
    pub start: u64,
    pub end: u64,
    pub read_count: f64,
    pub bases_covered_1: f64,
    pub bases_covered_2: f64,
    pub percent_covered: f64,
    pub reads_per_base: f64,
}

impl CoverageRecord {
    pub fn new(
        chrom: String,
        start: u64,
        end: u64,
        read_count: f64,
        bases_covered_1: f64,
        bases_covered_2: f64,
        percent_covered: f64,
    ) -> Self {
        Self {
            chrom,
            start,
            end,
            read_count,
            bases_covered_1,
            bases_covered_2,
            percent_covered,
            reads_per_base: read_count / bases_covered_1,
        }
    }

    /// Half-open overlap test against `[start, end)`
    pub fn overlaps(&self, start: u64, end: u64) -> bool {
        self.start < end && self.end > start
    }
}

/// A region of interest to be annotated
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IntervalRecord {
    pub chrom: String,
    pub start: u64,
    pub end: u64,
    pub copy_number: String,
}

impl IntervalRecord {
    pub fn new(chrom: String, start: u64, end: u64, copy_number: String) -> Self {
        Self {
            chrom,
            start,
            end,
            copy_number,
        }
    }
}

/// A z-score, or the `na` sentinel when no coverage overlaps the interval
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ZScore {
    Value(f64),
    Na,
}

impl ZScore {
    pub fn value(&self) -> Option<f64> {
        match self {
            ZScore::Value(v) => Some(*v),
            ZScore::Na => None,
        }
    }

    pub fn is_na(&self) -> bool {
        matches!(self, ZScore::Na)
    }
}

impl fmt::Display for ZScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ZScore::Na => write!(f, "na"),
            // Integral values keep one decimal digit, e.g. `0.0`
            ZScore::Value(v) if v.is_finite() && v.fract() == 0.0 => write!(f, "{:.1}", v),
            ZScore::Value(v) => write!(f, "{}", v),
        }
    }
}

impl Serialize for ZScore {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// An interval annotated with both z-score variants
#[derive(Debug, Clone, PartialEq)]
pub struct IntervalZScore {
    pub interval: IntervalRecord,
    pub zscore_sample: ZScore,
    pub zscore_population: ZScore,
}

impl IntervalZScore {
    pub fn new(interval: IntervalRecord, zscore_sample: ZScore, zscore_population: ZScore) -> Self {
        Self {
            interval,
            zscore_sample,
            zscore_population,
        }
    }

    pub fn na(interval: IntervalRecord) -> Self {
        Self::new(interval, ZScore::Na, ZScore::Na)
    }
}

/// Quality thresholds applied to coverage records when filtering is enabled
#[derive(Debug, Clone, PartialEq)]
pub struct CoverageFilter {
    pub min_percent_covered: f64,
    pub min_reads_per_base: f64,
}

impl Default for CoverageFilter {
    fn default() -> Self {
        Self {
            min_percent_covered: 1.0,
            min_reads_per_base: 1.0,
        }
    }
}

impl CoverageFilter {
    pub fn accepts(&self, record: &CoverageRecord) -> bool {
        record.percent_covered >= self.min_percent_covered
            && record.reads_per_base >= self.min_reads_per_base
    }
}

/// Configuration for an annotation run
#[derive(Debug, Clone)]
pub struct AnnotationConfig {
    pub filter: Option<CoverageFilter>,
    pub num_processes: usize,
}

impl Default for AnnotationConfig {
    fn default() -> Self {
        Self {
            filter: None,
            num_processes: 1,
        }
    }
}

/// Error types for the caza library
#[derive(Debug, thiserror::Error)]
pub enum CazaError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Degenerate coverage baseline: {0}")]
    DegenerateBaseline(String),
}

pub type CazaResult<T> = Result<T, CazaError>;
