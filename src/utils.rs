//! Utility functions for file handling and common operations

use crate::{CazaError, CazaResult};
use flate2::read::MultiGzDecoder;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;
use std::str::FromStr;

/// Check if a file is gzip compressed
pub fn is_gzipped<P: AsRef<Path>>(path: P) -> CazaResult<bool> {
    let mut file = File::open(path)?;
    let mut buffer = [0; 2];

    match file.read_exact(&mut buffer) {
        Ok(()) => Ok(buffer == [0x1f, 0x8b]),
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => Ok(false),
        Err(e) => Err(CazaError::Io(e)),
    }
}

/// Open a plain or gzip compressed text file
pub fn open_text<P: AsRef<Path>>(path: P) -> CazaResult<Box<dyn BufRead>> {
    let file = File::open(&path)
        .map_err(|_| CazaError::FileNotFound(path.as_ref().to_string_lossy().to_string()))?;

    let reader: Box<dyn BufRead> = if is_gzipped(&path)? {
        Box::new(BufReader::new(MultiGzDecoder::new(file)))
    } else {
        Box::new(BufReader::new(file))
    };

    Ok(reader)
}

/// Open a headerless tab-separated table
pub fn open_tsv<P: AsRef<Path>>(path: P) -> CazaResult<csv::Reader<Box<dyn BufRead>>> {
    let reader = open_text(path)?;

    Ok(csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .flexible(true)
        .comment(Some(b'#'))
        .from_reader(reader))
}

/// BED-style header lines that carry no data
pub fn is_track_line(record: &csv::StringRecord) -> bool {
    match record.get(0) {
        Some(first) => {
            let first = first.trim();
            first.is_empty() || first.starts_with("track") || first.starts_with("browser")
        }
        None => true,
    }
}

/// Parse a single column of a table row, naming the line on failure
pub fn parse_field<T: FromStr>(
    record: &csv::StringRecord,
    index: usize,
    name: &str,
    line: u64,
) -> CazaResult<T> {
    let raw = record.get(index).ok_or_else(|| {
        CazaError::InvalidRecord(format!(
            "line {}: missing column {} ({})",
            line,
            index + 1,
            name
        ))
    })?;

    raw.trim().parse::<T>().map_err(|_| {
        CazaError::InvalidRecord(format!("line {}: invalid {}: {:?}", line, name, raw))
    })
}

/// Get the number of CPU cores, with a fallback default
pub fn get_num_cpus() -> usize {
    std::thread::available_parallelism()
        .map(|p| p.get())
        .unwrap_or(1)
}

/// Validate file paths and check if they exist
pub fn validate_file_exists<P: AsRef<Path>>(path: P) -> CazaResult<()> {
    if !path.as_ref().exists() {
        return Err(CazaError::FileNotFound(
            path.as_ref().to_string_lossy().to_string(),
        ));
    }
    Ok(())
}

/// Validate that a file is readable
pub fn validate_file_readable<P: AsRef<Path>>(path: P) -> CazaResult<()> {
    validate_file_exists(&path)?;

    File::open(&path)
        .map_err(|_| CazaError::FileNotFound(path.as_ref().to_string_lossy().to_string()))?;

    Ok(())
}

/// Timer utility for measuring execution time
pub struct Timer {
    start: std::time::Instant,
    name: String,
}

impl Timer {
    pub fn new(name: &str) -> Self {
        log::info!("Starting timer: {}", name);
        Timer {
            start: std::time::Instant::now(),
            name: name.to_string(),
        }
    }

    pub fn elapsed(&self) -> std::time::Duration {
        self.start.elapsed()
    }

    pub fn log_elapsed(&self) {
        log::info!("Timer '{}' elapsed: {:.2?}", self.name, self.elapsed());
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        self.log_elapsed();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_is_gzipped() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, "chr1\t0\t100").unwrap();
        assert!(!is_gzipped(temp_file.path()).unwrap());

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(&[0x1f, 0x8b]).unwrap();
        assert!(is_gzipped(temp_file.path()).unwrap());

        let empty = NamedTempFile::new().unwrap();
        assert!(!is_gzipped(empty.path()).unwrap());
    }

    #[test]
    fn test_open_text_reads_gzip() {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(b"chr1\t0\t100\n").unwrap();
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(&encoder.finish().unwrap()).unwrap();
        temp_file.flush().unwrap();

        let mut content = String::new();
        open_text(temp_file.path())
            .unwrap()
            .read_to_string(&mut content)
            .unwrap();
        assert_eq!(content, "chr1\t0\t100\n");
    }

    #[test]
    fn test_open_text_missing_file() {
        match open_text("/nonexistent/coverage.bed") {
            Err(CazaError::FileNotFound(path)) => assert!(path.contains("coverage.bed")),
            _ => panic!("expected FileNotFound"),
        }
    }

    #[test]
    fn test_parse_field() {
        let record = csv::StringRecord::from(vec!["chr1", "100", "abc"]);
        let start: u64 = parse_field(&record, 1, "start", 3).unwrap();
        assert_eq!(start, 100);

        let err = parse_field::<u64>(&record, 2, "end", 3).unwrap_err();
        assert!(err.to_string().contains("line 3"));

        assert!(parse_field::<f64>(&record, 5, "read_count", 3).is_err());
    }

    #[test]
    fn test_is_track_line() {
        assert!(is_track_line(&csv::StringRecord::from(vec!["track name=cov"])));
        assert!(is_track_line(&csv::StringRecord::from(vec!["browser position chr1"])));
        assert!(is_track_line(&csv::StringRecord::from(vec![""])));
        assert!(!is_track_line(&csv::StringRecord::from(vec!["chr1", "0", "10"])));
    }

    #[test]
    fn test_get_num_cpus() {
        assert!(get_num_cpus() >= 1);
    }

    #[test]
    fn test_validate_file_exists() {
        let temp_file = NamedTempFile::new().unwrap();
        assert!(validate_file_exists(temp_file.path()).is_ok());
        assert!(validate_file_exists("/nonexistent/file").is_err());
        assert!(validate_file_readable(temp_file.path()).is_ok());
    }

    #[test]
    fn test_timer() {
        let timer = Timer::new("test");
        std::thread::sleep(std::time::Duration::from_millis(1));
        assert!(timer.elapsed().as_millis() >= 1);
    }
}
