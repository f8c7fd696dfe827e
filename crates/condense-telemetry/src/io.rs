//! JSONL I/O and atomic file operations

use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::Path;

/// Append a JSON record to a JSONL file
pub fn append_jsonl<T: Serialize>(path: &Path, record: &T) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let mut file = OpenOptions::new().create(true).append(true).open(path)?;

    let json = serde_json::to_string(record)?;
    writeln!(file, "{}", json)?;
    Ok(())
}

/// Read all records from a JSONL file, skipping malformed lines
pub fn read_jsonl<T: for<'de> Deserialize<'de>>(path: &Path) -> std::io::Result<Vec<T>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let mut records = Vec::new();

    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        if let Ok(record) = serde_json::from_str(&line) {
            records.push(record);
        }
    }

    Ok(records)
}

/// Write data atomically using temp file + rename
pub fn atomic_write(path: &Path, data: &[u8]) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let temp_path = path.with_extension("tmp");
    std::fs::write(&temp_path, data)?;
    std::fs::rename(temp_path, path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::UsageRecord;

    #[test]
    fn test_history_roundtrip() {
        let temp = tempfile::TempDir::new().unwrap();
        let history = temp.path().join("nested").join("history.jsonl");

        append_jsonl(&history, &UsageRecord::new("a.py", "strip", 100, 60)).unwrap();
        append_jsonl(&history, &UsageRecord::new("b.md", "summary", 400, 90)).unwrap();

        let records: Vec<UsageRecord> = read_jsonl(&history).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].source, "a.py");
        assert_eq!(records[1].compressed_tokens, 90);
    }

    #[test]
    fn test_read_skips_malformed_lines() {
        let temp = tempfile::TempDir::new().unwrap();
        let history = temp.path().join("history.jsonl");
        let good = serde_json::to_string(&UsageRecord::new("a.py", "strip", 8, 4)).unwrap();
        std::fs::write(&history, format!("{{not json\n\n{}\n", good)).unwrap();

        let records: Vec<UsageRecord> = read_jsonl(&history).unwrap();
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn test_read_missing_file_is_empty() {
        let records: Vec<UsageRecord> =
            read_jsonl(Path::new("/nonexistent/condense/history.jsonl")).unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn test_atomic_write() {
        let temp = tempfile::TempDir::new().unwrap();
        let out = temp.path().join("out.txt");

        atomic_write(&out, b"compressed").unwrap();
        atomic_write(&out, b"compressed again").unwrap();

        assert_eq!(std::fs::read(&out).unwrap(), b"compressed again");
        assert!(!out.with_extension("tmp").exists());
    }
}
