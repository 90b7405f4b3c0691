//! CSV export of segmented datasets and a content-addressed export cache

use std::collections::HashMap;
use std::path::Path;

use anyhow::Context;
use polars::prelude::*;
use sha2::{Digest, Sha256};
use tracing::debug;

/// Serialize `df` as UTF-8 CSV with a header row and no index column
pub fn to_csv_bytes(df: &DataFrame) -> crate::Result<Vec<u8>> {
    let mut frame = df.clone();
    let mut buffer = Vec::new();
    CsvWriter::new(&mut buffer)
        .include_header(true)
        .finish(&mut frame)
        .context("failed to serialize dataset as CSV")?;
    Ok(buffer)
}

/// Content address of an export: the source bytes plus the segment labels
///
/// Two runs over the same source with the same labeling serialize to the
/// same CSV, so they share a key.
pub fn export_key(source: &[u8], labels: &[usize]) -> String {
    let mut hasher = Sha256::new();
    hasher.update((source.len() as u64).to_le_bytes());
    hasher.update(source);
    for &label in labels {
        hasher.update((label as u64).to_le_bytes());
    }
    format!("{:x}", hasher.finalize())
}

/// Memoized CSV exports keyed by content, owned by the host application
#[derive(Debug, Default)]
pub struct ExportCache {
    entries: HashMap<String, Vec<u8>>,
}

impl ExportCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serialized CSV for `df`, reusing a previous export with the same key
    pub fn get_or_export(&mut self, key: &str, df: &DataFrame) -> crate::Result<&[u8]> {
        if !self.entries.contains_key(key) {
            let bytes = to_csv_bytes(df)?;
            self.entries.insert(key.to_string(), bytes);
        } else {
            debug!(key, "export cache hit");
        }
        Ok(&self.entries[key])
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Write CSV bytes to `path`
pub fn write_csv(path: impl AsRef<Path>, bytes: &[u8]) -> crate::Result<()> {
    let path = path.as_ref();
    std::fs::write(path, bytes).with_context(|| format!("failed to write {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame() -> DataFrame {
        DataFrame::new(vec![
            Column::new("Gender".into(), ["Male", "Female"]),
            Column::new("Age".into(), [19i64, 35]),
            Column::new("Persona".into(), [1u32, 0]),
        ])
        .unwrap()
    }

    #[test]
    fn test_csv_has_header_and_no_index() {
        let bytes = to_csv_bytes(&frame()).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines, vec!["Gender,Age,Persona", "Male,19,1", "Female,35,0"]);
    }

    #[test]
    fn test_export_key_depends_on_source_and_labels() {
        let source = b"a,b\n1,2\n";
        let key = export_key(source, &[0, 1]);
        assert_eq!(key, export_key(source, &[0, 1]));
        assert_ne!(key, export_key(source, &[1, 0]));
        assert_ne!(key, export_key(b"a,b\n1,3\n", &[0, 1]));
        assert_eq!(key.len(), 64);
    }

    #[test]
    fn test_cache_reuses_export() {
        let mut cache = ExportCache::new();
        let key = export_key(b"source", &[1, 0]);
        let first = cache.get_or_export(&key, &frame()).unwrap().to_vec();

        // A different frame under the same key is served from the cache
        let other = DataFrame::new(vec![Column::new("x".into(), [1i64])]).unwrap();
        let second = cache.get_or_export(&key, &other).unwrap().to_vec();

        assert_eq!(first, second);
        assert_eq!(cache.len(), 1);
        assert!(cache.contains(&key));

        cache.clear();
        assert!(cache.is_empty());
    }
}
