// Transfer records and the JSON manifest that lists them.
//
// A record is created exactly once per attempted transfer and never
// touched again. The manifest is the ordered list of records of one run,
// written once at the end of that run.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use url::Url;

/// An image location resolved from the catalog and waiting for transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageCandidate {
    pub breed: String,
    pub sub_breed: Option<String>,
    pub source_url: String,
}

impl ImageCandidate {
    /// Name the file gets on the storage side:
    /// `{breed}_{sub_breed}_{basename}` or `{breed}_{basename}`.
    pub fn filename(&self) -> String {
        let basename = url_basename(&self.source_url);
        match &self.sub_breed {
            Some(sub) => format!("{}_{}_{}", self.breed, sub, basename),
            None => format!("{}_{}", self.breed, basename),
        }
    }
}

/// Last segment of the URL path, without query string or fragment.
pub fn url_basename(source_url: &str) -> String {
    if let Ok(parsed) = Url::parse(source_url) {
        return parsed
            .path_segments()
            .and_then(|segments| segments.last())
            .unwrap_or_default()
            .to_string();
    }

    // Relative or otherwise unparsable input: strip suffixes by hand.
    let path = source_url.split(['?', '#']).next().unwrap_or_default();
    path.rsplit('/').next().unwrap_or_default().to_string()
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TransferStatus {
    Success,
    Error,
}

/// Outcome of one transfer request, in the manifest's on-disk shape.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct TransferRecord {
    pub breed: String,
    pub sub_breed: Option<String>,
    pub filename: String,
    #[serde(rename = "original_url")]
    pub source_url: String,
    #[serde(rename = "disk_path")]
    pub destination_path: String,
    pub status: TransferStatus,
}

impl TransferRecord {
    pub fn new(candidate: ImageCandidate, filename: String, destination_path: String, status: TransferStatus) -> Self {
        TransferRecord {
            breed: candidate.breed,
            sub_breed: candidate.sub_breed,
            filename,
            source_url: candidate.source_url,
            destination_path,
            status,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == TransferStatus::Success
    }
}

/// Write `records` as an indented JSON array, replacing any file already
/// at `path`.
pub fn write_manifest(path: &Path, records: &[TransferRecord]) -> Result<()> {
    let file = File::create(path).with_context(|| format!("Failed to create manifest {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, records).context("Failed to serialize manifest")?;
    writer.write_all(b"\n")?;
    writer.flush().with_context(|| format!("Failed to write manifest {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(sub_breed: Option<&str>) -> ImageCandidate {
        ImageCandidate {
            breed: "husky".into(),
            sub_breed: sub_breed.map(String::from),
            source_url: "https://images.dog.ceo/breeds/husky/n02110063_8514.jpg".into(),
        }
    }

    #[test]
    fn filename_includes_sub_breed_when_present() {
        assert_eq!(candidate(Some("siberian")).filename(), "husky_siberian_n02110063_8514.jpg");
        assert_eq!(candidate(None).filename(), "husky_n02110063_8514.jpg");
    }

    #[test]
    fn basename_ignores_query_and_fragment() {
        assert_eq!(url_basename("https://example.com/a/b/dog.jpg?size=large#top"), "dog.jpg");
        assert_eq!(url_basename("/relative/path/dog.png?x=1"), "dog.png");
    }

    #[test]
    fn basename_of_directory_url_is_empty() {
        assert_eq!(url_basename("https://example.com/breeds/"), "");
    }

    #[test]
    fn record_serializes_with_manifest_field_names() {
        let c = candidate(None);
        let record = TransferRecord::new(
            c.clone(),
            c.filename(),
            "/PY-130(API)/dog_images/husky/husky_n02110063_8514.jpg".into(),
            TransferStatus::Error,
        );
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["original_url"], c.source_url.as_str());
        assert_eq!(value["disk_path"], "/PY-130(API)/dog_images/husky/husky_n02110063_8514.jpg");
        assert_eq!(value["status"], "error");
        assert!(value["sub_breed"].is_null());
        assert_eq!(value.as_object().unwrap().len(), 6);
    }

    #[test]
    fn manifest_overwrites_previous_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("download_results.json");
        std::fs::write(&path, "stale").unwrap();

        let c = candidate(Some("siberian"));
        let records = vec![TransferRecord::new(c.clone(), c.filename(), "/x".into(), TransferStatus::Success)];
        write_manifest(&path, &records).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("[\n  {"));
        let back: Vec<TransferRecord> = serde_json::from_str(&text).unwrap();
        assert_eq!(back, records);
    }
}
