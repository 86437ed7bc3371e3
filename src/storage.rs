// Storage side: a small blocking client for the Yandex.Disk REST API.
// Only two calls are used: create a folder and ask the service to pull a
// file from a URL. Non-success answers are logged and turned into plain
// values; only transport failures surface as `Err`.

use anyhow::{Context, Result};
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::StatusCode;
use tracing::{error, info};

/// Answer to a URL upload request. `Accepted` only means the service
/// queued the download; completion is never confirmed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferAck {
    Accepted,
    Rejected { status: u16 },
}

impl TransferAck {
    pub fn is_accepted(&self) -> bool {
        matches!(self, TransferAck::Accepted)
    }
}

/// Folder and transfer operations the backup run needs from storage.
pub trait RemoteStorage {
    /// Create the folder at `path`. An existing folder counts as success.
    fn ensure_folder(&self, path: &str) -> Result<bool>;

    /// Ask the service to fetch `source_url` into `destination_path`.
    fn request_url_transfer(&self, source_url: &str, destination_path: &str) -> Result<TransferAck>;
}

impl<T: RemoteStorage + ?Sized> RemoteStorage for &T {
    fn ensure_folder(&self, path: &str) -> Result<bool> {
        (**self).ensure_folder(path)
    }

    fn request_url_transfer(&self, source_url: &str, destination_path: &str) -> Result<TransferAck> {
        (**self).request_url_transfer(source_url, destination_path)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FolderStatus {
    Created,
    AlreadyExists,
    Failed,
}

pub fn folder_status(status: StatusCode) -> FolderStatus {
    match status {
        StatusCode::CREATED => FolderStatus::Created,
        StatusCode::CONFLICT => FolderStatus::AlreadyExists,
        _ => FolderStatus::Failed,
    }
}

pub fn transfer_ack(status: StatusCode) -> TransferAck {
    if status == StatusCode::ACCEPTED {
        TransferAck::Accepted
    } else {
        TransferAck::Rejected { status: status.as_u16() }
    }
}

/// HTTP client for the disk API, authenticated with an OAuth token.
#[derive(Clone)]
pub struct DiskClient {
    client: Client,
    base_url: String,
}

impl DiskClient {
    /// Build a client for `base_url` (e.g. `https://cloud-api.yandex.net/v1/disk`)
    /// that sends `Authorization: OAuth <token>` with every request.
    pub fn new(base_url: &str, token: &str) -> Result<Self> {
        let mut headers = HeaderMap::new();
        let auth = HeaderValue::from_str(&format!("OAuth {}", token.trim()))
            .context("Token contains characters not allowed in an HTTP header")?;
        headers.insert(AUTHORIZATION, auth);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .default_headers(headers)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(DiskClient {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

impl RemoteStorage for DiskClient {
    fn ensure_folder(&self, path: &str) -> Result<bool> {
        let url = format!("{}/resources", &self.base_url);
        let res = self
            .client
            .put(&url)
            .query(&[("path", path)])
            .send()
            .with_context(|| format!("Failed to send folder request for {}", path))?;

        match folder_status(res.status()) {
            FolderStatus::Created => {
                info!("Folder '{}' created", path);
                Ok(true)
            }
            FolderStatus::AlreadyExists => {
                info!("Folder '{}' already exists", path);
                Ok(true)
            }
            FolderStatus::Failed => {
                error!("Failed to create folder '{}': {}", path, res.status());
                Ok(false)
            }
        }
    }

    fn request_url_transfer(&self, source_url: &str, destination_path: &str) -> Result<TransferAck> {
        let url = format!("{}/resources/upload", &self.base_url);
        let res = self
            .client
            .post(&url)
            .query(&[("path", destination_path), ("url", source_url)])
            .send()
            .with_context(|| format!("Failed to send upload request for {}", destination_path))?;

        let ack = transfer_ack(res.status());
        match ack {
            TransferAck::Accepted => info!("Upload of '{}' accepted", destination_path),
            TransferAck::Rejected { status } => {
                error!("Upload of '{}' rejected: {}", destination_path, status)
            }
        }
        Ok(ack)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conflict_means_folder_exists() {
        assert_eq!(folder_status(StatusCode::CREATED), FolderStatus::Created);
        assert_eq!(folder_status(StatusCode::CONFLICT), FolderStatus::AlreadyExists);
        assert_eq!(folder_status(StatusCode::UNAUTHORIZED), FolderStatus::Failed);
        assert_eq!(folder_status(StatusCode::OK), FolderStatus::Failed);
    }

    #[test]
    fn only_accepted_counts_as_transfer_ack() {
        assert!(transfer_ack(StatusCode::ACCEPTED).is_accepted());
        assert_eq!(transfer_ack(StatusCode::OK), TransferAck::Rejected { status: 200 });
        assert_eq!(transfer_ack(StatusCode::INSUFFICIENT_STORAGE), TransferAck::Rejected { status: 507 });
    }

    #[test]
    fn token_with_newline_is_rejected() {
        assert!(DiskClient::new("https://cloud-api.yandex.net/v1/disk", "abc\ndef").is_err());
    }
}
