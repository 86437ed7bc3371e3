// Backup run: create the remote folders, read the catalog, resolve one
// image per breed or sub-breed and ask storage to pull each of them.
//
// Everything runs sequentially on the calling thread. Failures are
// isolated per breed (folder) and per candidate (resolution, transfer);
// only root folder, catalog and target-breed problems abort the run.

use crate::catalog::{BreedCatalog, ImageCatalog};
use crate::config::DiskLayout;
use crate::manifest::{write_manifest, ImageCandidate, TransferRecord, TransferStatus};
use crate::storage::RemoteStorage;
use anyhow::Result;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{error, info, warn};

/// Why a run stopped before any transfer was attempted. No manifest is
/// written in these cases.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AbortReason {
    #[error("could not create root folder {0}")]
    RootFolder(String),

    #[error("could not create images folder {0}")]
    ImagesFolder(String),

    #[error("could not get the list of breeds")]
    CatalogUnavailable,

    #[error("breed {0} not found")]
    UnknownBreed(String),
}

/// Summary of a run that reached the end and wrote its manifest.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub records: Vec<TransferRecord>,
    pub manifest_path: PathBuf,
    /// Breeds whose folder could not be created.
    pub skipped_breeds: Vec<String>,
    /// Candidates the catalog could not resolve to an image.
    pub unresolved: usize,
}

impl RunReport {
    pub fn succeeded(&self) -> usize {
        self.records.iter().filter(|r| r.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.records.len() - self.succeeded()
    }
}

#[derive(Debug, Clone)]
pub enum RunOutcome {
    Completed(RunReport),
    Aborted(AbortReason),
}

/// Read-only view on run progress, used for progress bars.
pub trait RunObserver {
    fn breeds_selected(&mut self, _count: usize) {}
    fn breed_started(&mut self, _breed: &str, _candidates: usize) {}
    fn transfer_recorded(&mut self, _record: &TransferRecord) {}
    fn breed_finished(&mut self, _breed: &str) {}
}

impl RunObserver for () {}

/// Drives one backup run over a storage and a catalog implementation.
pub struct BackupOrchestrator<S, C> {
    storage: S,
    catalog: C,
    layout: DiskLayout,
    manifest_path: PathBuf,
}

impl<S: RemoteStorage, C: ImageCatalog> BackupOrchestrator<S, C> {
    pub fn new(storage: S, catalog: C, layout: DiskLayout, manifest_path: impl Into<PathBuf>) -> Self {
        BackupOrchestrator {
            storage,
            catalog,
            layout,
            manifest_path: manifest_path.into(),
        }
    }

    pub fn layout(&self) -> &DiskLayout {
        &self.layout
    }

    pub fn manifest_path(&self) -> &Path {
        &self.manifest_path
    }

    /// Back up `target_breed`, or every breed in the catalog when `None`.
    ///
    /// Service-level failures never produce `Err`: fatal ones end in
    /// [`RunOutcome::Aborted`], the rest are recorded or skipped. `Err`
    /// is reserved for transport and I/O faults.
    pub fn run(&self, target_breed: Option<&str>, observer: &mut dyn RunObserver) -> Result<RunOutcome> {
        info!("Starting dog image backup");

        let root = self.layout.root_path();
        if !self.storage.ensure_folder(&root)? {
            return Ok(self.abort(AbortReason::RootFolder(root)));
        }
        let images = self.layout.images_path();
        if !self.storage.ensure_folder(&images)? {
            return Ok(self.abort(AbortReason::ImagesFolder(images)));
        }

        let catalog = self.catalog.list_all_breeds()?;
        if catalog.is_empty() {
            return Ok(self.abort(AbortReason::CatalogUnavailable));
        }

        let selected = match select_breeds(&catalog, target_breed) {
            Ok(selected) => selected,
            Err(reason) => return Ok(self.abort(reason)),
        };
        observer.breeds_selected(selected.len());

        let mut records = Vec::new();
        let mut skipped_breeds = Vec::new();
        let mut unresolved = 0;

        for (breed, sub_breeds) in selected {
            let folder = self.layout.breed_path(breed);
            if !self.storage.ensure_folder(&folder)? {
                error!("Could not create folder for breed {}, skipping it", breed);
                skipped_breeds.push(breed.to_string());
                observer.breed_finished(breed);
                continue;
            }

            let candidates = self.resolve_candidates(breed, sub_breeds, &mut unresolved)?;
            observer.breed_started(breed, candidates.len());
            for candidate in candidates {
                let record = self.transfer(candidate)?;
                observer.transfer_recorded(&record);
                records.push(record);
            }
            observer.breed_finished(breed);
        }

        write_manifest(&self.manifest_path, &records)?;
        info!("Results saved to {}", self.manifest_path.display());
        info!("Backup finished");

        Ok(RunOutcome::Completed(RunReport {
            records,
            manifest_path: self.manifest_path.clone(),
            skipped_breeds,
            unresolved,
        }))
    }

    fn abort(&self, reason: AbortReason) -> RunOutcome {
        error!("Backup aborted: {}", reason);
        RunOutcome::Aborted(reason)
    }

    /// One candidate per sub-breed, or a single one for the breed itself.
    fn resolve_candidates(&self, breed: &str, sub_breeds: &[String], unresolved: &mut usize) -> Result<Vec<ImageCandidate>> {
        let queries: Vec<Option<&str>> = if sub_breeds.is_empty() {
            vec![None]
        } else {
            sub_breeds.iter().map(|s| Some(s.as_str())).collect()
        };

        let mut candidates = Vec::with_capacity(queries.len());
        for sub_breed in queries {
            match self.catalog.resolve_image(breed, sub_breed)? {
                Some(source_url) => candidates.push(ImageCandidate {
                    breed: breed.to_string(),
                    sub_breed: sub_breed.map(String::from),
                    source_url,
                }),
                None => *unresolved += 1,
            }
        }
        Ok(candidates)
    }

    fn transfer(&self, candidate: ImageCandidate) -> Result<TransferRecord> {
        let filename = candidate.filename();
        let destination = self.layout.destination_path(&candidate.breed, &filename);

        let ack = self.storage.request_url_transfer(&candidate.source_url, &destination)?;
        let status = if ack.is_accepted() {
            TransferStatus::Success
        } else {
            warn!("Transfer of {} to {} was not accepted", candidate.source_url, destination);
            TransferStatus::Error
        };
        Ok(TransferRecord::new(candidate, filename, destination, status))
    }
}

/// Pick the breeds to process: only `target` when given (it must be in
/// the catalog), otherwise all of them in catalog order.
pub fn select_breeds<'a>(catalog: &'a BreedCatalog, target: Option<&str>) -> Result<Vec<(&'a str, &'a [String])>, AbortReason> {
    match target {
        Some(name) => catalog
            .get_key_value(name)
            .map(|(breed, subs)| vec![(breed.as_str(), subs.as_slice())])
            .ok_or_else(|| AbortReason::UnknownBreed(name.to_string())),
        None => Ok(catalog.iter().map(|(breed, subs)| (breed.as_str(), subs.as_slice())).collect()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> BreedCatalog {
        let mut c = BreedCatalog::new();
        c.insert("akita".into(), vec![]);
        c.insert("husky".into(), vec!["siberian".into()]);
        c
    }

    #[test]
    fn selects_only_requested_breed() {
        let c = catalog();
        let selected = select_breeds(&c, Some("husky")).unwrap();
        assert_eq!(selected, vec![("husky", &["siberian".to_string()][..])]);
    }

    #[test]
    fn selects_everything_without_target() {
        let c = catalog();
        let names: Vec<&str> = select_breeds(&c, None).unwrap().into_iter().map(|(b, _)| b).collect();
        assert_eq!(names, vec!["akita", "husky"]);
    }

    #[test]
    fn unknown_target_is_rejected() {
        let c = catalog();
        assert_eq!(
            select_breeds(&c, Some("wolf")).unwrap_err(),
            AbortReason::UnknownBreed("wolf".into())
        );
    }
}
