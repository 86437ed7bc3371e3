// Runtime configuration: where the two services live, how the remote
// folders are laid out and where the manifest and log files go.
// Values come from environment variables with sensible defaults; the CLI
// flags in `main.rs` override them.

use std::path::PathBuf;

pub const DEFAULT_DISK_URL: &str = "https://cloud-api.yandex.net/v1/disk";
pub const DEFAULT_CATALOG_URL: &str = "https://dog.ceo/api";
pub const DEFAULT_ROOT_FOLDER: &str = "/PY-130(API)";
pub const DEFAULT_IMAGES_FOLDER: &str = "dog_images";
pub const DEFAULT_MANIFEST_FILE: &str = "download_results.json";
pub const DEFAULT_LOG_FILE: &str = "dog_downloader.log";

/// Remote folder layout: `{root}/{images}/{breed}/{filename}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiskLayout {
    root: String,
    images: String,
}

impl DiskLayout {
    /// Build a layout. A trailing `/` on the root and any slashes around
    /// the images folder name are dropped so joined paths never double up.
    pub fn new(root: &str, images: &str) -> Self {
        let root = root.trim_end_matches('/');
        DiskLayout {
            root: if root.is_empty() { String::new() } else { root.to_string() },
            images: images.trim_matches('/').to_string(),
        }
    }

    /// Same images folder under a different root.
    pub fn with_root(&self, root: &str) -> Self {
        DiskLayout::new(root, &self.images)
    }

    pub fn root_path(&self) -> String {
        if self.root.is_empty() {
            "/".to_string()
        } else {
            self.root.clone()
        }
    }

    pub fn images_path(&self) -> String {
        format!("{}/{}", self.root, self.images)
    }

    pub fn breed_path(&self, breed: &str) -> String {
        format!("{}/{}", self.images_path(), breed)
    }

    pub fn destination_path(&self, breed: &str, filename: &str) -> String {
        format!("{}/{}", self.breed_path(breed), filename)
    }
}

impl Default for DiskLayout {
    fn default() -> Self {
        DiskLayout::new(DEFAULT_ROOT_FOLDER, DEFAULT_IMAGES_FOLDER)
    }
}

/// Everything the binary needs to build the clients and run a backup.
#[derive(Debug, Clone)]
pub struct Config {
    pub disk_url: String,
    pub catalog_url: String,
    pub layout: DiskLayout,
    pub manifest_path: PathBuf,
    pub log_path: PathBuf,
    pub token: Option<String>,
}

impl Config {
    /// Read configuration from `DOG_BACKUP_*` environment variables,
    /// falling back to the public service endpoints and the default
    /// folder and file names.
    pub fn from_env() -> Self {
        let var = |name: &str, default: &str| std::env::var(name).unwrap_or_else(|_| default.into());

        let root = var("DOG_BACKUP_ROOT", DEFAULT_ROOT_FOLDER);
        let images = var("DOG_BACKUP_IMAGES_DIR", DEFAULT_IMAGES_FOLDER);

        Config {
            disk_url: normalize_base_url(&var("DOG_BACKUP_DISK_URL", DEFAULT_DISK_URL)),
            catalog_url: normalize_base_url(&var("DOG_BACKUP_CATALOG_URL", DEFAULT_CATALOG_URL)),
            layout: DiskLayout::new(&root, &images),
            manifest_path: PathBuf::from(var("DOG_BACKUP_MANIFEST", DEFAULT_MANIFEST_FILE)),
            log_path: PathBuf::from(var("DOG_BACKUP_LOG_FILE", DEFAULT_LOG_FILE)),
            token: std::env::var("DOG_BACKUP_TOKEN").ok().filter(|t| !t.trim().is_empty()),
        }
    }
}

pub fn normalize_base_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_layout_matches_remote_folder_names() {
        let layout = DiskLayout::default();
        assert_eq!(layout.root_path(), "/PY-130(API)");
        assert_eq!(layout.images_path(), "/PY-130(API)/dog_images");
        assert_eq!(layout.breed_path("husky"), "/PY-130(API)/dog_images/husky");
        assert_eq!(
            layout.destination_path("husky", "husky_n02110185_1469.jpg"),
            "/PY-130(API)/dog_images/husky/husky_n02110185_1469.jpg"
        );
    }

    #[test]
    fn layout_drops_stray_slashes() {
        let layout = DiskLayout::new("/backup/", "/images/");
        assert_eq!(layout.images_path(), "/backup/images");
        assert_eq!(layout.with_root("/other").images_path(), "/other/images");
    }

    #[test]
    fn bare_slash_root_stays_addressable() {
        let layout = DiskLayout::new("/", "dogs");
        assert_eq!(layout.root_path(), "/");
        assert_eq!(layout.images_path(), "/dogs");
    }

    #[test]
    fn base_urls_lose_trailing_slash() {
        assert_eq!(normalize_base_url(" https://dog.ceo/api/ "), "https://dog.ceo/api");
    }
}
