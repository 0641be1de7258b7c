use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::Utc;
use log::info;
use uuid::Uuid;

use crate::config::StorageSettings;
use crate::errors::UploadError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFolder {
    Matches,
    Tournaments,
}

impl ImageFolder {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageFolder::Matches => "matches",
            ImageFolder::Tournaments => "tournaments",
        }
    }
}

/// Blob storage for submitted photos: files under `root`, served from
/// `public_base_url`.
#[derive(Debug, Clone)]
pub struct ImageStore {
    root: PathBuf,
    public_base_url: String,
}

impl ImageStore {
    pub fn new<P: AsRef<Path>>(root: P, public_base_url: &str) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn from_settings(settings: &StorageSettings) -> Self {
        Self::new(&settings.image_dir, &settings.public_image_url)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Stores a `data:image/...;base64,` payload and returns its public URL.
    pub fn upload_data_url(&self, folder: ImageFolder, data_url: &str) -> Result<String> {
        let bytes = decode_data_url(data_url)?;
        self.store(folder, &bytes)
    }

    pub fn upload_file(&self, folder: ImageFolder, path: &Path) -> Result<String> {
        let bytes = fs::read(path).map_err(|source| UploadError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        self.store(folder, &bytes)
    }

    fn store(&self, folder: ImageFolder, bytes: &[u8]) -> Result<String> {
        if bytes.is_empty() {
            return Err(UploadError::Empty.into());
        }

        let filename = format!("{}-{}.jpg", Utc::now().timestamp_millis(), Uuid::new_v4().simple());
        let dir = self.root.join(folder.as_str());
        let path = dir.join(&filename);

        fs::create_dir_all(&dir)
            .and_then(|_| fs::write(&path, bytes))
            .map_err(|source| UploadError::Write {
                path: path.clone(),
                source,
            })?;

        info!("Stored image {} ({} bytes)", path.display(), bytes.len());
        Ok(self.public_url(folder, &filename))
    }

    fn public_url(&self, folder: ImageFolder, filename: &str) -> String {
        format!(
            "{}/{}/{}",
            self.public_base_url,
            folder.as_str(),
            urlencoding::encode(filename)
        )
    }
}

fn decode_data_url(data_url: &str) -> Result<Vec<u8>, UploadError> {
    let (header, payload) = data_url
        .strip_prefix("data:")
        .and_then(|rest| rest.split_once(','))
        .ok_or(UploadError::InvalidDataUrl)?;
    if !header.ends_with(";base64") {
        return Err(UploadError::InvalidDataUrl);
    }

    let bytes = STANDARD.decode(payload.trim())?;
    if bytes.is_empty() {
        return Err(UploadError::Empty);
    }
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::is_upload;

    fn temp_store(name: &str) -> ImageStore {
        let root = std::env::temp_dir().join(format!("match_tracker_images_{}_{}", name, std::process::id()));
        let _ = fs::remove_dir_all(&root);
        ImageStore::new(root, "http://localhost:3000/images/")
    }

    #[test]
    fn test_upload_data_url_writes_file_and_returns_url() {
        let store = temp_store("data_url");
        let data_url = format!("data:image/jpeg;base64,{}", STANDARD.encode(b"jpeg bytes"));

        let url = store.upload_data_url(ImageFolder::Matches, &data_url).unwrap();

        assert!(url.starts_with("http://localhost:3000/images/matches/"));
        assert!(url.ends_with(".jpg"));
        let filename = url.rsplit('/').next().unwrap();
        let stored = fs::read(store.root().join("matches").join(filename)).unwrap();
        assert_eq!(stored, b"jpeg bytes");

        let _ = fs::remove_dir_all(store.root());
    }

    #[test]
    fn test_rejects_malformed_payloads() {
        let store = temp_store("malformed");

        for bad in ["not a data url", "data:image/png,raw", "data:image/png;base64,@@@", "data:image/png;base64,"] {
            let err = store.upload_data_url(ImageFolder::Tournaments, bad).unwrap_err();
            assert!(is_upload(&err), "{bad} should be an upload error");
        }
        assert!(!store.root().exists());
    }

    #[test]
    fn test_upload_missing_file_fails() {
        let store = temp_store("missing");
        let err = store
            .upload_file(ImageFolder::Matches, Path::new("/definitely/not/here.jpg"))
            .unwrap_err();
        assert!(matches!(err.downcast_ref::<UploadError>(), Some(UploadError::Read { .. })));
    }
}
