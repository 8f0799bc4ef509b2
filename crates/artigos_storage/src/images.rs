use artigos_core::{Result, Upload};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

/// Prefix under which stored images are referenced and served.
pub const IMAGE_URL_PREFIX: &str = "/images";

/// Flat directory of uploaded images.
///
/// Files are referenced from articles as `/images/<filename>`. Only references
/// of that exact shape are ever resolved back to a path, so nothing outside
/// the directory can be touched through an article field.
#[derive(Debug, Clone)]
pub struct ImageStore {
    dir: PathBuf,
}

impl ImageStore {
    /// Use `dir` for uploads, creating it when missing.
    pub async fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir).await?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write `upload` and return its reference. An existing file with the same
    /// sanitized name is overwritten.
    pub async fn save(&self, upload: &Upload) -> Result<String> {
        let mut filename = sanitize_filename(&upload.filename);
        if filename.is_empty() {
            filename = uuid::Uuid::new_v4().simple().to_string();
        }

        let path = self.dir.join(&filename);
        fs::write(&path, &upload.bytes).await?;
        info!(file = %path.display(), bytes = upload.bytes.len(), "Stored uploaded image");

        Ok(format!("{}/{}", IMAGE_URL_PREFIX, filename))
    }

    /// Whether `reference` points at a file this store manages.
    pub fn is_managed(&self, reference: &str) -> bool {
        managed_filename(reference).is_some()
    }

    pub fn path_for(&self, reference: &str) -> Option<PathBuf> {
        managed_filename(reference).map(|name| self.dir.join(name))
    }

    /// Delete the file behind `reference`.
    ///
    /// Returns `false` when the reference is not managed or the file is
    /// already gone; neither is an error.
    pub async fn remove(&self, reference: &str) -> Result<bool> {
        let Some(path) = self.path_for(reference) else {
            return Ok(false);
        };
        match fs::remove_file(&path).await {
            Ok(()) => {
                info!(file = %path.display(), "Removed image");
                Ok(true)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(file = %path.display(), "Image already gone");
                Ok(false)
            }
            Err(e) => Err(e.into()),
        }
    }
}

fn managed_filename(reference: &str) -> Option<&str> {
    let name = reference.strip_prefix(IMAGE_URL_PREFIX)?.strip_prefix('/')?;
    if name.is_empty() || sanitize_filename(name) != name {
        return None;
    }
    Some(name)
}

/// Reduce a client-supplied filename to a safe, flat ASCII name.
///
/// Non-ASCII characters are dropped, path separators and whitespace runs
/// become a single `_`, anything outside `[A-Za-z0-9._-]` is removed, and
/// leading or trailing dots and underscores are stripped. The result may be
/// empty.
pub fn sanitize_filename(filename: &str) -> String {
    let ascii: String = filename
        .chars()
        .filter(char::is_ascii)
        .map(|c| if c == '/' || c == '\\' { ' ' } else { c })
        .collect();

    let joined = ascii.split_whitespace().collect::<Vec<_>>().join("_");
    let filtered: String = joined
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
        .collect();

    filtered.trim_matches(|c| c == '.' || c == '_').to_string()
}
