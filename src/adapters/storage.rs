use crate::domain::model::{Contest, SeenSet};
use crate::domain::ports::SeenStore;
use crate::utils::error::{LoadError, SaveError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

pub const STATE_VERSION: u32 = 1;

#[derive(Deserialize)]
struct StateFile {
    version: u32,
    contests: BTreeMap<String, Contest>,
}

#[derive(Serialize)]
struct StateFileRef<'a> {
    version: u32,
    contests: &'a SeenSet,
}

/// Seen-set persisted as one JSON document. Saves go through a sibling
/// temp file and a rename, so the target is always either the old or the
/// new content.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn display_path(&self) -> String {
        self.path.display().to_string()
    }

    fn temp_path(&self) -> io::Result<PathBuf> {
        let mut name = self
            .path
            .file_name()
            .ok_or_else(|| {
                io::Error::new(io::ErrorKind::InvalidInput, "state path has no file name")
            })?
            .to_os_string();
        name.push(".tmp");
        Ok(self.path.with_file_name(name))
    }

    fn parse(&self, bytes: &[u8]) -> Result<SeenSet, LoadError> {
        let corrupt = |message: String| LoadError::Corrupt {
            path: self.display_path(),
            message,
        };

        let file: StateFile = serde_json::from_slice(bytes).map_err(|e| corrupt(e.to_string()))?;
        if file.version != STATE_VERSION {
            return Err(corrupt(format!("unsupported state version {}", file.version)));
        }
        let mut seen = SeenSet::new();
        for (key, contest) in file.contests {
            if key != contest.id {
                return Err(corrupt(format!(
                    "entry '{}' holds contest '{}'",
                    key, contest.id
                )));
            }
            seen.insert(contest);
        }
        Ok(seen)
    }

    async fn write_atomically(&self, bytes: &[u8]) -> io::Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let tmp = self.temp_path()?;
        let written = async {
            let mut file = tokio::fs::File::create(&tmp).await?;
            file.write_all(bytes).await?;
            file.sync_all().await?;
            drop(file);
            tokio::fs::rename(&tmp, &self.path).await
        }
        .await;

        if written.is_err() {
            let _ = tokio::fs::remove_file(&tmp).await;
        }
        written
    }
}

impl SeenStore for JsonFileStore {
    async fn load(&self) -> Result<SeenSet, LoadError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!("No seen-set at {}, starting empty", self.display_path());
                return Ok(SeenSet::new());
            }
            Err(source) => {
                return Err(LoadError::Io {
                    path: self.display_path(),
                    source,
                })
            }
        };
        let seen = self.parse(&bytes)?;
        tracing::debug!(entries = seen.len(), "Loaded seen-set");
        Ok(seen)
    }

    async fn save(&self, state: &SeenSet) -> Result<(), SaveError> {
        let io_err = |source: io::Error| SaveError::Io {
            path: self.display_path(),
            source,
        };
        let doc = StateFileRef {
            version: STATE_VERSION,
            contests: state,
        };
        let bytes = serde_json::to_vec_pretty(&doc)
            .map_err(|e| io_err(io::Error::new(io::ErrorKind::InvalidData, e)))?;
        self.write_atomically(&bytes).await.map_err(io_err)
    }
}
