//! Stockage des fichiers uploadés sous `MEDIA_ROOT`.
//!
//! Les chemins enregistrés en base sont relatifs (`images/<uuid>_<nom>`), l'URL publique
//! est `MEDIA_URL` + chemin.

use std::io;
use std::path::{Component, Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Failed to store {path}: {source}")]
    Write { path: String, source: io::Error },
    #[error("Failed to delete {path}: {source}")]
    Delete { path: String, source: io::Error },
    #[error("Invalid stored path: {0}")]
    InvalidPath(String),
}

/// Sous-dossier de destination selon le champ
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    File,
}

impl MediaKind {
    pub fn directory(self) -> &'static str {
        match self {
            MediaKind::Image => "images",
            MediaKind::File => "files",
        }
    }
}

#[derive(Debug, Clone)]
pub struct MediaStorage {
    root: PathBuf,
    base_url: String,
}

impl MediaStorage {
    pub fn new(root: impl Into<PathBuf>, base_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            base_url: base_url.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Écrit le fichier et renvoie son chemin relatif
    pub fn save(&self, kind: MediaKind, file_name: &str, bytes: &[u8]) -> Result<String, StorageError> {
        let relative = format!(
            "{}/{}_{}",
            kind.directory(),
            uuid::Uuid::new_v4().simple(),
            sanitize_file_name(file_name)
        );
        let absolute = self.root.join(&relative);

        let write = || -> io::Result<()> {
            if let Some(parent) = absolute.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&absolute, bytes)
        };
        write().map_err(|source| StorageError::Write {
            path: relative.clone(),
            source,
        })?;

        tracing::debug!(path = %relative, size = bytes.len(), "Stored upload");
        Ok(relative)
    }

    /// Supprime un fichier stocké. Un fichier déjà absent n'est pas une erreur.
    pub fn delete(&self, relative: &str) -> Result<(), StorageError> {
        let absolute = self.resolve(relative)?;
        match std::fs::remove_file(&absolute) {
            Ok(()) => {
                tracing::debug!(path = %relative, "Deleted stored file");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StorageError::Delete {
                path: relative.to_string(),
                source,
            }),
        }
    }

    /// Suppression best-effort: l'échec est journalisé, jamais propagé
    pub fn discard<'a>(&self, paths: impl IntoIterator<Item = &'a str>) {
        for path in paths {
            if let Err(e) = self.delete(path) {
                tracing::warn!(error = %e, "Could not remove stored file");
            }
        }
    }

    pub fn exists(&self, relative: &str) -> bool {
        self.resolve(relative).map(|p| p.is_file()).unwrap_or(false)
    }

    pub fn url(&self, relative: &str) -> String {
        format!("{}{}", self.base_url, relative)
    }

    fn resolve(&self, relative: &str) -> Result<PathBuf, StorageError> {
        let path = Path::new(relative);
        let escapes = path
            .components()
            .any(|c| !matches!(c, Component::Normal(_)));
        if relative.is_empty() || escapes {
            return Err(StorageError::InvalidPath(relative.to_string()));
        }
        Ok(self.root.join(path))
    }
}

/// Garde le nom de base, remplace tout ce qui n'est pas `[A-Za-z0-9._-]`
fn sanitize_file_name(raw: &str) -> String {
    let base = raw.rsplit(['/', '\\']).next().unwrap_or_default();
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();

    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        "upload".to_string()
    } else {
        cleaned.to_string()
    }
}
