use crate::error::{Result, TemplateError};
use crate::tpl::program::Program;
use dashmap::DashMap;
use sha2::{Digest, Sha256};
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tempfile::NamedTempFile;
use tracing::trace;

const ARTIFACT_EXT: &str = "json";

/// On-disk store of compiled programs, one file per template name.
pub(crate) struct ArtifactCache {
    dir: PathBuf,
    /// 每个模板一把锁，串行化同名模板的编译与写入
    locks: DashMap<String, Arc<Mutex<()>>>,
}

impl ArtifactCache {
    pub(crate) fn open(dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&dir).map_err(|e| TemplateError::artifact_io(&dir, e))?;
        Ok(Self {
            dir,
            locks: DashMap::new(),
        })
    }

    pub(crate) fn dir(&self) -> &Path {
        &self.dir
    }

    /// Artifact key: hex SHA-256 of the template name. The template content is
    /// not part of the key.
    pub(crate) fn key(name: &str) -> String {
        format!("{:x}", Sha256::digest(name.as_bytes()))
    }

    pub(crate) fn path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{}.{}", Self::key(name), ARTIFACT_EXT))
    }

    /// Lock guarding compile-and-persist for `name`.
    pub(crate) fn lock(&self, name: &str) -> Arc<Mutex<()>> {
        self.locks
            .entry(name.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Loads the artifact for `name`. Any failure reads as a miss.
    pub(crate) fn load(&self, name: &str) -> Option<Program> {
        let path = self.path(name);
        let data = match fs::read(&path) {
            Ok(data) => data,
            Err(e) => {
                if e.kind() != ErrorKind::NotFound {
                    trace!(
                        "artifact unreadable: template={}, path={}, error={}",
                        name,
                        path.display(),
                        e
                    );
                }
                return None;
            }
        };
        match serde_json::from_slice::<Program>(&data) {
            Ok(program) if program.name == name => Some(program),
            Ok(program) => {
                trace!("artifact mismatch: template={}, found={}", name, program.name);
                None
            }
            Err(e) => {
                trace!(
                    "artifact undecodable: template={}, path={}, error={}",
                    name,
                    path.display(),
                    e
                );
                None
            }
        }
    }

    /// Writes the artifact through a temp file and an atomic rename, replacing
    /// any previous artifact for the same template.
    pub(crate) fn store(&self, program: &Program) -> Result<PathBuf> {
        let path = self.path(&program.name);
        let data = serde_json::to_vec(program)
            .map_err(|e| TemplateError::artifact_io(&path, std::io::Error::other(e)))?;

        let mut tmp =
            NamedTempFile::new_in(&self.dir).map_err(|e| TemplateError::artifact_io(&self.dir, e))?;
        tmp.write_all(&data)
            .and_then(|_| tmp.as_file().sync_all())
            .map_err(|e| TemplateError::artifact_io(tmp.path(), e))?;
        tmp.persist(&path)
            .map_err(|e| TemplateError::artifact_io(&path, e.error))?;
        Ok(path)
    }

    pub(crate) fn remove(&self, name: &str) -> Result<bool> {
        let path = self.path(name);
        match fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(TemplateError::artifact_io(path, e)),
        }
    }

    /// Removes every artifact file, returning how many were deleted.
    pub(crate) fn clear(&self) -> Result<usize> {
        let entries =
            fs::read_dir(&self.dir).map_err(|e| TemplateError::artifact_io(&self.dir, e))?;
        let mut removed = 0;
        for entry in entries {
            let path = entry.map_err(|e| TemplateError::artifact_io(&self.dir, e))?.path();
            if path.extension().is_some_and(|ext| ext == ARTIFACT_EXT) {
                fs::remove_file(&path).map_err(|e| TemplateError::artifact_io(&path, e))?;
                removed += 1;
            }
        }
        Ok(removed)
    }
}
