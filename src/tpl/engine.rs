use crate::error::{Result, TemplateError};
use crate::models::templater_options::TemplaterOptions;
use crate::serializer::to_value;
use crate::tpl::ast::Template;
use crate::tpl::cache::ArtifactCache;
use crate::tpl::codegen::generate;
use crate::tpl::parser::{self, Loader};
use crate::tpl::program::Program;
use crate::tpl::render::execute;
use crate::value::Value;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use std::sync::PoisonError;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{debug, trace};
use walkdir::{DirEntry, WalkDir};

/// Template engine rooted at one template directory.
///
/// `Templater` is `Send + Sync`; share it behind an `Arc` and call
/// [`Templater::render`] from any thread. Rendering blocks on file I/O.
pub struct Templater {
    dir: PathBuf,
    options: TemplaterOptions,
    cache: ArtifactCache,
    compiles: AtomicUsize,
}

impl Templater {
    /// Engine over `dir` with default options (development, uncached).
    pub fn new(dir: impl AsRef<Path>) -> Result<Self> {
        Self::with_options(dir, TemplaterOptions::default())
    }

    pub fn with_options(dir: impl AsRef<Path>, options: TemplaterOptions) -> Result<Self> {
        let dir = dir.as_ref();
        if !dir.is_dir() {
            return Err(TemplateError::TemplateDirectoryMissing(dir.to_path_buf()));
        }
        let dir = dir.canonicalize().map_err(|e| TemplateError::SourceIo {
            path: dir.to_path_buf(),
            source: e,
        })?;
        let cache = ArtifactCache::open(dir.join(&options.artifact_dir))?;
        debug!(
            "templater ready: dir={}, artifacts={}, cached={}, environment={:?}",
            dir.display(),
            cache.dir().display(),
            options.is_cached(),
            options.environment
        );
        Ok(Self {
            dir,
            options,
            cache,
            compiles: AtomicUsize::new(0),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn artifact_dir(&self) -> &Path {
        self.cache.dir()
    }

    pub fn options(&self) -> &TemplaterOptions {
        &self.options
    }

    /// Number of compile-and-persist runs performed by this instance.
    pub fn compile_count(&self) -> usize {
        self.compiles.load(Ordering::Relaxed)
    }

    /// Path of the persisted artifact for `name`, whether or not it exists.
    pub fn artifact_path(&self, name: &str) -> PathBuf {
        self.cache.path(name)
    }

    /// 渲染模板，`ctx` 必须序列化为 map（或 unit / None）
    pub fn render<T: Serialize + ?Sized>(&self, name: &str, ctx: &T) -> Result<String> {
        let value = to_value(ctx).map_err(|e| TemplateError::Context(e.to_string()))?;
        self.render_value(name, &value)
    }

    pub fn render_value(&self, name: &str, ctx: &Value) -> Result<String> {
        let empty = Value::Map(Default::default());
        let root = match ctx {
            Value::Map(_) => ctx,
            Value::Null => &empty,
            other => {
                return Err(TemplateError::Context(format!(
                    "expected a map, got {}",
                    other.type_name()
                )));
            }
        };
        let program = self.program(name)?;
        execute(&program, root)
    }

    /// Tokenizes and parses `name` and its `extends` chain, without code
    /// generation or caching.
    pub fn compile(&self, name: &str) -> Result<Template> {
        parser::compile(self, name)
    }

    /// Compiles and persists every template file under the template
    /// directory. Dot files and the artifact directory are skipped.
    pub fn precompile_all(&self) -> Result<usize> {
        let artifacts = self.cache.dir();
        let walker = WalkDir::new(&self.dir)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| e.path() != artifacts && !is_hidden(e));

        let mut count = 0;
        for entry in walker {
            let entry = entry.map_err(|e| {
                let path = e
                    .path()
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| self.dir.clone());
                TemplateError::SourceIo {
                    path,
                    source: e.into(),
                }
            })?;
            if !entry.file_type().is_file() {
                continue;
            }
            let Some(name) = self.template_name(entry.path()) else {
                continue;
            };
            let lock = self.cache.lock(&name);
            let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);
            self.build(&name)?;
            count += 1;
        }
        debug!("precompiled {} templates under {}", count, self.dir.display());
        Ok(count)
    }

    /// Removes the artifact for `name`. Returns whether one existed.
    pub fn invalidate(&self, name: &str) -> Result<bool> {
        let lock = self.cache.lock(name);
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);
        let removed = self.cache.remove(name)?;
        debug!("invalidate: template={}, removed={}", name, removed);
        Ok(removed)
    }

    /// Removes every artifact. Returns how many were deleted.
    pub fn clear(&self) -> Result<usize> {
        let removed = self.cache.clear()?;
        debug!("clear: removed={}", removed);
        Ok(removed)
    }

    fn program(&self, name: &str) -> Result<Program> {
        let path = self.source_path(name)?;
        if !path.is_file() {
            return Err(TemplateError::TemplateNotFound(name.to_string()));
        }

        let cached = self.options.is_cached();
        if cached {
            if let Some(program) = self.cached(name) {
                return Ok(program);
            }
        }

        let lock = self.cache.lock(name);
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);
        // another thread may have compiled it while we waited
        if cached {
            if let Some(program) = self.cached(name) {
                return Ok(program);
            }
        }
        self.build(name)
    }

    /// Loads a usable artifact for `name`, if any.
    fn cached(&self, name: &str) -> Option<Program> {
        let program = self.cache.load(name)?;
        if self.options.check_modified && self.is_stale(&program) {
            debug!("stale artifact: template={}, compiled_at={}", name, program.compiled_at);
            return None;
        }
        trace!("cache hit: template={}", name);
        Some(program)
    }

    /// Whether any file of the inheritance chain changed after `program`
    /// was compiled. Unreadable sources count as changed.
    fn is_stale(&self, program: &Program) -> bool {
        program.sources.iter().any(|source| {
            let modified = self
                .source_path(source)
                .ok()
                .and_then(|p| fs::metadata(p).and_then(|m| m.modified()).ok());
            match modified {
                Some(mtime) => DateTime::<Utc>::from(mtime) > program.compiled_at,
                None => true,
            }
        })
    }

    /// Compiles `name` and persists the artifact. Callers hold the key lock.
    fn build(&self, name: &str) -> Result<Program> {
        let template = self.compile(name)?;
        let program = generate(&template)?;
        let path = self.cache.store(&program)?;
        self.compiles.fetch_add(1, Ordering::Relaxed);
        debug!(
            "compiled: template={}, chain={:?}, instrs={}, artifact={}",
            name,
            program.sources,
            program.instrs.len(),
            path.display()
        );
        Ok(program)
    }

    /// Resolves a template name inside the template directory. Absolute
    /// names and names escaping the directory are never found.
    fn source_path(&self, name: &str) -> Result<PathBuf> {
        let relative = Path::new(name);
        let inside = !name.is_empty()
            && relative
                .components()
                .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
        if !inside {
            return Err(TemplateError::TemplateNotFound(name.to_string()));
        }
        Ok(self.dir.join(relative))
    }

    /// Template name of a file under the template directory, `/`-separated.
    fn template_name(&self, path: &Path) -> Option<String> {
        let relative = path.strip_prefix(&self.dir).ok()?;
        let parts: Vec<_> = relative
            .components()
            .map(|c| c.as_os_str().to_str())
            .collect::<Option<_>>()?;
        Some(parts.join("/"))
    }
}

impl Loader for Templater {
    fn load(&self, name: &str) -> Result<String> {
        let path = self.source_path(name)?;
        fs::read_to_string(&path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => TemplateError::TemplateNotFound(name.to_string()),
            _ => TemplateError::SourceIo { path, source: e },
        })
    }
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry
            .file_name()
            .to_str()
            .is_some_and(|s| s.starts_with('.'))
}
