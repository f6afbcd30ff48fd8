use std::path::PathBuf;
use thiserror::Error;

/// Represents errors that can occur while compiling or rendering a template.
#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("Template directory does not exist: {}", .0.display())]
    TemplateDirectoryMissing(PathBuf),
    #[error("Template not found: {0}")]
    TemplateNotFound(String),
    #[error("Unterminated `{keyword}` block in {template} at byte {offset}")]
    UnterminatedBlock {
        template: String,
        keyword: String,
        offset: usize,
    },
    #[error("Parse error in {template} at byte {offset}: {message}")]
    Parse {
        template: String,
        message: String,
        offset: usize,
    },
    #[error("Invalid expression in {template} at byte {offset}: {message}")]
    Expression {
        template: String,
        message: String,
        offset: usize,
    },
    #[error("Render error in {template}: {message}")]
    Render { template: String, message: String },
    #[error("Invalid render context: {0}")]
    Context(String),
    #[error("Cannot read template source {}: {source}", .path.display())]
    SourceIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Artifact I/O error on {}: {source}", .path.display())]
    ArtifactIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl TemplateError {
    pub(crate) fn parse(template: &str, message: impl Into<String>, offset: usize) -> Self {
        TemplateError::Parse {
            template: template.to_string(),
            message: message.into(),
            offset,
        }
    }

    pub(crate) fn render(template: &str, message: impl Into<String>) -> Self {
        TemplateError::Render {
            template: template.to_string(),
            message: message.into(),
        }
    }

    pub(crate) fn artifact_io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        TemplateError::ArtifactIo {
            path: path.into(),
            source,
        }
    }

    /// Byte offset into the template source, for compile errors.
    pub fn offset(&self) -> Option<usize> {
        match self {
            TemplateError::UnterminatedBlock { offset, .. }
            | TemplateError::Parse { offset, .. }
            | TemplateError::Expression { offset, .. } => Some(*offset),
            _ => None,
        }
    }
}

pub type Result<T, E = TemplateError> = std::result::Result<T, E>;
