//! Error type shared by every stage of a generation run.

use std::path::PathBuf;

/// Terminal error of a generation run.
///
/// Callers only ever observe "fully generated" or one of these; any file the
/// run created before the failure has already been rolled back.
#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    /// Bad output location or unresolvable crate path. Raised before any write.
    #[error("configuration error: {0}")]
    Config(String),

    /// The design document is structurally unusable.
    #[error("invalid design: {0}")]
    Design(String),

    /// The invoking tool and this generator disagree on the version.
    #[error("version mismatch: {0}")]
    VersionMismatch(String),

    /// A template failed to render.
    #[error("failed to render {template}: {source}")]
    Render {
        template: &'static str,
        #[source]
        source: askama::Error,
    },

    /// The source formatter rejected a generated file.
    #[error("failed to format {path:?}: {message}")]
    Format { path: PathBuf, message: String },

    /// Filesystem failure while writing a generated file.
    #[error("i/o error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl GenerateError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        GenerateError::Io {
            path: path.into(),
            source,
        }
    }
}
