use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while reading or writing an MVR archive.
#[derive(Debug, Error)]
pub enum Error {
    // ── Archive ─────────────────────────────────────────────────────
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid MVR archive: {0}")]
    Archive(#[from] zip::result::ZipError),

    /// The zip has no `GeneralSceneDescription.xml` member.
    #[error("Archive contains no GeneralSceneDescription.xml")]
    MissingSceneDescription,

    // ── Scene description ───────────────────────────────────────────
    #[error("Malformed scene XML: {0}")]
    Xml(String),

    /// Well-formed XML that is not a scene description.
    #[error("Invalid scene: {0}")]
    InvalidScene(String),

    #[error("Fixture index {index} out of range (scene has {count} fixtures)")]
    FixtureIndexOutOfRange { index: usize, count: usize },
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn xml(err: impl std::fmt::Display) -> Self {
        Self::Xml(err.to_string())
    }
}
