use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while configuring or running a negative harmony transform.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Mode not recognized: '{0}'. Use: 'le', 'fa', 'so', 'ca', or 'cn'.")]
    UnknownMode(String),

    #[error("Octave not recognized: '{0}'. Octave should be an integer between 0 and 10.")]
    OctaveOutOfRange(String),

    #[error(
        "Generator not recognized: '{0}'. Use a generator in the set \
         ['C', 'C#', 'D', 'D#', 'E', 'F', 'F#', 'G', 'G#', 'A', 'A#', 'B']."
    )]
    UnknownGenerator(String),

    #[error("failed to read config {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("{path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("midi error in {path}: {message}")]
    Midi { path: PathBuf, message: String },

    #[error("midi port error: {0}")]
    Port(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// True for the validation failures that must stop a run before any file is touched.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            Error::UnknownMode(_)
                | Error::OctaveOutOfRange(_)
                | Error::UnknownGenerator(_)
                | Error::ConfigRead { .. }
                | Error::ConfigParse { .. }
        )
    }
}
