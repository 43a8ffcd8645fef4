//! Error handling.

use std::{io, process::ExitStatus};

/// Our result type.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors involving the external subtitle converter.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// We could not start the converter at all.
    #[error("error running external command {command:?}")]
    CouldNotRun {
        /// The command line we tried to run.
        command: String,
        /// The original error.
        #[source]
        source: io::Error,
    },

    /// The converter ran, but reported a failure.
    #[error("external command {command:?} failed ({status})")]
    CommandFailed {
        /// The command line we ran.
        command: String,
        /// How it exited.
        status: ExitStatus,
    },

    /// The converter needs a 2-letter language code, and there isn't one for
    /// this language.
    #[error("no 2-letter language code for {code:?}")]
    UnknownLanguage {
        /// The 3-letter code found in the subtitles.
        code: String,
    },
}
