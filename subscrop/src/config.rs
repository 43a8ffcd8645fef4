//! Run-time configuration.

use std::env;
use std::path::PathBuf;

use bdnxml::Margins;

/// The converter we run if none is specified. It must be on the `PATH`.
pub const DEFAULT_EXECUTABLE: &str = "bdsup2sub++";

/// Everything the pipeline needs to know, other than the input and output
/// files.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    /// The BDSup2Sub-compatible converter. Defaults to
    /// [`DEFAULT_EXECUTABLE`].
    pub executable: PathBuf,
    /// A directory in which we can create our private working directory.
    /// Defaults to the system temporary directory.
    pub temp_dir: PathBuf,
    /// How much to crop off each subtitle image. Defaults to nothing.
    pub margins: Margins,
    /// Spend extra time compressing the cropped images. Defaults to
    /// `false`, since the converter re-encodes them anyway.
    pub optimize: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            executable: PathBuf::from(DEFAULT_EXECUTABLE),
            temp_dir: env::temp_dir(),
            margins: Margins::default(),
            optimize: false,
        }
    }
}
