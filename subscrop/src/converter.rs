//! Running the external subtitle converter.
//!
//! We expect a BDSup2Sub-compatible command line, and we only ever ask it to
//! convert between a binary subtitle file (`*.sup`, `*.sub`/`*.idx`) and
//! BDN XML.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::Command;

use log::debug;

use crate::errors::{Error, Result};

/// A BDSup2Sub-compatible converter.
#[derive(Clone, Debug)]
pub struct Converter {
    executable: PathBuf,
}

impl Converter {
    /// Use the converter at `executable`.
    pub fn new<P: Into<PathBuf>>(executable: P) -> Converter {
        Converter {
            executable: executable.into(),
        }
    }

    /// Convert the binary subtitles in `input` to BDN XML at `xml_out`. The
    /// images are written next to `xml_out`.
    pub fn decode(&self, input: &Path, xml_out: &Path) -> Result<()> {
        let mut cmd = self.command();
        cmd.arg("-o").arg(xml_out).arg(input);
        run(cmd)
    }

    /// Convert the BDN XML at `xml_in` to binary subtitles at `output`,
    /// tagged with the 2-letter language code `lang`.
    pub fn encode(&self, xml_in: &Path, lang: &str, output: &Path) -> Result<()> {
        let mut cmd = self.command();
        cmd.arg("--language")
            .arg(lang)
            .arg("-o")
            .arg(output)
            .arg(xml_in);
        run(cmd)
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.executable);
        cmd.arg("--no-verbose");
        cmd
    }
}

/// Run `cmd` to completion, and fail unless it exits successfully.
fn run(mut cmd: Command) -> Result<()> {
    let command = describe(&cmd);
    debug!("Running: {}", command);
    let status = cmd.status().map_err(|source| Error::CouldNotRun {
        command: command.clone(),
        source,
    })?;
    if status.success() {
        Ok(())
    } else {
        Err(Error::CommandFailed { command, status })
    }
}

/// A human-readable version of a command line, for error messages.
fn describe(cmd: &Command) -> String {
    let mut parts = vec![cmd.get_program().to_string_lossy().into_owned()];
    parts.extend(cmd.get_args().map(|arg: &OsStr| arg.to_string_lossy().into_owned()));
    parts.join(" ")
}
