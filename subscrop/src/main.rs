//! Crop picture-based subtitle files.

#![warn(missing_docs)]

use std::path::PathBuf;

use anyhow::Result;
use bdnxml::Margins;
use clap::Parser;
use log::debug;

use crate::config::{Config, DEFAULT_EXECUTABLE};

pub mod config;
pub mod converter;
pub mod errors;
pub mod lang;
pub mod pipeline;
pub mod validate;

#[derive(Debug, Parser)]
/// Crop picture-based subtitle files. Expects `bdsup2sub++` to be on the
/// PATH unless --executable is given. Only the first subtitle stream of the
/// input file is processed.
#[command(
    name = "subscrop",
    version,
    after_help = "Example: 'subscrop movie.sup movie.cropped.sup 0 10 0 0' crops 10 pixels \
                  from the top of every subtitle image."
)]
struct Args {
    /// Input subtitle file to crop [*.sub, *.sup].
    #[arg(value_parser = validate::existing_file)]
    file_in: PathBuf,

    /// Output cropped subtitle file [*.sub, *.sup]. Must not exist yet.
    #[arg(value_parser = validate::future_file)]
    file_out: PathBuf,

    /// Number of pixels to crop on the left.
    left: u32,

    /// ... on the top.
    top: u32,

    /// ... on the right.
    right: u32,

    /// ... on the bottom.
    bottom: u32,

    /// Temporary directory [default: the system temporary directory].
    #[arg(short = 't', long, value_parser = validate::existing_dir)]
    temppath: Option<PathBuf>,

    /// The bdsup2sub++ executable.
    #[arg(short = 'e', long, value_parser = validate::executable)]
    executable: Option<PathBuf>,

    /// Compress the cropped images harder before re-encoding.
    #[arg(long)]
    optimize: bool,
}

impl Args {
    /// Turn our arguments into a `Config`, filling in defaults.
    fn to_config(&self) -> Result<Config> {
        let defaults = Config::default();
        let executable = match &self.executable {
            Some(exe) => exe.clone(),
            None => validate::executable(DEFAULT_EXECUTABLE)?,
        };
        Ok(Config {
            executable,
            temp_dir: self.temppath.clone().unwrap_or(defaults.temp_dir),
            margins: Margins::new(self.left, self.top, self.right, self.bottom),
            optimize: self.optimize,
        })
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = Args::parse();
    debug!("args: {:?}", &args);
    let config = args.to_config()?;
    pipeline::convert_and_crop(&config, &args.file_in, &args.file_out)
}

#[cfg(test)]
mod tests {
    use std::ffi::OsStr;

    use super::*;

    #[test]
    fn arguments_become_config() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.sup");
        let tool = dir.path().join("tool");
        std::fs::write(&input, b"").unwrap();
        std::fs::write(&tool, b"").unwrap();
        let output = dir.path().join("out.sup");

        let args = Args::try_parse_from([
            OsStr::new("subscrop"),
            input.as_os_str(),
            output.as_os_str(),
            OsStr::new("1"),
            OsStr::new("2"),
            OsStr::new("3"),
            OsStr::new("4"),
            OsStr::new("--temppath"),
            dir.path().as_os_str(),
            OsStr::new("-e"),
            tool.as_os_str(),
        ])
        .unwrap();
        let config = args.to_config().unwrap();
        assert_eq!(
            config,
            Config {
                executable: tool,
                temp_dir: dir.path().to_owned(),
                margins: Margins::new(1, 2, 3, 4),
                optimize: false,
            }
        );
    }

    #[test]
    fn negative_margins_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.sup");
        std::fs::write(&input, b"").unwrap();
        let output = dir.path().join("out.sup");
        let result = Args::try_parse_from([
            OsStr::new("subscrop"),
            input.as_os_str(),
            output.as_os_str(),
            OsStr::new("0"),
            OsStr::new("-1"),
            OsStr::new("0"),
            OsStr::new("0"),
        ]);
        assert!(result.is_err());
    }
}
