//! The whole job: decode, crop, re-encode.

use std::path::Path;

use anyhow::{Context, Result};
use bdnxml::{crop_document, CropDocumentOptions, CropOptions};
use log::{debug, info};

use crate::config::Config;
use crate::converter::Converter;
use crate::lang::alpha2_for;

/// The name of the intermediate XML file inside our working directory.
const INTERMEDIATE_XML: &str = "subtitle.xml";

/// Crop the subtitles in `file_in` according to `config`, and write them to
/// `file_out`.
///
/// We work in a freshly created directory under `config.temp_dir`, so that
/// several copies of this tool can run at once. The directory is deleted
/// when we're done, whether or not we succeed.
pub fn convert_and_crop(config: &Config, file_in: &Path, file_out: &Path) -> Result<()> {
    let converter = Converter::new(&config.executable);
    let workdir = tempfile::Builder::new()
        .prefix("subscrop-")
        .tempdir_in(&config.temp_dir)
        .with_context(|| {
            format!(
                "could not create a working directory in {}",
                config.temp_dir.display()
            )
        })?;
    let xml_path = workdir.path().join(INTERMEDIATE_XML);
    debug!("Working in {}", workdir.path().display());

    converter
        .decode(file_in, &xml_path)
        .with_context(|| format!("could not convert {} to XML", file_in.display()))?;

    // The working directory is ours alone, so we can edit it in place.
    let options = CropDocumentOptions {
        out_dir: None,
        suffix: String::new(),
        image: CropOptions {
            format: None,
            optimize: config.optimize,
            overwrite: true,
        },
    };
    let cropped = crop_document(&xml_path, config.margins, &options)
        .with_context(|| format!("could not crop {}", file_in.display()))?;
    info!(
        "Cropped {} events ({} dropped)",
        cropped.kept_events, cropped.dropped_events,
    );

    let lang = alpha2_for(&cropped.language)?;
    converter
        .encode(&cropped.path, lang, file_out)
        .with_context(|| format!("could not write {}", file_out.display()))?;
    Ok(())
}
