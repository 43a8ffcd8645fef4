//! Cropping every graphic in a BDN XML file and patching the XML to match.

use std::path::{Path, PathBuf};

use log::{debug, warn};

use crate::crop::{crop_image, cropped_size, CropOptions, Margins};
use crate::document::SubtitleDocument;
use crate::errors::{Error, Result};
use crate::util::{parent_dir, suffixed_file_name, suffixed_path};

/// Options for [`crop_document`].
#[derive(Clone, Debug, Default)]
pub struct CropDocumentOptions {
    /// Where to write the XML and images. Defaults to the directory
    /// containing the input XML.
    pub out_dir: Option<PathBuf>,
    /// Inserted between the stem and extension of every output file name.
    pub suffix: String,
    /// How to write each image. `overwrite` also applies to the XML.
    pub image: CropOptions,
}

/// What [`crop_document`] produced.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CroppedDocument {
    /// The document's 3-letter language code.
    pub language: String,
    /// Where we wrote the patched XML.
    pub path: PathBuf,
    /// Events which survived.
    pub kept_events: usize,
    /// Events removed because a graphic could not be cropped.
    pub dropped_events: usize,
}

/// Crop `margins` off every graphic referenced by the BDN XML file at
/// `xml_path`, and write a new XML file with updated graphic sizes and
/// positions.
///
/// If any graphic is too small to crop, its entire event is dropped, because
/// an event without a graphic confuses the tools which read these files.
/// The graphics of a dropped event are never written. Any other error
/// aborts the whole run.
pub fn crop_document(
    xml_path: &Path,
    margins: Margins,
    options: &CropDocumentOptions,
) -> Result<CroppedDocument> {
    let mut doc = SubtitleDocument::open(xml_path)?;
    let language = doc.language().to_owned();

    let xml_dir = parent_dir(xml_path);
    let out_dir = options.out_dir.as_deref().unwrap_or(xml_dir);

    let dropped_events = doc.retain_events(|mut event| {
        // Check every graphic before writing any, so that a dropped event
        // leaves no cropped images behind.
        let files: Vec<PathBuf> = event
            .as_event()
            .graphics()
            .map(|graphic| PathBuf::from(graphic.file()))
            .collect();
        for file in &files {
            match cropped_size(&xml_dir.join(file), margins) {
                Ok(_) => {}
                Err(err @ Error::InvalidDimensions { .. }) => {
                    warn!("{}; dropping event", err);
                    return Ok(false);
                }
                Err(err) => return Err(err),
            }
        }
        if files.len() > 1 {
            debug!(
                "Event at {} has {} graphics",
                event.as_event().in_tc().unwrap_or("?"),
                files.len(),
            );
        }

        for mut graphic in event.graphics_mut() {
            let file = PathBuf::from(graphic.file());
            let out_name = suffixed_file_name(&file, &options.suffix)?;
            let output = out_dir.join(&out_name);
            let (width, height) =
                crop_image(&xml_dir.join(&file), &output, margins, &options.image)?;

            let mut geometry = graphic.geometry()?;
            geometry.width = width;
            geometry.height = height;
            geometry.x = geometry.x.saturating_add(margins.left);
            geometry.y = geometry.y.saturating_add(margins.top);
            graphic.set_geometry(geometry);
            graphic.set_file(&out_name.to_string_lossy());
        }
        Ok(true)
    })?;
    let kept_events = doc.events().count();

    let xml_out = suffixed_path(out_dir, xml_path, &options.suffix)?;
    doc.save(&xml_out, options.image.overwrite)?;
    debug!(
        "Wrote {} ({} events kept, {} dropped)",
        xml_out.display(),
        kept_events,
        dropped_events,
    );

    Ok(CroppedDocument {
        language,
        path: xml_out,
        kept_events,
        dropped_events,
    })
}
