//! This crate edits picture-based subtitles stored as BDN XML, the
//! intermediate format used by tools like BDSup2Sub: a single XML file
//! listing timed events, plus one PNG per event.
//!
//! ## Example code
//!
//! ```no_run
//! use bdnxml::{crop_document, CropDocumentOptions, Margins};
//! use std::path::Path;
//!
//! let cropped = crop_document(
//!     Path::new("movie.xml"),
//!     Margins::new(0, 10, 0, 0),
//!     &CropDocumentOptions {
//!         suffix: ".cropped".to_owned(),
//!         ..CropDocumentOptions::default()
//!     },
//! )
//! .unwrap();
//! println!("Language: {}", cropped.language);
//! println!("Wrote: {}", cropped.path.display());
//! ```
//!
//! Events whose graphics are too small to crop are removed, along with
//! their graphics, and a warning is logged.
//!
//! ## Limitations
//!
//! Color palettes are not preserved exactly: images are decoded to RGBA and
//! re-encoded.

#![warn(missing_docs)]

pub mod crop;
pub mod document;
mod errors;
pub mod patch;
mod util;
pub mod xml;

pub use crate::crop::{
    crop_directory, crop_image, cropped_size, CropOptions, DirectoryCropOptions, Margins,
};
pub use crate::document::{
    Event, EventMut, Geometry, Graphic, GraphicMut, SubtitleDocument, DEFAULT_LANGUAGE,
    EMPTY_TIMECODE,
};
pub use crate::errors::{Error, Result};
pub use crate::patch::{crop_document, CropDocumentOptions, CroppedDocument};
pub use image::ImageFormat;
