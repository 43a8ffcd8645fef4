//! Cropping subtitle bitmaps.

use std::fs;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::io::Reader as ImageReader;
use image::{DynamicImage, GenericImageView, ImageEncoder, ImageFormat};
use log::{debug, trace, warn};

use crate::errors::{Error, Result};
use crate::util::{is_same_file, suffixed_path};

/// How many pixels to remove from each edge of an image.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Margins {
    /// Pixels to remove on the left.
    pub left: u32,
    /// Pixels to remove on the top.
    pub top: u32,
    /// Pixels to remove on the right.
    pub right: u32,
    /// Pixels to remove on the bottom.
    pub bottom: u32,
}

impl Margins {
    /// Create a new set of margins.
    pub fn new(left: u32, top: u32, right: u32, bottom: u32) -> Margins {
        Margins {
            left,
            top,
            right,
            bottom,
        }
    }
}

/// Options controlling how cropped images are written.
#[derive(Clone, Copy, Debug, Default)]
pub struct CropOptions {
    /// Encode using this format instead of the input's format.
    pub format: Option<ImageFormat>,
    /// Spend extra time compressing PNG output.
    pub optimize: bool,
    /// Allow the output to replace the input.
    pub overwrite: bool,
}

/// Crop `margins` off the image at `input` and write the result to
/// `output`. Returns the new `(width, height)`.
///
/// Nothing is written if the margins would leave an empty image; instead
/// we return [`Error::InvalidDimensions`].
pub fn crop_image(
    input: &Path,
    output: &Path,
    margins: Margins,
    options: &CropOptions,
) -> Result<(u32, u32)> {
    if !options.overwrite && is_same_file(input, output)? {
        return Err(Error::WriteConflict {
            path: output.to_owned(),
        });
    }

    let reader = open_image(input)?;
    let input_format = reader.format();
    let original = reader.decode().map_err(|e| Error::image(input, e))?;
    let (width, height) = original.dimensions();
    let (new_width, new_height) = crop_box(input, (width, height), margins)?;
    trace!(
        "cropping {} from {}x{} to {}x{}",
        input.display(),
        width,
        height,
        new_width,
        new_height,
    );
    let cropped = original.crop_imm(margins.left, margins.top, new_width, new_height);

    let format = match options.format.or(input_format) {
        Some(format) => format,
        None => ImageFormat::from_path(output).map_err(|e| Error::image(output, e))?,
    };
    write_image(&cropped, output, format, options.optimize)?;
    Ok((new_width, new_height))
}

/// The size the image at `input` would have after cropping `margins` off
/// it. Only the image header is read. Fails with
/// [`Error::InvalidDimensions`] in the same cases as [`crop_image`].
pub fn cropped_size(input: &Path, margins: Margins) -> Result<(u32, u32)> {
    let size = open_image(input)?
        .into_dimensions()
        .map_err(|e| Error::image(input, e))?;
    crop_box(input, size, margins)
}

fn open_image(input: &Path) -> Result<ImageReader<BufReader<fs::File>>> {
    ImageReader::open(input)
        .and_then(|r| r.with_guessed_format())
        .map_err(|e| Error::io(input, e))
}

/// Work out the size of the cropped image, which must not be empty.
fn crop_box(path: &Path, (width, height): (u32, u32), margins: Margins) -> Result<(u32, u32)> {
    let l = i64::from(margins.left);
    let t = i64::from(margins.top);
    let r = i64::from(width) - i64::from(margins.right);
    let b = i64::from(height) - i64::from(margins.bottom);
    if !(l < r && t < b) {
        return Err(Error::InvalidDimensions {
            path: path.to_owned(),
            width: r - l,
            height: b - t,
        });
    }
    // All four values are in range now, so these casts can't truncate.
    Ok(((r - l) as u32, (b - t) as u32))
}

fn write_image(
    img: &DynamicImage,
    path: &Path,
    format: ImageFormat,
    optimize: bool,
) -> Result<()> {
    if optimize && format == ImageFormat::Png {
        let file = fs::File::create(path).map_err(|e| Error::io(path, e))?;
        let encoder = PngEncoder::new_with_quality(
            BufWriter::new(file),
            CompressionType::Best,
            FilterType::Adaptive,
        );
        encoder
            .write_image(img.as_bytes(), img.width(), img.height(), img.color())
            .map_err(|e| Error::image(path, e))
    } else {
        img.save_with_format(path, format)
            .map_err(|e| Error::image(path, e))
    }
}

/// Options for [`crop_directory`].
#[derive(Clone, Debug, Default)]
pub struct DirectoryCropOptions {
    /// Where to write cropped images. Defaults to the input directory.
    pub out_dir: Option<PathBuf>,
    /// Inserted between the stem and extension of each output file name.
    pub suffix: String,
    /// How to write each image.
    pub image: CropOptions,
}

/// Crop every `*.png` file in `dir`. Images which are too small for the
/// margins are skipped with a warning. Returns the paths we wrote, sorted.
pub fn crop_directory(
    dir: &Path,
    margins: Margins,
    options: &DirectoryCropOptions,
) -> Result<Vec<PathBuf>> {
    let mut inputs = vec![];
    for entry in fs::read_dir(dir).map_err(|e| Error::io(dir, e))? {
        let path = entry.map_err(|e| Error::io(dir, e))?.path();
        let is_png = path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("png"))
            .unwrap_or(false);
        if is_png && path.is_file() {
            inputs.push(path);
        } else {
            trace!("Skipping {}", path.display());
        }
    }
    inputs.sort();

    let out_dir = options.out_dir.as_deref().unwrap_or(dir);
    let mut written = vec![];
    for input in inputs {
        let output = suffixed_path(out_dir, &input, &options.suffix)?;
        match crop_image(&input, &output, margins, &options.image) {
            Ok(_) => written.push(output),
            Err(err @ Error::InvalidDimensions { .. }) => {
                warn!("{} (skipping)", err);
            }
            Err(err) => return Err(err),
        }
    }
    debug!(
        "Cropped {} images from {} into {}",
        written.len(),
        dir.display(),
        out_dir.display(),
    );
    Ok(written)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    /// Write a `width`x`height` PNG whose pixels encode their own
    /// coordinates, so we can tell which part of it survived a crop.
    pub(crate) fn write_test_png(path: &Path, width: u32, height: u32) {
        let img = RgbaImage::from_fn(width, height, |x, y| {
            Rgba([(x % 256) as u8, (y % 256) as u8, 0x80, 0xff])
        });
        img.save(path).unwrap();
    }

    fn open(path: &Path) -> DynamicImage {
        image::open(path).unwrap()
    }

    #[test]
    fn crop_removes_margins() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.png");
        let output = dir.path().join("out.png");
        write_test_png(&input, 100, 50);

        let size = crop_image(&input, &output, Margins::new(3, 5, 7, 11), &CropOptions::default())
            .unwrap();
        assert_eq!(size, (90, 34));

        let cropped = open(&output);
        assert_eq!(cropped.dimensions(), (90, 34));
        assert_eq!(cropped.get_pixel(0, 0), Rgba([3, 5, 0x80, 0xff]));
        assert_eq!(cropped.get_pixel(89, 33), Rgba([92, 38, 0x80, 0xff]));
    }

    #[test]
    fn zero_margins_copy_the_image() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.png");
        let output = dir.path().join("out.png");
        write_test_png(&input, 17, 9);

        let size = crop_image(&input, &output, Margins::default(), &CropOptions::default())
            .unwrap();
        assert_eq!(size, (17, 9));
        assert_eq!(open(&output).to_rgba8(), open(&input).to_rgba8());
    }

    #[test]
    fn margins_as_large_as_the_image_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.png");
        let output = dir.path().join("out.png");
        write_test_png(&input, 10, 10);

        let err = crop_image(&input, &output, Margins::new(4, 0, 6, 0), &CropOptions::default())
            .unwrap_err();
        match err {
            Error::InvalidDimensions { width, height, .. } => {
                assert_eq!((width, height), (0, 10));
            }
            other => panic!("unexpected error: {}", other),
        }
        assert!(!output.exists());

        let err = crop_image(&input, &output, Margins::new(0, 8, 0, 9), &CropOptions::default())
            .unwrap_err();
        assert!(matches!(err, Error::InvalidDimensions { height: -7, .. }));
        assert!(!output.exists());
    }

    #[test]
    fn cropped_size_matches_crop_image() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.png");
        write_test_png(&input, 40, 30);

        assert_eq!(cropped_size(&input, Margins::new(1, 2, 3, 4)).unwrap(), (36, 24));
        let err = cropped_size(&input, Margins::new(0, 15, 0, 15)).unwrap_err();
        assert!(matches!(err, Error::InvalidDimensions { width: 40, height: 0, .. }));
        let err = cropped_size(&dir.path().join("missing.png"), Margins::default())
            .unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }

    #[test]
    fn cropping_in_place_requires_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.png");
        write_test_png(&input, 10, 10);
        let before = fs::read(&input).unwrap();

        let err = crop_image(&input, &input, Margins::new(1, 1, 1, 1), &CropOptions::default())
            .unwrap_err();
        assert!(matches!(err, Error::WriteConflict { .. }));
        assert_eq!(fs::read(&input).unwrap(), before);

        let options = CropOptions {
            overwrite: true,
            ..CropOptions::default()
        };
        assert_eq!(
            crop_image(&input, &input, Margins::new(1, 1, 1, 1), &options).unwrap(),
            (8, 8)
        );
        assert_eq!(open(&input).dimensions(), (8, 8));
    }

    #[test]
    fn format_override_and_optimize() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.png");
        write_test_png(&input, 20, 20);

        let bmp = dir.path().join("out.png");
        let options = CropOptions {
            format: Some(ImageFormat::Bmp),
            ..CropOptions::default()
        };
        crop_image(&input, &bmp, Margins::new(2, 2, 2, 2), &options).unwrap();
        let detected = ImageReader::open(&bmp)
            .unwrap()
            .with_guessed_format()
            .unwrap()
            .format();
        assert_eq!(detected, Some(ImageFormat::Bmp));

        let png = dir.path().join("optimized.png");
        let options = CropOptions {
            optimize: true,
            ..CropOptions::default()
        };
        crop_image(&input, &png, Margins::new(2, 2, 2, 2), &options).unwrap();
        assert_eq!(open(&png).dimensions(), (16, 16));
    }

    #[test]
    fn unreadable_images_are_image_errors() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("broken.png");
        fs::write(&input, b"\x89PNG\r\n\x1a\nnot really").unwrap();
        let err = crop_image(
            &input,
            &dir.path().join("out.png"),
            Margins::default(),
            &CropOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, Error::Image { .. }));

        let err = crop_image(
            &dir.path().join("missing.png"),
            &dir.path().join("out.png"),
            Margins::default(),
            &CropOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }

    #[test]
    fn crop_directory_skips_images_that_are_too_small() {
        let _ = env_logger::builder().is_test(true).try_init();
        let dir = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        write_test_png(&dir.path().join("a.png"), 30, 30);
        write_test_png(&dir.path().join("b.png"), 4, 4);
        write_test_png(&dir.path().join("c.png"), 12, 40);
        fs::write(dir.path().join("notes.txt"), "hi").unwrap();

        let options = DirectoryCropOptions {
            out_dir: Some(out.path().to_owned()),
            suffix: "_cropped".to_owned(),
            image: CropOptions::default(),
        };
        let written = crop_directory(dir.path(), Margins::new(3, 3, 3, 3), &options).unwrap();
        assert_eq!(
            written,
            vec![out.path().join("a_cropped.png"), out.path().join("c_cropped.png")]
        );
        assert_eq!(open(&written[1]).dimensions(), (6, 34));
        assert!(!out.path().join("b_cropped.png").exists());
    }
}
