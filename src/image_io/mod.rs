//! Source photo decoding and sheet export

use crate::types::{Error, ImageFormat, Result, DEFAULT_JPEG_QUALITY};
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{DynamicImage, ImageReader, Rgb, RgbImage};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Load a photo from a file
pub fn load_image(path: &Path) -> Result<DynamicImage> {
    let mut reader = ImageReader::open(path)?.with_guessed_format()?;
    reader.no_limits();
    Ok(reader.decode()?)
}

/// Decode a photo from memory (e.g. a stored upload)
pub fn load_image_from_memory(bytes: &[u8]) -> Result<DynamicImage> {
    Ok(image::load_from_memory(bytes)?)
}

/// Convert to opaque RGB, compositing any transparency onto white
pub fn flatten_onto_white(img: &DynamicImage) -> RgbImage {
    if !img.color().has_alpha() {
        return img.to_rgb8();
    }
    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();
    RgbImage::from_fn(width, height, |x, y| {
        let [r, g, b, a] = rgba.get_pixel(x, y).0;
        let alpha = a as u32;
        let over_white = |c: u8| ((c as u32 * alpha + 255 * (255 - alpha) + 127) / 255) as u8;
        Rgb([over_white(r), over_white(g), over_white(b)])
    })
}

/// Encode a sheet into `writer`. `jpeg_quality` is clamped to 1..=100.
pub fn write_sheet<W: Write>(writer: W, sheet: &RgbImage, format: ImageFormat, jpeg_quality: u8) -> Result<()> {
    match format {
        ImageFormat::Jpeg => {
            let encoder = JpegEncoder::new_with_quality(writer, jpeg_quality.clamp(1, 100));
            sheet.write_with_encoder(encoder)?;
        }
        ImageFormat::Png => {
            sheet.write_with_encoder(PngEncoder::new(writer))?;
        }
    }
    Ok(())
}

/// Encode a sheet to bytes
pub fn encode_sheet(sheet: &RgbImage, format: ImageFormat, jpeg_quality: u8) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    write_sheet(&mut out, sheet, format, jpeg_quality)?;
    Ok(out)
}

/// Save a sheet to a file
pub fn save_sheet(path: &Path, sheet: &RgbImage, format: ImageFormat, jpeg_quality: u8) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    write_sheet(&mut writer, sheet, format, jpeg_quality)?;
    writer.flush()?;
    Ok(())
}

/// Save with the default JPEG quality, format picked from the extension
pub fn save_sheet_auto(path: &Path, sheet: &RgbImage) -> Result<()> {
    let format = path
        .extension()
        .and_then(|s| s.to_str())
        .and_then(ImageFormat::from_extension)
        .ok_or_else(|| Error::UnsupportedFormat(format!("cannot infer sheet format from {}", path.display())))?;
    save_sheet(path, sheet, format, DEFAULT_JPEG_QUALITY)
}

/// Generate output filename based on input, layout key and format
pub fn generate_output_path(input: &Path, layout_key: &str, format: ImageFormat) -> Result<PathBuf> {
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| Error::Io(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "Invalid input filename",
        )))?;

    let parent = input.parent().unwrap_or_else(|| Path::new("."));

    Ok(parent.join(format!("{}_{}_sheet.{}", stem, layout_key, format.extension())))
}
