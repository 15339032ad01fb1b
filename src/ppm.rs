//! Binary PPM (P6) image loading.
//!
//! Only 8-bit binary pixmaps are accepted. A bad file is reported through the
//! log and yields no image; it never ends the session.

use image::codecs::pnm::{PnmDecoder, PnmSubtype, SampleEncoding};
use image::{DynamicImage, RgbImage};
use std::fs::File;
use std::io::{BufRead, BufReader, Cursor, Read};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PpmError {
    #[error("could not open {}: {source}", .path.display())]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid magic number, expected binary pixmap (P6), found {0}")]
    InvalidMagic(String),
    #[error("invalid max color value, only 255 is supported")]
    InvalidMaxValue,
    #[error("failed to read image data: {0}")]
    Read(#[from] std::io::Error),
    #[error("malformed image data: {0}")]
    Decode(#[from] image::ImageError),
}

/// Decode a P6 image from any buffered reader.
pub fn decode_ppm<R: BufRead>(mut reader: R) -> Result<RgbImage, PpmError> {
    let mut data = Vec::new();
    reader.read_to_end(&mut data)?;
    let decoder = PnmDecoder::new(Cursor::new(data.as_slice()))?;

    match decoder.subtype() {
        PnmSubtype::Pixmap(SampleEncoding::Binary) => {}
        other => return Err(PpmError::InvalidMagic(magic_of(other).to_string())),
    }

    // The decoder rescales smaller max values instead of rejecting them
    if header_max_value(&data) != Some(255) {
        return Err(PpmError::InvalidMaxValue);
    }

    match DynamicImage::from_decoder(decoder)? {
        DynamicImage::ImageRgb8(img) => Ok(img),
        _ => Err(PpmError::InvalidMaxValue),
    }
}

/// Open and decode a P6 file.
pub fn read_ppm(path: &Path) -> Result<RgbImage, PpmError> {
    let file = File::open(path).map_err(|source| PpmError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    decode_ppm(BufReader::new(file))
}

/// Load a P6 file, logging the reason and returning `None` on failure.
pub fn load_ppm(path: &Path) -> Option<RgbImage> {
    match read_ppm(path) {
        Ok(img) => {
            tracing::debug!(
                path = %path.display(),
                width = img.width(),
                height = img.height(),
                "loaded PPM"
            );
            Some(img)
        }
        Err(e) => {
            tracing::error!(path = %path.display(), error = %e, "failed to load PPM");
            None
        }
    }
}

/// Fourth header token of a P6 file: magic, width, height, max value.
fn header_max_value(data: &[u8]) -> Option<u32> {
    let mut tokens = Vec::with_capacity(4);
    let mut pos = 0;

    while tokens.len() < 4 {
        match data.get(pos)? {
            b'#' => {
                while *data.get(pos)? != b'\n' {
                    pos += 1;
                }
            }
            c if c.is_ascii_whitespace() => pos += 1,
            _ => {
                let start = pos;
                while data.get(pos).is_some_and(|c| !c.is_ascii_whitespace()) {
                    pos += 1;
                }
                tokens.push(&data[start..pos]);
            }
        }
    }

    std::str::from_utf8(tokens[3]).ok()?.parse().ok()
}

fn magic_of(subtype: PnmSubtype) -> &'static str {
    match subtype {
        PnmSubtype::Bitmap(SampleEncoding::Ascii) => "P1",
        PnmSubtype::Graymap(SampleEncoding::Ascii) => "P2",
        PnmSubtype::Pixmap(SampleEncoding::Ascii) => "P3",
        PnmSubtype::Bitmap(SampleEncoding::Binary) => "P4",
        PnmSubtype::Graymap(SampleEncoding::Binary) => "P5",
        PnmSubtype::Pixmap(SampleEncoding::Binary) => "P6",
        PnmSubtype::ArbitraryMap => "P7",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p6(width: u32, height: u32, max: u32, pixels: &[u8]) -> Vec<u8> {
        let mut data = format!("P6\n{width} {height}\n{max}\n").into_bytes();
        data.extend_from_slice(pixels);
        data
    }

    #[test]
    fn test_decode_valid_p6() {
        let pixels = [255, 0, 0, 0, 255, 0, 0, 0, 255, 10, 20, 30];
        let img = decode_ppm(Cursor::new(p6(2, 2, 255, &pixels))).unwrap();
        assert_eq!(img.dimensions(), (2, 2));
        assert_eq!(img.get_pixel(1, 0).0, [0, 255, 0]);
        assert_eq!(img.get_pixel(1, 1).0, [10, 20, 30]);
        assert_eq!(img.as_raw().as_slice(), &pixels[..]);
    }

    #[test]
    fn test_ascii_pixmap_rejected() {
        let data = b"P3\n1 1\n255\n1 2 3\n".to_vec();
        match decode_ppm(Cursor::new(data)) {
            Err(PpmError::InvalidMagic(magic)) => assert_eq!(magic, "P3"),
            other => panic!("expected InvalidMagic, got {other:?}"),
        }
    }

    #[test]
    fn test_graymap_rejected() {
        let data = b"P5\n1 1\n255\n\x07".to_vec();
        assert!(matches!(
            decode_ppm(Cursor::new(data)),
            Err(PpmError::InvalidMagic(_))
        ));
    }

    #[test]
    fn test_sixteen_bit_rejected() {
        let data = p6(1, 1, 65535, &[0, 1, 0, 2, 0, 3]);
        assert!(matches!(
            decode_ppm(Cursor::new(data)),
            Err(PpmError::InvalidMaxValue)
        ));
    }

    #[test]
    fn test_small_max_value_rejected() {
        let data = p6(1, 1, 100, &[50, 100, 0]);
        assert!(matches!(
            decode_ppm(Cursor::new(data)),
            Err(PpmError::InvalidMaxValue)
        ));
    }

    #[test]
    fn test_header_comments_skipped() {
        let mut data = b"P6\n# palette\n1 1\n# depth\n255\n".to_vec();
        data.extend_from_slice(&[7, 8, 9]);
        assert_eq!(header_max_value(&data), Some(255));
        let img = decode_ppm(Cursor::new(data)).unwrap();
        assert_eq!(img.get_pixel(0, 0).0, [7, 8, 9]);
    }

    #[test]
    fn test_truncated_data_is_error() {
        let data = p6(4, 4, 255, &[1, 2, 3]);
        assert!(decode_ppm(Cursor::new(data)).is_err());
    }

    #[test]
    fn test_garbage_is_error() {
        assert!(decode_ppm(Cursor::new(b"not an image".to_vec())).is_err());
    }

    #[test]
    fn test_load_missing_file_returns_none() {
        let path = std::env::temp_dir().join("mandelbrot-explorer-missing.ppm");
        let _ = std::fs::remove_file(&path);
        assert!(matches!(read_ppm(&path), Err(PpmError::Open { .. })));
        assert!(load_ppm(&path).is_none());
    }

    #[test]
    fn test_load_from_file() {
        let path = std::env::temp_dir().join(format!(
            "mandelbrot-explorer-palette-{}.ppm",
            std::process::id()
        ));
        std::fs::write(&path, p6(3, 1, 255, &[1, 1, 1, 2, 2, 2, 3, 3, 3])).unwrap();
        let img = load_ppm(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(img.dimensions(), (3, 1));
        assert_eq!(img.get_pixel(2, 0).0, [3, 3, 3]);
    }
}
