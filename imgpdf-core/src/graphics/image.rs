//! Image support for PDF generation
//!
//! Baseline and progressive 8-bit JPEG files are embedded as-is behind
//! `/DCTDecode`. Every other format the `image` crate can decode (PNG, BMP,
//! GIF, TIFF, WebP and JPEGs with other sample precisions) is decoded to 8-bit
//! gray or RGB samples and embedded behind `/FlateDecode` when compression is
//! enabled.

use crate::objects::{Dictionary, Object, Stream};
use crate::{PdfError, Result};
use image::{ColorType, DynamicImage, ImageFormat as SourceFormat};
use std::path::Path;
use tracing::debug;

/// Represents an image that can be embedded in a PDF
#[derive(Debug, Clone)]
pub struct Image {
    /// Stream bytes exactly as they will be written
    data: Vec<u8>,
    /// How `data` is encoded
    format: ImageFormat,
    /// Width in pixels
    width: u32,
    /// Height in pixels
    height: u32,
    color_space: ColorSpace,
    bits_per_component: u8,
    /// Adobe CMYK JPEGs store inverted samples
    inverted: bool,
}

/// Encoding of the embedded image data
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ImageFormat {
    /// Original JPEG bytes
    Jpeg,
    /// Zlib-compressed samples
    Flate,
    /// Uncompressed samples
    Raw,
}

/// Color spaces for images
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColorSpace {
    DeviceGray,
    DeviceRGB,
    DeviceCMYK,
}

impl ColorSpace {
    fn pdf_name(self) -> &'static str {
        match self {
            ColorSpace::DeviceGray => "DeviceGray",
            ColorSpace::DeviceRGB => "DeviceRGB",
            ColorSpace::DeviceCMYK => "DeviceCMYK",
        }
    }
}

impl Image {
    /// Load an image from a file in any supported raster format.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data = std::fs::read(path.as_ref())?;
        Self::from_bytes(data)
    }

    /// Create an image from encoded file bytes, detecting the format.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        let source_format = image::guess_format(&data)?;
        debug!(?source_format, bytes = data.len(), "detected image format");

        let image = match source_format {
            SourceFormat::Jpeg => {
                let header = parse_jpeg_header(&data)?;
                if header.precision == 8 {
                    Self::from_jpeg_header(data, header)
                } else {
                    debug!(
                        precision = header.precision,
                        "decoding JPEG that cannot be embedded directly"
                    );
                    Self::decode(&data, SourceFormat::Jpeg)?
                }
            }
            other => Self::decode(&data, other)?,
        };

        debug!(
            width = image.width,
            height = image.height,
            color_space = ?image.color_space,
            "loaded image"
        );
        Ok(image)
    }

    /// Create an image from JPEG data
    ///
    /// Only 8-bit JPEGs are accepted, since `/DCTDecode` cannot carry any
    /// other sample precision.
    pub fn from_jpeg_data(data: Vec<u8>) -> Result<Self> {
        let header = parse_jpeg_header(&data)?;
        if header.precision != 8 {
            return Err(PdfError::InvalidImage(format!(
                "Unsupported JPEG precision: {} bits",
                header.precision
            )));
        }
        Ok(Self::from_jpeg_header(data, header))
    }

    fn from_jpeg_header(data: Vec<u8>, header: JpegHeader) -> Self {
        Image {
            data,
            format: ImageFormat::Jpeg,
            width: header.width,
            height: header.height,
            color_space: header.color_space,
            bits_per_component: header.precision,
            inverted: header.adobe && header.color_space == ColorSpace::DeviceCMYK,
        }
    }

    fn decode(data: &[u8], format: SourceFormat) -> Result<Self> {
        let decoded = image::load_from_memory_with_format(data, format)?;
        Self::from_dynamic(&decoded)
    }

    /// Create an image from already decoded pixels.
    ///
    /// Gray images stay gray, everything else is converted to RGB. Any alpha
    /// channel is discarded.
    pub fn from_dynamic(decoded: &DynamicImage) -> Result<Self> {
        let (width, height) = (decoded.width(), decoded.height());
        check_dimensions(width, height)?;

        let (color_space, samples) = match decoded.color() {
            ColorType::L8 | ColorType::La8 | ColorType::L16 | ColorType::La16 => {
                (ColorSpace::DeviceGray, decoded.to_luma8().into_raw())
            }
            _ => (ColorSpace::DeviceRGB, decoded.to_rgb8().into_raw()),
        };

        let (format, data) = encode_samples(samples)?;

        Ok(Image {
            data,
            format,
            width,
            height,
            color_space,
            bits_per_component: 8,
            inverted: false,
        })
    }

    /// Get image width in pixels
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Get image height in pixels
    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn format(&self) -> ImageFormat {
        self.format
    }

    pub fn color_space(&self) -> ColorSpace {
        self.color_space
    }

    /// Get image data
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Convert to PDF XObject
    pub fn to_pdf_object(&self) -> Object {
        let mut dict = Dictionary::new();

        dict.set("Type", Object::name("XObject"));
        dict.set("Subtype", Object::name("Image"));
        dict.set("Width", self.width);
        dict.set("Height", self.height);
        dict.set("ColorSpace", Object::name(self.color_space.pdf_name()));
        dict.set("BitsPerComponent", self.bits_per_component as u32);
        if self.inverted {
            let decode: Vec<Object> = [1i64, 0, 1, 0, 1, 0, 1, 0]
                .into_iter()
                .map(Object::Integer)
                .collect();
            dict.set("Decode", decode);
        }

        match self.format {
            ImageFormat::Jpeg => dict.set("Filter", Object::name("DCTDecode")),
            ImageFormat::Flate => dict.set("Filter", Object::name("FlateDecode")),
            ImageFormat::Raw => {}
        }

        Stream::with_dictionary(dict, self.data.clone()).into_object()
    }
}

fn check_dimensions(width: u32, height: u32) -> Result<()> {
    if width == 0 || height == 0 {
        return Err(PdfError::InvalidImage(format!(
            "Image has no pixels ({width}x{height})"
        )));
    }
    Ok(())
}

#[cfg(feature = "compression")]
fn encode_samples(samples: Vec<u8>) -> Result<(ImageFormat, Vec<u8>)> {
    let compressed = crate::objects::flate_encode(&samples)?;
    Ok((ImageFormat::Flate, compressed))
}

#[cfg(not(feature = "compression"))]
fn encode_samples(samples: Vec<u8>) -> Result<(ImageFormat, Vec<u8>)> {
    Ok((ImageFormat::Raw, samples))
}

/// Frame information read from a JPEG's markers
#[derive(Debug, Clone, Copy, PartialEq)]
struct JpegHeader {
    width: u32,
    height: u32,
    color_space: ColorSpace,
    precision: u8,
    /// An Adobe APP14 segment was present
    adobe: bool,
}

/// Parse JPEG header to extract image information
fn parse_jpeg_header(data: &[u8]) -> Result<JpegHeader> {
    if data.len() < 2 || data[0] != 0xFF || data[1] != 0xD8 {
        return Err(PdfError::InvalidImage("Not a valid JPEG file".to_string()));
    }

    let mut pos = 2;
    let mut width = 0;
    let mut height = 0;
    let mut components = 0;
    let mut precision = 8;
    let mut adobe = false;

    while pos < data.len() - 1 {
        if data[pos] != 0xFF {
            return Err(PdfError::InvalidImage("Invalid JPEG marker".to_string()));
        }

        let marker = data[pos + 1];
        pos += 2;

        // Fill bytes
        if marker == 0xFF {
            pos -= 1;
            continue;
        }

        // SOFn, excluding DHT (C4), JPG (C8) and DAC (CC)
        if (0xC0..=0xCF).contains(&marker) && marker != 0xC4 && marker != 0xC8 && marker != 0xCC {
            if pos + 7 >= data.len() {
                return Err(PdfError::InvalidImage("Truncated JPEG file".to_string()));
            }

            // Skip length
            pos += 2;

            precision = data[pos];
            pos += 1;

            height = ((data[pos] as u32) << 8) | (data[pos + 1] as u32);
            pos += 2;
            width = ((data[pos] as u32) << 8) | (data[pos + 1] as u32);
            pos += 2;

            components = data[pos];
            break;
        } else if marker == 0xD9 {
            break;
        } else if marker == 0xD8 || (0xD0..=0xD7).contains(&marker) {
            // No length field for these markers
            continue;
        } else {
            if pos + 1 >= data.len() {
                return Err(PdfError::InvalidImage("Truncated JPEG file".to_string()));
            }
            let length = ((data[pos] as usize) << 8) | (data[pos + 1] as usize);
            if marker == 0xEE && data.get(pos + 2..pos + 7) == Some(&b"Adobe"[..]) {
                adobe = true;
            }
            pos += length;
        }
    }

    if width == 0 || height == 0 {
        return Err(PdfError::InvalidImage(
            "Could not find image dimensions".to_string(),
        ));
    }

    let color_space = match components {
        1 => ColorSpace::DeviceGray,
        3 => ColorSpace::DeviceRGB,
        4 => ColorSpace::DeviceCMYK,
        _ => {
            return Err(PdfError::InvalidImage(format!(
                "Unsupported number of components: {components}"
            )))
        }
    };

    Ok(JpegHeader {
        width,
        height,
        color_space,
        precision,
        adobe,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma, Rgb, RgbImage, Rgba, RgbaImage};
    use std::io::Cursor;

    fn encode(image: &DynamicImage, format: SourceFormat) -> Vec<u8> {
        let mut bytes = Cursor::new(Vec::new());
        image.write_to(&mut bytes, format).unwrap();
        bytes.into_inner()
    }

    #[test]
    fn test_parse_jpeg_header() {
        let jpeg_data = vec![
            0xFF, 0xD8, // SOI marker
            0xFF, 0xC0, // SOF0 marker
            0x00, 0x11, // Length (17 bytes)
            0x08, // Precision (8 bits)
            0x00, 0x64, // Height (100)
            0x00, 0xC8, // Width (200)
            0x03, // Components (3 = RGB)
        ];

        let header = parse_jpeg_header(&jpeg_data).unwrap();
        assert_eq!(header.width, 200);
        assert_eq!(header.height, 100);
        assert_eq!(header.color_space, ColorSpace::DeviceRGB);
        assert_eq!(header.precision, 8);
        assert!(!header.adobe);
    }

    #[test]
    fn test_parse_jpeg_header_skips_segments() {
        let jpeg_data = vec![
            0xFF, 0xD8, // SOI
            0xFF, 0xE0, 0x00, 0x04, 0x4A, 0x46, // APP0, length 4
            0xFF, 0xC2, // SOF2 (progressive)
            0x00, 0x0B, 0x08, 0x00, 0x20, 0x00, 0x10, 0x01, // 16x32, gray
            0x00, 0x00,
        ];

        let header = parse_jpeg_header(&jpeg_data).unwrap();
        assert_eq!((header.width, header.height), (16, 32));
        assert_eq!(header.color_space, ColorSpace::DeviceGray);
    }

    fn cmyk_jpeg_header(adobe: bool) -> Vec<u8> {
        let mut data = vec![0xFF, 0xD8];
        if adobe {
            data.extend_from_slice(&[0xFF, 0xEE, 0x00, 0x0E]);
            data.extend_from_slice(b"Adobe");
            data.extend_from_slice(&[0x00, 0x64, 0x00, 0x00, 0x00, 0x00, 0x02]);
        }
        data.extend_from_slice(&[0xFF, 0xC0, 0x00, 0x14, 0x08, 0x00, 0x10, 0x00, 0x10, 0x04]);
        data.extend_from_slice(&[0x00; 12]);
        data
    }

    #[test]
    fn test_adobe_cmyk_jpeg_is_inverted() {
        let image = Image::from_jpeg_data(cmyk_jpeg_header(true)).unwrap();
        assert_eq!(image.color_space(), ColorSpace::DeviceCMYK);

        let dict = match image.to_pdf_object() {
            Object::Stream(dict, _) => dict,
            other => panic!("Expected stream, got {other:?}"),
        };
        let expected: Vec<Object> = [1, 0, 1, 0, 1, 0, 1, 0]
            .into_iter()
            .map(Object::Integer)
            .collect();
        assert_eq!(dict.get("Decode"), Some(&Object::Array(expected)));
    }

    #[test]
    fn test_plain_cmyk_jpeg_has_no_decode_array() {
        let image = Image::from_jpeg_data(cmyk_jpeg_header(false)).unwrap();
        assert_eq!(image.color_space(), ColorSpace::DeviceCMYK);

        let dict = match image.to_pdf_object() {
            Object::Stream(dict, _) => dict,
            other => panic!("Expected stream, got {other:?}"),
        };
        assert!(!dict.contains_key("Decode"));
    }

    #[test]
    fn test_twelve_bit_jpeg_is_not_embedded() {
        let jpeg_data = vec![
            0xFF, 0xD8, // SOI
            0xFF, 0xC1, // SOF1 (extended sequential)
            0x00, 0x0B, 0x0C, 0x00, 0x08, 0x00, 0x08, 0x01, // 8x8, gray, 12 bits
            0x00, 0x00,
        ];

        assert_eq!(parse_jpeg_header(&jpeg_data).unwrap().precision, 12);
        let err = Image::from_jpeg_data(jpeg_data).unwrap_err();
        assert!(matches!(err, PdfError::InvalidImage(_)));
    }

    #[test]
    fn test_invalid_jpeg() {
        assert!(parse_jpeg_header(&[0x00, 0x00]).is_err());
        assert!(parse_jpeg_header(&[0xFF, 0xD8, 0xFF, 0xD9]).is_err());
    }

    #[test]
    fn test_png_is_decoded_and_compressed() {
        let rgb = RgbImage::from_pixel(4, 3, Rgb([10, 20, 30]));
        let bytes = encode(&DynamicImage::ImageRgb8(rgb), SourceFormat::Png);

        let image = Image::from_bytes(bytes).unwrap();
        assert_eq!(image.width(), 4);
        assert_eq!(image.height(), 3);
        assert_eq!(image.color_space(), ColorSpace::DeviceRGB);

        #[cfg(feature = "compression")]
        assert_eq!(image.format(), ImageFormat::Flate);
        #[cfg(not(feature = "compression"))]
        assert_eq!(image.data().len(), 4 * 3 * 3);
    }

    #[test]
    fn test_gray_png_stays_gray() {
        let gray = GrayImage::from_pixel(2, 2, Luma([128]));
        let bytes = encode(&DynamicImage::ImageLuma8(gray), SourceFormat::Png);

        let image = Image::from_bytes(bytes).unwrap();
        assert_eq!(image.color_space(), ColorSpace::DeviceGray);
    }

    #[test]
    fn test_alpha_channel_is_dropped() {
        let rgba = RgbaImage::from_pixel(2, 2, Rgba([255, 0, 0, 10]));
        let image = Image::from_dynamic(&DynamicImage::ImageRgba8(rgba)).unwrap();

        assert_eq!(image.color_space(), ColorSpace::DeviceRGB);
        let dict = match image.to_pdf_object() {
            Object::Stream(dict, _) => dict,
            other => panic!("Expected stream, got {other:?}"),
        };
        assert!(!dict.contains_key("SMask"));
    }

    #[test]
    fn test_bmp_is_supported() {
        let rgb = RgbImage::from_pixel(5, 7, Rgb([1, 2, 3]));
        let bytes = encode(&DynamicImage::ImageRgb8(rgb), SourceFormat::Bmp);

        let image = Image::from_bytes(bytes).unwrap();
        assert_eq!((image.width(), image.height()), (5, 7));
    }

    #[test]
    fn test_jpeg_is_passed_through() {
        let rgb = RgbImage::from_pixel(8, 6, Rgb([200, 100, 50]));
        let bytes = encode(&DynamicImage::ImageRgb8(rgb), SourceFormat::Jpeg);

        let image = Image::from_bytes(bytes.clone()).unwrap();
        assert_eq!(image.format(), ImageFormat::Jpeg);
        assert_eq!((image.width(), image.height()), (8, 6));
        assert_eq!(image.data(), bytes.as_slice());
    }

    #[test]
    fn test_zero_sized_image_rejected() {
        let empty = DynamicImage::ImageRgb8(RgbImage::new(0, 4));
        let err = Image::from_dynamic(&empty).unwrap_err();
        assert!(matches!(err, PdfError::InvalidImage(_)));
    }

    #[test]
    fn test_garbage_bytes_rejected() {
        let err = Image::from_bytes(b"definitely not an image".to_vec()).unwrap_err();
        assert!(matches!(err, PdfError::Decode(_)));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = Image::from_file("/nonexistent/dir/picture.png").unwrap_err();
        assert!(matches!(err, PdfError::Io(_)));
    }

    #[test]
    fn test_to_pdf_object() {
        let rgb = RgbImage::from_pixel(3, 2, Rgb([0, 0, 0]));
        let image = Image::from_dynamic(&DynamicImage::ImageRgb8(rgb)).unwrap();

        let (dict, data) = match image.to_pdf_object() {
            Object::Stream(dict, data) => (dict, data),
            other => panic!("Expected stream, got {other:?}"),
        };
        assert_eq!(dict.get("Type"), Some(&Object::name("XObject")));
        assert_eq!(dict.get("Subtype"), Some(&Object::name("Image")));
        assert_eq!(dict.get("Width"), Some(&Object::Integer(3)));
        assert_eq!(dict.get("Height"), Some(&Object::Integer(2)));
        assert_eq!(dict.get("ColorSpace"), Some(&Object::name("DeviceRGB")));
        assert_eq!(dict.get("BitsPerComponent"), Some(&Object::Integer(8)));
        assert_eq!(
            dict.get("Length"),
            Some(&Object::Integer(data.len() as i64))
        );
    }
}
