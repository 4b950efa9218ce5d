//! Image to PDF conversion.

use crate::document::Document;
use crate::error::Result;
use crate::graphics::Image;
use crate::page::Page;
use std::path::Path;
use tracing::{debug, info};

/// Resource name of the single image on a converted page.
pub const IMAGE_NAME: &str = "Im1";

/// Converts the image at `image_path` into a one-page PDF at `pdf_path`.
///
/// The page measures one point per pixel and the image covers it exactly.
/// An existing file at `pdf_path` is overwritten. The image is decoded
/// before the output is opened, so a decode failure leaves `pdf_path`
/// untouched.
///
/// # Example
///
/// ```rust,no_run
/// imgpdf::convert("scan.png", "scan.pdf")?;
/// # Ok::<(), imgpdf::PdfError>(())
/// ```
pub fn convert(image_path: impl AsRef<Path>, pdf_path: impl AsRef<Path>) -> Result<()> {
    let document = image_to_document(image_path)?;
    document.save(pdf_path.as_ref())?;

    info!(output = %pdf_path.as_ref().display(), "wrote PDF");
    Ok(())
}

/// Builds the in-memory document that [`convert`] would save.
pub fn image_to_document(image_path: impl AsRef<Path>) -> Result<Document> {
    let image_path = image_path.as_ref();
    let image = Image::from_file(image_path)?;
    let (width, height) = (image.width() as f64, image.height() as f64);
    debug!(input = %image_path.display(), width, height, "building page");

    let mut page = Page::from_image_size(&image);
    page.add_image(IMAGE_NAME, image);
    page.draw_image(IMAGE_NAME, 0.0, 0.0, width, height)?;

    let mut document = Document::new();
    document.add_page(page);
    Ok(document)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PdfError;
    use image::{Rgb, RgbImage};
    use tempfile::tempdir;

    #[test]
    fn test_image_to_document_single_page() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("in.png");
        RgbImage::from_pixel(100, 50, Rgb([0, 128, 255]))
            .save(&input)
            .unwrap();

        let document = image_to_document(&input).unwrap();
        assert_eq!(document.page_count(), 1);

        let page = &document.pages()[0];
        assert_eq!(page.width(), 100.0);
        assert_eq!(page.height(), 50.0);
        assert_eq!(
            page.generate_content().unwrap(),
            b"q\n100.00 0 0 50.00 0.00 0.00 cm\n/Im1 Do\nQ\n"
        );
    }

    #[test]
    fn test_convert_writes_file() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("in.bmp");
        let output = dir.path().join("out.pdf");
        RgbImage::from_pixel(3, 9, Rgb([5, 5, 5])).save(&input).unwrap();

        convert(&input, &output).unwrap();

        let bytes = std::fs::read(&output).unwrap();
        assert!(bytes.starts_with(b"%PDF-1.7"));
        assert!(bytes.ends_with(b"%%EOF\n"));
    }

    #[test]
    fn test_convert_missing_input_leaves_no_output() {
        let dir = tempdir().unwrap();
        let output = dir.path().join("out.pdf");

        let err = convert(dir.path().join("missing.png"), &output).unwrap_err();
        assert!(matches!(err, PdfError::Io(_)));
        assert!(!output.exists());
    }

    #[test]
    fn test_convert_non_image_keeps_existing_output() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("notes.txt");
        let output = dir.path().join("out.pdf");
        std::fs::write(&input, "just some text").unwrap();
        std::fs::write(&output, "previous").unwrap();

        let err = convert(&input, &output).unwrap_err();
        assert!(matches!(err, PdfError::Decode(_)));
        assert_eq!(std::fs::read_to_string(&output).unwrap(), "previous");
    }
}
