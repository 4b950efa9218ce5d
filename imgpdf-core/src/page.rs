use crate::error::Result;
use crate::graphics::{GraphicsContext, Image};
use std::collections::BTreeMap;

/// A single page in a PDF document.
///
/// Pages have a size (width and height in points) and carry the images they
/// reference together with the content operators that draw them.
///
/// # Example
///
/// ```rust
/// use imgpdf::Page;
///
/// let page = Page::new(100.0, 50.0);
/// assert_eq!(page.width(), 100.0);
/// assert_eq!(page.height(), 50.0);
/// ```
#[derive(Clone, Debug)]
pub struct Page {
    width: f64,
    height: f64,
    graphics_context: GraphicsContext,
    images: BTreeMap<String, Image>,
}

impl Page {
    /// Creates a new page with the specified width and height in points.
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            graphics_context: GraphicsContext::new(),
            images: BTreeMap::new(),
        }
    }

    /// Creates a page measuring one point per pixel of `image`.
    pub fn from_image_size(image: &Image) -> Self {
        Self::new(image.width() as f64, image.height() as f64)
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn add_image(&mut self, name: impl Into<String>, image: Image) {
        self.images.insert(name.into(), image);
    }

    pub fn draw_image(&mut self, name: &str, x: f64, y: f64, width: f64, height: f64) -> Result<()> {
        if self.images.contains_key(name) {
            self.graphics_context.draw_image(name, x, y, width, height);
            Ok(())
        } else {
            Err(crate::PdfError::InvalidReference(format!(
                "Image '{name}' not found"
            )))
        }
    }

    pub(crate) fn images(&self) -> &BTreeMap<String, Image> {
        &self.images
    }

    pub(crate) fn generate_content(&self) -> Result<Vec<u8>> {
        self.graphics_context.generate_operations()
    }
}
