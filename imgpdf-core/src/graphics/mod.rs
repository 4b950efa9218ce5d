mod image;

pub use self::image::{ColorSpace as ImageColorSpace, Image, ImageFormat};

use crate::error::Result;

/// Accumulates page content-stream operators.
#[derive(Clone, Debug, Default)]
pub struct GraphicsContext {
    operations: String,
}

impl GraphicsContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn save_state(&mut self) -> &mut Self {
        self.operations.push_str("q\n");
        self
    }

    pub fn restore_state(&mut self) -> &mut Self {
        self.operations.push_str("Q\n");
        self
    }

    /// Paint the image XObject `image_name` into the rectangle with its
    /// lower-left corner at `(x, y)`.
    pub fn draw_image(
        &mut self,
        image_name: &str,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    ) -> &mut Self {
        self.save_state();

        // Image space is the unit square; scale it to the target rectangle
        self.operations
            .push_str(&format!("{width:.2} 0 0 {height:.2} {x:.2} {y:.2} cm\n"));
        self.operations.push_str(&format!("/{image_name} Do\n"));

        self.restore_state();
        self
    }

    pub fn operations(&self) -> &str {
        &self.operations
    }

    pub fn generate_operations(&self) -> Result<Vec<u8>> {
        Ok(self.operations.as_bytes().to_vec())
    }
}
