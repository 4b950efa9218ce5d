//! # imgpdf
//!
//! Turn a raster image into a single-page PDF whose page is exactly the size
//! of the image, one point per pixel, with the image drawn edge to edge.
//!
//! ## Features
//!
//! - **Any common raster input**: PNG, BMP and JPEG via the `image` crate
//! - **JPEG passthrough**: JPEG data is embedded without re-encoding
//! - **Deterministic output**: sorted dictionaries and sequential object
//!   numbers, so the same input and dates give the same bytes
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use imgpdf::Result;
//!
//! # fn main() -> Result<()> {
//! imgpdf::convert("photo.jpg", "photo.pdf")?;
//! # Ok(())
//! # }
//! ```
//!
//! Building the document by hand:
//!
//! ```rust,no_run
//! use imgpdf::{Document, Image, Page, Result};
//!
//! # fn main() -> Result<()> {
//! let image = Image::from_file("diagram.png")?;
//! let (w, h) = (image.width() as f64, image.height() as f64);
//!
//! let mut page = Page::from_image_size(&image);
//! page.add_image("Im1", image);
//! page.draw_image("Im1", 0.0, 0.0, w, h)?;
//!
//! let mut doc = Document::new();
//! doc.add_page(page);
//! doc.save("diagram.pdf")?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`mod@convert`] - The image to PDF pipeline
//! - [`document`] - PDF document and metadata
//! - [`page`] - Page size and content
//! - [`graphics`] - Images and content operators
//! - [`writer`] - Low-level PDF writing
//! - [`objects`] - PDF object model

pub mod convert;
pub mod document;
pub mod error;
pub mod graphics;
pub mod objects;
pub mod page;
pub mod writer;

pub use convert::{convert, image_to_document};
pub use document::{Document, DocumentMetadata};
pub use error::{PdfError, Result};
pub use graphics::{GraphicsContext, Image, ImageColorSpace, ImageFormat};
pub use page::Page;
pub use writer::{PdfWriter, WriterConfig};

/// Current version of imgpdf
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
