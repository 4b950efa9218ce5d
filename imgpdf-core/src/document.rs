use crate::error::Result;
use crate::page::Page;
use crate::writer::{PdfWriter, WriterConfig};
use chrono::{DateTime, Utc};

/// A PDF document made of pages plus its info dictionary.
///
/// # Example
///
/// ```rust
/// use imgpdf::{Document, Page};
///
/// let mut doc = Document::new();
/// doc.add_page(Page::new(200.0, 100.0));
///
/// let mut buffer = Vec::new();
/// doc.write(&mut buffer).unwrap();
/// assert!(buffer.starts_with(b"%PDF-"));
/// ```
#[derive(Debug, Clone)]
pub struct Document {
    pub(crate) pages: Vec<Page>,
    pub(crate) metadata: DocumentMetadata,
    pub(crate) config: WriterConfig,
}

/// Metadata written to the document info dictionary.
#[derive(Debug, Clone)]
pub struct DocumentMetadata {
    /// Software that created the original document
    pub creator: Option<String>,
    /// Software that produced the PDF
    pub producer: Option<String>,
    /// Creation time; the time of writing when unset
    pub creation_date: Option<DateTime<Utc>>,
    /// Modification time; the time of writing when unset
    pub modification_date: Option<DateTime<Utc>>,
}

impl Default for DocumentMetadata {
    fn default() -> Self {
        Self {
            creator: Some("imgpdf".to_string()),
            producer: Some(format!("imgpdf v{}", env!("CARGO_PKG_VERSION"))),
            creation_date: None,
            modification_date: None,
        }
    }
}

impl Document {
    /// Creates a new empty PDF document.
    pub fn new() -> Self {
        Self {
            pages: Vec::new(),
            metadata: DocumentMetadata::default(),
            config: WriterConfig::default(),
        }
    }

    /// Adds a page to the document.
    pub fn add_page(&mut self, page: Page) {
        self.pages.push(page);
    }

    /// Gets the number of pages in the document.
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    /// Pins the creation date instead of using the time of writing.
    pub fn set_creation_date(&mut self, date: DateTime<Utc>) {
        self.metadata.creation_date = Some(date);
    }

    /// Pins the modification date instead of using the time of writing.
    pub fn set_modification_date(&mut self, date: DateTime<Utc>) {
        self.metadata.modification_date = Some(date);
    }

    pub fn set_writer_config(&mut self, config: WriterConfig) {
        self.config = config;
    }

    /// Saves the document to a file, replacing any existing file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created or written.
    pub fn save(&self, path: impl AsRef<std::path::Path>) -> Result<()> {
        let mut writer = PdfWriter::new(path)?.with_config(self.config.clone());
        writer.write_document(self)?;
        Ok(())
    }

    /// Writes the document to a buffer.
    ///
    /// # Errors
    ///
    /// Returns an error if the PDF cannot be generated.
    pub fn write(&self, buffer: &mut Vec<u8>) -> Result<()> {
        let mut writer = PdfWriter::new_with_writer(buffer).with_config(self.config.clone());
        writer.write_document(self)?;
        Ok(())
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}
