use crate::document::Document;
use crate::error::Result;
use crate::objects::{Dictionary, Object, ObjectId, Stream};
use crate::page::Page;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::trace;

/// Serialization settings for [`PdfWriter`].
#[derive(Debug, Clone, PartialEq)]
pub struct WriterConfig {
    /// Version written in the `%PDF-x.y` header
    pub pdf_version: String,
    /// Flate-compress page content streams (requires the `compression` feature)
    pub compress_streams: bool,
}

impl Default for WriterConfig {
    fn default() -> Self {
        Self {
            pdf_version: "1.7".to_string(),
            compress_streams: true,
        }
    }
}

pub struct PdfWriter<W: Write> {
    writer: W,
    config: WriterConfig,
    xref_positions: BTreeMap<ObjectId, u64>,
    current_position: u64,
    next_object_number: u32,
}

impl<W: Write> PdfWriter<W> {
    pub fn new_with_writer(writer: W) -> Self {
        Self {
            writer,
            config: WriterConfig::default(),
            xref_positions: BTreeMap::new(),
            current_position: 0,
            next_object_number: 1,
        }
    }

    pub fn with_config(mut self, config: WriterConfig) -> Self {
        self.config = config;
        self
    }

    pub fn write_document(&mut self, document: &Document) -> Result<()> {
        self.write_header()?;

        let catalog_id = self.allocate_object_id();
        let pages_id = self.allocate_object_id();
        let page_ids: Vec<ObjectId> = document
            .pages
            .iter()
            .map(|_| self.allocate_object_id())
            .collect();

        self.write_catalog(catalog_id, pages_id)?;
        self.write_page_tree(pages_id, &page_ids)?;
        for (page, page_id) in document.pages.iter().zip(&page_ids) {
            self.write_page(*page_id, pages_id, page)?;
        }
        let info_id = self.write_info(document)?;

        let xref_position = self.current_position;
        self.write_xref()?;
        self.write_trailer(catalog_id, info_id, xref_position)?;

        self.writer.flush()?;
        trace!(
            objects = self.xref_positions.len(),
            bytes = self.current_position,
            "finished writing document"
        );
        Ok(())
    }

    fn allocate_object_id(&mut self) -> ObjectId {
        let id = ObjectId::new(self.next_object_number, 0);
        self.next_object_number += 1;
        id
    }

    fn write_header(&mut self) -> Result<()> {
        let header = format!("%PDF-{}\n", self.config.pdf_version);
        self.write_bytes(header.as_bytes())?;
        // Binary comment to ensure file is treated as binary
        self.write_bytes(&[b'%', 0xE2, 0xE3, 0xCF, 0xD3, b'\n'])?;
        Ok(())
    }

    fn write_catalog(&mut self, catalog_id: ObjectId, pages_id: ObjectId) -> Result<()> {
        let mut catalog = Dictionary::new();
        catalog.set("Type", Object::name("Catalog"));
        catalog.set("Pages", pages_id);

        self.write_object(catalog_id, Object::Dictionary(catalog))
    }

    fn write_page_tree(&mut self, pages_id: ObjectId, page_ids: &[ObjectId]) -> Result<()> {
        let mut pages_dict = Dictionary::new();
        pages_dict.set("Type", Object::name("Pages"));
        pages_dict.set("Count", page_ids.len() as i64);
        pages_dict.set(
            "Kids",
            page_ids
                .iter()
                .map(|id| Object::Reference(*id))
                .collect::<Vec<_>>(),
        );

        self.write_object(pages_id, Object::Dictionary(pages_dict))
    }

    fn write_page(&mut self, page_id: ObjectId, parent_id: ObjectId, page: &Page) -> Result<()> {
        let content_id = self.allocate_object_id();

        let mut page_dict = Dictionary::new();
        page_dict.set("Type", Object::name("Page"));
        page_dict.set("Parent", parent_id);
        page_dict.set(
            "MediaBox",
            vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Real(page.width()),
                Object::Real(page.height()),
            ],
        );
        page_dict.set("Contents", content_id);

        let mut resources = Dictionary::new();
        let mut image_objects = Vec::new();
        if !page.images().is_empty() {
            let mut xobject_dict = Dictionary::new();
            for (name, image) in page.images() {
                let image_id = self.allocate_object_id();
                xobject_dict.set(name.clone(), image_id);
                image_objects.push((image_id, image.to_pdf_object()));
            }
            resources.set("XObject", xobject_dict);
        }
        page_dict.set("Resources", resources);

        self.write_object(page_id, Object::Dictionary(page_dict))?;
        self.write_page_content(content_id, page)?;
        for (image_id, object) in image_objects {
            self.write_object(image_id, object)?;
        }
        Ok(())
    }

    fn write_page_content(&mut self, content_id: ObjectId, page: &Page) -> Result<()> {
        #[allow(unused_mut)]
        let mut stream = Stream::new(page.generate_content()?);

        #[cfg(feature = "compression")]
        if self.config.compress_streams {
            stream.compress_flate()?;
        }

        self.write_object(content_id, stream.into_object())
    }

    fn write_info(&mut self, document: &Document) -> Result<ObjectId> {
        let info_id = self.allocate_object_id();
        let metadata = &document.metadata;
        let now = Utc::now();

        let mut info_dict = Dictionary::new();
        if let Some(ref creator) = metadata.creator {
            info_dict.set("Creator", Object::String(creator.clone()));
        }
        if let Some(ref producer) = metadata.producer {
            info_dict.set("Producer", Object::String(producer.clone()));
        }
        info_dict.set(
            "CreationDate",
            Object::String(format_pdf_date(metadata.creation_date.unwrap_or(now))),
        );
        info_dict.set(
            "ModDate",
            Object::String(format_pdf_date(metadata.modification_date.unwrap_or(now))),
        );

        self.write_object(info_id, Object::Dictionary(info_dict))?;
        Ok(info_id)
    }
}

impl PdfWriter<BufWriter<std::fs::File>> {
    /// Creates (or truncates) the file at `path` and writes into it.
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let file = std::fs::File::create(path)?;
        Ok(Self::new_with_writer(BufWriter::new(file)))
    }
}

impl<W: Write> PdfWriter<W> {
    fn write_object(&mut self, id: ObjectId, object: Object) -> Result<()> {
        self.xref_positions.insert(id, self.current_position);
        trace!(object = id.number(), offset = self.current_position, "writing object");

        let header = format!("{} {} obj\n", id.number(), id.generation());
        self.write_bytes(header.as_bytes())?;

        self.write_object_value(&object)?;

        self.write_bytes(b"\nendobj\n")?;
        Ok(())
    }

    fn write_object_value(&mut self, object: &Object) -> Result<()> {
        match object {
            Object::Null => self.write_bytes(b"null")?,
            Object::Boolean(b) => self.write_bytes(if *b { b"true" } else { b"false" })?,
            Object::Integer(i) => self.write_bytes(i.to_string().as_bytes())?,
            Object::Real(f) => self.write_bytes(format_real(*f).as_bytes())?,
            Object::String(s) => {
                self.write_bytes(b"(")?;
                self.write_bytes(&escape_string(s))?;
                self.write_bytes(b")")?;
            }
            Object::Name(n) => {
                self.write_bytes(b"/")?;
                self.write_bytes(n.as_bytes())?;
            }
            Object::Array(arr) => {
                self.write_bytes(b"[")?;
                for (i, obj) in arr.iter().enumerate() {
                    if i > 0 {
                        self.write_bytes(b" ")?;
                    }
                    self.write_object_value(obj)?;
                }
                self.write_bytes(b"]")?;
            }
            Object::Dictionary(dict) => {
                self.write_bytes(b"<<")?;
                for (key, value) in dict.entries() {
                    self.write_bytes(b"\n/")?;
                    self.write_bytes(key.as_bytes())?;
                    self.write_bytes(b" ")?;
                    self.write_object_value(value)?;
                }
                self.write_bytes(b"\n>>")?;
            }
            Object::Stream(dict, data) => {
                let mut dict = dict.clone();
                dict.set("Length", data.len() as i64);
                self.write_object_value(&Object::Dictionary(dict))?;
                self.write_bytes(b"\nstream\n")?;
                self.write_bytes(data)?;
                self.write_bytes(b"\nendstream")?;
            }
            Object::Reference(id) => {
                self.write_bytes(id.to_string().as_bytes())?;
            }
        }
        Ok(())
    }

    fn write_xref(&mut self) -> Result<()> {
        self.write_bytes(b"xref\n")?;

        let max_obj_num = self
            .xref_positions
            .keys()
            .map(|id| id.number())
            .max()
            .unwrap_or(0);

        // Single subsection covering 0..=max
        self.write_bytes(format!("0 {}\n", max_obj_num + 1).as_bytes())?;
        self.write_bytes(b"0000000000 65535 f \n")?;

        for obj_num in 1..=max_obj_num {
            let entry = match self.xref_positions.get(&ObjectId::new(obj_num, 0)) {
                Some(position) => format!("{position:010} 00000 n \n"),
                None => "0000000000 00000 f \n".to_string(),
            };
            self.write_bytes(entry.as_bytes())?;
        }

        Ok(())
    }

    fn write_trailer(
        &mut self,
        catalog_id: ObjectId,
        info_id: ObjectId,
        xref_position: u64,
    ) -> Result<()> {
        let max_obj_num = self
            .xref_positions
            .keys()
            .map(|id| id.number())
            .max()
            .unwrap_or(0);

        let mut trailer = Dictionary::new();
        trailer.set("Size", (max_obj_num + 1) as i64);
        trailer.set("Root", catalog_id);
        trailer.set("Info", info_id);

        self.write_bytes(b"trailer\n")?;
        self.write_object_value(&Object::Dictionary(trailer))?;
        self.write_bytes(b"\nstartxref\n")?;
        self.write_bytes(xref_position.to_string().as_bytes())?;
        self.write_bytes(b"\n%%EOF\n")?;

        Ok(())
    }

    fn write_bytes(&mut self, data: &[u8]) -> Result<()> {
        self.writer.write_all(data)?;
        self.current_position += data.len() as u64;
        Ok(())
    }
}

/// Shortest decimal form with at most six fractional digits (`100.0` -> `100`).
fn format_real(value: f64) -> String {
    let formatted = format!("{value:.6}");
    let trimmed = formatted.trim_end_matches('0').trim_end_matches('.');
    match trimmed {
        "" | "-" | "-0" => "0".to_string(),
        other => other.to_string(),
    }
}

/// Escape a literal string body; `\`, `(` and `)` must be backslashed.
fn escape_string(s: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(s.len());
    for byte in s.bytes() {
        match byte {
            b'\\' | b'(' | b')' => {
                out.push(b'\\');
                out.push(byte);
            }
            b'\n' => out.extend_from_slice(b"\\n"),
            b'\r' => out.extend_from_slice(b"\\r"),
            _ => out.push(byte),
        }
    }
    out
}

/// Format a DateTime as a PDF date string (D:YYYYMMDDHHmmSSOHH'mm)
fn format_pdf_date(date: DateTime<Utc>) -> String {
    let formatted = date.format("D:%Y%m%d%H%M%S");

    // UTC, so the offset is always +00'00
    format!("{formatted}+00'00")
}
