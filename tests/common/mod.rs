//! Fixture builders shared by the integration tests.
//!
//! Everything is generated into a `TempDir` at test time; no binary fixtures
//! live in the tree.

#![allow(dead_code)]

use lopdf::{dictionary, Document, Object};
use std::io::Write;
use std::path::{Path, PathBuf};
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/></Types>"#;

/// Builder for a minimal but well-formed DOCX package.
#[derive(Default)]
pub struct DocxFixture {
    pages_field: Option<String>,
    paragraphs: Vec<String>,
    table_cells: Vec<String>,
    omit_body: bool,
}

impl DocxFixture {
    pub fn new() -> Self {
        Self::default()
    }

    /// Write `<Pages>{value}</Pages>` into `docProps/app.xml`.
    pub fn pages_field(mut self, value: &str) -> Self {
        self.pages_field = Some(value.to_string());
        self
    }

    pub fn paragraph(mut self, text: impl Into<String>) -> Self {
        self.paragraphs.push(text.into());
        self
    }

    /// Add a one-row body-level table with one cell per entry.
    pub fn table_row(mut self, cells: &[&str]) -> Self {
        self.table_cells.extend(cells.iter().map(|c| c.to_string()));
        self
    }

    pub fn without_body(mut self) -> Self {
        self.omit_body = true;
        self
    }

    pub fn write(&self, dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        let file = std::fs::File::create(&path).unwrap();
        let mut zip = ZipWriter::new(file);
        let options = SimpleFileOptions::default();

        zip.start_file("[Content_Types].xml", options).unwrap();
        zip.write_all(CONTENT_TYPES.as_bytes()).unwrap();

        if let Some(pages) = &self.pages_field {
            zip.start_file("docProps/app.xml", options).unwrap();
            write!(
                zip,
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Properties xmlns="http://schemas.openxmlformats.org/officeDocument/2006/extended-properties" xmlns:vt="http://schemas.openxmlformats.org/officeDocument/2006/docPropsVTypes"><Template>Normal.dotm</Template><Pages>{pages}</Pages><Application>Microsoft Office Word</Application></Properties>"#
            )
            .unwrap();
        }

        if !self.omit_body {
            zip.start_file("word/document.xml", options).unwrap();
            zip.write_all(self.document_xml().as_bytes()).unwrap();
        }

        zip.finish().unwrap();
        path
    }

    fn document_xml(&self) -> String {
        let mut body: String = self
            .paragraphs
            .iter()
            .map(|p| format!(r#"<w:p><w:r><w:t xml:space="preserve">{p}</w:t></w:r></w:p>"#))
            .collect();

        if !self.table_cells.is_empty() {
            body.push_str("<w:tbl><w:tr>");
            for cell in &self.table_cells {
                body.push_str(&format!("<w:tc><w:p><w:r><w:t>{cell}</w:t></w:r></w:p></w:tc>"));
            }
            body.push_str("</w:tr></w:tbl>");
        }

        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{body}<w:sectPr/></w:body></w:document>"#
        )
    }
}

/// Write a PDF whose page tree holds `per_node.len()` intermediate nodes,
/// the i-th one holding `per_node[i]` leaf pages.
pub fn write_pdf(dir: &Path, name: &str, per_node: &[usize]) -> PathBuf {
    let mut doc = Document::with_version("1.5");
    let root_id = doc.new_object_id();

    let mut root_kids = Vec::new();
    for &leaves in per_node {
        let node_id = doc.new_object_id();
        let kids: Vec<Object> = (0..leaves)
            .map(|_| {
                Object::Reference(doc.add_object(dictionary! {
                    "Type" => "Page",
                    "Parent" => node_id,
                }))
            })
            .collect();
        doc.objects.insert(
            node_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Parent" => root_id,
                "Kids" => kids,
                "Count" => leaves as i64,
            }),
        );
        root_kids.push(Object::Reference(node_id));
    }

    let total: usize = per_node.iter().sum();
    doc.objects.insert(
        root_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => root_kids,
            "Count" => total as i64,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => root_id,
    });
    doc.trailer.set("Root", catalog_id);

    let path = dir.join(name);
    doc.save(&path).unwrap();
    path
}

/// Write `size` bytes of filler under `name`.
pub fn write_filler(dir: &Path, name: &str, size: usize) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, vec![0xD0u8; size]).unwrap();
    path
}
