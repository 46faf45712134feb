#![allow(dead_code)]

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use zip::write::SimpleFileOptions;

const DOCUMENT_OPEN: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"
 xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"
 xmlns:wp="http://schemas.openxmlformats.org/drawingml/2006/wordprocessingDrawing"
 xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main"
 xmlns:pic="http://schemas.openxmlformats.org/drawingml/2006/picture"
 xmlns:wps="http://schemas.microsoft.com/office/word/2010/wordprocessingShape"><w:body>"#;

const DOCUMENT_CLOSE: &str = "<w:sectPr/></w:body></w:document>";

const IMAGE_REL: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/image";

/// Minimal WordprocessingML package written with `zip::ZipWriter`.
#[derive(Default)]
pub struct DocxBuilder {
    body: String,
    rels: Vec<(String, String, bool)>,
    media: Vec<(String, Vec<u8>)>,
}

impl DocxBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `word/media/<file_name>` and return its relationship id.
    pub fn image(&mut self, file_name: &str, bytes: &[u8]) -> String {
        let id = format!("rId{}", self.rels.len() + 10);
        self.rels
            .push((id.clone(), format!("media/{file_name}"), false));
        self.media
            .push((format!("word/media/{file_name}"), bytes.to_vec()));
        id
    }

    pub fn external_image(&mut self, url: &str) -> String {
        let id = format!("rId{}", self.rels.len() + 10);
        self.rels.push((id.clone(), url.to_string(), true));
        id
    }

    pub fn paragraph(&mut self, text: &str) -> &mut Self {
        self.body.push_str(&format!("<w:p><w:r><w:t>{text}</w:t></w:r></w:p>"));
        self
    }

    pub fn table(&mut self, rows: &[Vec<String>]) -> &mut Self {
        self.body.push_str("<w:tbl>");
        for row in rows {
            self.body.push_str("<w:tr>");
            for cell in row {
                self.body.push_str(cell);
            }
            self.body.push_str("</w:tr>");
        }
        self.body.push_str("</w:tbl>");
        self
    }

    pub fn write(&self, path: &Path) {
        let file = fs::File::create(path).unwrap();
        let mut zip = zip::ZipWriter::new(file);
        let opts = SimpleFileOptions::default();

        zip.start_file("[Content_Types].xml", opts).unwrap();
        zip.write_all(CONTENT_TYPES.as_bytes()).unwrap();

        zip.start_file("word/_rels/document.xml.rels", opts).unwrap();
        zip.write_all(self.rels_xml().as_bytes()).unwrap();

        zip.start_file("word/document.xml", opts).unwrap();
        zip.write_all(format!("{DOCUMENT_OPEN}{}{DOCUMENT_CLOSE}", self.body).as_bytes())
            .unwrap();

        for (name, bytes) in &self.media {
            zip.start_file(name.as_str(), opts).unwrap();
            zip.write_all(bytes).unwrap();
        }
        zip.finish().unwrap();
    }

    pub fn write_in(&self, dir: &Path) -> PathBuf {
        let path = dir.join("input.docx");
        self.write(&path);
        path
    }

    fn rels_xml(&self) -> String {
        let mut xml = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
        );
        for (id, target, external) in &self.rels {
            let mode = if *external { r#" TargetMode="External""# } else { "" };
            xml.push_str(&format!(
                r#"<Relationship Id="{id}" Type="{IMAGE_REL}" Target="{target}"{mode}/>"#
            ));
        }
        xml.push_str("</Relationships>");
        xml
    }
}

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Default Extension="png" ContentType="image/png"/><Default Extension="jpeg" ContentType="image/jpeg"/><Default Extension="gif" ContentType="image/gif"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/></Types>"#;

pub fn picture_run(rel_id: &str) -> String {
    format!(
        r#"<w:r><w:drawing><wp:inline><wp:extent cx="914400" cy="914400"/><a:graphic><a:graphicData uri="http://schemas.openxmlformats.org/drawingml/2006/picture"><pic:pic><pic:blipFill><a:blip r:embed="{rel_id}"/></pic:blipFill></pic:pic></a:graphicData></a:graphic></wp:inline></w:drawing></w:r>"#
    )
}

/// A drawing whose blip has no `r:embed`, like a shape with a linked fill.
pub fn linked_picture_run() -> String {
    r#"<w:r><w:drawing><wp:inline><a:graphic><a:graphicData><pic:pic><pic:blipFill><a:blip r:link="rId999"/></pic:blipFill></pic:pic></a:graphicData></a:graphic></wp:inline></w:drawing></w:r>"#.to_string()
}

/// A text box whose content holds another picture run.
pub fn text_box_run(rel_id: &str) -> String {
    format!(
        r#"<w:r><w:drawing><wp:anchor><a:graphic><a:graphicData><wps:wsp><wps:txbx><w:txbxContent><w:p>{}</w:p></w:txbxContent></wps:txbx></wps:wsp></a:graphicData></a:graphic></wp:anchor></w:drawing></w:r>"#,
        picture_run(rel_id)
    )
}

pub fn text_cell(text: &str) -> String {
    format!("<w:tc><w:p><w:r><w:t>{text}</w:t></w:r></w:p></w:tc>")
}

/// A text cell carrying `w:tcPr` children such as `<w:gridSpan w:val="2"/>`.
pub fn merged_cell(properties: &str, text: &str) -> String {
    let paragraph = if text.is_empty() {
        "<w:p/>".to_string()
    } else {
        format!("<w:p><w:r><w:t>{text}</w:t></w:r></w:p>")
    };
    format!("<w:tc><w:tcPr>{properties}</w:tcPr>{paragraph}</w:tc>")
}

pub fn empty_cell() -> String {
    "<w:tc><w:p/></w:tc>".to_string()
}

/// A cell with one paragraph per picture.
pub fn picture_cell(rel_ids: &[&str]) -> String {
    let paragraphs: String = rel_ids
        .iter()
        .map(|id| format!("<w:p>{}</w:p>", picture_run(id)))
        .collect();
    format!("<w:tc>{paragraphs}</w:tc>")
}

pub fn raw_cell(runs: &str) -> String {
    format!("<w:tc><w:p>{runs}</w:p></w:tc>")
}

pub fn png(tag: &str) -> Vec<u8> {
    let mut bytes = vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
    bytes.extend_from_slice(tag.as_bytes());
    bytes
}

pub fn file_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .filter_map(|e| e.ok())
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}
