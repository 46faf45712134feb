use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use crate::error::Error;
use crate::model::{
    BinaryPart, Block, Cell, Document, ImageRef, Paragraph, Row, Run, Table, VMerge,
};

const WML_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
const DML_NS: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";
const REL_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

const IMAGE_REL_SUFFIX: &str = "/image";

fn is_wml(node: roxmltree::Node, name: &str) -> bool {
    node.tag_name().name() == name && node.tag_name().namespace() == Some(WML_NS)
}

fn wml<'a>(node: roxmltree::Node<'a, 'a>, name: &str) -> Option<roxmltree::Node<'a, 'a>> {
    node.children().find(|n| is_wml(*n, name))
}

fn wml_attr<'a>(node: roxmltree::Node<'a, 'a>, child: &str) -> Option<&'a str> {
    wml(node, child).and_then(|n| n.attribute((WML_NS, "val")))
}

fn wml_children<'a>(
    node: roxmltree::Node<'a, 'a>,
    name: &'a str,
) -> impl Iterator<Item = roxmltree::Node<'a, 'a>> {
    node.children().filter(move |n| is_wml(*n, name))
}

fn read_zip_text(zip: &mut zip::ZipArchive<std::fs::File>, name: &str) -> Option<String> {
    let mut file = zip.by_name(name).ok()?;
    let mut content = String::new();
    file.read_to_string(&mut content).ok()?;
    Some(content)
}

struct ContentTypes {
    defaults: HashMap<String, String>,
    overrides: HashMap<String, String>,
}

impl ContentTypes {
    /// `part` is a package path without the leading slash.
    fn lookup(&self, part: &str) -> String {
        if let Some(ct) = self.overrides.get(&format!("/{part}")) {
            return ct.clone();
        }
        part.rsplit_once('.')
            .and_then(|(_, ext)| self.defaults.get(&ext.to_ascii_lowercase()))
            .cloned()
            .unwrap_or_default()
    }
}

fn parse_content_types(zip: &mut zip::ZipArchive<std::fs::File>) -> ContentTypes {
    let mut defaults = HashMap::new();
    let mut overrides = HashMap::new();

    let Some(xml_content) = read_zip_text(zip, "[Content_Types].xml") else {
        return ContentTypes { defaults, overrides };
    };
    let Ok(xml) = roxmltree::Document::parse(&xml_content) else {
        return ContentTypes { defaults, overrides };
    };

    for node in xml.root_element().children() {
        let Some(content_type) = node.attribute("ContentType") else {
            continue;
        };
        match node.tag_name().name() {
            "Default" => {
                if let Some(ext) = node.attribute("Extension") {
                    defaults.insert(ext.to_ascii_lowercase(), content_type.to_string());
                }
            }
            "Override" => {
                if let Some(part) = node.attribute("PartName") {
                    overrides.insert(part.to_string(), content_type.to_string());
                }
            }
            _ => {}
        }
    }

    ContentTypes { defaults, overrides }
}

/// Resolve a relationship target of `word/document.xml` to a package path.
fn part_path(target: &str) -> String {
    if let Some(absolute) = target.strip_prefix('/') {
        return absolute.to_string();
    }
    let mut segments: Vec<&str> = vec!["word"];
    for segment in target.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            s => segments.push(s),
        }
    }
    segments.join("/")
}

/// Load the image parts referenced from `word/_rels/document.xml.rels`.
/// External and missing targets are left out; references to them dangle.
fn parse_image_parts(
    zip: &mut zip::ZipArchive<std::fs::File>,
    content_types: &ContentTypes,
) -> HashMap<String, BinaryPart> {
    let mut parts = HashMap::new();
    let Some(xml_content) = read_zip_text(zip, "word/_rels/document.xml.rels") else {
        return parts;
    };
    let Ok(xml) = roxmltree::Document::parse(&xml_content) else {
        return parts;
    };

    for node in xml.root_element().children() {
        if node.tag_name().name() != "Relationship" {
            continue;
        }
        let (Some(id), Some(target)) = (node.attribute("Id"), node.attribute("Target")) else {
            continue;
        };
        if node.attribute("TargetMode") == Some("External") {
            log::debug!("Skipping external relationship {id} -> {target}");
            continue;
        }
        if !node
            .attribute("Type")
            .is_some_and(|t| t.ends_with(IMAGE_REL_SUFFIX))
        {
            continue;
        }

        let path = part_path(target);
        let Ok(mut entry) = zip.by_name(&path) else {
            log::warn!("Relationship {id} points at missing part {path}");
            continue;
        };
        let mut bytes = Vec::new();
        if let Err(e) = entry.read_to_end(&mut bytes) {
            log::warn!("Cannot read part {path}: {e}");
            continue;
        }
        let content_type = content_types.lookup(&path);
        parts.insert(id.to_string(), BinaryPart { bytes, content_type });
    }
    parts
}

/// Runs that belong to `para` itself, not to text boxes nested inside its runs.
fn top_level_runs<'a>(
    para: roxmltree::Node<'a, 'a>,
) -> impl Iterator<Item = roxmltree::Node<'a, 'a>> {
    para.descendants().filter(move |n| {
        is_wml(*n, "r")
            && n.ancestors()
                .skip(1)
                .take_while(|a| *a != para)
                .all(|a| !is_wml(a, "r") && !is_wml(a, "p"))
    })
}

fn parse_run(run_node: roxmltree::Node) -> Run {
    let mut text = String::new();
    for child in run_node.children() {
        if child.tag_name().namespace() != Some(WML_NS) {
            continue;
        }
        match child.tag_name().name() {
            "t" => text.push_str(child.text().unwrap_or_default()),
            "tab" => text.push('\t'),
            "br" | "cr" => text.push('\n'),
            _ => {}
        }
    }

    let images = run_node
        .descendants()
        .filter(|n| n.tag_name().name() == "blip" && n.tag_name().namespace() == Some(DML_NS))
        .map(|blip| ImageRef {
            embed: blip.attribute((REL_NS, "embed")).map(str::to_string),
        })
        .collect();

    Run { text, images }
}

fn parse_paragraph(para_node: roxmltree::Node) -> Paragraph {
    Paragraph {
        runs: top_level_runs(para_node).map(parse_run).collect(),
    }
}

fn wml_usize(node: roxmltree::Node, child: &str) -> Option<usize> {
    wml_attr(node, child).and_then(|v| v.parse::<usize>().ok())
}

fn parse_cell(tc: roxmltree::Node) -> Cell {
    let tc_pr = wml(tc, "tcPr");
    let grid_span = tc_pr.and_then(|n| wml_usize(n, "gridSpan")).unwrap_or(1);
    // w:vMerge without w:val continues the merge above
    let v_merge = match tc_pr.and_then(|n| wml(n, "vMerge")) {
        None => VMerge::None,
        Some(node) => match node.attribute((WML_NS, "val")) {
            Some("restart") => VMerge::Restart,
            _ => VMerge::Continue,
        },
    };
    Cell {
        paragraphs: wml_children(tc, "p").map(parse_paragraph).collect(),
        grid_span,
        v_merge,
    }
}

fn parse_table(tbl: roxmltree::Node, index: usize) -> Table {
    let rows = wml_children(tbl, "tr")
        .map(|tr| Row {
            grid_before: wml(tr, "trPr")
                .and_then(|n| wml_usize(n, "gridBefore"))
                .unwrap_or(0),
            cells: wml_children(tr, "tc").map(parse_cell).collect(),
        })
        .collect();
    Table { index, rows }
}

pub fn open(path: &Path) -> Result<Document, Error> {
    let file = std::fs::File::open(path)?;
    let mut zip = zip::ZipArchive::new(file)?;

    let content_types = parse_content_types(&mut zip);
    let parts = parse_image_parts(&mut zip, &content_types);

    let xml_content = read_zip_text(&mut zip, "word/document.xml")
        .ok_or_else(|| Error::InvalidDocx("missing word/document.xml".into()))?;
    let xml = roxmltree::Document::parse(&xml_content)?;
    let root = xml.root_element();

    let body = wml(root, "body").ok_or_else(|| Error::InvalidDocx("missing w:body".into()))?;

    let mut tables = Vec::new();
    let mut blocks = Vec::new();
    for node in body.children() {
        if is_wml(node, "tbl") {
            let index = tables.len();
            tables.push(parse_table(node, index));
            blocks.push(Block::Table(index));
        } else if is_wml(node, "p") {
            blocks.push(Block::Paragraph(parse_paragraph(node).text()));
        }
    }

    log::info!(
        "Parsed {}: {} tables, {} image parts",
        path.display(),
        tables.len(),
        parts.len()
    );

    Ok(Document { tables, blocks, parts })
}
