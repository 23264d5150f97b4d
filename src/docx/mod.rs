mod body;
mod styles;

use std::cell::RefCell;
use std::collections::HashMap;
use std::io::{Cursor, Read, Seek};
use std::path::Path;
use std::rc::Rc;

use memmap2::Mmap;

use crate::error::{Error, Result};
use crate::model::{
    BodyElement, Document, HeaderFooterPart, HeaderFooterReference, ImageFormat, Paragraph,
    PartType, PictureData, SectionProperties, TabAlignment, TabStop,
};
use crate::source::{DocumentSource, PartScope, effective_tab_stops};

use styles::StylesInfo;

pub(super) const WML_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
pub(super) const DML_NS: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";
pub(super) const PIC_NS: &str = "http://schemas.openxmlformats.org/drawingml/2006/picture";
pub(super) const WPD_NS: &str = "http://schemas.openxmlformats.org/drawingml/2006/wordprocessingDrawing";
pub(super) const REL_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

const DOCUMENT_PART: &str = "word/document.xml";

type Relationships = HashMap<String, String>;

pub(super) fn twips_to_pts(twips: f32) -> f32 {
    twips / 20.0
}

/// Parse a WML boolean toggle element (e.g., w:pageBreakBefore, w:titlePg).
/// Present with no val or val != "0"/"false"/"off" means true.
pub(super) fn wml_bool(parent: roxmltree::Node, name: &str) -> Option<bool> {
    wml(parent, name).map(|n| {
        n.attribute((WML_NS, "val"))
            .is_none_or(|v| v != "0" && v != "false" && v != "off")
    })
}

pub(super) fn wml<'a>(node: roxmltree::Node<'a, 'a>, name: &str) -> Option<roxmltree::Node<'a, 'a>> {
    node.children()
        .find(|n| n.tag_name().name() == name && n.tag_name().namespace() == Some(WML_NS))
}

pub(super) fn wml_attr<'a>(node: roxmltree::Node<'a, 'a>, child: &str) -> Option<&'a str> {
    wml(node, child).and_then(|n| n.attribute((WML_NS, "val")))
}

pub(super) fn twips_attr(node: roxmltree::Node, attr: &str) -> Option<f32> {
    node.attribute((WML_NS, attr))
        .and_then(|v| v.parse::<f32>().ok())
        .map(twips_to_pts)
}

pub(super) fn is_wml(node: roxmltree::Node, name: &str) -> bool {
    node.tag_name().name() == name && node.tag_name().namespace() == Some(WML_NS)
}

/// Tab stops declared in a `w:pPr`, clears included, sorted by position.
pub(super) fn parse_tab_stops(ppr: roxmltree::Node) -> Vec<TabStop> {
    let Some(tabs) = wml(ppr, "tabs") else {
        return vec![];
    };
    let mut stops: Vec<TabStop> = tabs
        .children()
        .filter(|n| is_wml(*n, "tab"))
        .filter_map(|n| {
            let position = twips_attr(n, "pos")?;
            let alignment = match n.attribute((WML_NS, "val")).unwrap_or("left") {
                "center" => TabAlignment::Center,
                "right" | "end" => TabAlignment::Right,
                "decimal" => TabAlignment::Decimal,
                "bar" => TabAlignment::Bar,
                "clear" => TabAlignment::Clear,
                _ => TabAlignment::Left,
            };
            let leader = n.attribute((WML_NS, "leader")).and_then(parse_leader);
            Some(TabStop {
                position,
                alignment,
                leader,
            })
        })
        .collect();
    stops.sort_by(|a, b| a.position.total_cmp(&b.position));
    stops
}

pub(super) fn parse_leader(val: &str) -> Option<char> {
    match val {
        "dot" => Some('.'),
        "hyphen" => Some('-'),
        "underscore" | "heavy" => Some('_'),
        "middleDot" => Some('\u{b7}'),
        _ => None,
    }
}

pub(super) fn read_zip_text<R: Read + Seek>(zip: &mut zip::ZipArchive<R>, name: &str) -> Option<String> {
    let mut content = String::new();
    zip.by_name(name).ok()?.read_to_string(&mut content).ok()?;
    Some(content)
}

fn read_zip_bytes<R: Read + Seek>(zip: &mut zip::ZipArchive<R>, name: &str) -> Option<Vec<u8>> {
    let mut data = Vec::new();
    zip.by_name(name).ok()?.read_to_end(&mut data).ok()?;
    Some(data)
}

fn parse_rels_xml(xml_content: &str) -> Relationships {
    let mut rels = HashMap::new();
    let Ok(xml) = roxmltree::Document::parse(xml_content) else {
        return rels;
    };
    for node in xml.root_element().children() {
        if node.tag_name().name() == "Relationship"
            && let (Some(id), Some(target)) = (node.attribute("Id"), node.attribute("Target"))
        {
            rels.insert(id.to_string(), target.to_string());
        }
    }
    rels
}

/// Load relationships for a part like "word/header1.xml" → "word/_rels/header1.xml.rels"
fn parse_part_relationships<R: Read + Seek>(
    zip: &mut zip::ZipArchive<R>,
    part_path: &str,
) -> Relationships {
    let (dir, file) = match part_path.rsplit_once('/') {
        Some((d, f)) => (d, f),
        None => ("", part_path),
    };
    let rels_path = if dir.is_empty() {
        format!("_rels/{}.rels", file)
    } else {
        format!("{}/_rels/{}.rels", dir, file)
    };
    let Some(xml_content) = read_zip_text(zip, &rels_path) else {
        return HashMap::new();
    };
    parse_rels_xml(&xml_content)
}

/// Resolve a relationship target against the directory of the part that owns it.
fn resolve_target(part_path: &str, target: &str) -> String {
    if let Some(absolute) = target.strip_prefix('/') {
        return absolute.to_string();
    }
    let dir = part_path.rsplit_once('/').map(|(d, _)| d).unwrap_or("");
    let mut segments: Vec<&str> = dir.split('/').filter(|s| !s.is_empty()).collect();
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

fn picture_format(data: &[u8]) -> ImageFormat {
    match image::guess_format(data) {
        Ok(image::ImageFormat::Png) => ImageFormat::Png,
        Ok(image::ImageFormat::Jpeg) => ImageFormat::Jpeg,
        Ok(image::ImageFormat::Gif) => ImageFormat::Gif,
        Ok(image::ImageFormat::Bmp) => ImageFormat::Bmp,
        _ => ImageFormat::Other,
    }
}

fn picture_dimensions(data: &[u8]) -> Option<(u32, u32)> {
    image::ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .ok()?
        .into_dimensions()
        .ok()
}

enum PackageBytes {
    Mapped(Mmap),
    Owned(Vec<u8>),
}

impl AsRef<[u8]> for PackageBytes {
    fn as_ref(&self) -> &[u8] {
        match self {
            PackageBytes::Mapped(map) => &map[..],
            PackageBytes::Owned(bytes) => &bytes[..],
        }
    }
}

type Archive = zip::ZipArchive<Cursor<PackageBytes>>;

/// A `.docx` package. The main document is parsed up front; header/footer parts
/// and pictures are read from the archive on demand.
pub struct DocxPackage {
    document: Document,
    archive: RefCell<Archive>,
    rels: Relationships,
    styles: StylesInfo,
    part_rels: RefCell<HashMap<String, Rc<Relationships>>>,
    pictures: RefCell<HashMap<(PartScope, String), Option<Rc<PictureData>>>>,
}

impl DocxPackage {
    pub fn open(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound | std::io::ErrorKind::PermissionDenied => Error::Io(
                std::io::Error::new(e.kind(), format!("{}: {}", e, path.display())),
            ),
            _ => Error::Io(e),
        })?;
        // SAFETY: the mapping is read-only and lives as long as the package.
        let map = unsafe { Mmap::map(&file) }?;
        Self::from_package(PackageBytes::Mapped(map))
    }

    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
        Self::from_package(PackageBytes::Owned(bytes))
    }

    fn from_package(bytes: PackageBytes) -> Result<Self> {
        let mut zip = zip::ZipArchive::new(Cursor::new(bytes))
            .map_err(|_| Error::InvalidDocx("file is not a ZIP archive".into()))?;

        let rels = parse_part_relationships(&mut zip, DOCUMENT_PART);
        let styles = styles::parse_styles(&mut zip);

        let xml_content = read_zip_text(&mut zip, DOCUMENT_PART).ok_or_else(|| {
            Error::InvalidDocx("missing word/document.xml (is this a DOCX file?)".into())
        })?;
        let xml = roxmltree::Document::parse(&xml_content)?;
        let root = xml.root_element();
        let body = wml(root, "body").ok_or_else(|| Error::InvalidDocx("missing w:body".into()))?;

        let document = Document {
            body: body::parse_blocks(body, &rels),
            section_properties: wml(body, "sectPr").map(body::parse_section_properties),
        };
        log::debug!(
            "Parsed {} body element(s), {} relationship(s), {} paragraph style(s)",
            document.body.len(),
            rels.len(),
            styles.paragraph_style_count()
        );

        Ok(Self {
            document,
            archive: RefCell::new(zip),
            rels,
            styles,
            part_rels: RefCell::new(HashMap::new()),
            pictures: RefCell::new(HashMap::new()),
        })
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    fn part_path(&self, id: &str) -> Option<String> {
        self.rels.get(id).map(|t| resolve_target(DOCUMENT_PART, t))
    }

    fn part_relationships(&self, part_path: &str) -> Rc<Relationships> {
        if let Some(rels) = self.part_rels.borrow().get(part_path) {
            return Rc::clone(rels);
        }
        let rels = Rc::new(parse_part_relationships(
            &mut *self.archive.borrow_mut(),
            part_path,
        ));
        self.part_rels
            .borrow_mut()
            .insert(part_path.to_string(), Rc::clone(&rels));
        rels
    }

    fn read_picture(&self, scope: &PartScope, embed_id: &str) -> Option<PictureData> {
        let (owner, target) = match scope.part_id() {
            None => (DOCUMENT_PART.to_string(), self.rels.get(embed_id)?.clone()),
            Some(part_id) => {
                let owner = self.part_path(part_id)?;
                let target = self.part_relationships(&owner).get(embed_id)?.clone();
                (owner, target)
            }
        };
        let path = resolve_target(&owner, &target);
        let data = read_zip_bytes(&mut *self.archive.borrow_mut(), &path)?;
        let format = picture_format(&data);
        let dimensions = picture_dimensions(&data);
        if dimensions.is_none() {
            log::debug!("Could not read dimensions of {path}");
        }
        Some(PictureData {
            path,
            data,
            format,
            dimensions,
        })
    }
}

impl DocumentSource for DocxPackage {
    fn body(&self) -> &[BodyElement] {
        &self.document.body
    }

    fn final_section(&self) -> Option<&SectionProperties> {
        self.document.section_properties.as_ref()
    }

    fn load_part(&self, reference: &HeaderFooterReference) -> Result<HeaderFooterPart> {
        let part_type = reference.part_type;
        let id = reference.id.as_str();
        let path = self
            .part_path(id)
            .ok_or_else(|| Error::malformed(part_type, id, "no relationship with this id"))?;

        let xml_content = read_zip_text(&mut *self.archive.borrow_mut(), &path)
            .ok_or_else(|| Error::malformed(part_type, id, format!("{path} is missing from the package")))?;
        let xml = roxmltree::Document::parse(&xml_content)
            .map_err(|e| Error::malformed(part_type, id, format!("{path}: {e}")))?;

        let root = xml.root_element();
        let expected = match part_type {
            PartType::Header => "hdr",
            PartType::Footer => "ftr",
        };
        if !is_wml(root, expected) {
            return Err(Error::malformed(
                part_type,
                id,
                format!("{path} has root element {}", root.tag_name().name()),
            ));
        }

        let rels = self.part_relationships(&path);
        Ok(HeaderFooterPart {
            id: id.to_string(),
            part_type,
            body: body::parse_blocks(root, &rels),
        })
    }

    fn picture(&self, scope: &PartScope, embed_id: &str) -> Option<Rc<PictureData>> {
        let key = (scope.clone(), embed_id.to_string());
        if let Some(cached) = self.pictures.borrow().get(&key) {
            return cached.clone();
        }
        let picture = self.read_picture(scope, embed_id).map(Rc::new);
        self.pictures.borrow_mut().insert(key, picture.clone());
        picture
    }

    fn paragraph_tab_stops(&self, paragraph: &Paragraph) -> Vec<TabStop> {
        let inherited = self.styles.tab_stops(paragraph.style_id.as_deref());
        effective_tab_stops(&inherited, &paragraph.tab_stops)
    }
}
