#![allow(dead_code)]

use std::io::{Cursor, Write};

use docxide_walk::model::{
    BodyElement, BreakKind, HeaderFooterKind, HeaderFooterPart, HeaderFooterReference, Paragraph,
    PartType, PositionalTab, Run, RunContent, SectionProperties, TabStop, Table, TableCell,
    TableRow,
};
use docxide_walk::visitor::{AnchorPosition, CellPosition, DocumentVisitor, PictureEvent, RowPosition};
use docxide_walk::{Error, PartScope, Section};

#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    StartDocument,
    EndDocument,
    StartParagraph,
    EndParagraph,
    EmptyRun,
    Text(String),
    Hyperlink(String, String),
    Tab(Vec<f32>),
    LineBreak(BreakKind),
    PageBreak,
    Picture {
        embed_id: Option<String>,
        position: Option<AnchorPosition>,
        dimensions: Option<(u32, u32)>,
        scope: PartScope,
    },
    StartTable(Vec<f32>),
    EndTable,
    StartRow(RowPosition),
    EndRow,
    StartCell(CellPosition),
    EndCell,
    CreateMasterPage(usize),
    StartHeader(String, HeaderFooterKind),
    EndHeader(String),
    StartFooter(String, HeaderFooterKind),
    EndFooter(String),
    SetActiveMasterPage(usize),
}

/// Records every callback. Containers are nesting depths, checked on the way out.
#[derive(Default)]
pub struct Recorder {
    pub events: Vec<Event>,
    /// Fail the walk on the first text callback with this content.
    pub fail_on_text: Option<String>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Text and hyperlink text in callback order.
    pub fn texts(&self) -> Vec<String> {
        self.events
            .iter()
            .filter_map(|e| match e {
                Event::Text(t) | Event::Hyperlink(t, _) => Some(t.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, wanted: &Event) -> usize {
        self.events.iter().filter(|e| *e == wanted).count()
    }

    pub fn position(&self, wanted: &Event) -> Option<usize> {
        self.events.iter().position(|e| e == wanted)
    }

    /// Events with section activation and document framing removed.
    pub fn content(&self) -> Vec<Event> {
        self.events
            .iter()
            .filter(|e| {
                !matches!(
                    e,
                    Event::StartDocument
                        | Event::EndDocument
                        | Event::CreateMasterPage(_)
                        | Event::SetActiveMasterPage(_)
                )
            })
            .cloned()
            .collect()
    }
}

impl DocumentVisitor for Recorder {
    type Container = usize;
    type MasterPage = usize;
    type Error = Error;

    fn start_document(&mut self) -> Result<usize, Error> {
        self.events.push(Event::StartDocument);
        Ok(0)
    }

    fn end_document(&mut self, container: usize) -> Result<(), Error> {
        assert_eq!(container, 0);
        self.events.push(Event::EndDocument);
        Ok(())
    }

    fn start_paragraph(&mut self, _paragraph: &Paragraph, parent: &mut usize) -> Result<usize, Error> {
        self.events.push(Event::StartParagraph);
        Ok(*parent + 1)
    }

    fn end_paragraph(&mut self, _paragraph: &Paragraph, parent: &mut usize, container: usize) -> Result<(), Error> {
        assert_eq!(container, *parent + 1);
        self.events.push(Event::EndParagraph);
        Ok(())
    }

    fn empty_run(&mut self, _paragraph: &mut usize) -> Result<(), Error> {
        self.events.push(Event::EmptyRun);
        Ok(())
    }

    fn text(&mut self, text: &str, _run: &Run, _paragraph: &mut usize) -> Result<(), Error> {
        if self.fail_on_text.as_deref() == Some(text) {
            return Err(Error::InvalidDocx(format!("refusing {text}")));
        }
        self.events.push(Event::Text(text.to_string()));
        Ok(())
    }

    fn hyperlink(&mut self, text: &str, target: &str, _run: &Run, _paragraph: &mut usize) -> Result<(), Error> {
        self.events
            .push(Event::Hyperlink(text.to_string(), target.to_string()));
        Ok(())
    }

    fn tab(&mut self, tab_stops: &[TabStop], _run: &Run, _paragraph: &mut usize) -> Result<(), Error> {
        self.events
            .push(Event::Tab(tab_stops.iter().map(|t| t.position).collect()));
        Ok(())
    }

    fn line_break(&mut self, kind: BreakKind, _run: &Run, _paragraph: &mut usize) -> Result<(), Error> {
        self.events.push(Event::LineBreak(kind));
        Ok(())
    }

    fn page_break(&mut self) -> Result<(), Error> {
        self.events.push(Event::PageBreak);
        Ok(())
    }

    fn picture(&mut self, event: PictureEvent<'_>, _paragraph: &mut usize) -> Result<(), Error> {
        self.events.push(Event::Picture {
            embed_id: event.picture.embed_id.clone(),
            position: event.position,
            dimensions: event.data.as_ref().and_then(|d| d.dimensions),
            scope: event.scope.clone(),
        });
        Ok(())
    }

    fn start_table(&mut self, _table: &Table, col_widths: &[f32], parent: &mut usize) -> Result<usize, Error> {
        self.events.push(Event::StartTable(col_widths.to_vec()));
        Ok(*parent + 1)
    }

    fn end_table(&mut self, _table: &Table, parent: &mut usize, container: usize) -> Result<(), Error> {
        assert_eq!(container, *parent + 1);
        self.events.push(Event::EndTable);
        Ok(())
    }

    fn start_row(&mut self, _row: &TableRow, _table: &mut usize, position: RowPosition) -> Result<(), Error> {
        self.events.push(Event::StartRow(position));
        Ok(())
    }

    fn end_row(&mut self, _row: &TableRow, _table: &mut usize, _position: RowPosition) -> Result<(), Error> {
        self.events.push(Event::EndRow);
        Ok(())
    }

    fn start_cell(&mut self, _cell: &TableCell, table: &mut usize, position: CellPosition) -> Result<usize, Error> {
        self.events.push(Event::StartCell(position));
        Ok(*table + 1)
    }

    fn end_cell(&mut self, _cell: &TableCell, table: &mut usize, container: usize) -> Result<(), Error> {
        assert_eq!(container, *table + 1);
        self.events.push(Event::EndCell);
        Ok(())
    }

    fn create_master_page(&mut self, section: &Section) -> Result<usize, Error> {
        self.events.push(Event::CreateMasterPage(section.index));
        Ok(section.index)
    }

    fn start_header(
        &mut self,
        part: &HeaderFooterPart,
        reference: &HeaderFooterReference,
        section: &Section,
        master_page: &mut usize,
    ) -> Result<usize, Error> {
        assert_eq!(*master_page, section.index);
        self.events
            .push(Event::StartHeader(part.id.clone(), reference.kind));
        Ok(100)
    }

    fn end_header(&mut self, part: &HeaderFooterPart, _master_page: &mut usize, container: usize) -> Result<(), Error> {
        assert_eq!(container, 100);
        self.events.push(Event::EndHeader(part.id.clone()));
        Ok(())
    }

    fn start_footer(
        &mut self,
        part: &HeaderFooterPart,
        reference: &HeaderFooterReference,
        section: &Section,
        master_page: &mut usize,
    ) -> Result<usize, Error> {
        assert_eq!(*master_page, section.index);
        self.events
            .push(Event::StartFooter(part.id.clone(), reference.kind));
        Ok(200)
    }

    fn end_footer(&mut self, part: &HeaderFooterPart, _master_page: &mut usize, container: usize) -> Result<(), Error> {
        assert_eq!(container, 200);
        self.events.push(Event::EndFooter(part.id.clone()));
        Ok(())
    }

    fn set_active_master_page(&mut self, master_page: usize) -> Result<(), Error> {
        self.events.push(Event::SetActiveMasterPage(master_page));
        Ok(())
    }
}

// Model builders

pub fn text(s: &str) -> Event {
    Event::Text(s.to_string())
}

pub fn run(content: Vec<RunContent>) -> Run {
    Run::new(content)
}

pub fn para(runs: Vec<Run>) -> BodyElement {
    BodyElement::Paragraph(Paragraph::new(runs))
}

pub fn p(s: &str) -> BodyElement {
    para(vec![Run::text(s)])
}

pub fn empty_p() -> BodyElement {
    para(vec![])
}

pub fn ptab() -> RunContent {
    RunContent::PositionalTab(PositionalTab {
        alignment: docxide_walk::model::PositionalTabAlignment::Right,
        relative_to: docxide_walk::model::PositionalTabBase::Margin,
        leader: None,
    })
}

pub fn reference(part_type: PartType, kind: HeaderFooterKind, id: &str) -> HeaderFooterReference {
    HeaderFooterReference {
        part_type,
        kind,
        id: id.to_string(),
    }
}

pub fn header_ref(id: &str) -> HeaderFooterReference {
    reference(PartType::Header, HeaderFooterKind::Default, id)
}

pub fn footer_ref(id: &str) -> HeaderFooterReference {
    reference(PartType::Footer, HeaderFooterKind::Default, id)
}

pub fn props(references: Vec<HeaderFooterReference>) -> SectionProperties {
    SectionProperties {
        references,
        ..SectionProperties::default()
    }
}

/// A paragraph that ends a section.
pub fn section_end(s: &str, references: Vec<HeaderFooterReference>) -> BodyElement {
    BodyElement::Paragraph(Paragraph {
        runs: vec![Run::text(s)],
        section_properties: Some(props(references)),
        ..Paragraph::default()
    })
}

pub fn part(part_type: PartType, id: &str, body: Vec<BodyElement>) -> HeaderFooterPart {
    HeaderFooterPart {
        id: id.to_string(),
        part_type,
        body,
    }
}

pub fn cell(body: Vec<BodyElement>) -> TableCell {
    TableCell::new(body)
}

// DOCX packages

pub const W_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
pub const R_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

pub fn document_xml(body: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="{W_NS}" xmlns:r="{R_NS}"
  xmlns:wp="http://schemas.openxmlformats.org/drawingml/2006/wordprocessingDrawing"
  xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main"
  xmlns:pic="http://schemas.openxmlformats.org/drawingml/2006/picture"><w:body>{body}</w:body></w:document>"#
    )
}

pub fn part_xml(root: &str, body: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:{root} xmlns:w="{W_NS}" xmlns:r="{R_NS}"
  xmlns:wp="http://schemas.openxmlformats.org/drawingml/2006/wordprocessingDrawing"
  xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main"
  xmlns:pic="http://schemas.openxmlformats.org/drawingml/2006/picture">{body}</w:{root}>"#
    )
}

/// `(id, target)` pairs as a relationships part.
pub fn rels_xml(rels: &[(&str, &str)]) -> String {
    let entries: String = rels
        .iter()
        .map(|(id, target)| format!(r#"<Relationship Id="{id}" Type="t" Target="{target}"/>"#))
        .collect();
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">{entries}</Relationships>"#
    )
}

pub fn build_docx(files: &[(&str, Vec<u8>)]) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options = zip::write::SimpleFileOptions::default();
    for (name, data) in files {
        writer.start_file(*name, options).unwrap();
        writer.write_all(data).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

pub fn png(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbImage::new(width, height);
    let mut bytes = Vec::new();
    image::DynamicImage::ImageRgb8(img)
        .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
        .unwrap();
    bytes
}

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}
