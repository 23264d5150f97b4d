//! The document-model provider contract consumed by the walker.

use std::collections::HashMap;
use std::rc::Rc;

use crate::error::{Error, Result};
use crate::model::{
    BodyElement, Document, HeaderFooterPart, HeaderFooterReference, Paragraph, PartType,
    PictureData, SectionProperties, TabAlignment, TabStop, Table, TableCell,
};
use crate::walk::table;

/// Which part of the package content is being walked. Picture ids are only
/// meaningful within one part.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum PartScope {
    Body,
    Header(String),
    Footer(String),
}

impl PartScope {
    pub fn for_reference(reference: &HeaderFooterReference) -> Self {
        match reference.part_type {
            PartType::Header => PartScope::Header(reference.id.clone()),
            PartType::Footer => PartScope::Footer(reference.id.clone()),
        }
    }

    pub fn part_id(&self) -> Option<&str> {
        match self {
            PartScope::Body => None,
            PartScope::Header(id) | PartScope::Footer(id) => Some(id),
        }
    }
}

pub trait DocumentSource {
    fn body(&self) -> &[BodyElement];

    /// Body-level section properties (the last section of the document).
    fn final_section(&self) -> Option<&SectionProperties>;

    /// Load the side document a header/footer reference points at. May block on I/O;
    /// the walker calls it at most once per part id.
    fn load_part(&self, reference: &HeaderFooterReference) -> Result<HeaderFooterPart>;

    fn picture(&self, scope: &PartScope, embed_id: &str) -> Option<Rc<PictureData>>;

    fn column_widths(&self, table: &Table) -> Vec<f32> {
        table::column_widths(table)
    }

    fn paragraph_tab_stops(&self, paragraph: &Paragraph) -> Vec<TabStop> {
        effective_tab_stops(&[], &paragraph.tab_stops)
    }

    fn cell_grid_span(&self, cell: &TableCell) -> Option<u32> {
        cell.grid_span
    }
}

/// Apply `overrides` on top of `inherited`: a stop at an existing position replaces it,
/// a clear removes it. Result is sorted by position.
pub fn effective_tab_stops(inherited: &[TabStop], overrides: &[TabStop]) -> Vec<TabStop> {
    let mut stops: Vec<TabStop> = inherited
        .iter()
        .filter(|t| t.alignment != TabAlignment::Clear)
        .cloned()
        .collect();
    for stop in overrides {
        stops.retain(|t| (t.position - stop.position).abs() > 0.05);
        if stop.alignment != TabAlignment::Clear {
            stops.push(stop.clone());
        }
    }
    stops.sort_by(|a, b| a.position.total_cmp(&b.position));
    stops
}

/// A fully materialized document held in memory.
#[derive(Default)]
pub struct MemorySource {
    pub document: Document,
    pub parts: HashMap<String, HeaderFooterPart>,
    pub pictures: HashMap<(PartScope, String), Rc<PictureData>>,
}

impl MemorySource {
    pub fn new(document: Document) -> Self {
        Self {
            document,
            ..Self::default()
        }
    }

    pub fn with_part(mut self, part: HeaderFooterPart) -> Self {
        self.parts.insert(part.id.clone(), part);
        self
    }

    pub fn with_picture(mut self, scope: PartScope, embed_id: &str, picture: PictureData) -> Self {
        self.pictures
            .insert((scope, embed_id.to_string()), Rc::new(picture));
        self
    }
}

impl DocumentSource for MemorySource {
    fn body(&self) -> &[BodyElement] {
        &self.document.body
    }

    fn final_section(&self) -> Option<&SectionProperties> {
        self.document.section_properties.as_ref()
    }

    fn load_part(&self, reference: &HeaderFooterReference) -> Result<HeaderFooterPart> {
        let part = self.parts.get(&reference.id).ok_or_else(|| {
            Error::malformed(reference.part_type, &reference.id, "no such part")
        })?;
        if part.part_type != reference.part_type {
            return Err(Error::malformed(
                reference.part_type,
                &reference.id,
                format!("part is a {}", part.part_type),
            ));
        }
        Ok(part.clone())
    }

    fn picture(&self, scope: &PartScope, embed_id: &str) -> Option<Rc<PictureData>> {
        self.pictures
            .get(&(scope.clone(), embed_id.to_string()))
            .cloned()
    }
}
