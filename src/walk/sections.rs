use std::collections::BTreeMap;

use crate::model::{
    BodyElement, HeaderFooterKind, HeaderFooterReference, PartType, SectionProperties,
};

#[derive(Clone, Debug, PartialEq)]
pub struct Section {
    pub index: usize,
    /// First top-level body element covered by this section.
    pub start: usize,
    /// Paragraph carrying the section's properties; `None` for the body-level section.
    pub boundary: Option<usize>,
    pub properties: SectionProperties,
    pub headers: BTreeMap<HeaderFooterKind, HeaderFooterReference>,
    pub footers: BTreeMap<HeaderFooterKind, HeaderFooterReference>,
}

impl Section {
    pub fn header(&self, kind: HeaderFooterKind) -> Option<&HeaderFooterReference> {
        self.headers.get(&kind)
    }

    pub fn footer(&self, kind: HeaderFooterKind) -> Option<&HeaderFooterReference> {
        self.footers.get(&kind)
    }
}

/// Builds the ordered section list of the main body once.
#[derive(Debug, Default)]
pub struct SectionResolver {
    sections: Option<Vec<Section>>,
}

impl SectionResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_initialized(&self) -> bool {
        self.sections.is_some()
    }

    /// Scan the body for section boundaries. Calling it again is a no-op.
    pub fn initialize(
        &mut self,
        body: &[BodyElement],
        final_properties: Option<&SectionProperties>,
    ) -> &[Section] {
        self.sections
            .get_or_insert_with(|| resolve_sections(body, final_properties))
    }

    pub fn sections(&self) -> &[Section] {
        self.sections.as_deref().unwrap_or(&[])
    }
}

pub fn resolve_sections(
    body: &[BodyElement],
    final_properties: Option<&SectionProperties>,
) -> Vec<Section> {
    let mut sections: Vec<Section> = Vec::new();
    let mut start = 0usize;

    for (i, element) in body.iter().enumerate() {
        let BodyElement::Paragraph(paragraph) = element else {
            continue;
        };
        let Some(props) = &paragraph.section_properties else {
            continue;
        };
        let section = build_section(sections.last(), sections.len(), start, Some(i), props);
        sections.push(section);
        start = i + 1;
    }

    let trailing = final_properties.cloned().unwrap_or_default();
    let section = build_section(sections.last(), sections.len(), start, None, &trailing);
    sections.push(section);

    log::debug!("Resolved {} section(s)", sections.len());
    sections
}

fn build_section(
    previous: Option<&Section>,
    index: usize,
    start: usize,
    boundary: Option<usize>,
    props: &SectionProperties,
) -> Section {
    let mut headers = previous.map(|s| s.headers.clone()).unwrap_or_default();
    let mut footers = previous.map(|s| s.footers.clone()).unwrap_or_default();
    for reference in &props.references {
        let map = match reference.part_type {
            PartType::Header => &mut headers,
            PartType::Footer => &mut footers,
        };
        map.insert(reference.kind, reference.clone());
    }
    Section {
        index,
        start,
        boundary,
        properties: props.clone(),
        headers,
        footers,
    }
}

/// Tracks which section is next to become active during a main-body walk.
#[derive(Debug)]
pub(crate) struct SectionCursor<'s> {
    sections: &'s [Section],
    next: usize,
}

impl<'s> SectionCursor<'s> {
    pub(crate) fn new(sections: &'s [Section]) -> Self {
        Self { sections, next: 0 }
    }

    /// The section that starts at top-level element `index`, if it has not been activated yet.
    pub(crate) fn enter(&mut self, index: usize) -> Option<&'s Section> {
        let section = self.sections.get(self.next)?;
        if section.start > index {
            return None;
        }
        self.next += 1;
        Some(section)
    }

    /// Sections never reached by the walk: the body-level section after a trailing
    /// section-ending paragraph, or every section of an empty body.
    pub(crate) fn finish(&mut self) -> &'s [Section] {
        let rest = self.sections.get(self.next..).unwrap_or(&[]);
        self.next = self.sections.len();
        rest
    }
}
