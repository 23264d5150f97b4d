//! Depth-first traversal of a document, driving a [`DocumentVisitor`].

pub mod content;
pub mod drawing;
pub mod sections;
pub mod table;

use std::collections::HashMap;
use std::rc::Rc;

use crate::error::Error;
use crate::model::{BodyElement, Drawing, HeaderFooterPart, HeaderFooterReference, Paragraph, Run, TabStop, Table};
use crate::source::{DocumentSource, PartScope};
use crate::visitor::{CellPosition, DocumentVisitor, PictureEvent, RowPosition};

use content::{FieldState, Unit};
use sections::{Section, SectionCursor};

/// Per-traversal state. Header/footer content is walked with a fresh state, so
/// it can neither detect section boundaries nor disturb the main body's pending
/// field instruction or page break.
struct WalkState<'s> {
    scope: PartScope,
    sections: Option<SectionCursor<'s>>,
    /// Nesting depth in table cells; sections only start at depth 0.
    depth: usize,
    fields: FieldState,
    page_break_on_next: bool,
}

impl<'s> WalkState<'s> {
    fn body(sections: &'s [Section]) -> Self {
        Self {
            scope: PartScope::Body,
            sections: Some(SectionCursor::new(sections)),
            depth: 0,
            fields: FieldState::default(),
            page_break_on_next: false,
        }
    }

    fn part(scope: PartScope) -> Self {
        Self {
            scope,
            sections: None,
            depth: 0,
            fields: FieldState::default(),
            page_break_on_next: false,
        }
    }
}

pub struct Walker<'a, S: DocumentSource + ?Sized> {
    source: &'a S,
    sections: &'a [Section],
    parts: HashMap<String, Rc<HeaderFooterPart>>,
}

impl<'a, S: DocumentSource + ?Sized> Walker<'a, S> {
    /// `sections` must come from [`sections::resolve_sections`] (or a
    /// [`sections::SectionResolver`]) over the same source.
    pub fn new(source: &'a S, sections: &'a [Section]) -> Self {
        Self {
            source,
            sections,
            parts: HashMap::new(),
        }
    }

    pub fn start<V: DocumentVisitor>(&mut self, visitor: &mut V) -> Result<(), V::Error> {
        let mut container = visitor.start_document()?;
        let mut state = WalkState::body(self.sections);
        let source = self.source;
        self.walk_body(source.body(), &mut container, &mut state, visitor)?;
        let unreached = state.sections.as_mut().map(|c| c.finish()).unwrap_or_default();
        for section in unreached {
            log::debug!("Section {} has no body content", section.index);
            self.activate_section(section, visitor)?;
        }
        if state.page_break_on_next {
            log::debug!("Dropping page break after the last paragraph");
        }
        visitor.end_document(container)
    }

    fn walk_body<V: DocumentVisitor>(
        &mut self,
        elements: &[BodyElement],
        container: &mut V::Container,
        state: &mut WalkState<'a>,
        visitor: &mut V,
    ) -> Result<(), V::Error> {
        for (i, element) in elements.iter().enumerate() {
            if state.depth == 0
                && let Some(section) = state.sections.as_mut().and_then(|c| c.enter(i))
            {
                self.activate_section(section, visitor)?;
            }
            match element {
                BodyElement::Paragraph(paragraph) => {
                    let is_last = i + 1 == elements.len();
                    self.walk_paragraph(paragraph, is_last, container, state, visitor)?
                }
                BodyElement::Table(table) => self.walk_table(table, container, state, visitor)?,
            }
        }
        Ok(())
    }

    fn activate_section<V: DocumentVisitor>(
        &mut self,
        section: &Section,
        visitor: &mut V,
    ) -> Result<(), V::Error> {
        log::debug!(
            "Activating section {} ({} header(s), {} footer(s))",
            section.index,
            section.headers.len(),
            section.footers.len()
        );
        let mut master_page = visitor.create_master_page(section)?;

        for reference in section.headers.values() {
            let part = self.load_part(reference)?;
            let mut container = visitor.start_header(&part, reference, section, &mut master_page)?;
            let mut state = WalkState::part(PartScope::for_reference(reference));
            self.walk_body(&part.body, &mut container, &mut state, visitor)?;
            visitor.end_header(&part, &mut master_page, container)?;
        }

        for reference in section.footers.values() {
            let part = self.load_part(reference)?;
            let mut container = visitor.start_footer(&part, reference, section, &mut master_page)?;
            let mut state = WalkState::part(PartScope::for_reference(reference));
            self.walk_body(&part.body, &mut container, &mut state, visitor)?;
            visitor.end_footer(&part, &mut master_page, container)?;
        }

        visitor.set_active_master_page(master_page)
    }

    fn load_part(&mut self, reference: &HeaderFooterReference) -> Result<Rc<HeaderFooterPart>, Error> {
        if let Some(part) = self.parts.get(&reference.id) {
            return Ok(Rc::clone(part));
        }
        log::debug!("Loading {} part {}", reference.part_type, reference.id);
        let part = Rc::new(self.source.load_part(reference)?);
        self.parts.insert(reference.id.clone(), Rc::clone(&part));
        Ok(part)
    }

    fn walk_paragraph<V: DocumentVisitor>(
        &mut self,
        paragraph: &Paragraph,
        is_last: bool,
        parent: &mut V::Container,
        state: &mut WalkState<'a>,
        visitor: &mut V,
    ) -> Result<(), V::Error> {
        state.fields.reset();
        if std::mem::take(&mut state.page_break_on_next) {
            visitor.page_break()?;
        }

        let mut container = visitor.start_paragraph(paragraph, parent)?;

        if paragraph.runs.is_empty() {
            // Trailing empty paragraphs add no artificial blank line.
            if !is_last {
                visitor.empty_run(&mut container)?;
            }
        } else {
            let mut tab_stops: Option<Vec<TabStop>> = None;
            for run in &paragraph.runs {
                self.walk_run(run, paragraph, &mut tab_stops, &mut container, state, visitor)?;
            }
        }
        // Reported once the content has been forwarded.
        if paragraph.page_break_before {
            visitor.page_break()?;
        }

        visitor.end_paragraph(paragraph, parent, container)?;
        state.fields.reset();
        Ok(())
    }

    fn walk_run<V: DocumentVisitor>(
        &mut self,
        run: &Run,
        paragraph: &Paragraph,
        tab_stops: &mut Option<Vec<TabStop>>,
        container: &mut V::Container,
        state: &mut WalkState<'a>,
        visitor: &mut V,
    ) -> Result<(), V::Error> {
        for item in &run.content {
            let Some(unit) = content::classify(item, run, &mut state.fields) else {
                continue;
            };
            match unit {
                Unit::Text(text) => visitor.text(text, run, container)?,
                Unit::Hyperlink { text, target } => visitor.hyperlink(text, &target, run, container)?,
                Unit::Tab => {
                    let stops = tab_stops.get_or_insert_with(|| self.source.paragraph_tab_stops(paragraph));
                    visitor.tab(stops, run, container)?
                }
                Unit::PositionalTab(tab) => visitor.positional_tab(tab, run, container)?,
                Unit::LineBreak(kind) => visitor.line_break(kind, run, container)?,
                Unit::PageBreak => state.page_break_on_next = true,
                Unit::Drawing(drawing) => self.walk_drawing(drawing, container, state, visitor)?,
            }
        }
        Ok(())
    }

    fn walk_drawing<V: DocumentVisitor>(
        &mut self,
        drawing: &Drawing,
        container: &mut V::Container,
        state: &WalkState<'a>,
        visitor: &mut V,
    ) -> Result<(), V::Error> {
        for (picture, position) in drawing::pictures(drawing) {
            let data = picture.embed_id.as_deref().and_then(|id| {
                let data = self.source.picture(&state.scope, id);
                if data.is_none() {
                    log::warn!("Picture {id} not found in {:?}", state.scope);
                }
                data
            });
            let event = PictureEvent {
                picture,
                data,
                position,
                scope: &state.scope,
            };
            visitor.picture(event, container)?;
        }
        Ok(())
    }

    fn walk_table<V: DocumentVisitor>(
        &mut self,
        table: &Table,
        parent: &mut V::Container,
        state: &mut WalkState<'a>,
        visitor: &mut V,
    ) -> Result<(), V::Error> {
        let col_widths = self.source.column_widths(table);
        let mut container = visitor.start_table(table, &col_widths, parent)?;

        let source = self.source;
        let row_count = table.rows.len();
        for (ri, row) in table.rows.iter().enumerate() {
            let row_position = RowPosition {
                first: ri == 0,
                last: ri + 1 == row_count,
            };
            visitor.start_row(row, &mut container, row_position)?;

            for cell in table::reconcile_row(row, col_widths.len(), |c| source.cell_grid_span(c)) {
                let position = CellPosition {
                    first_row: row_position.first,
                    last_row: row_position.last,
                    first_col: cell.first_col,
                    last_col: cell.last_col,
                };
                let mut cell_container = visitor.start_cell(cell.cell, &mut container, position)?;
                state.depth += 1;
                let walked = self.walk_body(&cell.cell.body, &mut cell_container, state, visitor);
                state.depth -= 1;
                walked?;
                visitor.end_cell(cell.cell, &mut container, cell_container)?;
            }

            visitor.end_row(row, &mut container, row_position)?;
        }

        visitor.end_table(table, parent, container)
    }
}
