//! The callback surface a renderer implements.
//!
//! The walker owns traversal order; a visitor only decides what to emit. Every
//! `start_*` callback returns a new container that is threaded to the node's
//! children and handed back to the matching `end_*` callback together with the
//! parent container.

use std::rc::Rc;

use crate::error::Error;
use crate::model::{
    BreakKind, HeaderFooterPart, HeaderFooterReference, Paragraph, PictureData, PictureRef,
    PositionalTab, RelativeFromH, RelativeFromV, Run, TabStop, Table, TableCell, TableRow,
};
use crate::source::PartScope;
use crate::walk::sections::Section;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RowPosition {
    pub first: bool,
    pub last: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CellPosition {
    pub first_row: bool,
    pub last_row: bool,
    pub first_col: bool,
    pub last_col: bool,
}

/// Position of an anchored graphic. Offsets are in points; `None` means the
/// document gave no offset (missing block, or alignment instead of an offset).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct AnchorPosition {
    pub offset_x: Option<f32>,
    pub relative_from_h: Option<RelativeFromH>,
    pub offset_y: Option<f32>,
    pub relative_from_v: Option<RelativeFromV>,
}

pub struct PictureEvent<'a> {
    pub picture: &'a PictureRef,
    /// Payload resolved in `scope`, if the embed id points at one.
    pub data: Option<Rc<PictureData>>,
    /// `None` for inline pictures.
    pub position: Option<AnchorPosition>,
    pub scope: &'a PartScope,
}

pub trait DocumentVisitor {
    type Container;
    type MasterPage;
    type Error: From<Error>;

    fn start_document(&mut self) -> Result<Self::Container, Self::Error>;

    fn end_document(&mut self, container: Self::Container) -> Result<(), Self::Error>;

    fn start_paragraph(
        &mut self,
        paragraph: &Paragraph,
        parent: &mut Self::Container,
    ) -> Result<Self::Container, Self::Error>;

    fn end_paragraph(
        &mut self,
        paragraph: &Paragraph,
        parent: &mut Self::Container,
        container: Self::Container,
    ) -> Result<(), Self::Error>;

    /// A paragraph without runs that is followed by more content.
    fn empty_run(&mut self, paragraph: &mut Self::Container) -> Result<(), Self::Error>;

    fn text(
        &mut self,
        text: &str,
        run: &Run,
        paragraph: &mut Self::Container,
    ) -> Result<(), Self::Error>;

    fn hyperlink(
        &mut self,
        text: &str,
        target: &str,
        run: &Run,
        paragraph: &mut Self::Container,
    ) -> Result<(), Self::Error>;

    /// `tab_stops` are the paragraph's effective stops, sorted by position.
    fn tab(
        &mut self,
        tab_stops: &[TabStop],
        run: &Run,
        paragraph: &mut Self::Container,
    ) -> Result<(), Self::Error>;

    /// Defaults to a plain tab with no stops.
    fn positional_tab(
        &mut self,
        tab: &PositionalTab,
        run: &Run,
        paragraph: &mut Self::Container,
    ) -> Result<(), Self::Error> {
        let _ = tab;
        self.tab(&[], run, paragraph)
    }

    /// Line and column breaks. Page breaks are reported through `page_break`.
    fn line_break(
        &mut self,
        kind: BreakKind,
        run: &Run,
        paragraph: &mut Self::Container,
    ) -> Result<(), Self::Error>;

    fn page_break(&mut self) -> Result<(), Self::Error>;

    fn picture(
        &mut self,
        event: PictureEvent<'_>,
        paragraph: &mut Self::Container,
    ) -> Result<(), Self::Error>;

    fn start_table(
        &mut self,
        table: &Table,
        col_widths: &[f32],
        parent: &mut Self::Container,
    ) -> Result<Self::Container, Self::Error>;

    fn end_table(
        &mut self,
        table: &Table,
        parent: &mut Self::Container,
        container: Self::Container,
    ) -> Result<(), Self::Error>;

    /// No-op by default.
    fn start_row(
        &mut self,
        row: &TableRow,
        table: &mut Self::Container,
        position: RowPosition,
    ) -> Result<(), Self::Error> {
        let _ = (row, table, position);
        Ok(())
    }

    /// No-op by default.
    fn end_row(
        &mut self,
        row: &TableRow,
        table: &mut Self::Container,
        position: RowPosition,
    ) -> Result<(), Self::Error> {
        let _ = (row, table, position);
        Ok(())
    }

    fn start_cell(
        &mut self,
        cell: &TableCell,
        table: &mut Self::Container,
        position: CellPosition,
    ) -> Result<Self::Container, Self::Error>;

    fn end_cell(
        &mut self,
        cell: &TableCell,
        table: &mut Self::Container,
        container: Self::Container,
    ) -> Result<(), Self::Error>;

    fn create_master_page(&mut self, section: &Section) -> Result<Self::MasterPage, Self::Error>;

    fn start_header(
        &mut self,
        part: &HeaderFooterPart,
        reference: &HeaderFooterReference,
        section: &Section,
        master_page: &mut Self::MasterPage,
    ) -> Result<Self::Container, Self::Error>;

    fn end_header(
        &mut self,
        part: &HeaderFooterPart,
        master_page: &mut Self::MasterPage,
        container: Self::Container,
    ) -> Result<(), Self::Error>;

    fn start_footer(
        &mut self,
        part: &HeaderFooterPart,
        reference: &HeaderFooterReference,
        section: &Section,
        master_page: &mut Self::MasterPage,
    ) -> Result<Self::Container, Self::Error>;

    fn end_footer(
        &mut self,
        part: &HeaderFooterPart,
        master_page: &mut Self::MasterPage,
        container: Self::Container,
    ) -> Result<(), Self::Error>;

    fn set_active_master_page(&mut self, master_page: Self::MasterPage) -> Result<(), Self::Error>;
}
