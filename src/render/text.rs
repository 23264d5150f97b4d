use crate::error::Error;
use crate::model::{
    BreakKind, HeaderFooterKind, HeaderFooterPart, HeaderFooterReference, Paragraph, Run,
    TabStop, Table, TableCell, TableRow,
};
use crate::visitor::{CellPosition, DocumentVisitor, PictureEvent, RowPosition};
use crate::walk::sections::Section;

const PAGE_BREAK: char = '\u{c}';

#[derive(Clone, Debug)]
pub struct TextOptions {
    /// Emit each section's headers before its content and its footers after it.
    pub include_headers_footers: bool,
    /// Placed between the cells of a table row.
    pub cell_separator: String,
    /// Append `<target>` after hyperlink text that differs from its target.
    pub show_hyperlink_targets: bool,
}

impl Default for TextOptions {
    fn default() -> Self {
        Self {
            include_headers_footers: true,
            cell_separator: "\t".to_string(),
            show_hyperlink_targets: true,
        }
    }
}

/// Header and footer text collected while a section is activated.
#[derive(Debug)]
pub struct TextMasterPage {
    section: usize,
    current_kind: HeaderFooterKind,
    headers: Vec<String>,
    footers: Vec<String>,
}

/// Plain-text rendering. Paragraphs end in `\n`, page breaks are form feeds,
/// table rows are one line each.
#[derive(Debug, Default)]
pub struct TextRenderer {
    options: TextOptions,
    pending_page_breaks: usize,
    pending_header: Option<String>,
    pending_footer: Option<String>,
    /// Inside a header/footer walk.
    in_part: bool,
    text: String,
}

/// `[header: first] line one / line two`, or nothing for a blank part.
fn part_text(label: &str, kind: HeaderFooterKind, container: &str) -> Option<String> {
    let text = container.trim_end();
    if text.is_empty() {
        return None;
    }
    Some(format!("[{label}: {}] {}\n", kind_label(kind), text.replace('\n', " / ")))
}

fn kind_label(kind: HeaderFooterKind) -> &'static str {
    match kind {
        HeaderFooterKind::Default => "default",
        HeaderFooterKind::First => "first",
        HeaderFooterKind::Even => "even",
    }
}

impl TextRenderer {
    pub fn new(options: TextOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    /// Text of the last completed walk.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn into_text(self) -> String {
        self.text
    }

    fn flush_page_breaks(&mut self, out: &mut String) {
        for _ in 0..std::mem::take(&mut self.pending_page_breaks) {
            out.push(PAGE_BREAK);
        }
    }

    fn flush_header(&mut self, out: &mut String) {
        if let Some(header) = self.pending_header.take() {
            out.push_str(&header);
        }
    }

    fn flush_footer(&mut self, out: &mut String) {
        if let Some(footer) = self.pending_footer.take() {
            out.push_str(&footer);
        }
    }
}

impl DocumentVisitor for TextRenderer {
    type Container = String;
    type MasterPage = TextMasterPage;
    type Error = Error;

    fn start_document(&mut self) -> Result<String, Error> {
        self.pending_page_breaks = 0;
        self.pending_header = None;
        self.pending_footer = None;
        self.in_part = false;
        self.text.clear();
        Ok(String::new())
    }

    fn end_document(&mut self, mut container: String) -> Result<(), Error> {
        self.flush_header(&mut container);
        self.flush_footer(&mut container);
        self.text = container;
        Ok(())
    }

    fn start_paragraph(&mut self, _paragraph: &Paragraph, parent: &mut String) -> Result<String, Error> {
        self.flush_page_breaks(parent);
        if !self.in_part {
            self.flush_header(parent);
        }
        Ok(String::new())
    }

    fn end_paragraph(
        &mut self,
        _paragraph: &Paragraph,
        parent: &mut String,
        container: String,
    ) -> Result<(), Error> {
        // page-break-before arrives after start_paragraph
        self.flush_page_breaks(parent);
        parent.push_str(&container);
        parent.push('\n');
        Ok(())
    }

    fn empty_run(&mut self, _paragraph: &mut String) -> Result<(), Error> {
        Ok(())
    }

    fn text(&mut self, text: &str, _run: &Run, paragraph: &mut String) -> Result<(), Error> {
        paragraph.push_str(text);
        Ok(())
    }

    fn hyperlink(
        &mut self,
        text: &str,
        target: &str,
        _run: &Run,
        paragraph: &mut String,
    ) -> Result<(), Error> {
        paragraph.push_str(text);
        if self.options.show_hyperlink_targets && text.trim() != target {
            paragraph.push_str(&format!(" <{target}>"));
        }
        Ok(())
    }

    fn tab(&mut self, _tab_stops: &[TabStop], _run: &Run, paragraph: &mut String) -> Result<(), Error> {
        paragraph.push('\t');
        Ok(())
    }

    fn line_break(&mut self, _kind: BreakKind, _run: &Run, paragraph: &mut String) -> Result<(), Error> {
        paragraph.push('\n');
        Ok(())
    }

    fn page_break(&mut self) -> Result<(), Error> {
        self.pending_page_breaks += 1;
        Ok(())
    }

    fn picture(&mut self, event: PictureEvent<'_>, paragraph: &mut String) -> Result<(), Error> {
        let name = event
            .picture
            .name
            .as_deref()
            .or(event.picture.embed_id.as_deref())
            .unwrap_or("picture");
        match event.data.as_ref().and_then(|d| d.dimensions) {
            Some((w, h)) => paragraph.push_str(&format!("[image: {name} {w}x{h}]")),
            None => paragraph.push_str(&format!("[image: {name}]")),
        }
        Ok(())
    }

    fn start_table(&mut self, _table: &Table, _col_widths: &[f32], parent: &mut String) -> Result<String, Error> {
        self.flush_page_breaks(parent);
        if !self.in_part {
            self.flush_header(parent);
        }
        Ok(String::new())
    }

    fn end_table(&mut self, _table: &Table, parent: &mut String, container: String) -> Result<(), Error> {
        parent.push_str(&container);
        Ok(())
    }

    fn end_row(&mut self, _row: &TableRow, table: &mut String, _position: RowPosition) -> Result<(), Error> {
        table.push('\n');
        Ok(())
    }

    fn start_cell(&mut self, _cell: &TableCell, table: &mut String, position: CellPosition) -> Result<String, Error> {
        if !position.first_col {
            table.push_str(&self.options.cell_separator);
        }
        Ok(String::new())
    }

    fn end_cell(&mut self, _cell: &TableCell, table: &mut String, container: String) -> Result<(), Error> {
        let text = container.trim_end_matches('\n').replace('\n', " ");
        table.push_str(&text);
        Ok(())
    }

    fn create_master_page(&mut self, section: &Section) -> Result<TextMasterPage, Error> {
        Ok(TextMasterPage {
            section: section.index,
            current_kind: HeaderFooterKind::Default,
            headers: Vec::new(),
            footers: Vec::new(),
        })
    }

    fn start_header(
        &mut self,
        _part: &HeaderFooterPart,
        reference: &HeaderFooterReference,
        _section: &Section,
        master_page: &mut TextMasterPage,
    ) -> Result<String, Error> {
        master_page.current_kind = reference.kind;
        self.in_part = true;
        Ok(String::new())
    }

    fn end_header(
        &mut self,
        _part: &HeaderFooterPart,
        master_page: &mut TextMasterPage,
        container: String,
    ) -> Result<(), Error> {
        let text = part_text("header", master_page.current_kind, &container);
        master_page.headers.extend(text);
        self.in_part = false;
        Ok(())
    }

    fn start_footer(
        &mut self,
        _part: &HeaderFooterPart,
        reference: &HeaderFooterReference,
        _section: &Section,
        master_page: &mut TextMasterPage,
    ) -> Result<String, Error> {
        master_page.current_kind = reference.kind;
        self.in_part = true;
        Ok(String::new())
    }

    fn end_footer(
        &mut self,
        _part: &HeaderFooterPart,
        master_page: &mut TextMasterPage,
        container: String,
    ) -> Result<(), Error> {
        let text = part_text("footer", master_page.current_kind, &container);
        master_page.footers.extend(text);
        self.in_part = false;
        Ok(())
    }

    fn set_active_master_page(&mut self, master_page: TextMasterPage) -> Result<(), Error> {
        if !self.options.include_headers_footers {
            return Ok(());
        }
        log::debug!(
            "Section {}: {} header(s), {} footer(s)",
            master_page.section,
            master_page.headers.len(),
            master_page.footers.len()
        );
        let mut block = self.pending_footer.take().unwrap_or_default();
        block.extend(master_page.headers);
        self.pending_header = Some(block).filter(|b| !b.is_empty());
        let footers: String = master_page.footers.concat();
        self.pending_footer = Some(footers).filter(|f| !f.is_empty());
        Ok(())
    }
}
