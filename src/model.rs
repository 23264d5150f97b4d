use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TabAlignment {
    Left,
    Center,
    Right,
    Decimal,
    Bar,
    /// Removes an inherited stop at the same position.
    Clear,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TabStop {
    pub position: f32, // points
    pub alignment: TabAlignment,
    pub leader: Option<char>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PositionalTabAlignment {
    Left,
    Center,
    Right,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PositionalTabBase {
    Margin,
    Indent,
}

/// `w:ptab`: an absolute tab that ignores the paragraph's tab stops.
#[derive(Clone, Debug, PartialEq)]
pub struct PositionalTab {
    pub alignment: PositionalTabAlignment,
    pub relative_to: PositionalTabBase,
    pub leader: Option<char>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BreakKind {
    Line,
    Page,
    Column,
}

#[derive(Clone, Debug, PartialEq)]
pub enum RunContent {
    Text(String),
    /// Raw field code (`w:instrText`), never rendered directly.
    FieldInstruction(String),
    Tab,
    PositionalTab(PositionalTab),
    Break(BreakKind),
    Drawing(Drawing),
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Run {
    pub content: Vec<RunContent>,
    /// Target of an enclosing `w:hyperlink`, already resolved through relationships.
    pub hyperlink: Option<String>,
}

impl Run {
    pub fn new(content: Vec<RunContent>) -> Self {
        Self {
            content,
            hyperlink: None,
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self::new(vec![RunContent::Text(text.into())])
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Paragraph {
    pub style_id: Option<String>,
    pub runs: Vec<Run>,
    /// Tab stops declared directly on the paragraph (clears included).
    pub tab_stops: Vec<TabStop>,
    pub page_break_before: bool,
    /// Present only on the paragraph that ends a section.
    pub section_properties: Option<SectionProperties>,
}

impl Paragraph {
    pub fn new(runs: Vec<Run>) -> Self {
        Self {
            runs,
            ..Self::default()
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PartType {
    Header,
    Footer,
}

impl fmt::Display for PartType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PartType::Header => f.write_str("header"),
            PartType::Footer => f.write_str("footer"),
        }
    }
}

/// Which pages of a section a header/footer applies to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum HeaderFooterKind {
    Default,
    First,
    Even,
}

impl HeaderFooterKind {
    pub fn parse(val: &str) -> Option<Self> {
        match val {
            "default" => Some(HeaderFooterKind::Default),
            "first" => Some(HeaderFooterKind::First),
            "even" => Some(HeaderFooterKind::Even),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct HeaderFooterReference {
    pub part_type: PartType,
    pub kind: HeaderFooterKind,
    /// Relationship id of the referenced part.
    pub id: String,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SectionBreakType {
    NextPage,
    Continuous,
    OddPage,
    EvenPage,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PageSize {
    pub width: f32,  // points
    pub height: f32, // points
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PageMargins {
    pub top: f32,
    pub bottom: f32,
    pub left: f32,
    pub right: f32,
    pub header: f32,
    pub footer: f32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SectionProperties {
    pub references: Vec<HeaderFooterReference>,
    pub page_size: Option<PageSize>,
    pub margins: Option<PageMargins>,
    pub title_page: bool,
    pub break_type: SectionBreakType,
}

impl Default for SectionProperties {
    fn default() -> Self {
        Self {
            references: Vec::new(),
            page_size: None,
            margins: None,
            title_page: false,
            break_type: SectionBreakType::NextPage,
        }
    }
}

impl SectionProperties {
    pub fn reference(&self, part_type: PartType, kind: HeaderFooterKind) -> Option<&HeaderFooterReference> {
        self.references
            .iter()
            .find(|r| r.part_type == part_type && r.kind == kind)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum VMerge {
    Restart,
    Continue,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct TableCell {
    pub width: Option<f32>, // points
    pub grid_span: Option<u32>,
    pub v_merge: Option<VMerge>,
    pub body: Vec<BodyElement>,
}

impl TableCell {
    pub fn new(body: Vec<BodyElement>) -> Self {
        Self {
            body,
            ..Self::default()
        }
    }
}

/// A raw child of `w:tr` that carries cells.
#[derive(Clone, Debug, PartialEq)]
pub enum RowChild {
    Cell(TableCell),
    /// Cells wrapped in a structured-content tag (`w:sdt/w:sdtContent/w:tc`).
    StructuredContent(Vec<TableCell>),
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct TableRow {
    pub children: Vec<RowChild>,
    pub height: Option<f32>,
}

impl TableRow {
    /// Direct cells only; cells inside structured-content wrappers are not enumerated.
    pub fn cells(&self) -> impl Iterator<Item = &TableCell> {
        self.children.iter().filter_map(|child| match child {
            RowChild::Cell(cell) => Some(cell),
            RowChild::StructuredContent(_) => None,
        })
    }

    /// Every cell in document order, wrapped or not.
    pub fn all_cells(&self) -> impl Iterator<Item = &TableCell> {
        self.children.iter().flat_map(|child| match child {
            RowChild::Cell(cell) => std::slice::from_ref(cell).iter(),
            RowChild::StructuredContent(cells) => cells.iter(),
        })
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Table {
    pub style_id: Option<String>,
    /// `w:tblGrid` column widths in points.
    pub grid: Vec<f32>,
    pub width: Option<f32>, // points
    pub rows: Vec<TableRow>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum BodyElement {
    Paragraph(Paragraph),
    Table(Table),
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Document {
    pub body: Vec<BodyElement>,
    /// Body-level `w:sectPr`: properties of the last section.
    pub section_properties: Option<SectionProperties>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct HeaderFooterPart {
    pub id: String,
    pub part_type: PartType,
    pub body: Vec<BodyElement>,
}

/// Horizontal frame an anchor offset is measured from (`ST_RelFromH`).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RelativeFromH {
    Margin,
    Page,
    Column,
    Character,
    LeftMargin,
    RightMargin,
    InsideMargin,
    OutsideMargin,
}

impl RelativeFromH {
    pub fn parse(val: &str) -> Option<Self> {
        match val {
            "margin" => Some(Self::Margin),
            "page" => Some(Self::Page),
            "column" => Some(Self::Column),
            "character" => Some(Self::Character),
            "leftMargin" => Some(Self::LeftMargin),
            "rightMargin" => Some(Self::RightMargin),
            "insideMargin" => Some(Self::InsideMargin),
            "outsideMargin" => Some(Self::OutsideMargin),
            _ => None,
        }
    }
}

/// Vertical frame an anchor offset is measured from (`ST_RelFromV`).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RelativeFromV {
    Margin,
    Page,
    Paragraph,
    Line,
    TopMargin,
    BottomMargin,
    InsideMargin,
    OutsideMargin,
}

impl RelativeFromV {
    pub fn parse(val: &str) -> Option<Self> {
        match val {
            "margin" => Some(Self::Margin),
            "page" => Some(Self::Page),
            "paragraph" => Some(Self::Paragraph),
            "line" => Some(Self::Line),
            "topMargin" => Some(Self::TopMargin),
            "bottomMargin" => Some(Self::BottomMargin),
            "insideMargin" => Some(Self::InsideMargin),
            "outsideMargin" => Some(Self::OutsideMargin),
            _ => None,
        }
    }
}

/// `wp:positionH` / `wp:positionV` as written in the document.
#[derive(Clone, Debug, PartialEq)]
pub struct Position<R> {
    pub relative_from: Option<R>,
    pub offset_emu: Option<i64>,
    pub align: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Anchor {
    pub position_h: Option<Position<RelativeFromH>>,
    pub position_v: Option<Position<RelativeFromV>>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Placement {
    Inline,
    Anchor(Anchor),
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct PictureRef {
    /// `r:embed` of the picture's blip.
    pub embed_id: Option<String>,
    pub name: Option<String>,
    pub extent_cx: i64, // EMU
    pub extent_cy: i64, // EMU
}

#[derive(Clone, Debug, PartialEq)]
pub struct DrawingObject {
    pub placement: Placement,
    pub pictures: Vec<PictureRef>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Drawing {
    pub objects: Vec<DrawingObject>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ImageFormat {
    Png,
    Jpeg,
    Gif,
    Bmp,
    Other,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PictureData {
    pub path: String,
    pub data: Vec<u8>,
    pub format: ImageFormat,
    /// Pixel dimensions, when the payload could be decoded.
    pub dimensions: Option<(u32, u32)>,
}
