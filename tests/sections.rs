mod common;

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use common::*;
use docxide_walk::model::{
    BodyElement, BreakKind, Document, HeaderFooterKind, HeaderFooterPart, HeaderFooterReference,
    Paragraph, PartType, PictureData, RowChild, RunContent, SectionProperties, Table, TableRow,
};
use docxide_walk::{DocumentSource, Error, MemorySource, PartScope, SectionResolver, walk};

/// Counts how often each part is requested.
struct CountingSource {
    inner: MemorySource,
    loads: RefCell<HashMap<String, usize>>,
}

impl CountingSource {
    fn new(inner: MemorySource) -> Self {
        Self {
            inner,
            loads: RefCell::new(HashMap::new()),
        }
    }
}

impl DocumentSource for CountingSource {
    fn body(&self) -> &[BodyElement] {
        self.inner.body()
    }

    fn final_section(&self) -> Option<&SectionProperties> {
        self.inner.final_section()
    }

    fn load_part(&self, reference: &HeaderFooterReference) -> docxide_walk::Result<HeaderFooterPart> {
        *self.loads.borrow_mut().entry(reference.id.clone()).or_default() += 1;
        self.inner.load_part(reference)
    }

    fn picture(&self, scope: &PartScope, embed_id: &str) -> Option<Rc<PictureData>> {
        self.inner.picture(scope, embed_id)
    }
}

fn two_section_source() -> MemorySource {
    MemorySource::new(Document {
        body: vec![
            p("one"),
            section_end("end1", vec![header_ref("h1"), footer_ref("f1")]),
            p("two"),
        ],
        section_properties: Some(props(vec![footer_ref("f2")])),
    })
    .with_part(part(PartType::Header, "h1", vec![p("H1")]))
    .with_part(part(PartType::Footer, "f1", vec![p("F1")]))
    .with_part(part(PartType::Footer, "f2", vec![p("F2")]))
}

#[test]
fn sections_activate_with_their_headers_and_footers() {
    let source = two_section_source();
    let mut recorder = Recorder::new();
    walk(&source, &mut recorder).unwrap();

    let d = HeaderFooterKind::Default;
    assert_eq!(
        recorder.events,
        vec![
            Event::StartDocument,
            Event::CreateMasterPage(0),
            Event::StartHeader("h1".into(), d),
            Event::StartParagraph,
            text("H1"),
            Event::EndParagraph,
            Event::EndHeader("h1".into()),
            Event::StartFooter("f1".into(), d),
            Event::StartParagraph,
            text("F1"),
            Event::EndParagraph,
            Event::EndFooter("f1".into()),
            Event::SetActiveMasterPage(0),
            Event::StartParagraph,
            text("one"),
            Event::EndParagraph,
            Event::StartParagraph,
            text("end1"),
            Event::EndParagraph,
            // header inherited, footer replaced
            Event::CreateMasterPage(1),
            Event::StartHeader("h1".into(), d),
            Event::StartParagraph,
            text("H1"),
            Event::EndParagraph,
            Event::EndHeader("h1".into()),
            Event::StartFooter("f2".into(), d),
            Event::StartParagraph,
            text("F2"),
            Event::EndParagraph,
            Event::EndFooter("f2".into()),
            Event::SetActiveMasterPage(1),
            Event::StartParagraph,
            text("two"),
            Event::EndParagraph,
            Event::EndDocument,
        ]
    );
}

#[test]
fn each_part_is_loaded_once() {
    let source = CountingSource::new(two_section_source());
    let mut recorder = Recorder::new();
    walk(&source, &mut recorder).unwrap();

    let loads = source.loads.borrow();
    assert_eq!(loads.get("h1"), Some(&1));
    assert_eq!(loads.get("f1"), Some(&1));
    assert_eq!(loads.get("f2"), Some(&1));
    assert_eq!(recorder.count(&Event::StartHeader("h1".into(), HeaderFooterKind::Default)), 2);
}

#[test]
fn headers_are_visited_in_kind_order() {
    let source = MemorySource::new(Document {
        body: vec![p("x")],
        section_properties: Some(SectionProperties {
            references: vec![
                reference(PartType::Header, HeaderFooterKind::Even, "even"),
                reference(PartType::Header, HeaderFooterKind::First, "first"),
                reference(PartType::Header, HeaderFooterKind::Default, "default"),
            ],
            title_page: true,
            ..SectionProperties::default()
        }),
    })
    .with_part(part(PartType::Header, "even", vec![p("E")]))
    .with_part(part(PartType::Header, "first", vec![p("F")]))
    .with_part(part(PartType::Header, "default", vec![p("D")]));

    let mut recorder = Recorder::new();
    walk(&source, &mut recorder).unwrap();

    let started: Vec<HeaderFooterKind> = recorder
        .events
        .iter()
        .filter_map(|e| match e {
            Event::StartHeader(_, kind) => Some(*kind),
            _ => None,
        })
        .collect();
    assert_eq!(
        started,
        vec![HeaderFooterKind::Default, HeaderFooterKind::First, HeaderFooterKind::Even]
    );
}

#[test]
fn missing_part_is_a_malformed_reference() {
    let source = MemorySource::new(Document {
        body: vec![p("x")],
        section_properties: Some(props(vec![header_ref("nope")])),
    });
    let mut recorder = Recorder::new();
    let err = walk(&source, &mut recorder).unwrap_err();
    match err {
        Error::MalformedReference { part_type, id, .. } => {
            assert_eq!(part_type, PartType::Header);
            assert_eq!(id, "nope");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(recorder.texts().is_empty());
}

#[test]
fn part_of_the_wrong_type_is_a_malformed_reference() {
    let source = MemorySource::new(Document {
        body: vec![p("x")],
        section_properties: Some(props(vec![header_ref("f")])),
    })
    .with_part(part(PartType::Footer, "f", vec![p("F")]));
    let mut recorder = Recorder::new();
    assert!(matches!(
        walk(&source, &mut recorder),
        Err(Error::MalformedReference { part_type: PartType::Header, .. })
    ));
}

#[test]
fn pending_page_break_survives_header_traversal() {
    let boundary = BodyElement::Paragraph(Paragraph {
        runs: vec![run(vec![RunContent::Text("b".into()), RunContent::Break(BreakKind::Page)])],
        section_properties: Some(props(vec![header_ref("h")])),
        ..Paragraph::default()
    });
    let source = MemorySource::new(Document {
        body: vec![p("a"), boundary, p("c")],
        section_properties: None,
    })
    // a page break at the end of the header content stays inside the header
    .with_part(part(
        PartType::Header,
        "h",
        vec![para(vec![run(vec![
            RunContent::Text("H".into()),
            RunContent::Break(BreakKind::Page),
        ])])],
    ));

    let mut recorder = Recorder::new();
    walk(&source, &mut recorder).unwrap();

    assert_eq!(recorder.count(&Event::PageBreak), 1);
    let activated = recorder.position(&Event::SetActiveMasterPage(1)).unwrap();
    let page_break = recorder.position(&Event::PageBreak).unwrap();
    let c = recorder.position(&text("c")).unwrap();
    assert!(activated < page_break);
    assert!(page_break < c);
}

#[test]
fn table_at_section_start_activates_the_section() {
    let table = BodyElement::Table(Table {
        grid: vec![72.0],
        rows: vec![TableRow {
            children: vec![RowChild::Cell(cell(vec![p("cell")]))],
            height: None,
        }],
        ..Table::default()
    });
    let source = MemorySource::new(Document {
        body: vec![section_end("a", vec![]), table],
        section_properties: None,
    });
    let mut recorder = Recorder::new();
    walk(&source, &mut recorder).unwrap();

    let activated = recorder.position(&Event::CreateMasterPage(1)).unwrap();
    let table_start = recorder.position(&Event::StartTable(vec![72.0])).unwrap();
    assert!(activated < table_start);
}

#[test]
fn section_after_the_last_paragraph_is_still_activated() {
    let source = MemorySource::new(Document {
        body: vec![p("one"), section_end("end", vec![header_ref("h1")])],
        section_properties: Some(props(vec![header_ref("h2")])),
    })
    .with_part(part(PartType::Header, "h1", vec![p("H1")]))
    .with_part(part(PartType::Header, "h2", vec![p("H2")]));
    let mut recorder = Recorder::new();
    walk(&source, &mut recorder).unwrap();

    let tail = &recorder.events[recorder.position(&text("end")).unwrap()..];
    assert_eq!(
        tail,
        [
            text("end"),
            Event::EndParagraph,
            Event::CreateMasterPage(1),
            Event::StartHeader("h2".into(), HeaderFooterKind::Default),
            Event::StartParagraph,
            text("H2"),
            Event::EndParagraph,
            Event::EndHeader("h2".into()),
            Event::SetActiveMasterPage(1),
            Event::EndDocument,
        ]
    );
}

#[test]
fn section_properties_inside_table_cells_are_ignored() {
    let table = BodyElement::Table(Table {
        grid: vec![72.0],
        rows: vec![TableRow {
            children: vec![RowChild::Cell(cell(vec![section_end("inner", vec![header_ref("hx")])]))],
            height: None,
        }],
        ..Table::default()
    });
    let source = MemorySource::new(Document {
        body: vec![table, p("after")],
        section_properties: None,
    });
    let mut recorder = Recorder::new();
    walk(&source, &mut recorder).unwrap();

    assert_eq!(recorder.count(&Event::CreateMasterPage(0)), 1);
    assert_eq!(recorder.count(&Event::CreateMasterPage(1)), 0);
    assert_eq!(recorder.texts(), vec!["inner".to_string(), "after".to_string()]);
}

#[test]
fn resolver_initializes_once() {
    let source = two_section_source();
    let mut resolver = SectionResolver::new();
    assert!(!resolver.is_initialized());

    let first = resolver.initialize(source.body(), source.final_section()).len();
    assert_eq!(first, 2);
    assert!(resolver.is_initialized());

    // a second call keeps the first result
    let again = resolver.initialize(&[], None).to_vec();
    assert_eq!(again.len(), 2);
    assert_eq!(again[0].boundary, Some(1));
    assert_eq!(again[1].start, 2);
    assert_eq!(resolver.sections(), &again[..]);
}
