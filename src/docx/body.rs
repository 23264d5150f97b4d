use std::collections::HashMap;
use std::str::FromStr;

use crate::model::{
    Anchor, BodyElement, BreakKind, Drawing, DrawingObject, HeaderFooterKind,
    HeaderFooterReference, PageMargins, PageSize, Paragraph, PartType, PictureRef, Placement,
    Position, PositionalTab, PositionalTabAlignment, PositionalTabBase, RelativeFromH,
    RelativeFromV, Run, RunContent, RowChild, SectionBreakType, SectionProperties, Table,
    TableCell, TableRow, VMerge,
};

use super::{
    DML_NS, PIC_NS, REL_NS, WML_NS, WPD_NS, is_wml, parse_leader, parse_tab_stops, twips_attr,
    wml, wml_attr, wml_bool,
};

type Node<'a> = roxmltree::Node<'a, 'a>;

/// Markup that carries no content for the walk and is dropped without noise.
const IGNORED: &[&str] = &[
    "bookmarkStart",
    "bookmarkEnd",
    "commentRangeStart",
    "commentRangeEnd",
    "permStart",
    "permEnd",
    "proofErr",
    "del",
    "moveFrom",
    "moveFromRangeStart",
    "moveFromRangeEnd",
    "moveToRangeStart",
    "moveToRangeEnd",
];

fn is_ns(node: Node, ns: &str, name: &str) -> bool {
    node.tag_name().name() == name && node.tag_name().namespace() == Some(ns)
}

fn child<'a>(node: Node<'a>, ns: &str, name: &str) -> Option<Node<'a>> {
    node.children().find(|n| is_ns(*n, ns, name))
}

fn collect_block_nodes<'a>(parent: Node<'a>) -> Vec<Node<'a>> {
    let mut nodes = Vec::new();
    for child in parent.children() {
        if is_wml(child, "sdt") {
            if let Some(content) = wml(child, "sdtContent") {
                nodes.extend(collect_block_nodes(content));
            }
        } else {
            nodes.push(child);
        }
    }
    nodes
}

/// Block-level content of `w:body`, `w:hdr`, `w:ftr` or `w:tc`.
pub(super) fn parse_blocks(parent: Node, rels: &HashMap<String, String>) -> Vec<BodyElement> {
    let mut elements = Vec::new();
    for node in collect_block_nodes(parent) {
        if node.tag_name().namespace() != Some(WML_NS) {
            continue;
        }
        match node.tag_name().name() {
            "p" => elements.push(BodyElement::Paragraph(parse_paragraph(node, rels))),
            "tbl" => elements.push(BodyElement::Table(parse_table(node, rels))),
            // Body-level section properties are read by the caller.
            "sectPr" | "tcPr" => {}
            name if IGNORED.contains(&name) => {}
            name => log::debug!("Skipping block-level w:{name}"),
        }
    }
    elements
}

fn parse_paragraph(node: Node, rels: &HashMap<String, String>) -> Paragraph {
    let ppr = wml(node, "pPr");
    let mut runs = Vec::new();
    collect_runs(node, rels, None, &mut runs);
    Paragraph {
        style_id: ppr.and_then(|p| wml_attr(p, "pStyle")).map(String::from),
        runs,
        tab_stops: ppr.map(parse_tab_stops).unwrap_or_default(),
        page_break_before: ppr
            .and_then(|p| wml_bool(p, "pageBreakBefore"))
            .unwrap_or(false),
        section_properties: ppr
            .and_then(|p| wml(p, "sectPr"))
            .map(parse_section_properties),
    }
}

fn collect_runs(
    parent: Node,
    rels: &HashMap<String, String>,
    hyperlink: Option<&str>,
    out: &mut Vec<Run>,
) {
    for child in parent.children() {
        if child.tag_name().namespace() != Some(WML_NS) {
            continue;
        }
        match child.tag_name().name() {
            "r" => out.push(parse_run(child, hyperlink)),
            "hyperlink" => {
                let target = child
                    .attribute((REL_NS, "id"))
                    .and_then(|rid| rels.get(rid))
                    .cloned()
                    .or_else(|| child.attribute((WML_NS, "anchor")).map(|a| format!("#{a}")));
                collect_runs(child, rels, target.as_deref().or(hyperlink), out);
            }
            "sdt" => {
                if let Some(content) = wml(child, "sdtContent") {
                    collect_runs(content, rels, hyperlink, out);
                }
            }
            "smartTag" | "customXml" | "ins" | "moveTo" => collect_runs(child, rels, hyperlink, out),
            "fldSimple" => {
                if let Some(instr) = child.attribute((WML_NS, "instr")) {
                    let mut run = Run::new(vec![RunContent::FieldInstruction(instr.to_string())]);
                    run.hyperlink = hyperlink.map(String::from);
                    out.push(run);
                }
                collect_runs(child, rels, hyperlink, out);
            }
            "pPr" => {}
            name if IGNORED.contains(&name) => {}
            name => log::debug!("Skipping paragraph child w:{name}"),
        }
    }
}

fn parse_run(node: Node, hyperlink: Option<&str>) -> Run {
    let mut content = Vec::new();
    for child in node.children() {
        if child.tag_name().namespace() != Some(WML_NS) {
            continue;
        }
        match child.tag_name().name() {
            "t" => content.push(RunContent::Text(child.text().unwrap_or("").to_string())),
            "instrText" => {
                content.push(RunContent::FieldInstruction(child.text().unwrap_or("").to_string()))
            }
            "tab" => content.push(RunContent::Tab),
            "ptab" => content.push(RunContent::PositionalTab(parse_positional_tab(child))),
            "br" => {
                let kind = match child.attribute((WML_NS, "type")) {
                    Some("page") => BreakKind::Page,
                    Some("column") => BreakKind::Column,
                    _ => BreakKind::Line,
                };
                content.push(RunContent::Break(kind));
            }
            "cr" => content.push(RunContent::Break(BreakKind::Line)),
            "drawing" => content.push(RunContent::Drawing(parse_drawing(child))),
            "rPr" | "fldChar" | "lastRenderedPageBreak" | "delText" | "delInstrText"
            | "softHyphen" | "noBreakHyphen" | "commentReference" | "footnoteReference"
            | "endnoteReference" => {}
            name => log::debug!("Skipping run child w:{name}"),
        }
    }
    Run {
        content,
        hyperlink: hyperlink.map(String::from),
    }
}

fn parse_positional_tab(node: Node) -> PositionalTab {
    let alignment = match node.attribute((WML_NS, "alignment")) {
        Some("center") => PositionalTabAlignment::Center,
        Some("right") => PositionalTabAlignment::Right,
        _ => PositionalTabAlignment::Left,
    };
    let relative_to = match node.attribute((WML_NS, "relativeTo")) {
        Some("indent") => PositionalTabBase::Indent,
        _ => PositionalTabBase::Margin,
    };
    PositionalTab {
        alignment,
        relative_to,
        leader: node.attribute((WML_NS, "leader")).and_then(parse_leader),
    }
}

fn find_blip_embed<'a>(container: Node<'a>) -> Option<&'a str> {
    container
        .descendants()
        .find(|n| is_ns(*n, DML_NS, "blip"))
        .and_then(|n| n.attribute((REL_NS, "embed")))
}

fn parse_drawing(node: Node) -> Drawing {
    let mut objects = Vec::new();
    for container in node.children() {
        if container.tag_name().namespace() != Some(WPD_NS) {
            continue;
        }
        let placement = match container.tag_name().name() {
            "inline" => Placement::Inline,
            "anchor" => Placement::Anchor(parse_anchor(container)),
            _ => continue,
        };

        let extent = child(container, WPD_NS, "extent");
        let extent_attr = |name: &str| {
            extent
                .and_then(|e| e.attribute(name))
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(0)
        };
        let (extent_cx, extent_cy) = (extent_attr("cx"), extent_attr("cy"));

        let graphic_data =
            child(container, DML_NS, "graphic").and_then(|g| child(g, DML_NS, "graphicData"));
        let pictures: Vec<PictureRef> = graphic_data
            .into_iter()
            .flat_map(|gd| gd.children().filter(|n| is_ns(*n, PIC_NS, "pic")))
            .map(|pic| PictureRef {
                embed_id: find_blip_embed(pic).map(String::from),
                name: child(pic, PIC_NS, "nvPicPr")
                    .and_then(|nv| child(nv, PIC_NS, "cNvPr"))
                    .and_then(|c| c.attribute("name"))
                    .map(String::from),
                extent_cx,
                extent_cy,
            })
            .collect();

        if pictures.is_empty() {
            let uri = graphic_data.and_then(|gd| gd.attribute("uri")).unwrap_or("");
            log::debug!("Drawing without pictures (graphic data {uri:?})");
        }
        objects.push(DrawingObject { placement, pictures });
    }
    Drawing { objects }
}

fn parse_position<R>(node: Option<Node>, relative_from: impl Fn(&str) -> Option<R>) -> Option<Position<R>> {
    let node = node?;
    let text_of = |name: &str| {
        child(node, WPD_NS, name)
            .and_then(|n| n.text())
            .map(str::trim)
    };
    Some(Position {
        relative_from: node.attribute("relativeFrom").and_then(relative_from),
        offset_emu: text_of("posOffset").and_then(|t| i64::from_str(t).ok()),
        align: text_of("align").map(String::from),
    })
}

fn parse_anchor(container: Node) -> Anchor {
    Anchor {
        position_h: parse_position(child(container, WPD_NS, "positionH"), RelativeFromH::parse),
        position_v: parse_position(child(container, WPD_NS, "positionV"), RelativeFromV::parse),
    }
}

fn parse_table(node: Node, rels: &HashMap<String, String>) -> Table {
    let tbl_pr = wml(node, "tblPr");
    let grid = wml(node, "tblGrid")
        .map(|g| {
            g.children()
                .filter(|n| is_wml(*n, "gridCol"))
                .filter_map(|n| twips_attr(n, "w"))
                .collect()
        })
        .unwrap_or_default();
    let width = tbl_pr
        .and_then(|p| wml(p, "tblW"))
        .filter(|w| matches!(w.attribute((WML_NS, "type")), None | Some("dxa")))
        .and_then(|w| twips_attr(w, "w"));

    let rows = collect_block_nodes(node)
        .into_iter()
        .filter(|n| is_wml(*n, "tr"))
        .map(|tr| parse_row(tr, rels))
        .collect();

    Table {
        style_id: tbl_pr.and_then(|p| wml_attr(p, "tblStyle")).map(String::from),
        grid,
        width,
        rows,
    }
}

/// Row children are kept as written so wrapped cells stay distinguishable.
fn parse_row(tr: Node, rels: &HashMap<String, String>) -> TableRow {
    let mut children = Vec::new();
    for node in tr.children() {
        if node.tag_name().namespace() != Some(WML_NS) {
            continue;
        }
        match node.tag_name().name() {
            "tc" => children.push(RowChild::Cell(parse_cell(node, rels))),
            "sdt" => {
                let cells = wml(node, "sdtContent")
                    .map(|content| {
                        content
                            .children()
                            .filter(|n| is_wml(*n, "tc"))
                            .map(|tc| parse_cell(tc, rels))
                            .collect()
                    })
                    .unwrap_or_default();
                children.push(RowChild::StructuredContent(cells));
            }
            "trPr" | "tblPrEx" => {}
            name if IGNORED.contains(&name) => {}
            name => log::debug!("Skipping row child w:{name}"),
        }
    }

    let height = wml(tr, "trPr")
        .and_then(|p| wml(p, "trHeight"))
        .and_then(|h| twips_attr(h, "val"));

    TableRow { children, height }
}

fn parse_cell(tc: Node, rels: &HashMap<String, String>) -> TableCell {
    let tc_pr = wml(tc, "tcPr");
    let width = tc_pr
        .and_then(|p| wml(p, "tcW"))
        .filter(|w| matches!(w.attribute((WML_NS, "type")), None | Some("dxa")))
        .and_then(|w| twips_attr(w, "w"));
    let grid_span = tc_pr
        .and_then(|p| wml_attr(p, "gridSpan"))
        .and_then(|v| v.parse::<u32>().ok());
    let v_merge = tc_pr.and_then(|p| wml(p, "vMerge")).map(|n| {
        match n.attribute((WML_NS, "val")) {
            Some("restart") => VMerge::Restart,
            _ => VMerge::Continue,
        }
    });

    TableCell {
        width,
        grid_span,
        v_merge,
        body: parse_blocks(tc, rels),
    }
}

pub(super) fn parse_section_properties(sect: Node) -> SectionProperties {
    let mut references = Vec::new();
    for node in sect.children() {
        let part_type = if is_wml(node, "headerReference") {
            PartType::Header
        } else if is_wml(node, "footerReference") {
            PartType::Footer
        } else {
            continue;
        };
        let Some(id) = node.attribute((REL_NS, "id")) else {
            log::debug!("{part_type} reference without r:id");
            continue;
        };
        let kind = match node.attribute((WML_NS, "type")) {
            None => HeaderFooterKind::Default,
            Some(val) => match HeaderFooterKind::parse(val) {
                Some(kind) => kind,
                None => {
                    log::debug!("Unknown {part_type} reference type {val:?}");
                    continue;
                }
            },
        };
        references.push(HeaderFooterReference {
            part_type,
            kind,
            id: id.to_string(),
        });
    }

    let page_size = wml(sect, "pgSz").and_then(|n| {
        Some(PageSize {
            width: twips_attr(n, "w")?,
            height: twips_attr(n, "h")?,
        })
    });
    let margins = wml(sect, "pgMar").map(|n| PageMargins {
        top: twips_attr(n, "top").unwrap_or(0.0),
        bottom: twips_attr(n, "bottom").unwrap_or(0.0),
        left: twips_attr(n, "left").unwrap_or(0.0),
        right: twips_attr(n, "right").unwrap_or(0.0),
        header: twips_attr(n, "header").unwrap_or(0.0),
        footer: twips_attr(n, "footer").unwrap_or(0.0),
    });
    let break_type = match wml_attr(sect, "type") {
        Some("continuous") => SectionBreakType::Continuous,
        Some("oddPage") => SectionBreakType::OddPage,
        Some("evenPage") => SectionBreakType::EvenPage,
        _ => SectionBreakType::NextPage,
    };

    SectionProperties {
        references,
        page_size,
        margins,
        title_page: wml_bool(sect, "titlePg").unwrap_or(false),
        break_type,
    }
}
