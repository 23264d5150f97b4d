use std::collections::HashMap;
use std::io::{Read, Seek};

use crate::model::TabStop;
use crate::source::effective_tab_stops;

use super::{WML_NS, parse_tab_stops, read_zip_text, wml};

pub(super) struct ParagraphStyle {
    /// Stops declared on this style alone, clears included.
    tab_stops: Vec<TabStop>,
    based_on: Option<String>,
    /// Stops after applying the whole `w:basedOn` chain.
    resolved: Vec<TabStop>,
}

#[derive(Default)]
pub(super) struct StylesInfo {
    default_tab_stops: Vec<TabStop>,
    default_paragraph_style: Option<String>,
    paragraph_styles: HashMap<String, ParagraphStyle>,
}

impl StylesInfo {
    pub(super) fn paragraph_style_count(&self) -> usize {
        self.paragraph_styles.len()
    }

    /// Effective stops a paragraph inherits from `style_id`, or from the
    /// default paragraph style when it names none.
    pub(super) fn tab_stops(&self, style_id: Option<&str>) -> Vec<TabStop> {
        let style = style_id
            .or(self.default_paragraph_style.as_deref())
            .and_then(|id| self.paragraph_styles.get(id));
        match style {
            Some(style) => style.resolved.clone(),
            None => self.default_tab_stops.clone(),
        }
    }
}

pub(super) fn parse_styles<R: Read + Seek>(zip: &mut zip::ZipArchive<R>) -> StylesInfo {
    let mut info = StylesInfo::default();

    let Some(xml_content) = read_zip_text(zip, "word/styles.xml") else {
        return info;
    };
    let Ok(xml) = roxmltree::Document::parse(&xml_content) else {
        log::warn!("word/styles.xml is not well-formed, ignoring styles");
        return info;
    };

    let root = xml.root_element();

    if let Some(ppr) = wml(root, "docDefaults")
        .and_then(|n| wml(n, "pPrDefault"))
        .and_then(|n| wml(n, "pPr"))
    {
        info.default_tab_stops = effective_tab_stops(&[], &parse_tab_stops(ppr));
    }

    for style_node in root.children() {
        if style_node.tag_name().name() != "style"
            || style_node.tag_name().namespace() != Some(WML_NS)
        {
            continue;
        }
        if style_node.attribute((WML_NS, "type")) != Some("paragraph") {
            continue;
        }
        let Some(style_id) = style_node.attribute((WML_NS, "styleId")) else {
            continue;
        };

        if matches!(style_node.attribute((WML_NS, "default")), Some("1" | "true")) {
            info.default_paragraph_style = Some(style_id.to_string());
        }

        let tab_stops = wml(style_node, "pPr")
            .map(parse_tab_stops)
            .unwrap_or_default();
        let based_on = wml(style_node, "basedOn")
            .and_then(|n| n.attribute((WML_NS, "val")))
            .map(|s| s.to_string());

        info.paragraph_styles.insert(
            style_id.to_string(),
            ParagraphStyle {
                tab_stops,
                based_on,
                resolved: Vec::new(),
            },
        );
    }

    resolve_based_on(&mut info.paragraph_styles, &info.default_tab_stops);
    info
}

/// Flatten each style's tab stops along its `w:basedOn` chain, starting from
/// the document defaults.
fn resolve_based_on(styles: &mut HashMap<String, ParagraphStyle>, defaults: &[TabStop]) {
    let ids: Vec<String> = styles.keys().cloned().collect();
    for id in ids {
        let mut chain: Vec<String> = Vec::new();
        let mut current = id.clone();
        loop {
            if chain.contains(&current) {
                log::debug!("Style {id} has a cyclic basedOn chain");
                break;
            }
            chain.push(current.clone());
            match styles.get(&current).and_then(|s| s.based_on.clone()) {
                Some(parent) => current = parent,
                None => break,
            }
        }

        let mut resolved = defaults.to_vec();
        for ancestor_id in chain.iter().rev() {
            if let Some(s) = styles.get(ancestor_id) {
                resolved = effective_tab_stops(&resolved, &s.tab_stops);
            }
        }

        if let Some(style) = styles.get_mut(&id) {
            style.resolved = resolved;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TabAlignment;

    fn stop(position: f32, alignment: TabAlignment) -> TabStop {
        TabStop {
            position,
            alignment,
            leader: None,
        }
    }

    fn style(tab_stops: Vec<TabStop>, based_on: Option<&str>) -> ParagraphStyle {
        ParagraphStyle {
            tab_stops,
            based_on: based_on.map(String::from),
            resolved: Vec::new(),
        }
    }

    #[test]
    fn derived_style_clears_and_adds_stops() {
        let mut styles = HashMap::new();
        styles.insert(
            "Base".to_string(),
            style(
                vec![stop(36.0, TabAlignment::Left), stop(72.0, TabAlignment::Right)],
                None,
            ),
        );
        styles.insert(
            "Derived".to_string(),
            style(
                vec![stop(36.0, TabAlignment::Clear), stop(108.0, TabAlignment::Center)],
                Some("Base"),
            ),
        );
        resolve_based_on(&mut styles, &[]);

        let positions: Vec<f32> = styles["Derived"].resolved.iter().map(|t| t.position).collect();
        assert_eq!(positions, vec![72.0, 108.0]);
        assert_eq!(styles["Base"].resolved.len(), 2);
    }

    #[test]
    fn cyclic_chain_terminates() {
        let mut styles = HashMap::new();
        styles.insert("A".to_string(), style(vec![stop(10.0, TabAlignment::Left)], Some("B")));
        styles.insert("B".to_string(), style(vec![stop(20.0, TabAlignment::Left)], Some("A")));
        resolve_based_on(&mut styles, &[]);
        assert_eq!(styles["A"].resolved.len(), 2);
    }
}
