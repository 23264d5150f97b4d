use crate::model::{BreakKind, Drawing, PositionalTab, Run, RunContent};

const HYPERLINK: &str = "HYPERLINK";

/// What a single run content item means to the consumer once field-code state is applied.
#[derive(Debug, PartialEq)]
pub enum Unit<'a> {
    Text(&'a str),
    Hyperlink { text: &'a str, target: String },
    Tab,
    PositionalTab(&'a PositionalTab),
    LineBreak(BreakKind),
    /// Not emitted in place: the walker defers it to the next paragraph.
    PageBreak,
    Drawing(&'a Drawing),
}

/// Field instruction seen in the current paragraph and not yet consumed by text.
#[derive(Debug, Default)]
pub struct FieldState {
    instruction: Option<String>,
}

impl FieldState {
    pub fn reset(&mut self) {
        self.instruction = None;
    }

    pub fn is_pending(&self) -> bool {
        self.instruction.is_some()
    }
}

/// Classify one content item of `run`. Field instructions only update `fields`
/// and produce no unit.
pub fn classify<'a>(content: &'a RunContent, run: &Run, fields: &mut FieldState) -> Option<Unit<'a>> {
    match content {
        RunContent::FieldInstruction(instr) => {
            fields.instruction = Some(instr.clone());
            None
        }
        RunContent::Text(text) => {
            let target = fields
                .instruction
                .take()
                .and_then(|instr| hyperlink_target(&instr))
                .or_else(|| run.hyperlink.clone());
            Some(match target {
                Some(target) => Unit::Hyperlink { text, target },
                None => Unit::Text(text),
            })
        }
        RunContent::Tab => Some(Unit::Tab),
        RunContent::PositionalTab(tab) => Some(Unit::PositionalTab(tab)),
        RunContent::Break(BreakKind::Page) => Some(Unit::PageBreak),
        RunContent::Break(kind) => Some(Unit::LineBreak(*kind)),
        RunContent::Drawing(drawing) => Some(Unit::Drawing(drawing)),
    }
}

/// Target of a `HYPERLINK "url"` field instruction. `\l "name"` switches to a
/// bookmark target, returned as `#name`.
pub fn hyperlink_target(instruction: &str) -> Option<String> {
    let rest = instruction.trim().strip_prefix(HYPERLINK)?.trim();

    let mut url: Option<String> = None;
    let mut bookmark: Option<String> = None;
    let mut args = Arguments(rest);
    while let Some(arg) = args.next() {
        match arg {
            Argument::Switch("l") => {
                if let Some(Argument::Value(v)) = args.next() {
                    bookmark = Some(v);
                }
            }
            Argument::Switch("m" | "n") => {}
            // Remaining switches (\o, \t) carry a value.
            Argument::Switch(_) => {
                args.next();
            }
            Argument::Value(v) if url.is_none() => url = Some(v),
            Argument::Value(_) => {}
        }
    }

    let url = url.filter(|u| !u.is_empty());
    let bookmark = bookmark.filter(|b| !b.is_empty());
    match (url, bookmark) {
        (Some(url), Some(bookmark)) => Some(format!("{url}#{bookmark}")),
        (Some(url), None) => Some(url),
        (None, Some(bookmark)) => Some(format!("#{bookmark}")),
        (None, None) => None,
    }
}

enum Argument<'a> {
    Switch(&'a str),
    Value(String),
}

/// Field-code argument tokenizer: quoted strings, `\x` switches, bare words.
struct Arguments<'a>(&'a str);

impl<'a> Iterator for Arguments<'a> {
    type Item = Argument<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let s = self.0.trim_start();
        if s.is_empty() {
            self.0 = s;
            return None;
        }
        if let Some(rest) = s.strip_prefix('"') {
            let end = rest.find('"').unwrap_or(rest.len());
            self.0 = rest.get(end + 1..).unwrap_or("");
            return Some(Argument::Value(rest[..end].to_string()));
        }
        let end = s.find(char::is_whitespace).unwrap_or(s.len());
        let (word, rest) = s.split_at(end);
        self.0 = rest;
        Some(match word.strip_prefix('\\') {
            Some(switch) => Argument::Switch(switch),
            None => Argument::Value(word.to_string()),
        })
    }
}
