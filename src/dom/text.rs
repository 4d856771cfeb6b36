//! Visible-text rendering of a parsed HTML document.

use super::arena::{ArenaDom, ArenaNodeData, ArenaNodeId};

/// Elements whose subtrees never contribute text.
const HIDDEN: &[&str] = &["script", "style", "head"];

/// Elements rendered on their own line(s).
const BLOCKS: &[&str] = &[
    "address", "article", "aside", "blockquote", "dd", "details", "dialog", "div", "dl", "dt",
    "fieldset", "figcaption", "figure", "footer", "form", "header", "hgroup", "hr", "li", "main",
    "nav", "ol", "pre", "section", "summary", "table", "tr", "ul",
];

/// Elements separated from their neighbours by a blank line.
const PARAGRAPHS: &[&str] = &["p", "h1", "h2", "h3", "h4", "h5", "h6"];

/// Render the visible text of a document, roughly as `innerText` would.
///
/// Rendering starts at `<body>`, falling back to the root element and then
/// the document. Whitespace runs collapse to one space; block elements and
/// `<br>` start new lines.
pub fn render_text(dom: &ArenaDom) -> String {
    let start = dom
        .find_by_tag("body")
        .or_else(|| dom.root_element())
        .unwrap_or_else(|| dom.document());

    let mut writer = TextWriter::default();

    enum Step {
        Enter(ArenaNodeId),
        Leave(usize),
    }

    let mut stack = vec![Step::Enter(start)];
    while let Some(step) = stack.pop() {
        let id = match step {
            Step::Enter(id) => id,
            Step::Leave(breaks) => {
                writer.line_break(breaks);
                continue;
            }
        };
        let Some(node) = dom.get(id) else { continue };

        match &node.data {
            ArenaNodeData::Text(text) => writer.text(text),
            ArenaNodeData::Element { name } => {
                let tag = name.local.as_ref();
                if HIDDEN.contains(&tag) {
                    continue;
                }
                if tag == "br" {
                    writer.hard_break();
                    continue;
                }
                let breaks = if PARAGRAPHS.contains(&tag) {
                    2
                } else if BLOCKS.contains(&tag) {
                    1
                } else {
                    0
                };
                writer.line_break(breaks);
                stack.push(Step::Leave(breaks));
                push_children(dom, id, &mut stack, Step::Enter);
            }
            ArenaNodeData::Document => push_children(dom, id, &mut stack, Step::Enter),
            ArenaNodeData::Other => {}
        }
    }

    writer.finish()
}

fn push_children<T>(
    dom: &ArenaDom,
    id: ArenaNodeId,
    stack: &mut Vec<T>,
    wrap: fn(ArenaNodeId) -> T,
) {
    let children: Vec<_> = dom.children(id).collect();
    stack.extend(children.into_iter().rev().map(wrap));
}

/// Accumulates words, deferring separators until the next visible character.
#[derive(Default)]
struct TextWriter {
    out: String,
    pending_space: bool,
    pending_breaks: usize,
}

impl TextWriter {
    fn text(&mut self, text: &str) {
        for c in text.chars() {
            if c.is_ascii_whitespace() {
                self.pending_space = true;
            } else {
                self.flush_separator();
                self.out.push(c);
            }
        }
    }

    fn line_break(&mut self, count: usize) {
        self.pending_breaks = self.pending_breaks.max(count);
    }

    fn hard_break(&mut self) {
        self.pending_breaks += 1;
    }

    fn flush_separator(&mut self) {
        if !self.out.is_empty() {
            if self.pending_breaks > 0 {
                for _ in 0..self.pending_breaks.min(2) {
                    self.out.push('\n');
                }
            } else if self.pending_space {
                self.out.push(' ');
            }
        }
        self.pending_space = false;
        self.pending_breaks = 0;
    }

    fn finish(self) -> String {
        self.out
    }
}
