//! HTML parsing into a small arena DOM, and visible-text rendering.
//!
//! html5ever does the parsing (with full error recovery) into [`ArenaDom`]
//! through [`ArenaSink`]; [`render_text`] walks the result.

mod arena;
mod text;
mod tree_sink;

pub use arena::{ArenaDom, ArenaNode, ArenaNodeData, ArenaNodeId};
pub use text::render_text;
pub use tree_sink::{ArenaSink, NodeHandle};

use html5ever::driver::ParseOpts;
use html5ever::parse_document;
use html5ever::tendril::TendrilSink;

/// Parse an HTML document into an [`ArenaDom`].
pub fn parse_html(html: &str) -> ArenaDom {
    parse_document(ArenaSink::new(), ParseOpts::default())
        .from_utf8()
        .one(html.as_bytes())
        .into_dom()
}

/// Parse an HTML document and return its visible text.
pub fn html_to_text(html: &str) -> String {
    render_text(&parse_html(html))
}
