//! # tachy
//!
//! Document text extraction and an accelerating word pacer for rapid
//! serial visual presentation (speed reading).
//!
//! ## Features
//!
//! - Extract plain text from TXT, HTML, EPUB, PDF, DOCX, FB2, RTF and
//!   MOBI/AZW/AZW3 (legacy PalmDOC and KF8) files
//! - Tokenize extracted text into display words
//! - Pace words one at a time, easing in from 120 wpm to a configurable peak
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::time::Instant;
//! use tachy::{Pacer, SourceDocument, extract_words};
//!
//! let doc = SourceDocument::open("book.epub")?;
//! let mut pacer = Pacer::new(extract_words(&doc)?);
//!
//! pacer.toggle(Instant::now());
//! while let Some(due) = pacer.next_due() {
//!     std::thread::sleep(due.saturating_duration_since(Instant::now()));
//!     pacer.poll(Instant::now());
//!     if let Some(word) = pacer.current_word() {
//!         println!("{word}");
//!     }
//! }
//! # Ok::<(), tachy::Error>(())
//! ```
//!
//! ## Pasted Text
//!
//! Text that is already plain skips extraction:
//!
//! ```
//! use tachy::WordSequence;
//!
//! let words = WordSequence::from_text("Read **this** at <b>speed</b>.");
//! assert_eq!(words.as_slice(), ["Read", "this", "at", "speed"]);
//! ```

pub mod config;
pub mod dom;
pub mod error;
pub mod extract;
pub mod mobi;
pub mod pacing;
pub mod tokenize;
pub(crate) mod util;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use config::{PeakRate, Settings};
pub use error::{ConfigError, Error, Result};
pub use extract::{
    ACCEPTED_EXTENSIONS, Format, SourceDocument, accept_attr, extract_text, extract_words,
};
pub use pacing::{Pacer, PlaybackPhase, PlaybackSnapshot, SubscriptionId};
pub use tokenize::{WordSequence, tokenize};
