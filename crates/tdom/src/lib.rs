//! tdom - In-Memory Markup Trees
//!
//! Build element trees programmatically, locate nodes with a small CSS-like
//! selector language, mutate every match at once, and render the result as
//! HTML/XML text.
//!
//! ## Philosophy
//!
//! - **Data structures first**: one arena owns every element, ids everywhere
//! - **No special cases**: a node set obeys the same mutation contract as a
//!   single element
//! - **One parent, always**: bulk inserts hand the original to the first
//!   match and independent duplicates to the rest
//!
//! ## Core Design
//!
//! ```text
//! DomArena::element → NodeId ──select──→ NodeSet
//!        ↑                                  │
//!        └──── TreeOps (insert/remove) ─────┘
//!                        ↓
//!             Visitor → DomSerializer → text
//! ```
//!
//! ## Example
//!
//! ```
//! use tdom::{attr, text, DomArena, DomSerializer, TreeOps};
//!
//! let mut dom = DomArena::new();
//! let div = dom.element("div", [attr("class", "content")])?;
//! div.append(&mut dom, text("hi"))?;
//!
//! let found = dom.select(div, ".content")?;
//! assert_eq!(found.entries(), &[div]);
//! assert_eq!(
//!     DomSerializer::new().serialize(&dom, div)?,
//!     "<div class=\"content\">hi</div>"
//! );
//! # Ok::<(), tdom::DomError>(())
//! ```

pub mod arena;
pub mod error;
pub mod mutation;
pub mod node_set;
pub mod selector;
pub mod serializer;
pub mod types;
pub mod utils;
pub mod visit;

pub use arena::DomArena;
pub use error::{DomError, Result};
pub use mutation::{MatchPolicy, SelectorOp, TreeOps};
pub use node_set::NodeSet;
pub use selector::{Filter, Selector, SimpleSelector};
pub use serializer::{DomSerializer, HtmlVisitor, SerializerConfig};
pub use types::*;
pub use visit::{ChildRef, ElementRef, Visitor};
