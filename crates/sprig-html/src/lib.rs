//! sprig HTML
//!
//! HTML5 parsing (built on html5ever) into the sprig DOM arena, and
//! serialization back out.

mod parser;
mod serialize;

pub use parser::{parse, parse_fragment_into, parse_with_url};
pub use serialize::{serialize_children, serialize_node};
