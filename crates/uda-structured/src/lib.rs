//! Structured data trees for UDA results.
//!
//! A fetch returns an opaque native root; [`TreeNode`] wraps it and imports
//! attributes and children on first access. Trees are navigated with
//! slash-delimited path queries, reshaped with editor operations, and
//! detached into owned, serializable copies.
//!
//! # Example
//!
//! ```
//! use uda_structured::{Client, MemoryFetcher, MemoryNode, TreeError};
//!
//! let fetcher = MemoryFetcher::new().with_root(
//!     "GEOM::get(signal=/magnetics/pickup, Config=1)",
//!     "45272",
//!     MemoryNode::unnamed().with_child(
//!         MemoryNode::new("coils")
//!             .with_child(MemoryNode::new("pickup").with_attribute("r", 0.8))
//!             .with_child(MemoryNode::new("pickup").with_attribute("r", 1.1)),
//!     ),
//! );
//! let client = Client::new(fetcher);
//! let tree = client.get("GEOM::get(signal=/magnetics/pickup, Config=1)", "45272")?;
//!
//! let second = tree.find("coils/pickup@1")?;
//! assert_eq!(second.attribute("r")?.and_then(|v| v.as_f64()), Some(1.1));
//! assert_eq!(tree.select("coils/pickup")?.len(), 2);
//!
//! let owned = tree.detach()?;
//! let text = owned.to_json()?;
//! assert_eq!(uda_structured::TreeNode::from_json(&text)?, owned);
//! # Ok::<(), TreeError>(())
//! ```

mod error;
pub use error::{FetchError, TreeError};

mod value;
pub use value::{ArithmeticError, DType, Number, Value, STRING_TYPE};

mod native;
pub use native::{Fetcher, HandleRef, NativeData, NativeHandle, NativeValue};

mod sanitize;
pub use sanitize::{is_reserved, sanitize_identifier, RESERVED_KEYWORDS, STRUCTURAL_MEMBERS};

mod node;
pub use node::{Attributes, Materialization, TreeNode, ROOT_NAME};

mod path;
pub use path::{names_match, parse_path, Match, ResolveMode, Resolved, Segment};

mod edit;
pub use edit::ChildSelector;

mod detach;
pub use detach::DetachedTreeNode;

mod display;

mod memory;
pub use memory::{MemoryFetcher, MemoryNode};

mod client;
pub use client::Client;
