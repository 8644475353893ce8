//! Two-way links from UI components into structurally-shared persistent state.
//!
//! `tirea-link` lets a component read a value nested inside its state and
//! write a new value back. Writing produces a new top-level entry in which
//! only the containers along the written path are rebuilt; every other
//! branch is shared with the previous version, so upstream change detection
//! can compare by identity.
//!
//! # Core Concepts
//!
//! - **RootState**: flat mapping from top-level key to [`Item`], owned by the host
//! - **Item**: a plain JSON value or a persistent [`Map`] / [`List`]
//! - **Linker**: binds paths; built from a state getter and a commit callback
//! - **Link**: the bound `(value, request_change)` pair
//! - **PathAccess**: capability trait of persistent containers
//!
//! # Quick Start
//!
//! ```
//! use std::sync::Arc;
//! use serde_json::json;
//! use tirea_link::{Item, LinkOptions, RootState, StateCell};
//!
//! let state = RootState::from_plain(
//!     json!({"todos": {"items": ["write docs"], "filter": "all"}})
//!         .as_object()
//!         .unwrap()
//!         .clone(),
//! );
//! let cell = Arc::new(StateCell::new(state));
//! let linker = cell.linker();
//!
//! // Reads are plain by default.
//! let items = linker.bind(["todos", "items"]).unwrap();
//! assert_eq!(items.value().unwrap(), &json!(["write docs"]));
//!
//! // Writes splice a persistent value into the tree.
//! items.request_change(json!(["write docs", "ship"])).unwrap();
//!
//! let raw = linker
//!     .bind_with(["todos", "items"], LinkOptions::new().retain_persistent())
//!     .unwrap();
//! assert_eq!(raw.value().and_then(Item::as_list).unwrap().len(), 2);
//! ```
//!
//! # Paths
//!
//! The first segment names a top-level entry. A single segment binds that
//! entry directly, whatever it holds. Longer paths require the entry to be a
//! persistent container; binding fails otherwise.

mod cell;
mod error;
mod item;
mod link;
mod node;
mod options;
mod path;
mod root;

pub use cell::StateCell;
pub use error::{value_type_name, LinkError, LinkResult};
pub use item::Item;
pub use link::{ChangeFn, CommitFn, Link, Linker, StateFn};
pub use node::{List, Map, Node, PathAccess};
pub use options::LinkOptions;
pub use path::{KeyPath, Path, Seg};
pub use root::{PartialState, RootState};

// Re-export serde_json::Value for convenience
pub use serde_json::Value;
