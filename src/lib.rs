//! Mutable in-memory document model for Ion data
//!
//! Values live in a [`Dom`] arena and are addressed by [`ValueId`]
//! handles. Containers (lists, s-expressions, structs and datagrams) own
//! their children and keep each child's element index equal to its slot.
//! Symbol text is resolved through the symbol table of the tree's top-level
//! value, found by walking up the containment chain on demand.
//!
//! ```
//! use ion_dom::Dom;
//!
//! let mut dom = Dom::new();
//! let record = dom.new_empty_struct();
//! let list = dom.new_list_of_ints(&[1, 2, 3])?;
//! dom.add_field(record, "values", list)?;
//! dom.make_read_only(record)?;
//!
//! assert_eq!(ion_dom::text::to_ion_text(&dom, record)?, "{values:[1,2,3]}");
//! # Ok::<(), ion_dom::IonError>(())
//! ```

pub mod config;
pub mod dom;
pub mod error;
pub mod model;
pub mod text;

pub use config::{CursorSyncPolicy, DomConfig};
pub use dom::{Children, Cursor, Dom, SymbolPropagator};
pub use error::{IonError, Result, SurrogateKind};
pub use model::{
    ContainerKind, Context, IonType, Mutability, Scalar, SymbolTable, SymbolTableKind,
    SymbolTableRef, SymbolToken, ValueId,
};
