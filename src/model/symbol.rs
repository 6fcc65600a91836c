//! Symbol tokens and symbol tables
//!
//! A symbol table maps small integer ids to text so that repeated field
//! names, annotations and symbol values can be encoded compactly. Tokens in
//! the tree always carry text when it is known; the id is resolution state
//! that is only meaningful relative to the table governing the token's tree.

use indexmap::IndexSet;
use parking_lot::RwLock;
use rustc_hash::FxBuildHasher;
use std::fmt;
use std::sync::Arc;

use super::string_intern::intern_symbol_text;
use crate::error::{IonError, Result};

/// Text of the system symbols, in sid order starting at 1
pub const SYSTEM_SYMBOLS: [&str; 9] = [
    "$ion",
    "$ion_1_0",
    "$ion_symbol_table",
    "name",
    "version",
    "imports",
    "symbols",
    "max_id",
    "$ion_shared_symbol_table",
];

/// Highest sid defined by the system symbol table
pub const SYSTEM_MAX_ID: u32 = SYSTEM_SYMBOLS.len() as u32;

/// Shared handle to a symbol table
pub type SymbolTableRef = Arc<RwLock<SymbolTable>>;

/// A symbolic reference: text, a resolved symbol id, or both
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct SymbolToken {
    text: Option<Arc<str>>,
    sid: Option<u32>,
}

impl SymbolToken {
    /// Token with known text and no resolved id
    pub fn from_text(text: impl AsRef<str>) -> Self {
        Self {
            text: Some(intern_symbol_text(text)),
            sid: None,
        }
    }

    /// Token known only by id, as produced by a binary decoder
    pub fn from_sid(sid: u32) -> Self {
        Self {
            text: None,
            sid: Some(sid),
        }
    }

    /// Token with both parts supplied
    pub fn new(text: Option<Arc<str>>, sid: Option<u32>) -> Self {
        Self { text, sid }
    }

    /// Text of the symbol, if known
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    /// Shared text of the symbol, if known
    pub fn text_arc(&self) -> Option<&Arc<str>> {
        self.text.as_ref()
    }

    /// Resolved symbol id, if any
    pub fn sid(&self) -> Option<u32> {
        self.sid
    }

    /// Whether the token carries a resolved id
    pub fn is_resolved(&self) -> bool {
        self.sid.is_some()
    }

    /// Whether this token spells `text`
    pub fn matches_text(&self, text: &str) -> bool {
        self.text.as_deref() == Some(text)
    }

    /// Copy of this token with resolution state dropped
    ///
    /// Fails when the text is unknown, since the id alone means nothing
    /// outside the table that produced it.
    pub fn unresolved_copy(&self) -> Result<Self> {
        match (&self.text, self.sid) {
            (Some(text), _) => Ok(Self {
                text: Some(Arc::clone(text)),
                sid: None,
            }),
            (None, Some(sid)) => Err(IonError::UnknownSymbol { sid }),
            (None, None) => Err(IonError::EmptySymbol),
        }
    }

    pub(crate) fn set_sid(&mut self, sid: u32) {
        self.sid = Some(sid);
    }

    /// Fill in missing text from `table`, then drop the id if text is known
    pub(crate) fn clear_sid(&mut self, table: Option<&SymbolTable>) {
        if self.text.is_none() {
            if let (Some(sid), Some(table)) = (self.sid, table) {
                self.text = table.find_text(sid);
            }
        }
        if self.text.is_some() {
            self.sid = None;
        }
    }
}

impl fmt::Debug for SymbolToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.text, self.sid) {
            (Some(text), Some(sid)) => write!(f, "{text:?}${sid}"),
            (Some(text), None) => write!(f, "{text:?}"),
            (None, Some(sid)) => write!(f, "${sid}"),
            (None, None) => write!(f, "<empty>"),
        }
    }
}

impl From<&str> for SymbolToken {
    fn from(text: &str) -> Self {
        Self::from_text(text)
    }
}

/// Kind of symbol table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolTableKind {
    /// The shared, immutable system table
    System,
    /// A document-local table extending the system table
    Local,
}

/// Mapping between symbol ids and text
///
/// Sid 0 is reserved and never maps to text; sids `1..=SYSTEM_MAX_ID` are
/// the system symbols, local symbols follow.
#[derive(Debug, Clone)]
pub struct SymbolTable {
    kind: SymbolTableKind,
    symbols: IndexSet<Arc<str>, FxBuildHasher>,
}

static SYSTEM_TABLE: once_cell::sync::Lazy<SymbolTableRef> =
    once_cell::sync::Lazy::new(|| Arc::new(RwLock::new(SymbolTable::system())));

/// The process-wide shared system symbol table
pub fn system_symbol_table() -> SymbolTableRef {
    Arc::clone(&SYSTEM_TABLE)
}

impl SymbolTable {
    fn with_system_symbols(kind: SymbolTableKind) -> Self {
        let mut symbols = IndexSet::with_capacity_and_hasher(SYSTEM_SYMBOLS.len(), FxBuildHasher);
        for text in SYSTEM_SYMBOLS {
            symbols.insert(intern_symbol_text(text));
        }
        Self { kind, symbols }
    }

    /// A standalone system table
    pub fn system() -> Self {
        Self::with_system_symbols(SymbolTableKind::System)
    }

    /// A fresh local table importing the system symbols
    pub fn local() -> Self {
        Self::with_system_symbols(SymbolTableKind::Local)
    }

    /// A fresh local table behind a shared handle
    pub fn new_local_ref() -> SymbolTableRef {
        Arc::new(RwLock::new(Self::local()))
    }

    /// Kind of this table
    pub fn kind(&self) -> SymbolTableKind {
        self.kind
    }

    /// Check if this is the system table
    pub fn is_system(&self) -> bool {
        self.kind == SymbolTableKind::System
    }

    /// Check if this is a local table
    pub fn is_local(&self) -> bool {
        self.kind == SymbolTableKind::Local
    }

    /// Highest assigned sid
    pub fn max_id(&self) -> u32 {
        self.symbols.len() as u32
    }

    /// Lowest sid whose text is `text`
    pub fn find_sid(&self, text: &str) -> Option<u32> {
        self.symbols.get_index_of(text).map(|index| index as u32 + 1)
    }

    /// Text for `sid`
    pub fn find_text(&self, sid: u32) -> Option<Arc<str>> {
        if sid == 0 {
            return None;
        }
        self.symbols.get_index(sid as usize - 1).cloned()
    }

    /// Sid for `text`, adding it to a local table when missing
    pub fn intern(&mut self, text: &str) -> Result<u32> {
        if let Some(sid) = self.find_sid(text) {
            return Ok(sid);
        }
        if self.is_system() {
            return Err(IonError::ReadOnlySymbolTable);
        }
        let (index, _) = self.symbols.insert_full(intern_symbol_text(text));
        Ok(index as u32 + 1)
    }

    /// Symbols defined beyond the system table, in sid order
    pub fn local_symbols(&self) -> impl Iterator<Item = &str> {
        self.symbols
            .iter()
            .skip(SYSTEM_SYMBOLS.len())
            .map(|text| text.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_table_lookup() {
        let table = SymbolTable::system();
        assert_eq!(table.find_sid("$ion"), Some(1));
        assert_eq!(table.find_sid("$ion_symbol_table"), Some(3));
        assert_eq!(table.find_text(9).as_deref(), Some("$ion_shared_symbol_table"));
        assert_eq!(table.find_text(0), None);
        assert_eq!(table.find_text(10), None);
        assert_eq!(table.max_id(), SYSTEM_MAX_ID);
    }

    #[test]
    fn test_system_table_is_read_only() {
        let mut table = SymbolTable::system();
        assert_eq!(table.intern("name"), Ok(4));
        assert_eq!(table.intern("brand_new"), Err(IonError::ReadOnlySymbolTable));
    }

    #[test]
    fn test_local_table_interning() {
        let mut table = SymbolTable::local();
        assert_eq!(table.intern("foo"), Ok(10));
        assert_eq!(table.intern("bar"), Ok(11));
        assert_eq!(table.intern("foo"), Ok(10));
        assert_eq!(table.max_id(), 11);
        assert_eq!(table.local_symbols().collect::<Vec<_>>(), vec!["foo", "bar"]);
    }

    #[test]
    fn test_token_clear_sid() {
        let table = SymbolTable::system();

        let mut by_sid = SymbolToken::from_sid(4);
        by_sid.clear_sid(Some(&table));
        assert_eq!(by_sid.text(), Some("name"));
        assert_eq!(by_sid.sid(), None);

        let mut unknown = SymbolToken::from_sid(99);
        unknown.clear_sid(Some(&table));
        assert_eq!(unknown.text(), None);
        assert_eq!(unknown.sid(), Some(99));
    }

    #[test]
    fn test_unresolved_copy() {
        let mut token = SymbolToken::from_text("abc");
        token.set_sid(12);
        let copy = token.unresolved_copy().unwrap();
        assert_eq!(copy.text(), Some("abc"));
        assert!(!copy.is_resolved());

        assert_eq!(
            SymbolToken::from_sid(42).unresolved_copy(),
            Err(IonError::UnknownSymbol { sid: 42 })
        );
    }
}
