//! Error types for document model operations

use thiserror::Error;

use crate::model::IonType;

/// Result type for document model operations
pub type Result<T> = std::result::Result<T, IonError>;

/// Which half of a UTF-16 surrogate pair was left unmatched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurrogateKind {
    /// A high surrogate not followed by a low surrogate
    UnmatchedHigh,
    /// A low surrogate not preceded by a high surrogate
    UnmatchedLow,
}

impl std::fmt::Display for SurrogateKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SurrogateKind::UnmatchedHigh => write!(f, "unmatched high surrogate"),
            SurrogateKind::UnmatchedLow => write!(f, "unmatched low surrogate"),
        }
    }
}

/// Errors raised by the value tree, its cursors and its collaborators
///
/// Every variant is recoverable: the call that returned it left the tree
/// exactly as it was before the call.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum IonError {
    /// The value already belongs to a container
    #[error("value is already contained in another container")]
    ContainedValue,

    /// A datagram can never be nested inside another container
    #[error("a datagram can not be inserted into another container")]
    DatagramNesting,

    /// Adding the value would make a container its own descendant
    #[error("a container can not be added to itself or to one of its descendants")]
    CyclicContainment,

    /// Mutation attempted on a read-only value
    #[error("value is read-only")]
    ReadOnlyValue,

    /// Attempt to add symbols to a shared, read-only symbol table
    #[error("symbol table is read-only")]
    ReadOnlySymbolTable,

    /// Element access on a null container
    #[error("operation requires a non-null {ion_type} value")]
    NullValue {
        /// Type of the null value
        ion_type: IonType,
    },

    /// Index outside the valid child range
    #[error("index {index} out of bounds for container of size {len}")]
    IndexOutOfBounds {
        /// Requested index
        index: usize,
        /// Number of children (or upper bound for cursor start)
        len: usize,
    },

    /// Cursor moved past either end of its container
    #[error("no such element")]
    NoSuchElement,

    /// Cursor remove without a preceding next/previous
    #[error("cursor has no current element")]
    NoCurrentElement,

    /// A cursor lost track of its element after an uncoordinated mutation
    #[error("container changed during iteration: {reason}")]
    StructuralDesync {
        /// What the cursor observed
        reason: String,
    },

    /// Text contains an unmatched UTF-16 surrogate half
    #[error("text is invalid UTF-16: {kind} {code_unit:#06x} at index {index}")]
    InvalidEncoding {
        /// Offending code unit
        code_unit: u16,
        /// Position of the offending code unit
        index: usize,
        /// Which half is unmatched
        kind: SurrogateKind,
    },

    /// Handle refers to a value that has been discarded
    #[error("value handle {index}v{generation} is stale")]
    StaleHandle {
        /// Slot index of the handle
        index: u32,
        /// Generation carried by the handle
        generation: u32,
    },

    /// Container operation on a scalar
    #[error("{ion_type} is not a container")]
    NotAContainer {
        /// Actual type
        ion_type: IonType,
    },

    /// Field operation on something other than a struct
    #[error("{ion_type} is not a struct")]
    NotAStruct {
        /// Actual type
        ion_type: IonType,
    },

    /// Positional insert into a struct without a field name
    #[error("struct children require a field name")]
    FieldNameRequired,

    /// Scalar payload does not match the value's type
    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch {
        /// Type of the value being written
        expected: IonType,
        /// Type of the supplied payload
        found: IonType,
    },

    /// Operation not defined for this kind of value
    #[error("{operation} is not supported on {ion_type}")]
    Unsupported {
        /// Name of the rejected operation
        operation: &'static str,
        /// Type of the value it was attempted on
        ion_type: IonType,
    },

    /// Symbol id has no text in the governing symbol table
    #[error("symbol ${sid} has unknown text")]
    UnknownSymbol {
        /// The unresolved symbol id
        sid: u32,
    },

    /// Symbols must have at least one character
    #[error("symbol must be non-empty")]
    EmptySymbol,

    /// Byte range outside the supplied slice
    #[error("range {offset}..{offset}+{length} is outside a buffer of {len} bytes")]
    InvalidRange {
        /// Start of the requested range
        offset: usize,
        /// Length of the requested range
        length: usize,
        /// Length of the buffer
        len: usize,
    },
}

impl IonError {
    /// Whether this error reports an attempt to give a value a second owner
    /// or to nest a datagram
    pub fn is_containment_violation(&self) -> bool {
        matches!(
            self,
            IonError::ContainedValue | IonError::DatagramNesting | IonError::CyclicContainment
        )
    }

    /// Whether this error reports a mutation of locked state
    pub fn is_immutability_violation(&self) -> bool {
        matches!(self, IonError::ReadOnlyValue | IonError::ReadOnlySymbolTable)
    }

    /// Whether this error reports an index or cursor boundary violation
    pub fn is_bounds_violation(&self) -> bool {
        matches!(
            self,
            IonError::IndexOutOfBounds { .. } | IonError::NoSuchElement
        )
    }

    pub(crate) fn desync(reason: impl Into<String>) -> Self {
        IonError::StructuralDesync {
            reason: reason.into(),
        }
    }
}
