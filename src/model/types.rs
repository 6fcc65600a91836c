//! Value kinds and per-kind storage tuning tables

use std::fmt;

/// The fixed set of value kinds in the data model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum IonType {
    /// The untyped null
    Null,
    /// Boolean
    Bool,
    /// Signed integer
    Int,
    /// Binary floating point
    Float,
    /// Arbitrary precision decimal
    Decimal,
    /// Point in time with offset
    Timestamp,
    /// Symbolic atom (text or symbol id)
    Symbol,
    /// Unicode text
    String,
    /// Character large object
    Clob,
    /// Binary large object
    Blob,
    /// Ordered list
    List,
    /// S-expression
    Sexp,
    /// Record of named fields
    Struct,
    /// Top-level multi-value envelope
    Datagram,
}

impl IonType {
    /// Check if values of this type hold children
    pub fn is_container(self) -> bool {
        self.container_kind().is_some()
    }

    /// Check if this is a list or sexp
    pub fn is_sequence(self) -> bool {
        matches!(self, IonType::List | IonType::Sexp)
    }

    /// Storage kind for container types
    pub fn container_kind(self) -> Option<ContainerKind> {
        match self {
            IonType::List => Some(ContainerKind::List),
            IonType::Sexp => Some(ContainerKind::Sexp),
            IonType::Struct => Some(ContainerKind::Struct),
            IonType::Datagram => Some(ContainerKind::Datagram),
            _ => None,
        }
    }

    /// Lower-case type keyword, as used in typed nulls (`null.int`)
    pub fn name(self) -> &'static str {
        match self {
            IonType::Null => "null",
            IonType::Bool => "bool",
            IonType::Int => "int",
            IonType::Float => "float",
            IonType::Decimal => "decimal",
            IonType::Timestamp => "timestamp",
            IonType::Symbol => "symbol",
            IonType::String => "string",
            IonType::Clob => "clob",
            IonType::Blob => "blob",
            IonType::List => "list",
            IonType::Sexp => "sexp",
            IonType::Struct => "struct",
            IonType::Datagram => "datagram",
        }
    }
}

impl fmt::Display for IonType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Container kinds, each with its own growth tuning
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContainerKind {
    /// List
    List,
    /// S-expression
    Sexp,
    /// Struct
    Struct,
    /// Datagram
    Datagram,
}

/// Two-stage growth tuning for a container kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GrowthPolicy {
    /// Capacity of the first allocation
    pub initial: usize,
    /// Capacity of the second allocation; doubling takes over afterwards
    pub plateau: usize,
}

/// Indexed by `ContainerKind as usize`
static GROWTH_TABLE: [GrowthPolicy; 4] = [
    GrowthPolicy { initial: 1, plateau: 4 },
    GrowthPolicy { initial: 4, plateau: 8 },
    GrowthPolicy { initial: 5, plateau: 8 },
    GrowthPolicy { initial: 3, plateau: 10 },
];

/// Structs switch to a name index once they hold more children than this
pub const STRUCT_FIELD_INDEX_THRESHOLD: usize = 5;

impl ContainerKind {
    /// The matching value type
    pub fn ion_type(self) -> IonType {
        match self {
            ContainerKind::List => IonType::List,
            ContainerKind::Sexp => IonType::Sexp,
            ContainerKind::Struct => IonType::Struct,
            ContainerKind::Datagram => IonType::Datagram,
        }
    }

    /// Growth tuning for this kind
    pub fn growth(self) -> &'static GrowthPolicy {
        &GROWTH_TABLE[self as usize]
    }

    /// Capacity to allocate when an array of `current` slots is full
    pub fn next_capacity(self, current: usize) -> usize {
        let policy = self.growth();
        if current == 0 {
            policy.initial
        } else if policy.plateau > current {
            policy.plateau
        } else {
            current * 2
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_container_classification() {
        assert!(IonType::List.is_container());
        assert!(IonType::Datagram.is_container());
        assert!(!IonType::Symbol.is_container());
        assert!(IonType::Sexp.is_sequence());
        assert!(!IonType::Struct.is_sequence());
        assert_eq!(IonType::Struct.container_kind(), Some(ContainerKind::Struct));
        assert_eq!(ContainerKind::Datagram.ion_type(), IonType::Datagram);
    }

    #[test]
    fn test_growth_sequence() {
        let grow = |kind: ContainerKind, steps: usize| {
            let mut sizes = Vec::new();
            let mut current = 0;
            for _ in 0..steps {
                current = kind.next_capacity(current);
                sizes.push(current);
            }
            sizes
        };

        assert_eq!(grow(ContainerKind::List, 4), vec![1, 4, 8, 16]);
        assert_eq!(grow(ContainerKind::Sexp, 3), vec![4, 8, 16]);
        assert_eq!(grow(ContainerKind::Struct, 3), vec![5, 8, 16]);
        assert_eq!(grow(ContainerKind::Datagram, 3), vec![3, 10, 20]);
    }

    #[test]
    fn test_type_names() {
        assert_eq!(IonType::Timestamp.to_string(), "timestamp");
        assert_eq!(IonType::Null.name(), "null");
    }
}
