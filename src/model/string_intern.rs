// Copyright 2024 OctoFHIR Team
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Interning of symbol text
//!
//! Field names, annotations and symbol values repeat heavily across a
//! document. Interning their text lets every token share one `Arc<str>`
//! per distinct spelling.

use dashmap::DashMap;
use std::sync::Arc;

use super::symbol::SYSTEM_SYMBOLS;

/// Thread-safe text interner using Arc for shared ownership
pub struct SymbolTextInterner {
    cache: DashMap<Box<str>, Arc<str>>,
}

impl Default for SymbolTextInterner {
    fn default() -> Self {
        Self::new()
    }
}

impl SymbolTextInterner {
    /// Create a new, empty interner
    pub fn new() -> Self {
        Self {
            cache: DashMap::new(),
        }
    }

    /// Intern text, returning a shared `Arc<str>`
    pub fn intern<S: AsRef<str>>(&self, s: S) -> Arc<str> {
        let text = s.as_ref();

        if let Some(interned) = self.cache.get(text) {
            return Arc::clone(&interned);
        }

        match self.cache.entry(Box::from(text)) {
            dashmap::mapref::entry::Entry::Occupied(entry) => Arc::clone(entry.get()),
            dashmap::mapref::entry::Entry::Vacant(entry) => {
                let interned: Arc<str> = Arc::from(text);
                entry.insert(Arc::clone(&interned));
                interned
            }
        }
    }

    /// Number of distinct spellings held
    pub fn stats(&self) -> InternerStats {
        InternerStats {
            entries: self.cache.len(),
        }
    }
}

/// Statistics about text interning
#[derive(Debug, Clone)]
pub struct InternerStats {
    /// Number of unique strings interned
    pub entries: usize,
}

static GLOBAL_INTERNER: once_cell::sync::Lazy<SymbolTextInterner> =
    once_cell::sync::Lazy::new(|| {
        let interner = SymbolTextInterner::new();
        for text in SYSTEM_SYMBOLS {
            interner.intern(text);
        }
        interner
    });

/// Intern symbol text using the global interner
pub fn intern_symbol_text<S: AsRef<str>>(s: S) -> Arc<str> {
    GLOBAL_INTERNER.intern(s)
}

/// Statistics from the global interner
pub fn global_interner_stats() -> InternerStats {
    GLOBAL_INTERNER.stats()
}
