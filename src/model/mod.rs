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

//! Value model: kinds, scalar payloads, symbols and arena nodes

pub mod node;
pub mod scalar;
pub mod string_intern;
pub mod symbol;
pub mod types;

pub use node::{Context, Mutability, ValueId};
pub use scalar::Scalar;
pub use string_intern::{InternerStats, global_interner_stats, intern_symbol_text};
pub use symbol::{
    SYSTEM_MAX_ID, SYSTEM_SYMBOLS, SymbolTable, SymbolTableKind, SymbolTableRef, SymbolToken,
    system_symbol_table,
};
pub use types::{ContainerKind, GrowthPolicy, IonType, STRUCT_FIELD_INDEX_THRESHOLD};
