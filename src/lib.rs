//! Document query core: a document state model with diff and apply, an NXQL
//! predicate evaluator with three-valued logic, fulltext query analysis, a
//! query optimizer and a scroll cursor service.
//!
//! ```text
//! core      error, config
//! state     State / StateValue, copy, equality, diff, apply, json
//! analysis  tokenizer + filters, fulltext query parsing, translation, matching
//! query     ast, evaluator over a ReferenceResolver, optimizer
//! schema    TypeRegistry, SchemaRegistry
//! search    CursorService, scroll results, clocks
//! ```

pub mod core;
pub mod state;
pub mod analysis;
pub mod query;
pub mod schema;
pub mod search;
