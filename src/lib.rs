// Model Blueprint - Core Library
// Consolidates the model's symbol definitions into one registry and runs
// consistency checks over it. Exposed as a library for the CLI and tests.

pub mod checks;
pub mod extract;
pub mod registry;
pub mod sources;
pub mod table;

// Re-export commonly used types
pub use checks::{CheckResult, CheckStatus, ConsistencyChecker};
pub use extract::extract_symbols;
pub use registry::{
    Category, RegistryBuilder, SourceId, SymbolRecord, SymbolRegistry, SymbolUpdate, Timing,
};
pub use sources::{DocumentStore, ProcessEntry, SourceKind, StateEntry, StatesDoc};
pub use table::{parse_table, Table};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
