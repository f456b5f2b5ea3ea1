// 📂 Source Loaders - the four canonical model specification documents
// Pure I/O with a soft-missing policy: a partial document set still yields
// a partial, inspectable registry downstream. Nothing here ever errors.

use serde_yaml::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

// ============================================================================
// SOURCE KINDS
// ============================================================================

/// The four logical source documents of a model blueprint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Scope,
    Shocks,
    Timing,
    States,
}

impl SourceKind {
    pub const ALL: [SourceKind; 4] = [
        SourceKind::Scope,
        SourceKind::Shocks,
        SourceKind::Timing,
        SourceKind::States,
    ];

    /// Short key used in blueprint bundles and CLI output.
    pub fn key(&self) -> &'static str {
        match self {
            SourceKind::Scope => "scope",
            SourceKind::Shocks => "shocks",
            SourceKind::Timing => "timing",
            SourceKind::States => "states",
        }
    }

    /// Canonical filename under the specs directory.
    pub fn filename(&self) -> &'static str {
        match self {
            SourceKind::Scope => "D0_1_scope.md",
            SourceKind::Shocks => "D0_1_shocks.md",
            SourceKind::Timing => "D0_1_timing_sheet.md",
            SourceKind::States => "D0_1_states.yaml",
        }
    }
}

// ============================================================================
// STATES DOCUMENT
// ============================================================================

/// One named entry in a states group. Metadata beyond what the registry
/// consumes is ignored at load time.
#[derive(Debug, Clone, Default)]
pub struct StateEntry {
    pub name: String,
    /// `type:` field, e.g. `shock` for disaster innovations.
    pub kind: Option<String>,
    /// `timing.choice_at_t` control-variable hint (household states only).
    pub choice_at_t: Option<String>,
}

/// A process and its optional innovation shock.
#[derive(Debug, Clone, Default)]
pub struct ProcessEntry {
    pub name: String,
    /// `shock.name` of the nested innovation, when declared.
    pub shock_name: Option<String>,
}

/// Structured view of the states YAML. Group order follows the document.
///
/// Parsing is tolerant entry by entry: a scalar where a mapping was
/// expected still contributes a name-only entry instead of poisoning the
/// whole document.
#[derive(Debug, Clone, Default)]
pub struct StatesDoc {
    pub household_states: Vec<StateEntry>,
    pub aggregate_states: Vec<StateEntry>,
    pub aggregate_jumps: Vec<StateEntry>,
    pub disaster_states: Vec<StateEntry>,
    pub processes: Vec<ProcessEntry>,
    pub derived_objects: Vec<StateEntry>,
}

impl StatesDoc {
    /// Parse from raw YAML text. Unparseable YAML yields an empty document.
    pub fn from_yaml(text: &str) -> Self {
        let root: Value = match serde_yaml::from_str(text) {
            Ok(v) => v,
            Err(e) => {
                debug!(error = %e, "states YAML unparseable, using empty document");
                return StatesDoc::default();
            }
        };

        StatesDoc {
            household_states: state_group(&root, "household_states"),
            aggregate_states: state_group(&root, "aggregate_states"),
            aggregate_jumps: state_group(&root, "aggregate_jumps"),
            disaster_states: state_group(&root, "disaster_states"),
            processes: process_group(&root, "processes"),
            derived_objects: state_group(&root, "derived_objects"),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.household_states.is_empty()
            && self.aggregate_states.is_empty()
            && self.aggregate_jumps.is_empty()
            && self.disaster_states.is_empty()
            && self.processes.is_empty()
            && self.derived_objects.is_empty()
    }
}

fn state_group(root: &Value, group: &str) -> Vec<StateEntry> {
    group_entries(root, group)
        .into_iter()
        .map(|(name, meta)| StateEntry {
            name,
            kind: str_at(&meta, &["type"]),
            choice_at_t: str_at(&meta, &["timing", "choice_at_t"]),
        })
        .collect()
}

fn process_group(root: &Value, group: &str) -> Vec<ProcessEntry> {
    group_entries(root, group)
        .into_iter()
        .map(|(name, meta)| ProcessEntry {
            name,
            shock_name: str_at(&meta, &["shock", "name"]),
        })
        .collect()
}

/// Named entries of a top-level group mapping, in document order.
fn group_entries(root: &Value, group: &str) -> Vec<(String, Value)> {
    let Some(mapping) = root.get(group).and_then(Value::as_mapping) else {
        return Vec::new();
    };
    mapping
        .iter()
        .filter_map(|(k, v)| k.as_str().map(|k| (k.to_string(), v.clone())))
        .collect()
}

/// String value at a nested key path, if every step is a mapping.
fn str_at(value: &Value, path: &[&str]) -> Option<String> {
    let mut current = value;
    for key in path {
        current = current.get(key)?;
    }
    current.as_str().map(str::to_string)
}

// ============================================================================
// DOCUMENT STORE
// ============================================================================

/// Read-only access to the specs directory.
///
/// Missing or unreadable files degrade to empty content; the checker's job
/// is to surface incompleteness, not to require completeness up front.
#[derive(Debug, Clone)]
pub struct DocumentStore {
    dir: PathBuf,
}

impl DocumentStore {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        DocumentStore {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    /// Resolved path of a source document.
    pub fn path(&self, kind: SourceKind) -> PathBuf {
        self.dir.join(kind.filename())
    }

    /// Raw text of a source document, or `""` when missing/unreadable.
    pub fn read(&self, kind: SourceKind) -> String {
        let path = self.path(kind);
        match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) => {
                debug!(path = %path.display(), error = %e, "source missing, using empty content");
                String::new()
            }
        }
    }

    /// The states document parsed as structure. Empty on missing/bad YAML.
    pub fn states(&self) -> StatesDoc {
        StatesDoc::from_yaml(&self.read(SourceKind::States))
    }

    /// Raw contents of all four documents keyed as `{key}_content`, with a
    /// placeholder note for files that are not on disk.
    pub fn blueprint(&self) -> Vec<(String, String)> {
        SourceKind::ALL
            .iter()
            .map(|kind| {
                let path = self.path(*kind);
                let content = if path.exists() {
                    self.read(*kind)
                } else {
                    format!("# Error: {} not found", path.display())
                };
                (format!("{}_content", kind.key()), content)
            })
            .collect()
    }
}

// ============================================================================
// TESTS
// ============================================================================
