// ✅ Consistency Checker - six structural rules over a built registry
// Each check is independent, side-effect-free, and always returns a
// result: an empty registry produces degraded verdicts, never an error.

use crate::registry::{Category, SourceId, SymbolRegistry};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

// ============================================================================
// CHECK RESULT
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CheckStatus {
    Pass,
    Warn,
    Fail,
}

impl CheckStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckStatus::Pass => "PASS",
            CheckStatus::Warn => "WARN",
            CheckStatus::Fail => "FAIL",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckResult {
    pub name: String,
    pub score: u8,
    pub status: CheckStatus,
    pub message: String,
}

impl CheckResult {
    fn pass(name: &str, message: impl Into<String>) -> Self {
        CheckResult {
            name: name.to_string(),
            score: 100,
            status: CheckStatus::Pass,
            message: message.into(),
        }
    }

    fn warn(name: &str, score: u8, message: impl Into<String>) -> Self {
        CheckResult {
            name: name.to_string(),
            score,
            status: CheckStatus::Warn,
            message: message.into(),
        }
    }

    fn fail(name: &str, score: u8, message: impl Into<String>) -> Self {
        CheckResult {
            name: name.to_string(),
            score,
            status: CheckStatus::Fail,
            message: message.into(),
        }
    }
}

// ============================================================================
// CHECKER
// ============================================================================

/// Domain blocks the scope document must mention. `intermediar` matches
/// both "intermediary" and "intermediaries".
const REQUIRED_BLOCKS: [&str; 5] = ["household", "firm", "intermediar", "monetary", "disaster"];

/// States with no transition use by construction; exempt from closure.
const CLOSURE_ALLOWLIST: [&str; 3] = ["pD", "z", "i_lag"];

/// Runs the fixed battery of six checks. Holds the scope document's raw
/// text, which only the structural check consumes.
pub struct ConsistencyChecker {
    scope: String,
}

impl ConsistencyChecker {
    pub fn new(scope: impl Into<String>) -> Self {
        ConsistencyChecker {
            scope: scope.into(),
        }
    }

    /// All six checks, fixed order, no short-circuiting.
    pub fn run(&self, registry: &SymbolRegistry) -> Vec<CheckResult> {
        vec![
            self.structural_integrity(),
            self.timing_coverage(registry),
            self.shock_logic(registry),
            self.naming_consistency(registry),
            self.disaster_logic(registry),
            self.closure_checks(registry),
        ]
    }

    /// 1. The scope document must mention every core domain block.
    fn structural_integrity(&self) -> CheckResult {
        let scope = self.scope.to_lowercase();
        let missing: Vec<&str> = REQUIRED_BLOCKS
            .iter()
            .copied()
            .filter(|block| !scope.contains(block))
            .collect();

        if missing.is_empty() {
            CheckResult::pass("Structural Integrity", "All core blocks detected in scope.")
        } else {
            CheckResult::warn(
                "Structural Integrity",
                60,
                format!("Missing blocks: {}", missing.join(", ")),
            )
        }
    }

    /// 2. Coverage proxy: the timing sheet should mention at least as many
    /// symbols as the canonical YAML declares.
    fn timing_coverage(&self, registry: &SymbolRegistry) -> CheckResult {
        let yaml_count = registry
            .records()
            .filter(|r| r.defined_by(SourceId::StatesYaml))
            .count();
        let timing_count = registry
            .records()
            .filter(|r| r.defined_by(SourceId::TimingMd))
            .count();

        if yaml_count <= timing_count {
            CheckResult::pass(
                "Timing Coverage",
                format!(
                    "Every state/jump appearing in YAML ({}) is mapped in Timing sheet ({}).",
                    yaml_count, timing_count
                ),
            )
        } else {
            CheckResult::warn(
                "Timing Coverage",
                70,
                format!(
                    "Timing sheet ({}) lags behind YAML declarations ({}).",
                    timing_count, yaml_count
                ),
            )
        }
    }

    /// 3. Every shock must name at least one entry-point equation.
    fn shock_logic(&self, registry: &SymbolRegistry) -> CheckResult {
        let issues: Vec<&str> = registry
            .records()
            .filter(|r| r.category == Category::Shock && r.used_in.is_empty())
            .map(|r| r.symbol.as_str())
            .collect();

        if issues.is_empty() {
            CheckResult::pass("Shock Logic", "All shocks have targets and entry points.")
        } else {
            CheckResult::warn(
                "Shock Logic",
                70,
                format!("Shocks missing entry points: {}", issues.join(", ")),
            )
        }
    }

    /// 4. Symbol names must stay unique after lower-casing; `R` vs `r` is
    /// a collision even though identity is case-sensitive.
    fn naming_consistency(&self, registry: &SymbolRegistry) -> CheckResult {
        let mut seen = BTreeSet::new();
        let mut collisions = BTreeSet::new();
        for symbol in registry.symbols() {
            if !seen.insert(symbol.to_lowercase()) {
                collisions.insert(symbol.to_lowercase());
            }
        }

        if collisions.is_empty() {
            CheckResult::pass(
                "Naming Consistency",
                "All symbols follow case-sensitive uniqueness.",
            )
        } else {
            let listed: Vec<String> = collisions.into_iter().collect();
            CheckResult::fail(
                "Naming Consistency",
                40,
                format!("Collisions detected: {}", listed.join(", ")),
            )
        }
    }

    /// 5. The disaster block needs its probability, its shock, and at
    /// least one damage wedge.
    fn disaster_logic(&self, registry: &SymbolRegistry) -> CheckResult {
        let complete = registry.contains("pD")
            && registry.contains("sD")
            && (registry.contains("damage_A") || registry.contains("damage_K"));

        if complete {
            CheckResult::pass(
                "Disaster Logic",
                "pD, sD, and damage wedges are correctly linked.",
            )
        } else {
            CheckResult::fail(
                "Disaster Logic",
                50,
                "Disaster module incomplete (check pD/sD or wedges).",
            )
        }
    }

    /// 6. Every state must feed some transition, except the allow-listed
    /// terminal-use symbols.
    fn closure_checks(&self, registry: &SymbolRegistry) -> CheckResult {
        let orphans: Vec<&str> = registry
            .records()
            .filter(|r| {
                r.category.is_state()
                    && r.used_in.is_empty()
                    && !CLOSURE_ALLOWLIST.contains(&r.symbol.as_str())
            })
            .map(|r| r.symbol.as_str())
            .collect();

        if orphans.is_empty() {
            CheckResult::pass("Closure Checks", "Every state has clear transition dependency.")
        } else {
            CheckResult::warn(
                "Closure Checks",
                60,
                format!("Orphan states (missing rules): {}", orphans.join(", ")),
            )
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
