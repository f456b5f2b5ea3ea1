// 🔣 Symbol Extractor - LaTeX inline math → bare symbol names
// Best-effort heuristic, not a LaTeX parser: it targets the conventions
// used by the model specification documents and nothing more.

use once_cell::sync::Lazy;
use regex::Regex;

// ============================================================================
// REGEXES
// ============================================================================

/// Inline math span: `\( ... \)`, non-greedy via the negated class.
/// Nested delimiters are not supported.
static INLINE_MATH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\\\(([^)]+)\\\)").expect("inline math regex"));

/// Subscript/superscript decoration: `_t`, `_{t+1}`, `^i`, `^{j,k}`, ...
static DECORATION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[_^]\{?[\w+\-,]+\}?").expect("decoration regex"));

/// Bare identifier fallback for undelimited cells like `K` or `i_lag`.
static BARE_SYMBOL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_]+$").expect("bare symbol regex"));

// ============================================================================
// EXTRACTION
// ============================================================================

/// Extract normalized symbol names from a text fragment.
///
/// # Strategy:
/// 1. Collect every `\( ... \)` span in order.
/// 2. No spans: if the whole trimmed input looks like a bare identifier,
///    return it as the single symbol; otherwise return nothing.
/// 3. Per span: delete sub/superscript decorations, delete backslashes,
///    then split on `,` or `/` into sub-tokens.
///
/// Duplicates are kept; deduplication is the registry's job, not ours.
/// Malformed LaTeX yields whatever the regex happens to match.
pub fn extract_symbols(text: &str) -> Vec<String> {
    let spans: Vec<&str> = INLINE_MATH
        .captures_iter(text)
        .filter_map(|c| c.get(1).map(|m| m.as_str()))
        .collect();

    if spans.is_empty() {
        let trimmed = text.trim();
        if BARE_SYMBOL.is_match(trimmed) {
            return vec![trimmed.to_string()];
        }
        return Vec::new();
    }

    let mut symbols = Vec::new();
    for span in spans {
        let cleaned = DECORATION.replace_all(span, "");
        let cleaned = cleaned.replace('\\', "");
        for token in cleaned.split(|c| c == ',' || c == '/') {
            let token = token.trim();
            if !token.is_empty() {
                symbols.push(token.to_string());
            }
        }
    }
    symbols
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_subscript() {
        assert_eq!(extract_symbols("\\(c_t\\)"), vec!["c"]);
    }

    #[test]
    fn test_strips_braced_subscript_and_backslash() {
        assert_eq!(extract_symbols("\\(\\pi_{t+1}\\)"), vec!["pi"]);
    }

    #[test]
    fn test_splits_on_comma() {
        assert_eq!(extract_symbols("\\(a, b\\)"), vec!["a", "b"]);
    }

    #[test]
    fn test_splits_on_slash() {
        assert_eq!(extract_symbols("\\(c/h\\)"), vec!["c", "h"]);
    }

    #[test]
    fn test_bare_identifier_fallback() {
        assert_eq!(extract_symbols("K"), vec!["K"]);
        assert_eq!(extract_symbols("  i_lag  "), vec!["i_lag"]);
    }

    #[test]
    fn test_prose_yields_nothing() {
        assert!(extract_symbols("not a symbol!!").is_empty());
        assert!(extract_symbols("").is_empty());
    }

    #[test]
    fn test_superscript_stripped() {
        assert_eq!(extract_symbols("\\(e^{-gamma}_A\\)"), vec!["e"]);
    }

    #[test]
    fn test_multiple_spans_in_order() {
        assert_eq!(
            extract_symbols("state \\(K_t\\) and jump \\(pi_t\\)"),
            vec!["K", "pi"]
        );
    }

    #[test]
    fn test_duplicates_kept() {
        assert_eq!(extract_symbols("\\(z_t, z_t\\)"), vec!["z", "z"]);
    }

    #[test]
    fn test_idempotent_on_normalized_symbol() {
        let first = extract_symbols("\\(\\pi_t\\)");
        assert_eq!(first, vec!["pi"]);
        let rewrapped = format!("\\({}\\)", first.join(", "));
        assert_eq!(extract_symbols(&rewrapped), first);
    }
}
