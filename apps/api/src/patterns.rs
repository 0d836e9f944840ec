//! Shared regex compilation for the heuristic text matchers.
//!
//! Pattern sets are compiled once into `Lazy<PatternSet>` statics. A compile
//! failure is kept as a value so callers can log it and degrade instead of
//! panicking inside a request.

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[error("pattern `{pattern}` failed to compile: {source}")]
pub struct PatternError {
    pub pattern: &'static str,
    #[source]
    pub source: regex::Error,
}

pub type PatternSet = Result<Vec<Regex>, PatternError>;

/// Compiles every source pattern, stopping at the first failure.
pub fn compile_all(sources: &[&'static str]) -> PatternSet {
    sources
        .iter()
        .map(|&pattern| Regex::new(pattern).map_err(|source| PatternError { pattern, source }))
        .collect()
}

/// Borrows a compiled set, cloning out the error if compilation failed.
pub fn get(set: &'static Lazy<PatternSet>) -> Result<&'static [Regex], PatternError> {
    match Lazy::force(set) {
        Ok(patterns) => Ok(patterns.as_slice()),
        Err(e) => Err(e.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    static BROKEN: Lazy<PatternSet> = Lazy::new(|| compile_all(&[r"\d+", r"(unclosed"]));

    #[test]
    fn test_compile_all_reports_offending_pattern() {
        let err = get(&BROKEN).unwrap_err();
        assert_eq!(err.pattern, r"(unclosed");
        assert!(err.to_string().contains("(unclosed"));
    }

    #[test]
    fn test_compile_all_keeps_order() {
        let set = compile_all(&[r"a", r"b"]).unwrap();
        assert_eq!(set[0].as_str(), "a");
        assert_eq!(set[1].as_str(), "b");
    }
}
