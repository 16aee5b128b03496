//! Identity validation
//!
//! Decides whether the name typed into a row is admissible under the
//! column's data-validation rule.
//!
//! # Policy
//!
//! This gate protects a reminder workflow, not access to anything, so it
//! leans towards admitting:
//!
//! - a blank name is never admissible
//! - no rule, an empty list, or an unrecognized rule admits any name
//! - list and range rules compare trimmed values, case-sensitively
//!
//! `check_identity` reports when it cannot decide (a range that does not
//! resolve). Callers merge `FAIL_OPEN` for that case.

mod errors;
mod rule;

pub use errors::{ValidationError, ValidationResult};
pub use rule::ValidationRule;

use crate::table::{CellValue, TableResult, TableStore};

/// Decision applied when `check_identity` returns an error.
pub const FAIL_OPEN: bool = true;

/// Anything that can flatten a range reference into cell values.
pub trait RangeSource {
    fn values_of(&self, reference: &str) -> TableResult<Vec<CellValue>>;
}

impl<T: TableStore + ?Sized> RangeSource for T {
    fn values_of(&self, reference: &str) -> TableResult<Vec<CellValue>> {
        self.resolve_range(reference)
    }
}

/// Decide admissibility of `identity` under `rule`.
///
/// # Errors
///
/// Returns `ValidationError` only for range rules whose reference is missing
/// or cannot be resolved.
pub fn check_identity<R: RangeSource + ?Sized>(
    rule: Option<&ValidationRule>,
    identity: &str,
    ranges: &R,
) -> ValidationResult<bool> {
    let candidate = identity.trim();
    if candidate.is_empty() {
        return Ok(false);
    }

    let rule = match rule {
        Some(rule) => rule,
        None => return Ok(true),
    };

    match rule {
        ValidationRule::List { values } if values.is_empty() => Ok(true),
        ValidationRule::List { values } => Ok(values.iter().any(|v| v.trim() == candidate)),
        ValidationRule::Range { reference } => {
            let reference = reference
                .as_deref()
                .filter(|r| !r.trim().is_empty())
                .ok_or(ValidationError::MissingReference)?;
            let allowed = ranges.values_of(reference).map_err(|source| {
                ValidationError::RangeResolution {
                    reference: reference.to_string(),
                    source,
                }
            })?;
            Ok(allowed.iter().any(|v| v.trimmed() == candidate))
        }
        ValidationRule::Unrecognized => Ok(true),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::{MemoryTable, TableError};

    fn roster() -> MemoryTable {
        MemoryTable::default().with_named_range(
            "Roster",
            vec![
                CellValue::text(" alice "),
                CellValue::text("bob"),
                CellValue::Empty,
            ],
        )
    }

    #[test]
    fn test_blank_identity_rejected_without_rule() {
        let table = roster();
        assert!(!check_identity(None, "", &table).unwrap());
        assert!(!check_identity(None, "   ", &table).unwrap());
    }

    #[test]
    fn test_blank_identity_rejected_with_open_rule() {
        let table = roster();
        let rule = ValidationRule::Unrecognized;
        assert!(!check_identity(Some(&rule), " ", &table).unwrap());
    }

    #[test]
    fn test_no_rule_admits() {
        let table = roster();
        assert!(check_identity(None, "anyone", &table).unwrap());
    }

    #[test]
    fn test_list_rule() {
        let table = roster();
        let rule = ValidationRule::list(["Alice", " Bob"]);

        assert!(check_identity(Some(&rule), "Alice", &table).unwrap());
        assert!(check_identity(Some(&rule), " Alice ", &table).unwrap());
        assert!(check_identity(Some(&rule), "Bob", &table).unwrap());
        assert!(!check_identity(Some(&rule), "Carol", &table).unwrap());
        assert!(!check_identity(Some(&rule), "alice", &table).unwrap());
    }

    #[test]
    fn test_empty_list_admits() {
        let table = roster();
        let rule = ValidationRule::List { values: vec![] };
        assert!(check_identity(Some(&rule), "Carol", &table).unwrap());
    }

    #[test]
    fn test_range_rule() {
        let table = roster();
        let rule = ValidationRule::range("Roster");

        assert!(check_identity(Some(&rule), "alice", &table).unwrap());
        assert!(check_identity(Some(&rule), "bob ", &table).unwrap());
        assert!(!check_identity(Some(&rule), "carol", &table).unwrap());
    }

    #[test]
    fn test_range_rule_failure_is_reported() {
        let table = MemoryTable::default();
        let rule = ValidationRule::range("Roster");

        let err = check_identity(Some(&rule), "carol", &table).unwrap_err();
        assert!(matches!(
            err,
            ValidationError::RangeResolution {
                source: TableError::RangeNotFound(_),
                ..
            }
        ));
        assert!(check_identity(Some(&rule), "carol", &table).unwrap_or(FAIL_OPEN));
    }

    #[test]
    fn test_range_rule_without_reference() {
        let table = roster();
        let rule = ValidationRule::Range { reference: None };

        assert!(matches!(
            check_identity(Some(&rule), "carol", &table),
            Err(ValidationError::MissingReference)
        ));
        assert!(check_identity(Some(&rule), "carol", &table).unwrap_or(FAIL_OPEN));
    }

    #[test]
    fn test_unrecognized_rule_admits() {
        let table = roster();
        assert!(check_identity(Some(&ValidationRule::Unrecognized), "zed", &table).unwrap());
    }

    #[test]
    fn test_fail_open_never_admits_blank() {
        let table = MemoryTable::default();
        let rule = ValidationRule::range("Missing");
        assert!(!check_identity(Some(&rule), "  ", &table).unwrap_or(FAIL_OPEN));
    }
}
