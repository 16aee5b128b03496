//! Data-validation rules attached to the name column

use serde::{Deserialize, Serialize};

/// A validation rule as reported by the sheet store.
///
/// Rule kinds this crate does not understand deserialize to `Unrecognized`
/// and are admitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValidationRule {
    /// Value must be one of a literal list
    List {
        #[serde(default)]
        values: Vec<String>,
    },

    /// Value must appear in a (named or A1) range
    Range {
        #[serde(default)]
        reference: Option<String>,
    },

    /// Any other criteria type
    #[serde(other)]
    Unrecognized,
}

impl ValidationRule {
    /// Literal list rule
    pub fn list<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ValidationRule::List {
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    /// Range rule pointing at `reference`
    pub fn range(reference: impl Into<String>) -> Self {
        ValidationRule::Range {
            reference: Some(reference.into()),
        }
    }

    /// Criteria kind tag, as used in logs
    pub fn criteria_kind(&self) -> &'static str {
        match self {
            ValidationRule::List { .. } => "list",
            ValidationRule::Range { .. } => "range",
            ValidationRule::Unrecognized => "unrecognized",
        }
    }
}
