//! Attribute domains defined at workspace level.

use std::collections::BTreeMap;

use crate::value::Value;

/// A named constraint on the legal values of a field.
#[derive(Debug, Clone, PartialEq)]
pub struct Domain {
    /// Domain name as stored. Identity comparisons use the lower-cased name.
    pub name: String,
    pub kind: DomainKind,
}

/// The constraint carried by a [`Domain`].
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum DomainKind {
    /// Enumerated codes, each with a description.
    Coded(BTreeMap<Value, String>),
    /// Closed numeric interval.
    Range { min: f64, max: f64 },
}

impl Domain {
    /// Creates a coded-value domain.
    pub fn coded<I, V, D>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = (V, D)>,
        V: Into<Value>,
        D: Into<String>,
    {
        Self {
            name: name.into(),
            kind: DomainKind::Coded(
                values
                    .into_iter()
                    .map(|(code, description)| (code.into(), description.into()))
                    .collect(),
            ),
        }
    }

    /// Creates a range domain.
    #[must_use]
    pub fn range(name: impl Into<String>, min: f64, max: f64) -> Self {
        Self {
            name: name.into(),
            kind: DomainKind::Range { min, max },
        }
    }

    /// Lower-cased name used as the domain's identity.
    #[must_use]
    pub fn key(&self) -> String {
        self.name.to_lowercase()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coded_constructor() {
        let domain = Domain::coded("Status", [(1_i64, "Open"), (2_i64, "Closed")]);
        assert_eq!(domain.key(), "status");
        let DomainKind::Coded(values) = &domain.kind else {
            panic!("expected coded domain");
        };
        assert_eq!(values.get(&Value::Integer(1)).map(String::as_str), Some("Open"));
        assert_eq!(values.len(), 2);
    }

    #[test]
    fn test_range_constructor() {
        let domain = Domain::range("PctComplete", 0.0, 100.0);
        assert_eq!(
            domain.kind,
            DomainKind::Range {
                min: 0.0,
                max: 100.0
            }
        );
    }
}
