//! Attribute query engine.
//!
//! Filters one layer's features by a text predicate on a single field.
//! Both sides are coerced to text and compared case-insensitively.

use mapscope_core::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::feature::Feature;
use crate::layer::LayerStack;

use super::result::QueryResult;

/// Comparison applied to the coerced attribute text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AttributeOperator {
    #[default]
    Equals,
    Contains,
    StartsWith,
    EndsWith,
}

impl AttributeOperator {
    /// Applies the operator to already lower-cased operands.
    fn test(self, candidate: &str, value: &str) -> bool {
        match self {
            AttributeOperator::Equals => candidate == value,
            AttributeOperator::Contains => candidate.contains(value),
            AttributeOperator::StartsWith => candidate.starts_with(value),
            AttributeOperator::EndsWith => candidate.ends_with(value),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AttributeOperator::Equals => "equals",
            AttributeOperator::Contains => "contains",
            AttributeOperator::StartsWith => "startsWith",
            AttributeOperator::EndsWith => "endsWith",
        }
    }
}

impl FromStr for AttributeOperator {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "equals" => Ok(AttributeOperator::Equals),
            "contains" => Ok(AttributeOperator::Contains),
            "startsWith" => Ok(AttributeOperator::StartsWith),
            "endsWith" => Ok(AttributeOperator::EndsWith),
            other => Err(ValidationError::UnknownOperator {
                operator: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for AttributeOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An attribute query as entered in the query panel.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AttributeQuery {
    pub layer_id: Option<String>,
    pub field: Option<String>,
    pub operator: AttributeOperator,
    pub value: String,
}

impl AttributeQuery {
    pub fn new(
        layer_id: impl Into<String>,
        field: impl Into<String>,
        operator: AttributeOperator,
        value: impl Into<String>,
    ) -> Self {
        Self {
            layer_id: Some(layer_id.into()),
            field: Some(field.into()),
            operator,
            value: value.into(),
        }
    }

    /// Checks the inputs are complete, returning `(layer, field, value)`
    /// with the value trimmed.
    pub fn validate(&self) -> Result<(&str, &str, &str), ValidationError> {
        let layer = self
            .layer_id
            .as_deref()
            .filter(|s| !s.is_empty())
            .ok_or(ValidationError::NoLayerSelected)?;
        let field = self
            .field
            .as_deref()
            .filter(|s| !s.is_empty())
            .ok_or(ValidationError::NoFieldSelected)?;
        let value = self.value.trim();
        if value.is_empty() {
            return Err(ValidationError::EmptyValue);
        }
        Ok((layer, field, value))
    }

    /// True if `feature` satisfies the predicate. Features without the field
    /// (missing or null) never match.
    pub fn matches(&self, feature: &Feature, field: &str, value_lower: &str) -> bool {
        feature
            .attribute_text(field)
            .is_some_and(|text| self.operator.test(&text.to_lowercase(), value_lower))
    }

    /// Runs the query against `layers`.
    ///
    /// Validation happens before any comparison. The result holds at most
    /// one group (the queried layer) in store insertion order.
    pub fn execute(&self, layers: &LayerStack) -> Result<QueryResult, ValidationError> {
        let (layer_id, field, value) = self.validate()?;
        let layer = layers
            .get(layer_id)
            .filter(|l| !l.is_overlay())
            .ok_or_else(|| ValidationError::UnknownLayer {
                layer_id: layer_id.to_string(),
            })?;
        let store = layer.store().ok_or_else(|| ValidationError::UnknownLayer {
            layer_id: layer_id.to_string(),
        })?;

        let needle = value.to_lowercase();
        let matches: Vec<_> = store
            .snapshot()
            .into_iter()
            .filter(|f| self.matches(f, field, &needle))
            .collect();
        tracing::debug!(
            "Attribute query {} {} '{}' on {}: {} matches",
            field,
            self.operator,
            value,
            layer_id,
            matches.len()
        );

        let mut result = QueryResult::new();
        result.push_layer(layer.id.clone(), layer.name.clone(), matches);
        Ok(result)
    }
}

/// State of the attribute result panel.
///
/// `NotQueried` and `NoMatches` both render an empty list but with different
/// messages.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum AttributeResults {
    #[default]
    NotQueried,
    NoMatches,
    Matches(QueryResult),
}

impl AttributeResults {
    /// Wraps a query result.
    pub fn from_result(result: QueryResult) -> Self {
        if result.is_empty() {
            AttributeResults::NoMatches
        } else {
            AttributeResults::Matches(result)
        }
    }

    /// Message shown when the list is empty.
    pub fn empty_message(&self) -> Option<&'static str> {
        match self {
            AttributeResults::NotQueried => Some("Query results will appear here"),
            AttributeResults::NoMatches => Some("No matching features found"),
            AttributeResults::Matches(_) => None,
        }
    }

    pub fn result(&self) -> Option<&QueryResult> {
        match self {
            AttributeResults::Matches(result) => Some(result),
            _ => None,
        }
    }

    pub fn match_count(&self) -> usize {
        self.result().map_or(0, QueryResult::total)
    }
}
