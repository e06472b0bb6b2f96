use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// How the clauses of a single when rule combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogicalOperator {
    #[default]
    And,
    Or,
}

/// Comparison operators understood by the rule evaluator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Condition {
    #[serde(rename = "equals")]
    Equals,
    #[serde(rename = "not equals")]
    NotEquals,
    #[serde(rename = "equals any")]
    EqualsAny,
    #[serde(rename = "not equals any")]
    NotEqualsAny,
    #[serde(rename = "contains")]
    Contains,
    #[serde(rename = "not contains")]
    NotContains,
    #[serde(rename = "contains any")]
    ContainsAny,
    #[serde(rename = "contains all")]
    ContainsAll,
    #[serde(rename = "set")]
    Set,
    #[serde(rename = "not set")]
    NotSet,
    #[serde(rename = "greater than")]
    GreaterThan,
    #[serde(rename = "greater than or equal to")]
    GreaterThanOrEqual,
    #[serde(rename = "less than")]
    LessThan,
    #[serde(rename = "less than or equal to")]
    LessThanOrEqual,
}

impl Condition {
    /// Unary conditions only inspect the left operand.
    pub fn is_unary(self) -> bool {
        matches!(self, Condition::Set | Condition::NotSet)
    }

    /// Negated conditions hold when an operand is absent.
    pub fn is_negated(self) -> bool {
        matches!(
            self,
            Condition::NotEquals
                | Condition::NotEqualsAny
                | Condition::NotContains
                | Condition::NotSet
        )
    }
}

/// Which facet of a list a list operand resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListSelector {
    #[default]
    Count,
    PrimaryItem,
    Items,
}

/// Field of the current location a location operand resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocationField {
    SectionId,
    BlockId,
    ListName,
    ListItemId,
}

/// Value source referenced by a rule clause.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawOperand", into = "RawOperand")]
pub enum Operand {
    Answer { id: String },
    Metadata { key: String },
    List { name: String, selector: ListSelector },
    Location { field: LocationField },
}

impl Operand {
    pub fn answer(id: impl Into<String>) -> Self {
        Operand::Answer { id: id.into() }
    }

    pub fn metadata(key: impl Into<String>) -> Self {
        Operand::Metadata { key: key.into() }
    }

    pub fn list(name: impl Into<String>, selector: ListSelector) -> Self {
        Operand::List {
            name: name.into(),
            selector,
        }
    }

    pub fn location(field: LocationField) -> Self {
        Operand::Location { field }
    }

    pub fn answer_id(&self) -> Option<&str> {
        match self {
            Operand::Answer { id } => Some(id),
            _ => None,
        }
    }

    pub fn list_name(&self) -> Option<&str> {
        match self {
            Operand::List { name, .. } => Some(name),
            _ => None,
        }
    }
}

/// Right-hand side of a rule clause.
#[derive(Debug, Clone, PartialEq)]
pub enum Comparand {
    None,
    Literal(Value),
    Literals(Vec<Value>),
    Operand(Operand),
}

/// Single comparison inside a when rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawClause", into = "RawClause")]
pub struct RuleClause {
    pub operand: Operand,
    pub condition: Condition,
    pub comparand: Comparand,
}

impl RuleClause {
    pub fn new(operand: Operand, condition: Condition, comparand: Comparand) -> Self {
        Self {
            operand,
            condition,
            comparand,
        }
    }

    /// Operands referenced on either side of the clause.
    pub fn operands(&self) -> impl Iterator<Item = &Operand> {
        let right = match &self.comparand {
            Comparand::Operand(operand) => Some(operand),
            _ => None,
        };
        std::iter::once(&self.operand).chain(right)
    }
}

/// Schema-declared boolean condition. A bare array of clauses is an AND rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawWhenRule")]
pub struct WhenRule {
    pub condition: LogicalOperator,
    pub rules: Vec<RuleClause>,
}

impl WhenRule {
    pub fn all(rules: Vec<RuleClause>) -> Self {
        Self {
            condition: LogicalOperator::And,
            rules,
        }
    }

    pub fn any(rules: Vec<RuleClause>) -> Self {
        Self {
            condition: LogicalOperator::Or,
            rules,
        }
    }
}

/// Reads a `when` field. A list of plain clauses is a single AND rule; a list of
/// rule objects is kept as is and combines with OR; a lone rule object is one rule.
pub fn deserialize_when<'de, D>(deserializer: D) -> Result<Vec<WhenRule>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    parse_when(value).map_err(de::Error::custom)
}

pub fn parse_when(value: Value) -> Result<Vec<WhenRule>, ClauseError> {
    match value {
        Value::Null => Ok(Vec::new()),
        Value::Array(items) if !items.is_empty() && items.iter().all(is_plain_clause) => {
            let rules = items
                .into_iter()
                .map(serde_json::from_value::<RuleClause>)
                .collect::<Result<Vec<_>, _>>()?;
            Ok(vec![WhenRule::all(rules)])
        }
        Value::Array(items) => Ok(items
            .into_iter()
            .map(serde_json::from_value::<WhenRule>)
            .collect::<Result<Vec<_>, _>>()?),
        other => Ok(vec![serde_json::from_value(other)?]),
    }
}

fn is_plain_clause(value: &Value) -> bool {
    value
        .as_object()
        .is_some_and(|object| !object.contains_key("rules"))
}

/// Errors raised while decoding a rule clause.
#[derive(Debug, Error)]
pub enum ClauseError {
    #[error("rule clause must name exactly one of 'id', 'meta', 'list' or 'location' (found {0})")]
    OperandCount(usize),
    #[error("'selector' is only valid together with 'list'")]
    StraySelector,
    #[error("condition '{0:?}' requires one of 'value', 'values' or 'comparison'")]
    MissingComparand(Condition),
    #[error("rule clause may carry only one of 'value', 'values' or 'comparison'")]
    ConflictingComparands,
    #[error("invalid rule clause: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawOperand {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    meta: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    list: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    selector: Option<ListSelector>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    location: Option<LocationField>,
}

impl TryFrom<RawOperand> for Operand {
    type Error = ClauseError;

    fn try_from(raw: RawOperand) -> Result<Self, Self::Error> {
        let count = [
            raw.id.is_some(),
            raw.meta.is_some(),
            raw.list.is_some(),
            raw.location.is_some(),
        ]
        .into_iter()
        .filter(|present| *present)
        .count();
        if count != 1 {
            return Err(ClauseError::OperandCount(count));
        }
        if raw.selector.is_some() && raw.list.is_none() {
            return Err(ClauseError::StraySelector);
        }

        let operand = if let Some(id) = raw.id {
            Operand::Answer { id }
        } else if let Some(key) = raw.meta {
            Operand::Metadata { key }
        } else if let Some(name) = raw.list {
            Operand::List {
                name,
                selector: raw.selector.unwrap_or_default(),
            }
        } else if let Some(field) = raw.location {
            Operand::Location { field }
        } else {
            return Err(ClauseError::OperandCount(0));
        };
        Ok(operand)
    }
}

impl From<Operand> for RawOperand {
    fn from(operand: Operand) -> Self {
        match operand {
            Operand::Answer { id } => RawOperand {
                id: Some(id),
                ..Default::default()
            },
            Operand::Metadata { key } => RawOperand {
                meta: Some(key),
                ..Default::default()
            },
            Operand::List { name, selector } => RawOperand {
                list: Some(name),
                selector: Some(selector),
                ..Default::default()
            },
            Operand::Location { field } => RawOperand {
                location: Some(field),
                ..Default::default()
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawClause {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    meta: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    list: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    selector: Option<ListSelector>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    location: Option<LocationField>,
    condition: Condition,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    value: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    values: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    comparison: Option<Operand>,
}

impl TryFrom<RawClause> for RuleClause {
    type Error = ClauseError;

    fn try_from(raw: RawClause) -> Result<Self, Self::Error> {
        let operand = Operand::try_from(RawOperand {
            id: raw.id,
            meta: raw.meta,
            list: raw.list,
            selector: raw.selector,
            location: raw.location,
        })?;

        let comparand = match (raw.value, raw.values, raw.comparison) {
            (None, None, None) => Comparand::None,
            (Some(value), None, None) => Comparand::Literal(value),
            (None, Some(values), None) => Comparand::Literals(values),
            (None, None, Some(operand)) => Comparand::Operand(operand),
            _ => return Err(ClauseError::ConflictingComparands),
        };
        if !raw.condition.is_unary() && comparand == Comparand::None {
            return Err(ClauseError::MissingComparand(raw.condition));
        }

        Ok(RuleClause {
            operand,
            condition: raw.condition,
            comparand,
        })
    }
}

impl From<RuleClause> for RawClause {
    fn from(clause: RuleClause) -> Self {
        let operand = RawOperand::from(clause.operand);
        let (value, values, comparison) = match clause.comparand {
            Comparand::None => (None, None, None),
            Comparand::Literal(value) => (Some(value), None, None),
            Comparand::Literals(values) => (None, Some(values), None),
            Comparand::Operand(operand) => (None, None, Some(operand)),
        };
        RawClause {
            id: operand.id,
            meta: operand.meta,
            list: operand.list,
            selector: operand.selector,
            location: operand.location,
            condition: clause.condition,
            value,
            values,
            comparison,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawWhenRule {
    Clauses(Vec<Value>),
    Rule {
        #[serde(default)]
        condition: LogicalOperator,
        rules: Vec<Value>,
    },
}

impl TryFrom<RawWhenRule> for WhenRule {
    type Error = ClauseError;

    fn try_from(raw: RawWhenRule) -> Result<Self, Self::Error> {
        let (condition, clauses) = match raw {
            RawWhenRule::Clauses(clauses) => (LogicalOperator::And, clauses),
            RawWhenRule::Rule { condition, rules } => (condition, rules),
        };
        let rules = clauses
            .into_iter()
            .map(serde_json::from_value::<RuleClause>)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(WhenRule { condition, rules })
    }
}
