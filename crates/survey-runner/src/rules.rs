use std::cmp::Ordering;
use std::collections::BTreeSet;

use serde_json::Value;
use survey_schema::{
    Comparand, Condition, ListSelector, LocationField, LogicalOperator, Operand,
    QuestionnaireSchema, RuleClause, WhenRule,
};
use tracing::trace;

use crate::answer_store::AnswerStore;
use crate::list_store::ListStore;
use crate::location::Location;
use crate::metadata::Metadata;

/// Operand after lookup. `Absent` is distinct from every answer value, including `null`.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolved {
    Absent,
    Value(Value),
}

impl Resolved {
    pub fn is_present(&self) -> bool {
        matches!(self, Resolved::Value(_))
    }

    fn from_option(value: Option<&Value>) -> Self {
        match value {
            Some(Value::Null) | None => Resolved::Absent,
            Some(value) => Resolved::Value(value.clone()),
        }
    }
}

/// Everything a when rule may read. Cheap to copy; evaluation never mutates it.
#[derive(Debug, Clone, Copy)]
pub struct RuleContext<'a> {
    pub schema: &'a QuestionnaireSchema,
    pub metadata: &'a Metadata,
    pub answers: &'a AnswerStore,
    pub lists: &'a ListStore,
    pub location: Option<&'a Location>,
    hidden_blocks: Option<&'a BTreeSet<String>>,
}

impl<'a> RuleContext<'a> {
    pub fn new(
        schema: &'a QuestionnaireSchema,
        metadata: &'a Metadata,
        answers: &'a AnswerStore,
        lists: &'a ListStore,
    ) -> Self {
        Self {
            schema,
            metadata,
            answers,
            lists,
            location: None,
            hidden_blocks: None,
        }
    }

    pub fn at(mut self, location: &'a Location) -> Self {
        self.location = Some(location);
        self
    }

    /// Answers owned by `blocks` resolve to absent.
    pub(crate) fn hiding(mut self, blocks: &'a BTreeSet<String>) -> Self {
        self.hidden_blocks = Some(blocks);
        self
    }

    /// Rules combine with OR; an empty sequence is unconditional.
    pub fn evaluate(&self, rules: &[WhenRule]) -> bool {
        rules.is_empty() || rules.iter().any(|rule| self.evaluate_rule(rule))
    }

    pub fn evaluate_rule(&self, rule: &WhenRule) -> bool {
        match rule.condition {
            LogicalOperator::And => rule.rules.iter().all(|clause| self.evaluate_clause(clause)),
            LogicalOperator::Or => rule.rules.iter().any(|clause| self.evaluate_clause(clause)),
        }
    }

    pub fn evaluate_clause(&self, clause: &RuleClause) -> bool {
        let left = self.resolve(&clause.operand);
        let right = match &clause.comparand {
            Comparand::None => Resolved::Absent,
            Comparand::Literal(value) => Resolved::Value(value.clone()),
            Comparand::Literals(values) => Resolved::Value(Value::Array(values.clone())),
            Comparand::Operand(operand) => self.resolve(operand),
        };
        let matched = compare(clause.condition, &left, &right);
        trace!(
            condition = ?clause.condition,
            left = ?left,
            right = ?right,
            matched,
            "evaluated rule clause"
        );
        matched
    }

    pub fn resolve(&self, operand: &Operand) -> Resolved {
        match operand {
            Operand::Answer { id } => self.resolve_answer(id),
            Operand::Metadata { key } => Resolved::from_option(self.metadata.get(key)),
            Operand::List { name, selector } => match selector {
                ListSelector::Count => Resolved::Value(Value::from(self.lists.count(name))),
                ListSelector::PrimaryItem => self
                    .lists
                    .primary_item(name)
                    .map_or(Resolved::Absent, |item| Resolved::Value(Value::from(item))),
                ListSelector::Items => Resolved::Value(Value::Array(
                    self.lists.items(name).iter().cloned().map(Value::from).collect(),
                )),
            },
            Operand::Location { field } => {
                let Some(location) = self.location else {
                    return Resolved::Absent;
                };
                let value = match field {
                    LocationField::SectionId => Some(location.section_id()),
                    LocationField::BlockId => Some(location.block_id()),
                    LocationField::ListName => location.list_name(),
                    LocationField::ListItemId => location.list_item_id(),
                };
                value.map_or(Resolved::Absent, |value| Resolved::Value(Value::from(value)))
            }
        }
    }

    fn resolve_answer(&self, answer_id: &str) -> Resolved {
        let list_item_id = if self.schema.is_repeating_answer(answer_id) {
            self.location.and_then(Location::list_item_id)
        } else {
            None
        };
        match self.answers.get(answer_id, list_item_id) {
            Some(answer) if !self.is_hidden(&answer.block_id) => {
                Resolved::from_option(Some(&answer.value))
            }
            _ => Resolved::Absent,
        }
    }

    fn is_hidden(&self, block_id: &str) -> bool {
        self.hidden_blocks
            .is_some_and(|blocks| blocks.contains(block_id))
    }
}

/// Evaluates `rules` against the given state; an empty rule sequence is always true.
pub fn evaluate_when_rules(
    rules: &[WhenRule],
    schema: &QuestionnaireSchema,
    metadata: &Metadata,
    answers: &AnswerStore,
    lists: &ListStore,
    current_location: Option<&Location>,
) -> bool {
    let ctx = RuleContext::new(schema, metadata, answers, lists);
    match current_location {
        Some(location) => ctx.at(location).evaluate(rules),
        None => ctx.evaluate(rules),
    }
}

/// Applies `condition` to resolved operands. An absent operand satisfies only negated conditions.
pub fn compare(condition: Condition, left: &Resolved, right: &Resolved) -> bool {
    match condition {
        Condition::Set => return left.is_present(),
        Condition::NotSet => return !left.is_present(),
        _ => {}
    }
    let (Resolved::Value(left), Resolved::Value(right)) = (left, right) else {
        return condition.is_negated();
    };

    match condition {
        Condition::Equals => values_equal(left, right),
        Condition::NotEquals => !values_equal(left, right),
        Condition::EqualsAny => candidates(right).iter().any(|value| values_equal(left, value)),
        Condition::NotEqualsAny => !candidates(right).iter().any(|value| values_equal(left, value)),
        Condition::Contains => contains(left, right),
        Condition::NotContains => !contains(left, right),
        Condition::ContainsAny => candidates(right).iter().any(|value| contains(left, value)),
        Condition::ContainsAll => candidates(right).iter().all(|value| contains(left, value)),
        Condition::GreaterThan => ordering(left, right) == Some(Ordering::Greater),
        Condition::GreaterThanOrEqual => {
            matches!(ordering(left, right), Some(Ordering::Greater | Ordering::Equal))
        }
        Condition::LessThan => ordering(left, right) == Some(Ordering::Less),
        Condition::LessThanOrEqual => {
            matches!(ordering(left, right), Some(Ordering::Less | Ordering::Equal))
        }
        Condition::Set => true,
        Condition::NotSet => false,
    }
}

fn candidates(value: &Value) -> &[Value] {
    match value {
        Value::Array(values) => values,
        other => std::slice::from_ref(other),
    }
}

fn contains(haystack: &Value, needle: &Value) -> bool {
    match haystack {
        Value::Array(items) => items.iter().any(|item| values_equal(item, needle)),
        Value::String(text) => needle.as_str().is_some_and(|needle| text.contains(needle)),
        _ => false,
    }
}

fn values_equal(left: &Value, right: &Value) -> bool {
    if left == right {
        return true;
    }
    if left.is_number() || right.is_number() {
        return match (as_number(left), as_number(right)) {
            (Some(left), Some(right)) => left == right,
            _ => false,
        };
    }
    false
}

fn ordering(left: &Value, right: &Value) -> Option<Ordering> {
    match (left, right) {
        (Value::String(left), Value::String(right)) => {
            match (left.trim().parse::<f64>(), right.trim().parse::<f64>()) {
                (Ok(left), Ok(right)) => left.partial_cmp(&right),
                _ => Some(left.cmp(right)),
            }
        }
        _ => as_number(left)?.partial_cmp(&as_number(right)?),
    }
}

/// Numbers, and strings holding numbers, as entered in text fields.
fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}
