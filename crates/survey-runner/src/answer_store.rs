use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::location::Location;

/// Submitted answer. Identity is `(block_id, answer_id, answer_instance, list_item_id)`;
/// `group_instance` only participates in ordering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Answer {
    #[serde(default)]
    pub group_id: String,
    #[serde(default)]
    pub group_instance: u32,
    pub block_id: String,
    pub answer_id: String,
    #[serde(default)]
    pub answer_instance: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub list_item_id: Option<String>,
    pub value: Value,
}

impl Answer {
    pub fn new(block_id: impl Into<String>, answer_id: impl Into<String>, value: Value) -> Self {
        Self {
            group_id: String::new(),
            group_instance: 0,
            block_id: block_id.into(),
            answer_id: answer_id.into(),
            answer_instance: 0,
            list_item_id: None,
            value,
        }
    }

    pub fn in_group(mut self, group_id: impl Into<String>, group_instance: u32) -> Self {
        self.group_id = group_id.into();
        self.group_instance = group_instance;
        self
    }

    pub fn with_instance(mut self, answer_instance: u32) -> Self {
        self.answer_instance = answer_instance;
        self
    }

    pub fn for_list_item(mut self, list_item_id: impl Into<String>) -> Self {
        self.list_item_id = Some(list_item_id.into());
        self
    }

    fn same_identity(&self, other: &Answer) -> bool {
        self.block_id == other.block_id
            && self.answer_id == other.answer_id
            && self.answer_instance == other.answer_instance
            && self.list_item_id == other.list_item_id
    }
}

/// Criteria for [`AnswerStore::filter`] and [`AnswerStore::remove`]. Unset fields match anything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnswerFilter {
    pub group_id: Option<String>,
    pub group_instance: Option<u32>,
    pub block_id: Option<String>,
    pub answer_ids: Option<Vec<String>>,
    pub answer_instance: Option<u32>,
    pub list_item_id: Option<String>,
}

impl AnswerFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn group_id(mut self, group_id: impl Into<String>) -> Self {
        self.group_id = Some(group_id.into());
        self
    }

    pub fn group_instance(mut self, group_instance: u32) -> Self {
        self.group_instance = Some(group_instance);
        self
    }

    pub fn block_id(mut self, block_id: impl Into<String>) -> Self {
        self.block_id = Some(block_id.into());
        self
    }

    pub fn answer_ids<I, S>(mut self, answer_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.answer_ids = Some(answer_ids.into_iter().map(Into::into).collect());
        self
    }

    pub fn answer_instance(mut self, answer_instance: u32) -> Self {
        self.answer_instance = Some(answer_instance);
        self
    }

    pub fn list_item_id(mut self, list_item_id: impl Into<String>) -> Self {
        self.list_item_id = Some(list_item_id.into());
        self
    }

    pub fn matches(&self, answer: &Answer) -> bool {
        self.group_id
            .as_ref()
            .is_none_or(|group_id| &answer.group_id == group_id)
            && self
                .group_instance
                .is_none_or(|instance| answer.group_instance == instance)
            && self
                .block_id
                .as_ref()
                .is_none_or(|block_id| &answer.block_id == block_id)
            && self
                .answer_ids
                .as_ref()
                .is_none_or(|ids| ids.contains(&answer.answer_id))
            && self
                .answer_instance
                .is_none_or(|instance| answer.answer_instance == instance)
            && self
                .list_item_id
                .as_ref()
                .is_none_or(|item| answer.list_item_id.as_ref() == Some(item))
    }
}

/// Ordered collection of submitted answers; iteration follows insertion order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnswerStore {
    answers: Vec<Answer>,
}

impl AnswerStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_answers(answers: impl IntoIterator<Item = Answer>) -> Self {
        let mut store = Self::new();
        for answer in answers {
            store.add(answer);
        }
        store
    }

    /// Stores `answer`, replacing the value of an existing answer with the same identity in place.
    pub fn add(&mut self, answer: Answer) {
        match self
            .answers
            .iter_mut()
            .find(|existing| existing.same_identity(&answer))
        {
            Some(existing) => *existing = answer,
            None => self.answers.push(answer),
        }
    }

    /// Removes every answer matched by `filter` and returns how many were dropped.
    pub fn remove(&mut self, filter: &AnswerFilter) -> usize {
        let before = self.answers.len();
        self.answers.retain(|answer| !filter.matches(answer));
        before - self.answers.len()
    }

    /// Removes the answers submitted on `location`.
    pub fn remove_by_location(&mut self, location: &Location) -> usize {
        let before = self.answers.len();
        self.answers.retain(|answer| {
            answer.block_id != location.block_id()
                || answer.list_item_id.as_deref() != location.list_item_id()
        });
        before - self.answers.len()
    }

    pub fn filter(&self, filter: &AnswerFilter) -> Vec<&Answer> {
        self.answers
            .iter()
            .filter(|answer| filter.matches(answer))
            .collect()
    }

    /// Answers for one answer id, ordered by group instance then answer instance.
    pub fn get_answers_by_answer_id(&self, block_id: &str, answer_id: &str) -> Vec<&Answer> {
        let mut answers: Vec<&Answer> = self
            .answers
            .iter()
            .filter(|answer| answer.block_id == block_id && answer.answer_id == answer_id)
            .collect();
        answers.sort_by_key(|answer| (answer.group_instance, answer.answer_instance));
        answers
    }

    /// First stored answer for `answer_id` scoped to `list_item_id`.
    pub fn get(&self, answer_id: &str, list_item_id: Option<&str>) -> Option<&Answer> {
        self.answers.iter().find(|answer| {
            answer.answer_id == answer_id && answer.list_item_id.as_deref() == list_item_id
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = &Answer> {
        self.answers.iter()
    }

    pub fn len(&self) -> usize {
        self.answers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.answers.is_empty()
    }

    pub fn clear(&mut self) {
        self.answers.clear();
    }
}
