use serde::{Deserialize, Serialize};
use survey_schema::QuestionnaireSchema;
use tracing::debug;

use crate::answer_store::{AnswerFilter, AnswerStore};
use crate::list_store::ListStore;
use crate::metadata::Metadata;
use crate::progress_store::ProgressStore;
use crate::router::Router;

/// Everything a respondent has accumulated so far, as persisted between requests.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuestionnaireState {
    #[serde(default)]
    pub answers: AnswerStore,
    #[serde(default)]
    pub lists: ListStore,
    #[serde(default)]
    pub progress: ProgressStore,
    #[serde(default)]
    pub metadata: Metadata,
}

impl QuestionnaireState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json_str(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    pub fn router<'a>(&'a self, schema: &'a QuestionnaireSchema) -> Router<'a> {
        Router::new(
            schema,
            &self.answers,
            &self.lists,
            &self.progress,
            &self.metadata,
        )
    }

    /// Deletes a list item together with its answers and progress.
    /// Returns false when the item was not in the list.
    pub fn remove_list_item(&mut self, list_name: &str, list_item_id: &str) -> bool {
        if !self.lists.delete_list_item(list_name, list_item_id) {
            return false;
        }
        let removed = self
            .answers
            .remove(&AnswerFilter::new().list_item_id(list_item_id));
        self.progress.remove_progress_for_list_item(list_item_id);
        debug!(list = list_name, list_item_id, answers = removed, "removed list item");
        true
    }
}
