#![allow(missing_docs)]

pub mod answer_store;
pub mod list_store;
pub mod location;
pub mod metadata;
pub mod progress_store;
pub mod router;
pub mod rules;
pub mod state;
pub mod variants;

#[cfg(feature = "cli")]
pub mod cli;
#[cfg(feature = "cli")]
pub mod cmd;

pub use answer_store::{Answer, AnswerFilter, AnswerStore};
pub use list_store::{ListModel, ListStore};
pub use location::{Location, LocationParseError, QUESTIONNAIRE_PREFIX};
pub use metadata::Metadata;
pub use progress_store::{CompletionStatus, ProgressStore, SectionKey, SectionProgress};
pub use router::{HUB_URL, NavigationPolicy, NavigationTarget, Router, RouterError, SUBMIT_URL};
pub use rules::{Resolved, RuleContext, compare, evaluate_when_rules};
pub use state::QuestionnaireState;
pub use variants::{
    choose_content_to_display, choose_question_to_display, choose_variant,
    get_answer_ids_in_block, transform_variants,
};
