pub mod block;
pub mod questionnaire;
pub mod section;

pub use block::{
    AnswerSpec, Block, BlockType, ContentSpec, ContentVariant, Goto, GotoTarget, ListOperation,
    QuestionSpec, QuestionVariant, RoutingRule, Variant,
};
pub use questionnaire::{HubConfig, Navigation, QuestionnaireSchema};
pub use section::{Group, GroupRepeat, Section, SectionRepeat};
