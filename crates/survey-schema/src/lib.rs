#![allow(missing_docs)]

pub mod rules;
pub mod spec;
pub mod validate;

pub use rules::{
    ClauseError, Comparand, Condition, ListSelector, LocationField, LogicalOperator, Operand,
    RuleClause, WhenRule, parse_when,
};
pub use spec::{
    AnswerSpec, Block, BlockType, ContentSpec, ContentVariant, Goto, GotoTarget, Group,
    GroupRepeat, HubConfig, ListOperation, Navigation, QuestionSpec, QuestionVariant,
    QuestionnaireSchema, RoutingRule, Section, SectionRepeat, Variant,
};
pub use validate::{SchemaError, validate};
