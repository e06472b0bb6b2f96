use crate::rules::WhenRule;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Closed set of navigable block kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BlockType {
    Question,
    ConfirmationQuestion,
    Interstitial,
    Introduction,
    ListCollector,
    PrimaryPersonListCollector,
    ListAddQuestion,
    ListEditQuestion,
    ListRemoveQuestion,
    SectionSummary,
    Summary,
    Confirmation,
}

impl BlockType {
    pub fn is_list_collector(self) -> bool {
        matches!(
            self,
            BlockType::ListCollector | BlockType::PrimaryPersonListCollector
        )
    }

    /// Terminal blocks close a section or the questionnaire and never need answering.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            BlockType::SectionSummary | BlockType::Summary | BlockType::Confirmation
        )
    }
}

/// Nested forms a list collector embeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListOperation {
    Add,
    Edit,
    Remove,
}

impl ListOperation {
    pub const ALL: [ListOperation; 3] =
        [ListOperation::Add, ListOperation::Edit, ListOperation::Remove];

    /// Edit and remove forms act on one existing list item.
    pub fn targets_item(self) -> bool {
        !matches!(self, ListOperation::Add)
    }
}

/// Answer declared by a question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerSpec {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub mandatory: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionSpec {
    pub id: String,
    pub title: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default)]
    pub answers: Vec<AnswerSpec>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentSpec {
    pub title: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub contents: Vec<Value>,
}

/// A `{when, payload}` pair; the first variant whose rules hold is displayed.
pub trait Variant {
    type Payload;

    fn when(&self) -> &[WhenRule];
    fn payload(&self) -> &Self::Payload;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionVariant {
    #[serde(default, deserialize_with = "crate::rules::deserialize_when")]
    pub when: Vec<WhenRule>,
    pub question: QuestionSpec,
}

impl Variant for QuestionVariant {
    type Payload = QuestionSpec;

    fn when(&self) -> &[WhenRule] {
        &self.when
    }

    fn payload(&self) -> &QuestionSpec {
        &self.question
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentVariant {
    #[serde(default, deserialize_with = "crate::rules::deserialize_when")]
    pub when: Vec<WhenRule>,
    pub content: ContentSpec,
}

impl Variant for ContentVariant {
    type Payload = ContentSpec;

    fn when(&self) -> &[WhenRule] {
        &self.when
    }

    fn payload(&self) -> &ContentSpec {
        &self.content
    }
}

/// Destination of a routing rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GotoTarget {
    Block(String),
    Group(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Goto {
    #[serde(flatten)]
    pub target: GotoTarget,
    #[serde(
        default,
        deserialize_with = "crate::rules::deserialize_when",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub when: Vec<WhenRule>,
}

/// Forward jump taken after the owning block is placed on a routing path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutingRule {
    pub goto: Goto,
}

/// Smallest navigable unit of a questionnaire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: BlockType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub question: Option<QuestionSpec>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub question_variants: Vec<QuestionVariant>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<ContentSpec>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub content_variants: Vec<ContentVariant>,
    #[serde(
        default,
        deserialize_with = "crate::rules::deserialize_when",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub when: Vec<WhenRule>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub routing_rules: Vec<RoutingRule>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub for_list: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub add_block: Option<Box<Block>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edit_block: Option<Box<Block>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remove_block: Option<Box<Block>>,
}

impl Block {
    pub fn new(id: impl Into<String>, kind: BlockType) -> Self {
        Self {
            id: id.into(),
            kind,
            question: None,
            question_variants: Vec::new(),
            content: None,
            content_variants: Vec::new(),
            when: Vec::new(),
            routing_rules: Vec::new(),
            for_list: None,
            add_block: None,
            edit_block: None,
            remove_block: None,
        }
    }

    pub fn sub_block(&self, operation: ListOperation) -> Option<&Block> {
        let slot = match operation {
            ListOperation::Add => &self.add_block,
            ListOperation::Edit => &self.edit_block,
            ListOperation::Remove => &self.remove_block,
        };
        slot.as_deref()
    }

    pub fn sub_block_mut(&mut self, operation: ListOperation) -> Option<&mut Block> {
        let slot = match operation {
            ListOperation::Add => &mut self.add_block,
            ListOperation::Edit => &mut self.edit_block,
            ListOperation::Remove => &mut self.remove_block,
        };
        slot.as_deref_mut()
    }

    /// Add/edit/remove forms embedded in this block, in that order.
    pub fn sub_blocks(&self) -> impl Iterator<Item = (ListOperation, &Block)> {
        ListOperation::ALL
            .into_iter()
            .filter_map(|operation| self.sub_block(operation).map(|block| (operation, block)))
    }

    /// Every question this block can display, fixed or variant.
    pub fn questions(&self) -> impl Iterator<Item = &QuestionSpec> {
        self.question
            .iter()
            .chain(self.question_variants.iter().map(|variant| &variant.question))
    }
}
