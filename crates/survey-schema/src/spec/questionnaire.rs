use std::collections::BTreeSet;

use crate::spec::block::{Block, ListOperation};
use crate::spec::section::{Group, Section};
use crate::validate::{SchemaError, validate};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct HubConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required_completed_sections: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Navigation {
    #[serde(default)]
    pub hub: HubConfig,
}

/// Top-level questionnaire definition. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionnaireSchema {
    pub survey_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default)]
    pub navigation: Navigation,
    pub sections: Vec<Section>,
}

impl QuestionnaireSchema {
    /// Parses and validates a schema document.
    pub fn from_json_str(raw: &str) -> Result<Self, SchemaError> {
        let schema: QuestionnaireSchema = serde_json::from_str(raw)?;
        validate(&schema)?;
        Ok(schema)
    }

    pub fn from_value(value: Value) -> Result<Self, SchemaError> {
        let schema: QuestionnaireSchema = serde_json::from_value(value)?;
        validate(&schema)?;
        Ok(schema)
    }

    pub fn is_hub_enabled(&self) -> bool {
        self.navigation.hub.enabled
    }

    pub fn section(&self, section_id: &str) -> Option<&Section> {
        self.sections.iter().find(|section| section.id == section_id)
    }

    pub fn section_index(&self, section_id: &str) -> Option<usize> {
        self.sections
            .iter()
            .position(|section| section.id == section_id)
    }

    pub fn group(&self, group_id: &str) -> Option<&Group> {
        self.sections
            .iter()
            .flat_map(|section| section.groups.iter())
            .find(|group| group.id == group_id)
    }

    /// Looks a block up by id, including forms nested in list collectors.
    pub fn block(&self, block_id: &str) -> Option<&Block> {
        self.sections
            .iter()
            .flat_map(Section::all_blocks)
            .find(|block| block.id == block_id)
    }

    pub fn section_for_block(&self, block_id: &str) -> Option<&Section> {
        self.sections
            .iter()
            .find(|section| section.all_blocks().any(|block| block.id == block_id))
    }

    pub fn group_for_block(&self, block_id: &str) -> Option<&Group> {
        self.sections
            .iter()
            .flat_map(|section| section.groups.iter())
            .find(|group| {
                group.blocks.iter().any(|block| {
                    block.id == block_id
                        || block.sub_blocks().any(|(_, sub_block)| sub_block.id == block_id)
                })
            })
    }

    /// Finds the list collector embedding `block_id` and the operation it serves.
    pub fn list_collector_for_sub_block(&self, block_id: &str) -> Option<(&Block, ListOperation)> {
        self.sections
            .iter()
            .flat_map(Section::blocks)
            .find_map(|block| {
                block
                    .sub_blocks()
                    .find(|(_, sub_block)| sub_block.id == block_id)
                    .map(|(operation, _)| (block, operation))
            })
    }

    /// Block declaring the answer with the given id.
    pub fn block_for_answer_id(&self, answer_id: &str) -> Option<&Block> {
        self.sections
            .iter()
            .flat_map(Section::all_blocks)
            .find(|block| {
                block
                    .questions()
                    .any(|question| question.answers.iter().any(|answer| answer.id == answer_id))
            })
    }

    /// True when answers of `answer_id` are recorded once per list item.
    pub fn is_repeating_answer(&self, answer_id: &str) -> bool {
        let Some(block) = self.block_for_answer_id(answer_id) else {
            return false;
        };
        if self.list_collector_for_sub_block(&block.id).is_some() {
            return true;
        }
        let section_repeats = self
            .section_for_block(&block.id)
            .is_some_and(|section| section.repeat.is_some());
        let group_repeats = self
            .group_for_block(&block.id)
            .is_some_and(|group| group.repeat.is_some());
        section_repeats || group_repeats
    }

    pub fn answer_ids(&self) -> BTreeSet<&str> {
        self.sections
            .iter()
            .flat_map(Section::all_blocks)
            .flat_map(Block::questions)
            .flat_map(|question| question.answers.iter().map(|answer| answer.id.as_str()))
            .collect()
    }

    /// Lists declared by list collectors.
    pub fn list_names(&self) -> BTreeSet<&str> {
        self.sections
            .iter()
            .flat_map(Section::blocks)
            .filter(|block| block.kind.is_list_collector())
            .filter_map(|block| block.for_list.as_deref())
            .collect()
    }

    pub fn is_terminal_block(&self, block_id: &str) -> bool {
        self.block(block_id)
            .is_some_and(|block| block.kind.is_terminal())
    }
}
