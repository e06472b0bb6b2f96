use std::collections::BTreeSet;

use thiserror::Error;

use crate::rules::{Operand, WhenRule};
use crate::spec::block::{Block, GotoTarget};
use crate::spec::questionnaire::QuestionnaireSchema;
use crate::spec::section::Section;

/// Configuration errors detected while loading a questionnaire schema.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("failed to parse questionnaire schema: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("{kind} id must not be empty")]
    EmptyId { kind: &'static str },
    #[error("duplicate {kind} id '{id}'")]
    DuplicateId { kind: &'static str, id: String },
    #[error("list collector '{block_id}' does not declare 'for_list'")]
    MissingListName { block_id: String },
    #[error("'{referenced_by}' references undeclared list '{list}'")]
    DanglingListReference { list: String, referenced_by: String },
    #[error("'{referenced_by}' references unknown answer '{answer_id}'")]
    DanglingAnswerReference {
        answer_id: String,
        referenced_by: String,
    },
    #[error("routing rule on block '{block_id}' targets '{target}': {reason}")]
    InvalidGoto {
        block_id: String,
        target: String,
        reason: &'static str,
    },
    #[error("list collector '{block_id}' embeds '{sub_block_id}', which nests further list forms")]
    NestedListCollector {
        block_id: String,
        sub_block_id: String,
    },
    #[error("hub requires unknown section '{0}'")]
    UnknownSection(String),
}

/// Checks the structural invariants the router relies on.
pub fn validate(schema: &QuestionnaireSchema) -> Result<(), SchemaError> {
    check_unique_ids(schema)?;
    check_list_collectors(schema)?;
    check_list_references(schema)?;
    check_rule_references(schema)?;
    for section in &schema.sections {
        check_routing_rules(section)?;
    }
    for section_id in &schema.navigation.hub.required_completed_sections {
        if schema.section(section_id).is_none() {
            return Err(SchemaError::UnknownSection(section_id.clone()));
        }
    }
    Ok(())
}

fn check_unique_ids(schema: &QuestionnaireSchema) -> Result<(), SchemaError> {
    let mut sections = BTreeSet::new();
    let mut groups = BTreeSet::new();
    let mut blocks = BTreeSet::new();
    for section in &schema.sections {
        check_non_empty("section", &section.id)?;
        if !sections.insert(section.id.as_str()) {
            return Err(duplicate("section", &section.id));
        }
        for group in &section.groups {
            check_non_empty("group", &group.id)?;
            if !groups.insert(group.id.as_str()) {
                return Err(duplicate("group", &group.id));
            }
        }
        for block in section.all_blocks() {
            check_non_empty("block", &block.id)?;
            if !blocks.insert(block.id.as_str()) {
                return Err(duplicate("block", &block.id));
            }
        }
    }
    Ok(())
}

/// Ids become url segments, and an empty segment does not parse back.
fn check_non_empty(kind: &'static str, id: &str) -> Result<(), SchemaError> {
    if id.is_empty() {
        return Err(SchemaError::EmptyId { kind });
    }
    Ok(())
}

fn duplicate(kind: &'static str, id: &str) -> SchemaError {
    SchemaError::DuplicateId {
        kind,
        id: id.to_string(),
    }
}

fn check_list_collectors(schema: &QuestionnaireSchema) -> Result<(), SchemaError> {
    for block in schema.sections.iter().flat_map(Section::blocks) {
        if block.kind.is_list_collector() && block.for_list.is_none() {
            return Err(SchemaError::MissingListName {
                block_id: block.id.clone(),
            });
        }
        for (_, sub_block) in block.sub_blocks() {
            if sub_block.kind.is_list_collector() || sub_block.sub_blocks().next().is_some() {
                return Err(SchemaError::NestedListCollector {
                    block_id: block.id.clone(),
                    sub_block_id: sub_block.id.clone(),
                });
            }
        }
    }
    Ok(())
}

fn check_list_references(schema: &QuestionnaireSchema) -> Result<(), SchemaError> {
    let declared = schema.list_names();
    let dangling = |list: &str, referenced_by: &str| SchemaError::DanglingListReference {
        list: list.to_string(),
        referenced_by: referenced_by.to_string(),
    };

    for section in &schema.sections {
        if let Some(list) = section.repeating_list()
            && !declared.contains(list)
        {
            return Err(dangling(list, &section.id));
        }
        for group in &section.groups {
            if let Some(repeat) = &group.repeat
                && !declared.contains(repeat.for_list.as_str())
            {
                return Err(dangling(&repeat.for_list, &group.id));
            }
        }
        for block in section.all_blocks() {
            if let Some(list) = &block.for_list
                && !declared.contains(list.as_str())
            {
                return Err(dangling(list, &block.id));
            }
        }
    }
    Ok(())
}

fn check_rule_references(schema: &QuestionnaireSchema) -> Result<(), SchemaError> {
    let declared_lists = schema.list_names();
    let declared_answers = schema.answer_ids();

    for (owner, rule) in when_rules(schema) {
        for operand in rule.rules.iter().flat_map(|clause| clause.operands()) {
            match operand {
                Operand::Answer { id } if !declared_answers.contains(id.as_str()) => {
                    return Err(SchemaError::DanglingAnswerReference {
                        answer_id: id.clone(),
                        referenced_by: owner.to_string(),
                    });
                }
                Operand::List { name, .. } if !declared_lists.contains(name.as_str()) => {
                    return Err(SchemaError::DanglingListReference {
                        list: name.clone(),
                        referenced_by: owner.to_string(),
                    });
                }
                _ => {}
            }
        }
    }
    Ok(())
}

/// Every when rule in the schema paired with the id of the element declaring it.
fn when_rules(schema: &QuestionnaireSchema) -> Vec<(&str, &WhenRule)> {
    let mut rules = Vec::new();
    for section in &schema.sections {
        rules.extend(section.when.iter().map(|rule| (section.id.as_str(), rule)));
        for group in &section.groups {
            rules.extend(group.when.iter().map(|rule| (group.id.as_str(), rule)));
        }
        for block in section.all_blocks() {
            collect_block_rules(block, &mut rules);
        }
    }
    rules
}

fn collect_block_rules<'a>(block: &'a Block, rules: &mut Vec<(&'a str, &'a WhenRule)>) {
    let owner = block.id.as_str();
    rules.extend(block.when.iter().map(|rule| (owner, rule)));
    for variant in &block.question_variants {
        rules.extend(variant.when.iter().map(|rule| (owner, rule)));
    }
    for variant in &block.content_variants {
        rules.extend(variant.when.iter().map(|rule| (owner, rule)));
    }
    for routing_rule in &block.routing_rules {
        rules.extend(routing_rule.goto.when.iter().map(|rule| (owner, rule)));
    }
}

fn check_routing_rules(section: &Section) -> Result<(), SchemaError> {
    let block_order: Vec<(&Block, usize)> = section
        .groups
        .iter()
        .enumerate()
        .flat_map(|(group_index, group)| group.blocks.iter().map(move |block| (block, group_index)))
        .collect();

    for (block_index, &(block, group_index)) in block_order.iter().enumerate() {
        for rule in &block.routing_rules {
            let invalid = |target: &str, reason: &'static str| SchemaError::InvalidGoto {
                block_id: block.id.clone(),
                target: target.to_string(),
                reason,
            };
            match &rule.goto.target {
                GotoTarget::Block(target) => {
                    let position = block_order.iter().position(|(other, _)| &other.id == target);
                    match position {
                        None => return Err(invalid(target, "not a block of the same section")),
                        Some(position) if position <= block_index => {
                            return Err(invalid(target, "routing may only jump forward"));
                        }
                        Some(_) => {}
                    }
                }
                GotoTarget::Group(target) => {
                    let position = section.groups.iter().position(|group| &group.id == target);
                    match position {
                        None => return Err(invalid(target, "not a group of the same section")),
                        Some(position) if position <= group_index => {
                            return Err(invalid(target, "routing may only jump forward"));
                        }
                        Some(_) => {}
                    }
                }
            }
        }
        for (_, sub_block) in block.sub_blocks() {
            if !sub_block.routing_rules.is_empty() {
                return Err(SchemaError::InvalidGoto {
                    block_id: sub_block.id.clone(),
                    target: block.id.clone(),
                    reason: "list forms do not route",
                });
            }
        }
    }
    Ok(())
}
