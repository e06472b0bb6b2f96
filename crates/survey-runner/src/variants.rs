use std::collections::BTreeSet;

use survey_schema::{Block, ContentSpec, QuestionSpec, Variant};

use crate::rules::RuleContext;

/// Returns the fixed payload when declared, otherwise the first variant whose rules hold.
pub fn choose_variant<'s, V: Variant>(
    single: Option<&'s V::Payload>,
    variants: &'s [V],
    ctx: &RuleContext<'_>,
) -> Option<&'s V::Payload> {
    if let Some(single) = single {
        return Some(single);
    }
    variants
        .iter()
        .find(|variant| ctx.evaluate(variant.when()))
        .map(V::payload)
}

pub fn choose_question_to_display<'s>(
    block: &'s Block,
    ctx: &RuleContext<'_>,
) -> Option<&'s QuestionSpec> {
    choose_variant(block.question.as_ref(), &block.question_variants, ctx)
}

pub fn choose_content_to_display<'s>(
    block: &'s Block,
    ctx: &RuleContext<'_>,
) -> Option<&'s ContentSpec> {
    choose_variant(block.content.as_ref(), &block.content_variants, ctx)
}

/// Copy of `block` with variants replaced by the chosen question/content. List collectors
/// get the same treatment for their add/edit/remove forms, one level deep.
pub fn transform_variants(block: &Block, ctx: &RuleContext<'_>) -> Block {
    let mut output = resolve_block_variants(block, ctx);
    if block.kind.is_list_collector() {
        for (operation, sub_block) in block.sub_blocks() {
            let resolved = resolve_block_variants(sub_block, ctx);
            if let Some(slot) = output.sub_block_mut(operation) {
                *slot = resolved;
            }
        }
    }
    output
}

fn resolve_block_variants(block: &Block, ctx: &RuleContext<'_>) -> Block {
    let mut output = block.clone();
    if !block.question_variants.is_empty() {
        output.question = choose_question_to_display(block, ctx).cloned();
        output.question_variants.clear();
    }
    if !block.content_variants.is_empty() {
        output.content = choose_content_to_display(block, ctx).cloned();
        output.content_variants.clear();
    }
    output
}

/// Answer ids of every question the block can display, in declaration order.
pub fn get_answer_ids_in_block(block: &Block) -> Vec<&str> {
    let mut seen = BTreeSet::new();
    block
        .questions()
        .flat_map(|question| question.answers.iter())
        .map(|answer| answer.id.as_str())
        .filter(|id| seen.insert(*id))
        .collect()
}
