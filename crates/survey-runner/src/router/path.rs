use std::collections::BTreeSet;

use survey_schema::{Block, GotoTarget, Group, Section};
use tracing::{debug, trace};

use super::{Router, RouterError};
use crate::location::Location;
use crate::progress_store::SectionKey;

impl Router<'_> {
    /// Ordered locations of one section instance reachable under the current state.
    ///
    /// Repeating sections require the list item they are answered for; passing one to a
    /// non-repeating section is rejected. A list item that no longer exists yields an
    /// empty path.
    pub fn routing_path(
        &self,
        section_id: &str,
        list_item_id: Option<&str>,
    ) -> Result<Vec<Location>, RouterError> {
        let section = self
            .schema
            .section(section_id)
            .ok_or_else(|| RouterError::UnknownSection(section_id.to_string()))?;
        match (section.repeat.is_some(), list_item_id) {
            (true, None) => Err(RouterError::ListItemRequired(section_id.to_string())),
            (false, Some(list_item_id)) => Err(RouterError::UnexpectedListItem {
                section_id: section_id.to_string(),
                list_item_id: list_item_id.to_string(),
            }),
            _ => Ok(self.section_path(section, list_item_id)),
        }
    }

    /// Concatenated paths of every section instance in schema order.
    pub fn full_routing_path(&self) -> Vec<Location> {
        let mut path = Vec::new();
        for section in &self.schema.sections {
            for list_item_id in self.section_instances(section) {
                path.extend(self.section_path(section, list_item_id));
            }
        }
        path
    }

    pub(crate) fn section_path(&self, section: &Section, list_item_id: Option<&str>) -> Vec<Location> {
        let key = SectionKey::new(section.id.clone(), list_item_id);
        if let Some(path) = self.paths.borrow().get(&key) {
            return path.clone();
        }
        let path = self.build_section_path(section, list_item_id);
        self.paths.borrow_mut().insert(key, path.clone());
        path
    }

    /// Single forward pass over the section's groups and blocks.
    ///
    /// Answers of blocks in this section that the pass has not reached yet are hidden
    /// from rules, so a condition can only depend on what comes before it.
    fn build_section_path(&self, section: &Section, list_item_id: Option<&str>) -> Vec<Location> {
        let section_list = section.repeating_list();
        if let (Some(list_name), Some(item)) = (section_list, list_item_id)
            && !self.lists.is_list_item(list_name, item)
        {
            debug!(section = %section.id, list_item_id = item, "list item no longer exists");
            return Vec::new();
        }
        let section_list = section_list.filter(|_| list_item_id.is_some());

        let Some(first_block) = section.first_block() else {
            return Vec::new();
        };
        let entry = Location::from_parts(&section.id, &first_block.id, section_list, list_item_id);
        if !self.rule_context(Some(&entry)).evaluate(&section.when) {
            debug!(section = %section.id, "section disabled");
            return Vec::new();
        }

        let mut hidden: BTreeSet<String> = section.all_blocks().map(|block| block.id.clone()).collect();
        let mut pending: Option<&GotoTarget> = None;
        let mut path = Vec::new();

        for group in &section.groups {
            match pending {
                Some(GotoTarget::Group(target)) if *target != group.id => continue,
                Some(GotoTarget::Group(_)) => pending = None,
                Some(GotoTarget::Block(target)) if !group.contains_block(target) => continue,
                _ => {}
            }

            for (list_name, item) in self.group_instances(section, group, list_item_id) {
                let Some(first) = group.blocks.first() else {
                    continue;
                };
                let group_entry = Location::from_parts(&section.id, &first.id, list_name, item);
                let enabled = self
                    .rule_context(Some(&group_entry))
                    .hiding(&hidden)
                    .evaluate(&group.when);
                if !enabled {
                    trace!(group = %group.id, list_item_id = ?item, "group skipped");
                    continue;
                }

                for block in &group.blocks {
                    match pending {
                        Some(GotoTarget::Group(_)) => break,
                        Some(GotoTarget::Block(target)) if *target != block.id => continue,
                        Some(GotoTarget::Block(_)) => pending = None,
                        None => {}
                    }

                    let location = Location::from_parts(&section.id, &block.id, list_name, item);
                    let enabled = self
                        .rule_context(Some(&location))
                        .hiding(&hidden)
                        .evaluate(&block.when);
                    if !enabled {
                        trace!(block = %block.id, "block skipped");
                        continue;
                    }

                    reveal(&mut hidden, block);
                    if pending.is_none() {
                        pending = self.matching_goto(block, &location, &hidden);
                        if let Some(target) = pending {
                            trace!(block = %block.id, target = ?target, "routing rule matched");
                        }
                    }
                    if !path.contains(&location) {
                        path.push(location);
                    }
                }
            }

            // A target with no rendered instance, or gated off in each, resumes after its group.
            if let Some(GotoTarget::Block(target)) = pending
                && group.contains_block(target)
            {
                trace!(group = %group.id, target = %target, "routing target not rendered");
                pending = None;
            }
        }

        debug!(
            section = %section.id,
            list_item_id = ?list_item_id,
            locations = path.len(),
            "computed routing path"
        );
        path
    }

    /// List name and item each expansion of `group` is rendered for.
    fn group_instances<'g>(
        &'g self,
        section: &'g Section,
        group: &'g Group,
        list_item_id: Option<&'g str>,
    ) -> Vec<(Option<&'g str>, Option<&'g str>)> {
        match &group.repeat {
            Some(repeat) => self
                .lists
                .items(&repeat.for_list)
                .iter()
                .map(|item| (Some(repeat.for_list.as_str()), Some(item.as_str())))
                .collect(),
            None => vec![(
                section.repeating_list().filter(|_| list_item_id.is_some()),
                list_item_id,
            )],
        }
    }

    /// First routing rule of `block` whose condition holds; rules without one always match.
    fn matching_goto<'b>(
        &self,
        block: &'b Block,
        location: &Location,
        hidden: &BTreeSet<String>,
    ) -> Option<&'b GotoTarget> {
        let ctx = self.rule_context(Some(location)).hiding(hidden);
        block
            .routing_rules
            .iter()
            .find(|rule| ctx.evaluate(&rule.goto.when))
            .map(|rule| &rule.goto.target)
    }
}

fn reveal(hidden: &mut BTreeSet<String>, block: &Block) {
    hidden.remove(&block.id);
    for (_, sub_block) in block.sub_blocks() {
        hidden.remove(&sub_block.id);
    }
}
