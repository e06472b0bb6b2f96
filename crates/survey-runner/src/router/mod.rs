//! Routing over a questionnaire schema and the current answer/list/progress state.
//!
//! A [`Router`] borrows the schema and the three stores for the duration of one
//! request. Section paths are computed lazily in a single forward pass and cached
//! per section instance; the stores cannot change underneath a router, so the
//! cache never needs invalidating.

use std::cell::RefCell;
use std::collections::HashMap;

use survey_schema::{QuestionnaireSchema, Section};
use thiserror::Error;
use tracing::debug;

use crate::answer_store::AnswerStore;
use crate::list_store::ListStore;
use crate::location::Location;
use crate::metadata::Metadata;
use crate::progress_store::{CompletionStatus, ProgressStore, SectionKey};
use crate::rules::RuleContext;

mod navigation;
mod path;

pub use navigation::{HUB_URL, NavigationPolicy, NavigationTarget, SUBMIT_URL};

/// Caller-contract violations. Stale list items are never errors; they are inaccessible.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouterError {
    #[error("unknown section '{0}'")]
    UnknownSection(String),
    #[error("section '{0}' repeats over a list; a list item id is required")]
    ListItemRequired(String),
    #[error("section '{section_id}' does not repeat but list item '{list_item_id}' was given")]
    UnexpectedListItem {
        section_id: String,
        list_item_id: String,
    },
    #[error("location {0} is not on the routing path")]
    LocationNotOnPath(String),
}

#[derive(Debug)]
pub struct Router<'a> {
    schema: &'a QuestionnaireSchema,
    answers: &'a AnswerStore,
    lists: &'a ListStore,
    progress: &'a ProgressStore,
    metadata: &'a Metadata,
    policy: NavigationPolicy,
    paths: RefCell<HashMap<SectionKey, Vec<Location>>>,
}

impl<'a> Router<'a> {
    pub fn new(
        schema: &'a QuestionnaireSchema,
        answers: &'a AnswerStore,
        lists: &'a ListStore,
        progress: &'a ProgressStore,
        metadata: &'a Metadata,
    ) -> Self {
        Self {
            schema,
            answers,
            lists,
            progress,
            metadata,
            policy: NavigationPolicy::for_schema(schema),
            paths: RefCell::new(HashMap::new()),
        }
    }

    pub fn schema(&self) -> &'a QuestionnaireSchema {
        self.schema
    }

    pub fn navigation_policy(&self) -> NavigationPolicy {
        self.policy
    }

    /// Evaluation context over this router's state, optionally positioned at a location.
    pub fn rule_context<'l>(&'l self, location: Option<&'l Location>) -> RuleContext<'l> {
        let ctx = RuleContext::new(self.schema, self.metadata, self.answers, self.lists);
        match location {
            Some(location) => ctx.at(location),
            None => ctx,
        }
    }

    /// True iff `location` is on `routing_path` and any list item it names still exists.
    pub fn can_access_location(&self, location: &Location, routing_path: &[Location]) -> bool {
        if let Some(list_item_id) = location.list_item_id() {
            let list_name = location.list_name().or_else(|| {
                self.schema
                    .section(location.section_id())
                    .and_then(Section::repeating_list)
            });
            let present =
                list_name.is_some_and(|list_name| self.lists.is_list_item(list_name, list_item_id));
            if !present {
                debug!(location = %location, "list item no longer exists");
                return false;
            }
        }
        routing_path.contains(location)
    }

    /// Access check for the add/edit/remove forms of a list collector on `routing_path`.
    /// Edit and remove forms need an existing item; the add form takes none.
    pub fn can_access_list_operation(&self, location: &Location, routing_path: &[Location]) -> bool {
        let Some((collector, operation)) =
            self.schema.list_collector_for_sub_block(location.block_id())
        else {
            return false;
        };
        let collector_on_path = routing_path.iter().any(|visited| {
            visited.section_id() == location.section_id() && visited.block_id() == collector.id
        });
        if !collector_on_path {
            return false;
        }
        let Some(list_name) = collector.for_list.as_deref() else {
            return false;
        };

        match (operation.targets_item(), location.list_item_id()) {
            (true, Some(list_item_id)) => {
                location.list_name().is_none_or(|name| name == list_name)
                    && self.lists.is_list_item(list_name, list_item_id)
            }
            (false, None) => true,
            _ => false,
        }
    }

    /// First location of `routing_path` not yet visited in the section's progress entry.
    pub fn get_first_incomplete_location_for_section(
        &self,
        routing_path: &[Location],
        section_id: &str,
    ) -> Option<Location> {
        let list_item_id = self.progress_list_item(routing_path, section_id);
        let entry = self.progress.get(section_id, list_item_id);
        routing_path
            .iter()
            .find(|location| !entry.is_some_and(|entry| entry.has_visited(location)))
            .cloned()
    }

    /// Last location of the contiguous visited prefix of `routing_path`.
    pub fn get_last_complete_location_for_section(
        &self,
        routing_path: &[Location],
        section_id: &str,
    ) -> Option<Location> {
        let list_item_id = self.progress_list_item(routing_path, section_id);
        let entry = self.progress.get(section_id, list_item_id)?;
        routing_path
            .iter()
            .take_while(|location| entry.has_visited(location))
            .last()
            .cloned()
    }

    /// Every applicable section instance, each list item of repeating sections included,
    /// is completed. Instances with nothing to answer are not required.
    pub fn is_survey_complete(&self) -> bool {
        for section in &self.schema.sections {
            for list_item_id in self.section_instances(section) {
                if self.requires_completion(section, list_item_id)
                    && !self.progress.is_section_complete(&section.id, list_item_id)
                {
                    debug!(
                        section = %section.id,
                        list_item_id = ?list_item_id,
                        "questionnaire incomplete"
                    );
                    return false;
                }
            }
        }
        true
    }

    /// Where a returning respondent resumes: the first unvisited location of the
    /// first applicable section instance that is not yet complete.
    pub fn get_first_incomplete_location_in_survey(&self) -> Option<Location> {
        for section in &self.schema.sections {
            for list_item_id in self.section_instances(section) {
                if !self.requires_completion(section, list_item_id)
                    || self.progress.is_section_complete(&section.id, list_item_id)
                {
                    continue;
                }
                let path = self.section_path(section, list_item_id);
                return self
                    .get_first_incomplete_location_for_section(&path, &section.id)
                    .or_else(|| path.first().cloned());
            }
        }
        None
    }

    pub fn section_status(&self, section_id: &str, list_item_id: Option<&str>) -> CompletionStatus {
        self.progress.get_completion_status(section_id, list_item_id)
    }

    /// The hub opens once every section it requires is complete.
    pub fn can_access_hub(&self) -> bool {
        if self.policy != NavigationPolicy::HubAndSpoke {
            return false;
        }
        self.schema
            .navigation
            .hub
            .required_completed_sections
            .iter()
            .filter_map(|section_id| self.schema.section(section_id))
            .all(|section| {
                self.section_instances(section)
                    .into_iter()
                    .all(|list_item_id| {
                        !self.requires_completion(section, list_item_id)
                            || self.progress.is_section_complete(&section.id, list_item_id)
                    })
            })
    }

    /// Section instances whose routing path is currently non-empty, in schema order.
    pub fn enabled_section_instances(&self) -> Vec<SectionKey> {
        self.section_instance_keys()
            .into_iter()
            .filter(|key| !self.instance_path(key).is_empty())
            .collect()
    }

    /// Section instances in schema order; repeating sections expand per list item.
    pub fn section_instance_keys(&self) -> Vec<SectionKey> {
        self.schema
            .sections
            .iter()
            .flat_map(|section| {
                self.section_instances(section)
                    .into_iter()
                    .map(|list_item_id| SectionKey::new(section.id.clone(), list_item_id))
            })
            .collect()
    }

    /// List item ids a section is answered for; `[None]` for non-repeating sections.
    pub(crate) fn section_instances(&self, section: &Section) -> Vec<Option<&'a str>> {
        let Some(repeat) = &section.repeat else {
            return vec![None];
        };
        let primary = self.lists.primary_item(&repeat.for_list);
        self.lists
            .items(&repeat.for_list)
            .iter()
            .map(String::as_str)
            .filter(|item| repeat.include_primary || primary != Some(*item))
            .map(Some)
            .collect()
    }

    pub(crate) fn section_key_for(&self, location: &Location) -> SectionKey {
        let repeats = self
            .schema
            .section(location.section_id())
            .is_some_and(|section| section.repeat.is_some());
        let list_item_id = if repeats {
            location.list_item_id()
        } else {
            None
        };
        SectionKey::new(location.section_id(), list_item_id)
    }

    pub(crate) fn instance_path(&self, key: &SectionKey) -> Vec<Location> {
        self.schema
            .section(&key.section_id)
            .map(|section| self.section_path(section, key.list_item_id()))
            .unwrap_or_default()
    }

    fn requires_completion(&self, section: &Section, list_item_id: Option<&str>) -> bool {
        self.section_path(section, list_item_id)
            .iter()
            .any(|location| !self.schema.is_terminal_block(location.block_id()))
    }

    /// Progress entries of repeating sections are keyed by the path's list item.
    fn progress_list_item<'p>(&self, routing_path: &'p [Location], section_id: &str) -> Option<&'p str> {
        let repeats = self
            .schema
            .section(section_id)
            .is_some_and(|section| section.repeat.is_some());
        if !repeats {
            return None;
        }
        routing_path
            .iter()
            .find(|location| location.section_id() == section_id)
            .and_then(Location::list_item_id)
    }
}
