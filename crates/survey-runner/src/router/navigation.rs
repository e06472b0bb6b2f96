use survey_schema::QuestionnaireSchema;
use tracing::debug;

use super::{Router, RouterError};
use crate::location::{Location, QUESTIONNAIRE_PREFIX};

pub const HUB_URL: &str = QUESTIONNAIRE_PREFIX;
pub const SUBMIT_URL: &str = "/questionnaire/submit/";

/// Where a next/previous step lands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationTarget {
    Location(Location),
    Hub,
    Submit,
}

impl NavigationTarget {
    pub fn url(&self) -> String {
        match self {
            NavigationTarget::Location(location) => location.url(),
            NavigationTarget::Hub => HUB_URL.to_string(),
            NavigationTarget::Submit => SUBMIT_URL.to_string(),
        }
    }

    pub fn location(&self) -> Option<&Location> {
        match self {
            NavigationTarget::Location(location) => Some(location),
            _ => None,
        }
    }
}

/// Decides where navigation goes once it steps off either end of a section's path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationPolicy {
    /// Sections run back to back and finish on the submit page.
    Linear,
    /// Every section starts and ends at the hub.
    HubAndSpoke,
}

impl NavigationPolicy {
    pub fn for_schema(schema: &QuestionnaireSchema) -> Self {
        if schema.is_hub_enabled() {
            NavigationPolicy::HubAndSpoke
        } else {
            NavigationPolicy::Linear
        }
    }

    fn after_last(self, router: &Router<'_>, current: &Location) -> NavigationTarget {
        match self {
            NavigationPolicy::HubAndSpoke => NavigationTarget::Hub,
            NavigationPolicy::Linear => router.next_section_target(current),
        }
    }

    fn before_first(self, router: &Router<'_>, current: &Location) -> Option<NavigationTarget> {
        match self {
            NavigationPolicy::HubAndSpoke => Some(NavigationTarget::Hub),
            NavigationPolicy::Linear => router
                .previous_section_location(current)
                .map(NavigationTarget::Location),
        }
    }
}

impl Router<'_> {
    /// Location after `current` on `routing_path`; off the end the navigation policy decides.
    pub fn get_next_location(
        &self,
        current: &Location,
        routing_path: &[Location],
    ) -> Result<NavigationTarget, RouterError> {
        let index = position_on_path(current, routing_path)?;
        if let Some(next) = routing_path.get(index + 1) {
            return Ok(NavigationTarget::Location(next.clone()));
        }
        let target = self.policy.after_last(self, current);
        debug!(location = %current, target = %target.url(), "left end of routing path");
        Ok(target)
    }

    pub fn get_next_location_url(
        &self,
        current: &Location,
        routing_path: &[Location],
    ) -> Result<String, RouterError> {
        self.get_next_location(current, routing_path)
            .map(|target| target.url())
    }

    /// Location before `current` on `routing_path`; `None` at the very start of a linear
    /// questionnaire.
    pub fn get_previous_location(
        &self,
        current: &Location,
        routing_path: &[Location],
    ) -> Result<Option<NavigationTarget>, RouterError> {
        let index = position_on_path(current, routing_path)?;
        if let Some(previous) = index.checked_sub(1).and_then(|index| routing_path.get(index)) {
            return Ok(Some(NavigationTarget::Location(previous.clone())));
        }
        Ok(self.policy.before_first(self, current))
    }

    pub fn get_previous_location_url(
        &self,
        current: &Location,
        routing_path: &[Location],
    ) -> Result<Option<String>, RouterError> {
        self.get_previous_location(current, routing_path)
            .map(|target| target.map(|target| target.url()))
    }

    /// An incomplete section sends the respondent back to its first gap; otherwise the
    /// next enabled section instance starts, and after the last one comes submission.
    fn next_section_target(&self, current: &Location) -> NavigationTarget {
        let key = self.section_key_for(current);
        if !self
            .progress
            .is_section_complete(&key.section_id, key.list_item_id())
        {
            let section_path = self.instance_path(&key);
            if let Some(incomplete) =
                self.get_first_incomplete_location_for_section(&section_path, &key.section_id)
                && incomplete != *current
            {
                return NavigationTarget::Location(incomplete);
            }
        }

        let instances = self.section_instance_keys();
        let start = instances
            .iter()
            .position(|instance| *instance == key)
            .map_or(instances.len(), |index| index + 1);
        instances[start..]
            .iter()
            .find_map(|instance| {
                let path = self.instance_path(instance);
                self.get_first_incomplete_location_for_section(&path, &instance.section_id)
                    .or_else(|| path.into_iter().next())
            })
            .map_or(NavigationTarget::Submit, NavigationTarget::Location)
    }

    fn previous_section_location(&self, current: &Location) -> Option<Location> {
        let key = self.section_key_for(current);
        let instances = self.section_instance_keys();
        let end = instances.iter().position(|instance| *instance == key)?;
        instances[..end]
            .iter()
            .rev()
            .find_map(|instance| self.instance_path(instance).pop())
    }
}

fn position_on_path(current: &Location, routing_path: &[Location]) -> Result<usize, RouterError> {
    routing_path
        .iter()
        .position(|location| location == current)
        .ok_or_else(|| RouterError::LocationNotOnPath(current.url()))
}
