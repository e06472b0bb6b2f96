use serde::{Deserialize, Serialize};

use crate::location::Location;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CompletionStatus {
    #[default]
    NotStarted,
    InProgress,
    Completed,
}

/// Identifies one section instance: a section, or a section repeated for one list item.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SectionKey {
    pub section_id: String,
    pub list_item_id: Option<String>,
}

impl SectionKey {
    pub fn new(section_id: impl Into<String>, list_item_id: Option<&str>) -> Self {
        Self {
            section_id: section_id.into(),
            list_item_id: list_item_id.map(str::to_string),
        }
    }

    pub fn list_item_id(&self) -> Option<&str> {
        self.list_item_id.as_deref()
    }
}

/// Completion state of one section instance plus the locations visited so far.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionProgress {
    pub section_id: String,
    #[serde(default)]
    pub list_item_id: Option<String>,
    pub status: CompletionStatus,
    #[serde(default)]
    pub locations: Vec<Location>,
}

impl SectionProgress {
    fn is_for(&self, section_id: &str, list_item_id: Option<&str>) -> bool {
        self.section_id == section_id && self.list_item_id.as_deref() == list_item_id
    }

    pub fn key(&self) -> SectionKey {
        SectionKey::new(self.section_id.clone(), self.list_item_id.as_deref())
    }

    pub fn has_visited(&self, location: &Location) -> bool {
        self.locations.contains(location)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProgressStore {
    sections: Vec<SectionProgress>,
}

impl ProgressStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries(entries: impl IntoIterator<Item = SectionProgress>) -> Self {
        Self {
            sections: entries.into_iter().collect(),
        }
    }

    pub fn get(&self, section_id: &str, list_item_id: Option<&str>) -> Option<&SectionProgress> {
        self.sections
            .iter()
            .find(|entry| entry.is_for(section_id, list_item_id))
    }

    pub fn get_completion_status(
        &self,
        section_id: &str,
        list_item_id: Option<&str>,
    ) -> CompletionStatus {
        self.get(section_id, list_item_id)
            .map(|entry| entry.status)
            .unwrap_or_default()
    }

    pub fn is_section_complete(&self, section_id: &str, list_item_id: Option<&str>) -> bool {
        self.get_completion_status(section_id, list_item_id) == CompletionStatus::Completed
    }

    /// Sets the status of a section instance, creating its entry on first use.
    /// Returns true when the stored status changed.
    pub fn update_section_status(
        &mut self,
        section_id: &str,
        list_item_id: Option<&str>,
        status: CompletionStatus,
    ) -> bool {
        let entry = self.entry_mut(section_id, list_item_id);
        let changed = entry.status != status;
        entry.status = status;
        changed
    }

    /// Records `location` as visited for the section instance. A not-started entry
    /// moves to in-progress.
    pub fn add_completed_location(
        &mut self,
        section_id: &str,
        list_item_id: Option<&str>,
        location: Location,
    ) {
        let entry = self.entry_mut(section_id, list_item_id);
        if entry.status == CompletionStatus::NotStarted {
            entry.status = CompletionStatus::InProgress;
        }
        if !entry.locations.contains(&location) {
            entry.locations.push(location);
        }
    }

    pub fn remove_completed_location(
        &mut self,
        section_id: &str,
        list_item_id: Option<&str>,
        location: &Location,
    ) -> bool {
        let Some(entry) = self
            .sections
            .iter_mut()
            .find(|entry| entry.is_for(section_id, list_item_id))
        else {
            return false;
        };
        let before = entry.locations.len();
        entry.locations.retain(|visited| visited != location);
        entry.locations.len() != before
    }

    /// Drops every entry keyed to `list_item_id` and every visited location referencing it.
    pub fn remove_progress_for_list_item(&mut self, list_item_id: &str) {
        self.sections
            .retain(|entry| entry.list_item_id.as_deref() != Some(list_item_id));
        for entry in &mut self.sections {
            entry
                .locations
                .retain(|location| location.list_item_id() != Some(list_item_id));
        }
    }

    pub fn remove_progress(&mut self, section_id: &str, list_item_id: Option<&str>) -> bool {
        let before = self.sections.len();
        self.sections
            .retain(|entry| !entry.is_for(section_id, list_item_id));
        self.sections.len() != before
    }

    pub fn started_section_keys(&self) -> Vec<SectionKey> {
        self.sections
            .iter()
            .filter(|entry| entry.status != CompletionStatus::NotStarted)
            .map(SectionProgress::key)
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SectionProgress> {
        self.sections.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    fn entry_mut(&mut self, section_id: &str, list_item_id: Option<&str>) -> &mut SectionProgress {
        let index = match self
            .sections
            .iter()
            .position(|entry| entry.is_for(section_id, list_item_id))
        {
            Some(index) => index,
            None => {
                self.sections.push(SectionProgress {
                    section_id: section_id.to_string(),
                    list_item_id: list_item_id.map(str::to_string),
                    status: CompletionStatus::NotStarted,
                    locations: Vec::new(),
                });
                self.sections.len() - 1
            }
        };
        &mut self.sections[index]
    }
}
