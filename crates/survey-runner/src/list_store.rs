use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

const GENERATED_ID_LEN: usize = 6;

/// Named dynamic list of opaque item ids, kept in creation order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListModel {
    pub name: String,
    #[serde(default, deserialize_with = "deserialize_item_ids")]
    pub items: Vec<String>,
    #[serde(
        rename = "primary_person",
        alias = "primary_item_id",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub primary_item: Option<String>,
}

impl ListModel {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            items: Vec::new(),
            primary_item: None,
        }
    }

    /// Drops repeated item ids, keeping each at its first position.
    pub fn deduplicated(mut self) -> Self {
        self.items = unique_item_ids(self.items);
        self
    }

    pub fn contains(&self, item_id: &str) -> bool {
        self.items.iter().any(|item| item == item_id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ListStore {
    lists: Vec<ListModel>,
}

impl ListStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_lists(lists: impl IntoIterator<Item = ListModel>) -> Self {
        Self {
            lists: lists.into_iter().map(ListModel::deduplicated).collect(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&ListModel> {
        self.lists.iter().find(|list| list.name == name)
    }

    /// Item ids of `name`; empty for a list nobody has added to yet.
    pub fn items(&self, name: &str) -> &[String] {
        self.get(name).map(|list| list.items.as_slice()).unwrap_or_default()
    }

    pub fn count(&self, name: &str) -> usize {
        self.items(name).len()
    }

    pub fn is_list_item(&self, name: &str, item_id: &str) -> bool {
        self.get(name).is_some_and(|list| list.contains(item_id))
    }

    pub fn primary_item(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(|list| list.primary_item.as_deref())
    }

    pub fn list_item_position(&self, name: &str, item_id: &str) -> Option<usize> {
        self.items(name).iter().position(|item| item == item_id)
    }

    pub fn lists(&self) -> impl Iterator<Item = &ListModel> {
        self.lists.iter()
    }

    /// Appends `item_id` to `name`, creating the list on first use. Returns false for duplicates.
    pub fn add_list_item(&mut self, name: &str, item_id: impl Into<String>) -> bool {
        let item_id = item_id.into();
        let list = self.list_mut(name);
        if list.contains(&item_id) {
            return false;
        }
        list.items.push(item_id);
        true
    }

    /// Appends a freshly generated item id and returns it.
    pub fn add_generated_list_item(&mut self, name: &str) -> String {
        let list = self.list_mut(name);
        let item_id = loop {
            let candidate = generate_item_id();
            if !list.contains(&candidate) {
                break candidate;
            }
        };
        list.items.push(item_id.clone());
        item_id
    }

    /// Removes `item_id` from `name`, clearing the primary flag when it pointed at the item.
    pub fn delete_list_item(&mut self, name: &str, item_id: &str) -> bool {
        let Some(list) = self.lists.iter_mut().find(|list| list.name == name) else {
            return false;
        };
        let before = list.items.len();
        list.items.retain(|item| item != item_id);
        if list.primary_item.as_deref() == Some(item_id) {
            list.primary_item = None;
        }
        list.items.len() != before
    }

    /// Flags `item_id` as primary and moves it to the front of the list.
    pub fn set_primary_item(&mut self, name: &str, item_id: impl Into<String>) {
        let item_id = item_id.into();
        let list = self.list_mut(name);
        list.items.retain(|item| item != &item_id);
        list.items.insert(0, item_id.clone());
        list.primary_item = Some(item_id);
    }

    fn list_mut(&mut self, name: &str) -> &mut ListModel {
        let index = match self.lists.iter().position(|list| list.name == name) {
            Some(index) => index,
            None => {
                self.lists.push(ListModel::new(name));
                self.lists.len() - 1
            }
        };
        &mut self.lists[index]
    }
}

fn generate_item_id() -> String {
    Uuid::new_v4()
        .simple()
        .to_string()
        .chars()
        .take(GENERATED_ID_LEN)
        .collect()
}

fn deserialize_item_ids<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Vec::<String>::deserialize(deserializer).map(unique_item_ids)
}

fn unique_item_ids(items: Vec<String>) -> Vec<String> {
    let mut unique: Vec<String> = Vec::with_capacity(items.len());
    for item in items {
        if !unique.contains(&item) {
            unique.push(item);
        }
    }
    unique
}
