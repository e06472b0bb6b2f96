use crate::rules::WhenRule;
use crate::spec::block::Block;
use serde::{Deserialize, Serialize};

fn include_primary_default() -> bool {
    true
}

/// Binds a section to a list; the section is answered once per list item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionRepeat {
    pub for_list: String,
    #[serde(default = "include_primary_default")]
    pub include_primary: bool,
}

/// Binds a group to a list; its blocks are expanded once per list item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupRepeat {
    pub for_list: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(
        default,
        deserialize_with = "crate::rules::deserialize_when",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub when: Vec<WhenRule>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repeat: Option<GroupRepeat>,
    pub blocks: Vec<Block>,
}

impl Group {
    pub fn contains_block(&self, block_id: &str) -> bool {
        self.blocks.iter().any(|block| block.id == block_id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(
        default,
        deserialize_with = "crate::rules::deserialize_when",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub when: Vec<WhenRule>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repeat: Option<SectionRepeat>,
    pub groups: Vec<Group>,
}

impl Section {
    pub fn repeating_list(&self) -> Option<&str> {
        self.repeat.as_ref().map(|repeat| repeat.for_list.as_str())
    }

    /// Top-level blocks in declaration order.
    pub fn blocks(&self) -> impl Iterator<Item = &Block> {
        self.groups.iter().flat_map(|group| group.blocks.iter())
    }

    /// Top-level blocks followed by the forms nested inside each of them.
    pub fn all_blocks(&self) -> impl Iterator<Item = &Block> {
        self.blocks().flat_map(|block| {
            std::iter::once(block).chain(block.sub_blocks().map(|(_, sub_block)| sub_block))
        })
    }

    pub fn first_block(&self) -> Option<&Block> {
        self.blocks().next()
    }
}
