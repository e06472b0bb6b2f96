use std::fmt;
use std::str::FromStr;

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_decode_str, utf8_percent_encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Root of every questionnaire URL; also the hub page.
pub const QUESTIONNAIRE_PREFIX: &str = "/questionnaire/";

const SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Single addressable point in a questionnaire.
///
/// Locations on a repeated list item carry both the list name and the item id.
/// Their URL form is `/questionnaire/{section}/{list}/{item}/{block}/`; every other
/// location renders as `/questionnaire/{section}/{block}/`.
///
/// Parsing the URL gives back the same location as long as no id is empty. Validated
/// schemas never declare empty ids, so every location the router builds round-trips.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Location {
    section_id: String,
    block_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    list_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    list_item_id: Option<String>,
}

impl Location {
    pub fn new(section_id: impl Into<String>, block_id: impl Into<String>) -> Self {
        Self {
            section_id: section_id.into(),
            block_id: block_id.into(),
            list_name: None,
            list_item_id: None,
        }
    }

    pub fn for_list_item(
        section_id: impl Into<String>,
        block_id: impl Into<String>,
        list_name: impl Into<String>,
        list_item_id: impl Into<String>,
    ) -> Self {
        Self {
            section_id: section_id.into(),
            block_id: block_id.into(),
            list_name: Some(list_name.into()),
            list_item_id: Some(list_item_id.into()),
        }
    }

    pub(crate) fn from_parts(
        section_id: &str,
        block_id: &str,
        list_name: Option<&str>,
        list_item_id: Option<&str>,
    ) -> Self {
        Self {
            section_id: section_id.to_string(),
            block_id: block_id.to_string(),
            list_name: list_name.map(str::to_string),
            list_item_id: list_item_id.map(str::to_string),
        }
    }

    pub fn section_id(&self) -> &str {
        &self.section_id
    }

    pub fn block_id(&self) -> &str {
        &self.block_id
    }

    pub fn list_name(&self) -> Option<&str> {
        self.list_name.as_deref()
    }

    pub fn list_item_id(&self) -> Option<&str> {
        self.list_item_id.as_deref()
    }

    pub fn url(&self) -> String {
        let section = encode(&self.section_id);
        let block = encode(&self.block_id);
        if self.list_name.is_none() && self.list_item_id.is_none() {
            return format!("{QUESTIONNAIRE_PREFIX}{section}/{block}/");
        }
        let list = encode(self.list_name.as_deref().unwrap_or_default());
        let item = encode(self.list_item_id.as_deref().unwrap_or_default());
        format!("{QUESTIONNAIRE_PREFIX}{section}/{list}/{item}/{block}/")
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.url())
    }
}

/// Errors raised when a URL does not describe a location.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LocationParseError {
    #[error("'{0}' is not a questionnaire url")]
    MissingPrefix(String),
    #[error("'{url}' has {count} path segments, expected 2 or 4")]
    SegmentCount { url: String, count: usize },
    #[error("'{0}' has an empty section or block segment")]
    EmptySegment(String),
    #[error("'{0}' contains a segment that is not valid utf-8")]
    InvalidEncoding(String),
}

impl FromStr for Location {
    type Err = LocationParseError;

    fn from_str(url: &str) -> Result<Self, Self::Err> {
        let rest = url
            .strip_prefix(QUESTIONNAIRE_PREFIX)
            .ok_or_else(|| LocationParseError::MissingPrefix(url.to_string()))?;
        let trimmed = rest.strip_suffix('/').unwrap_or(rest);
        let segments = trimmed
            .split('/')
            .map(|segment| decode(segment, url))
            .collect::<Result<Vec<_>, _>>()?;

        let (section_id, list_name, list_item_id, block_id) = match segments.as_slice() {
            [section, block] => (section, None, None, block),
            [section, list, item, block] => (section, non_empty(list), non_empty(item), block),
            other => {
                return Err(LocationParseError::SegmentCount {
                    url: url.to_string(),
                    count: other.len(),
                });
            }
        };
        if section_id.is_empty() || block_id.is_empty() {
            return Err(LocationParseError::EmptySegment(url.to_string()));
        }

        Ok(Location {
            section_id: section_id.clone(),
            block_id: block_id.clone(),
            list_name,
            list_item_id,
        })
    }
}

fn encode(segment: &str) -> String {
    utf8_percent_encode(segment, SEGMENT).to_string()
}

fn decode(segment: &str, url: &str) -> Result<String, LocationParseError> {
    percent_decode_str(segment)
        .decode_utf8()
        .map(|decoded| decoded.into_owned())
        .map_err(|_| LocationParseError::InvalidEncoding(url.to_string()))
}

fn non_empty(segment: &str) -> Option<String> {
    (!segment.is_empty()).then(|| segment.to_string())
}
