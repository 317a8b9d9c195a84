use serde::{Deserialize, Serialize};

/// A declared bucket tag
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tag {
    pub name: String,
    pub value: String,
}

impl Tag {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagEntry {
    pub key: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagSet {
    pub tags: Vec<TagEntry>,
}

/// `{"tagSets":[{"tags":[{"key","value"}..]}]}`, one set holding every
///  tag in declaration order. Duplicate keys are passed through; the
///  gateway keeps the last one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tagging {
    pub tag_sets: Vec<TagSet>,
}

impl Tagging {
    pub fn from_tags(tags: &[Tag]) -> Self {
        let tags = tags
            .iter()
            .map(|t| TagEntry {
                key: t.name.clone(),
                value: t.value.clone(),
            })
            .collect();
        Self {
            tag_sets: vec![TagSet { tags }],
        }
    }
}
