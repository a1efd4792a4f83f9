use std::collections::BTreeSet;

use crate::{Mechanism, Node};

/// Category/domain restriction for a single query. An empty filter admits
/// everything; otherwise a tagged item passes when any of its tags is in the
/// filter. Tags compare case-insensitively after trimming.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryFilter {
    categories: BTreeSet<String>,
}

impl CategoryFilter {
    pub fn new<I, S>(categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let categories = categories
            .into_iter()
            .map(|category| normalize_category(category.as_ref()))
            .filter(|category| !category.is_empty())
            .collect();
        Self { categories }
    }

    pub fn from_request(categories: Option<&[String]>) -> Self {
        categories.map(Self::new).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.categories.iter().map(String::as_str)
    }

    pub fn matches(&self, tags: &[String]) -> bool {
        if self.categories.is_empty() {
            return true;
        }
        tags.iter()
            .any(|tag| self.categories.contains(&normalize_category(tag)))
    }

    pub fn allows_mechanism(&self, mechanism: &Mechanism) -> bool {
        self.matches(&mechanism.categories)
    }

    pub fn allows_node(&self, node: &Node) -> bool {
        self.matches(&node.categories)
    }
}

pub(crate) fn normalize_category(value: &str) -> String {
    value.trim().to_ascii_lowercase()
}
