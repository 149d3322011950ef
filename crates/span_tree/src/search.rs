//! Name matching for search highlights

use regex::{Regex, RegexBuilder};
use thiserror::Error;
use crate::record::SpanId;
use crate::tree::{RenderNode, RenderTree};

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("Invalid search pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// A compiled search term.
///
/// The term is a regular expression matched anywhere in a node name. An
/// empty term matches nothing.
#[derive(Debug, Clone)]
pub struct SearchMatcher {
    term: String,
    regex: Option<Regex>,
    ignore_case: bool,
}

impl SearchMatcher {
    pub fn new(term: &str, ignore_case: bool) -> Result<Self, SearchError> {
        let regex = if term.is_empty() {
            None
        } else {
            let regex = RegexBuilder::new(term)
                .case_insensitive(ignore_case)
                .build()
                .map_err(|source| SearchError::InvalidPattern {
                    pattern: term.to_string(),
                    source,
                })?;
            Some(regex)
        };

        Ok(Self {
            term: term.to_string(),
            regex,
            ignore_case,
        })
    }

    /// Matcher that never matches
    pub fn none() -> Self {
        Self {
            term: String::new(),
            regex: None,
            ignore_case: false,
        }
    }

    pub fn term(&self) -> &str {
        &self.term
    }

    pub fn ignore_case(&self) -> bool {
        self.ignore_case
    }

    pub fn is_active(&self) -> bool {
        self.regex.is_some()
    }

    pub fn matches_name(&self, name: &str) -> bool {
        match &self.regex {
            Some(regex) if !name.is_empty() => regex.is_match(name),
            _ => false,
        }
    }

    pub fn is_match(&self, node: &RenderNode) -> bool {
        self.matches_name(&node.name)
    }

    /// Ids of every matching node, in pre-order
    pub fn matching_ids(&self, tree: &RenderTree) -> Vec<SpanId> {
        if !self.is_active() {
            return Vec::new();
        }
        tree.walk()
            .filter(|(_, node)| self.is_match(node))
            .map(|(_, node)| node.id.clone())
            .collect()
    }
}

/// One-shot form of [`SearchMatcher::is_match`]
pub fn search_match(node: &RenderNode, term: &str, ignore_case: bool) -> Result<bool, SearchError> {
    Ok(SearchMatcher::new(term, ignore_case)?.is_match(node))
}
