//! Match-capable entry view.
//!
//! Keyword matchers are compiled to regexes once per turn when the entry is
//! wrapped (after the modifier pass, so inherited matchers compile too), and
//! occurrence counts against a given source's text are memoized per source.
//! Scoring and association may both probe the same (entry, source) pair;
//! the second probe is a map lookup.

use std::cell::RefCell;
use std::collections::HashMap;

use regex::Regex;

use crate::Source;
use crate::model::{KeywordDef, KeywordMode};

/// Occurrence counts for one entry's keywords against one source text.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct KeywordScan {
    /// Distinct include keywords with at least one hit.
    pub unique_matched: usize,
    /// Total include-keyword occurrences across the text.
    pub total_hits: usize,
    /// Whether any exclude keyword occurred in the text.
    pub excluded: bool,
}

impl KeywordScan {
    /// The text satisfies the keyword matchers: no exclusion hit and at
    /// least one include keyword present.
    pub fn matched(&self) -> bool {
        !self.excluded && self.unique_matched > 0
    }
}

/// Compiled keyword matchers plus the per-source scan memo.
#[derive(Debug, Default)]
pub struct MatchView {
    regexes: Vec<(KeywordMode, Option<Regex>)>,
    scans: RefCell<HashMap<Source, KeywordScan>>,
}

impl MatchView {
    pub fn compile(keywords: &[KeywordDef]) -> Self {
        let regexes = keywords
            .iter()
            .map(|keyword| {
                let pattern = if keyword.exact {
                    format!(r"(?i)\b{}\b", regex::escape(&keyword.value))
                } else {
                    format!("(?i){}", regex::escape(&keyword.value))
                };
                (keyword.mode, Regex::new(&pattern).ok())
            })
            .collect();
        MatchView { regexes, scans: RefCell::new(HashMap::new()) }
    }

    /// Count keyword occurrences in `text`, memoized per `source`.
    pub fn scan(&self, source: &Source, text: &str) -> KeywordScan {
        if let Some(cached) = self.scans.borrow().get(source) {
            return *cached;
        }
        let mut scan = KeywordScan::default();
        for (mode, regex) in &self.regexes {
            let Some(regex) = regex else { continue };
            let hits = regex.find_iter(text).count();
            match mode {
                KeywordMode::Include => {
                    if hits > 0 {
                        scan.unique_matched += 1;
                        scan.total_hits += hits;
                    }
                }
                KeywordMode::Exclude => {
                    if hits > 0 {
                        scan.excluded = true;
                    }
                }
            }
        }
        self.scans.borrow_mut().insert(source.clone(), scan);
        scan
    }
}
