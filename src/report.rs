//! Author-facing validation report.
//!
//! Parse errors and semantic validation issues both land here. A non-empty
//! report blocks the turn: no association, no selection, no cache write,
//! until the author fixes the listed entries.

/// Issues for one entry, under its rendered label.
#[derive(Debug, Clone, PartialEq)]
pub struct EntryIssues {
    pub label: String,
    pub issues: Vec<String>,
}

/// Everything that blocked the current turn.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationReport {
    pub items: Vec<EntryIssues>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, label: impl Into<String>, issues: Vec<String>) {
        if !issues.is_empty() {
            self.items.push(EntryIssues { label: label.into(), issues });
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn issue_count(&self) -> usize {
        self.items.iter().map(|item| item.issues.len()).sum()
    }
}

impl std::fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for item in &self.items {
            writeln!(f, "{}:", item.label)?;
            for issue in &item.issues {
                writeln!(f, "  - {issue}")?;
            }
        }
        Ok(())
    }
}
