//! History collaborator.
//!
//! The engine never owns conversation history; it reads prior turns through
//! [`HistoryView`], addressed by non-negative depth from the most recent
//! turn. A turn materializes the bounded window it needs exactly once into
//! an indexable list - history is small and bounded, so nothing is gained by
//! keeping the access lazy past that point.

/// Who produced a history step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryOrigin {
    Player,
    Generator,
}

/// One prior turn's text.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryStep {
    pub text: String,
    pub origin: HistoryOrigin,
}

impl HistoryStep {
    pub fn new(text: impl Into<String>, origin: HistoryOrigin) -> Self {
        HistoryStep { text: text.into(), origin }
    }
}

/// An ordered, reversible view over prior turns. Depth 0 is the most recent
/// turn; `None` means history ends before that depth.
pub trait HistoryView {
    fn lookup(&self, depth: usize) -> Option<HistoryStep>;
}

/// In-memory history, most recent step first.
#[derive(Debug, Clone, Default)]
pub struct VecHistory {
    steps: Vec<HistoryStep>,
}

impl VecHistory {
    pub fn new(steps: Vec<HistoryStep>) -> Self {
        VecHistory { steps }
    }

    /// Convenience constructor for player-authored steps, most recent first.
    pub fn player<I, S>(texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        VecHistory { steps: texts.into_iter().map(|text| HistoryStep::new(text, HistoryOrigin::Player)).collect() }
    }

    /// Push a new most-recent step, shifting everything older one depth down.
    pub fn push_latest(&mut self, step: HistoryStep) {
        self.steps.insert(0, step);
    }
}

impl HistoryView for VecHistory {
    fn lookup(&self, depth: usize) -> Option<HistoryStep> {
        self.steps.get(depth).cloned()
    }
}

/// Materialize the window `0..depth` of a view into an indexable list.
pub(crate) fn materialize(view: &dyn HistoryView, depth: usize) -> Vec<HistoryStep> {
    (0..depth).map_while(|d| view.lookup(d)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn materialize_stops_at_the_end_of_history() {
        let history = VecHistory::player(["newest", "older", "oldest"]);
        let window = materialize(&history, 20);
        assert_eq!(window.len(), 3);
        assert_eq!(window[0].text, "newest");
        assert_eq!(window[2].text, "oldest");
    }

    #[test]
    fn push_latest_shifts_depths() {
        let mut history = VecHistory::player(["was newest"]);
        history.push_latest(HistoryStep::new("now newest", HistoryOrigin::Generator));
        assert_eq!(history.lookup(0).unwrap().text, "now newest");
        assert_eq!(history.lookup(1).unwrap().text, "was newest");
    }
}
