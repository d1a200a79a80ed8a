use tracing::debug;

/// Where a pipeline run currently is.
///
/// ```text
/// Idle -> StageRunning(0) -> StageComplete(0) -> StageRunning(1) -> ... -> Done
///                |
///                +-> Failed(i)
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PipelineState {
    Idle,
    StageRunning(usize),
    StageComplete(usize),
    Done,
    Failed(usize),
}

impl PipelineState {
    /// Whether `self -> to` is a legal step for a pipeline of `stage_count` stages.
    pub fn can_transition(self, to: Self, stage_count: usize) -> bool {
        use PipelineState::*;
        match (self, to) {
            (Idle, StageRunning(0)) => stage_count > 0,
            (Idle, Done) => stage_count == 0,
            (StageRunning(i), StageComplete(j)) | (StageRunning(i), Failed(j)) => i == j,
            (StageComplete(i), StageRunning(j)) => j == i + 1 && j < stage_count,
            (StageComplete(i), Done) => i + 1 == stage_count,
            _ => false,
        }
    }
}

/// Records the state sequence of one run and rejects illegal transitions.
#[derive(Debug)]
pub(crate) struct StateTracker {
    stage_count: usize,
    state: PipelineState,
    trace: Vec<PipelineState>,
}

impl StateTracker {
    pub(crate) fn new(stage_count: usize) -> Self {
        Self {
            stage_count,
            state: PipelineState::Idle,
            trace: vec![PipelineState::Idle],
        }
    }

    /// Move to `to`. An illegal transition is an orchestrator bug and panics.
    pub(crate) fn advance(&mut self, to: PipelineState) {
        assert!(
            self.state.can_transition(to, self.stage_count),
            "illegal pipeline transition {:?} -> {:?}",
            self.state,
            to
        );
        debug!(from = ?self.state, to = ?to, "pipeline transition");
        self.state = to;
        self.trace.push(to);
    }

    pub(crate) fn state(&self) -> PipelineState {
        self.state
    }

    pub(crate) fn into_trace(self) -> Vec<PipelineState> {
        self.trace
    }
}

#[cfg(test)]
mod tests {
    use super::PipelineState::*;
    use super::*;

    #[test]
    fn two_stage_happy_path() {
        let mut tracker = StateTracker::new(2);
        for to in [
            StageRunning(0),
            StageComplete(0),
            StageRunning(1),
            StageComplete(1),
            Done,
        ] {
            tracker.advance(to);
        }
        assert_eq!(tracker.state(), Done);
        assert_eq!(tracker.into_trace().len(), 6);
    }

    #[test]
    fn empty_pipeline_goes_straight_to_done() {
        assert!(Idle.can_transition(Done, 0));
        assert!(!Idle.can_transition(StageRunning(0), 0));
        assert!(!Idle.can_transition(Done, 1));
    }

    #[test]
    fn cannot_skip_completion() {
        assert!(!StageRunning(0).can_transition(StageRunning(1), 2));
        assert!(!StageRunning(0).can_transition(Done, 1));
    }

    #[test]
    fn cannot_skip_or_repeat_stages() {
        assert!(!StageComplete(0).can_transition(StageRunning(2), 3));
        assert!(!StageComplete(1).can_transition(StageRunning(1), 3));
        assert!(!StageComplete(0).can_transition(Done, 2));
        assert!(!StageComplete(1).can_transition(StageRunning(2), 2));
    }

    #[test]
    fn failure_only_from_running_stage() {
        assert!(StageRunning(1).can_transition(Failed(1), 2));
        assert!(!StageRunning(1).can_transition(Failed(0), 2));
        assert!(!StageComplete(1).can_transition(Failed(1), 2));
    }

    #[test]
    fn terminal_states_have_no_successor() {
        let every = [Idle, StageRunning(0), StageComplete(0), Done, Failed(0)];
        for to in every {
            assert!(!Done.can_transition(to, 1), "Done -> {to:?}");
            assert!(!Failed(0).can_transition(to, 1), "Failed(0) -> {to:?}");
        }
    }

    #[test]
    #[should_panic(expected = "illegal pipeline transition")]
    fn tracker_rejects_illegal_step() {
        let mut tracker = StateTracker::new(2);
        tracker.advance(StageRunning(1));
    }
}
