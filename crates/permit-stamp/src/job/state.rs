//! Workflow states of a stamping run and the transitions between them.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum WorkflowState {
    Init,
    Ready,
    Starting,
    Running,
    Done,
    NoFiles,
    /// Polling gave up after repeated failures; the job can be resumed.
    Interrupted,
}

impl fmt::Display for WorkflowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WorkflowState::Init => "init",
            WorkflowState::Ready => "ready",
            WorkflowState::Starting => "starting",
            WorkflowState::Running => "running",
            WorkflowState::Done => "done",
            WorkflowState::NoFiles => "noFiles",
            WorkflowState::Interrupted => "interrupted",
        };
        f.write_str(name)
    }
}

/// Inputs that move the workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// The eligible set was recomputed.
    EligibleChanged { count: usize },
    Start,
    Submitted,
    SubmissionFailed,
    JobDone,
    PollingExhausted,
    Resume,
    /// Leave a finished or interrupted run.
    Reset { count: usize },
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Trigger::EligibleChanged { count } => write!(f, "eligible-changed({})", count),
            Trigger::Start => f.write_str("start"),
            Trigger::Submitted => f.write_str("submitted"),
            Trigger::SubmissionFailed => f.write_str("submission-failed"),
            Trigger::JobDone => f.write_str("job-done"),
            Trigger::PollingExhausted => f.write_str("polling-exhausted"),
            Trigger::Resume => f.write_str("resume"),
            Trigger::Reset { count } => write!(f, "reset({})", count),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Cannot apply '{trigger}' in state '{state}'")]
pub struct TransitionError {
    pub state: WorkflowState,
    pub trigger: String,
}

/// User-facing operations gated by the workflow state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    EditSelection,
    Start,
    Cancel,
    Ok,
    Resume,
}

/// Which dialog buttons are enabled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AvailableActions {
    pub start: bool,
    pub cancel: bool,
    pub ok: bool,
    pub resume: bool,
}

fn ready_or_empty(count: usize) -> WorkflowState {
    if count > 0 {
        WorkflowState::Ready
    } else {
        WorkflowState::NoFiles
    }
}

impl WorkflowState {
    pub fn transition(self, trigger: Trigger) -> Result<WorkflowState, TransitionError> {
        use Trigger as T;
        use WorkflowState as S;

        let next = match (self, trigger) {
            (S::Init | S::Ready | S::NoFiles, T::EligibleChanged { count }) => ready_or_empty(count),
            // Selection is frozen from Starting on; recomputation keeps the state.
            (S::Starting | S::Running | S::Done | S::Interrupted, T::EligibleChanged { .. }) => self,
            (S::Ready, T::Start) => S::Starting,
            (S::Starting, T::Submitted) => S::Running,
            (S::Starting, T::SubmissionFailed) => S::Ready,
            (S::Running, T::JobDone) => S::Done,
            (S::Running, T::PollingExhausted) => S::Interrupted,
            (S::Interrupted, T::Resume) => S::Running,
            (S::Done | S::Interrupted, T::Reset { count }) => ready_or_empty(count),
            _ => {
                return Err(TransitionError {
                    state: self,
                    trigger: trigger.to_string(),
                })
            }
        };
        Ok(next)
    }

    pub fn permits(self, action: Action) -> bool {
        use WorkflowState as S;

        match action {
            Action::EditSelection => matches!(self, S::Init | S::Ready | S::NoFiles),
            Action::Start => self == S::Ready,
            Action::Cancel => matches!(self, S::Ready | S::Interrupted),
            Action::Ok => matches!(self, S::Done | S::NoFiles),
            Action::Resume => self == S::Interrupted,
        }
    }

    pub fn available_actions(self) -> AvailableActions {
        AvailableActions {
            start: self.permits(Action::Start),
            cancel: self.permits(Action::Cancel),
            ok: self.permits(Action::Ok),
            resume: self.permits(Action::Resume),
        }
    }

    /// A job exists on the server for this run.
    pub fn has_job(self) -> bool {
        matches!(self, WorkflowState::Running | WorkflowState::Interrupted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct TransitionTestCase {
        from: WorkflowState,
        trigger: Trigger,
        expected: Option<WorkflowState>,
    }

    const TRANSITION_TESTS: &[TransitionTestCase] = &[
        TransitionTestCase {
            from: WorkflowState::Init,
            trigger: Trigger::EligibleChanged { count: 3 },
            expected: Some(WorkflowState::Ready),
        },
        TransitionTestCase {
            from: WorkflowState::Init,
            trigger: Trigger::EligibleChanged { count: 0 },
            expected: Some(WorkflowState::NoFiles),
        },
        TransitionTestCase {
            from: WorkflowState::NoFiles,
            trigger: Trigger::EligibleChanged { count: 1 },
            expected: Some(WorkflowState::Ready),
        },
        TransitionTestCase {
            from: WorkflowState::Running,
            trigger: Trigger::EligibleChanged { count: 0 },
            expected: Some(WorkflowState::Running),
        },
        TransitionTestCase {
            from: WorkflowState::Done,
            trigger: Trigger::EligibleChanged { count: 5 },
            expected: Some(WorkflowState::Done),
        },
        TransitionTestCase {
            from: WorkflowState::Ready,
            trigger: Trigger::Start,
            expected: Some(WorkflowState::Starting),
        },
        TransitionTestCase {
            from: WorkflowState::NoFiles,
            trigger: Trigger::Start,
            expected: None,
        },
        TransitionTestCase {
            from: WorkflowState::Starting,
            trigger: Trigger::Start,
            expected: None,
        },
        TransitionTestCase {
            from: WorkflowState::Starting,
            trigger: Trigger::Submitted,
            expected: Some(WorkflowState::Running),
        },
        TransitionTestCase {
            from: WorkflowState::Starting,
            trigger: Trigger::SubmissionFailed,
            expected: Some(WorkflowState::Ready),
        },
        TransitionTestCase {
            from: WorkflowState::Running,
            trigger: Trigger::JobDone,
            expected: Some(WorkflowState::Done),
        },
        TransitionTestCase {
            from: WorkflowState::Running,
            trigger: Trigger::PollingExhausted,
            expected: Some(WorkflowState::Interrupted),
        },
        TransitionTestCase {
            from: WorkflowState::Interrupted,
            trigger: Trigger::Resume,
            expected: Some(WorkflowState::Running),
        },
        TransitionTestCase {
            from: WorkflowState::Running,
            trigger: Trigger::Resume,
            expected: None,
        },
        TransitionTestCase {
            from: WorkflowState::Done,
            trigger: Trigger::Reset { count: 2 },
            expected: Some(WorkflowState::Ready),
        },
        TransitionTestCase {
            from: WorkflowState::Interrupted,
            trigger: Trigger::Reset { count: 0 },
            expected: Some(WorkflowState::NoFiles),
        },
        TransitionTestCase {
            from: WorkflowState::Running,
            trigger: Trigger::Reset { count: 2 },
            expected: None,
        },
    ];

    #[test]
    fn test_transition_table() {
        for test_case in TRANSITION_TESTS {
            let result = test_case.from.transition(test_case.trigger);
            match test_case.expected {
                Some(expected) => assert_eq!(
                    result,
                    Ok(expected),
                    "{} --{}-->",
                    test_case.from,
                    test_case.trigger
                ),
                None => assert!(
                    result.is_err(),
                    "{} --{}--> should be rejected",
                    test_case.from,
                    test_case.trigger
                ),
            }
        }
    }

    #[test]
    fn test_selection_frozen_from_starting_on() {
        assert!(WorkflowState::Ready.permits(Action::EditSelection));
        assert!(WorkflowState::NoFiles.permits(Action::EditSelection));
        for state in [
            WorkflowState::Starting,
            WorkflowState::Running,
            WorkflowState::Done,
            WorkflowState::Interrupted,
        ] {
            assert!(!state.permits(Action::EditSelection), "{}", state);
        }
    }

    #[test]
    fn test_available_actions_table() {
        let ready = WorkflowState::Ready.available_actions();
        assert!(ready.start && ready.cancel && !ready.ok);

        assert_eq!(WorkflowState::Init.available_actions(), AvailableActions::default());
        assert_eq!(WorkflowState::Starting.available_actions(), AvailableActions::default());
        assert_eq!(WorkflowState::Running.available_actions(), AvailableActions::default());

        let done = WorkflowState::Done.available_actions();
        assert!(done.ok && !done.start && !done.cancel);
        assert!(WorkflowState::NoFiles.available_actions().ok);
        assert!(!WorkflowState::NoFiles.available_actions().start);
        let interrupted = WorkflowState::Interrupted.available_actions();
        assert!(interrupted.resume && interrupted.cancel && !interrupted.start);
    }

    #[test]
    fn test_error_message() {
        let err = WorkflowState::Done.transition(Trigger::Start).unwrap_err();
        assert_eq!(err.to_string(), "Cannot apply 'start' in state 'done'");
    }
}
