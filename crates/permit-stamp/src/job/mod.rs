//! The stamping job: submission, progress polling and the workflow states
//! around them.

pub mod poller;
pub mod schedule;
pub mod state;
pub mod submitter;
pub mod transport;
pub mod wire;

pub use poller::{JobPoller, PollOutcome};
pub use schedule::{Exponential, Fixed, Immediate, PollSchedule};
pub use state::{Action, AvailableActions, TransitionError, Trigger, WorkflowState};
pub use submitter::JobSubmitter;
pub use transport::{HttpTransport, StampTransport};
