//! Event streaming: the in-process hub the stamping session publishes to and
//! the job progress broadcaster.

pub mod hub;
pub mod job_progress;

pub use hub::{
    EventBus, EventFilter, Hub, HubEvent, Listener, SubscriptionId, SHOW_DIALOG_EVENT,
    STAMPING_STATUS_EVENT,
};
pub use job_progress::{JobProgressBroadcaster, JobProgressTracker, ProgressKind, StampProgressEvent};
