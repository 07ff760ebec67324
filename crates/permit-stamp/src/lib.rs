pub mod auth;
pub mod broadcast;
pub mod classifier;
pub mod config;
pub mod error;
pub mod grouping;
pub mod job;
pub mod logging;
pub mod model;
pub mod selection;
pub mod session;
pub mod stamp;

pub use auth::{AllowAll, Authorizer, CommandPermissions};
pub use broadcast::{EventBus, EventFilter, Hub, HubEvent, JobProgressBroadcaster, StampProgressEvent};
pub use classifier::{Classifier, FilterSet, NoFilters, PredicateFilters};
pub use config::{load_settings, load_settings_from_str, StampingSettings};
pub use error::{
    ConfigError, PollError, Result, StampError, SubmissionError, TransportError, ValidationError,
};
pub use grouping::{GroupKey, GroupedAttachments, GroupingPipeline, OperationGrouper, OperationGrouping, Partition};
pub use job::{
    AvailableActions, HttpTransport, JobPoller, JobSubmitter, PollOutcome, PollSchedule,
    StampTransport, TransitionError, WorkflowState,
};
pub use logging::{init_logging, LogFormat};
pub use model::{Attachment, AttachmentStatus, JobId, RawAttachment, StampingJob};
pub use selection::{GroupRef, SelectionState};
pub use session::{StampSession, StartOutcome};
pub use stamp::{PageSelector, StampConfiguration, StampDefinition, StampEditor, StampRegistry};
