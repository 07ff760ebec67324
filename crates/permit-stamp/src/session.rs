//! The stamping session: owns the attachment list, the selection, the stamp
//! form and the running job, and is the only place where they change.

use std::sync::Arc;

use log::{debug, info, warn};
use serde_json::json;

use crate::auth::{AllowAll, Authorizer};
use crate::broadcast::{
    EventBus, Hub, JobProgressBroadcaster, JobProgressTracker, SHOW_DIALOG_EVENT,
    STAMPING_STATUS_EVENT,
};
use crate::classifier::{Classifier, FilterSet, NoFilters};
use crate::config::StampingSettings;
use crate::error::{PollError, Result, StampError};
use crate::grouping::{GroupedAttachments, GroupingPipeline};
use crate::job::schedule::{self, PollSchedule};
use crate::job::wire::STAMP_COMMAND;
use crate::job::{
    Action, AvailableActions, JobPoller, JobSubmitter, PollOutcome, StampTransport,
    TransitionError, Trigger, WorkflowState,
};
use crate::model::{AttachmentType, JobId, RawAttachment, StampingJob};
use crate::selection::{GroupRef, RecomputeSummary, SelectionState};
use crate::stamp::{StampEditor, StampRegistry};

/// Localization key of the re-stamp confirmation dialog title.
pub const RESTAMP_DIALOG_TITLE: &str = "application.restamp";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartOutcome {
    Started { job_id: JobId },
    /// Some selected attachments are already stamped; call `start(true)`
    /// once the user has confirmed.
    ConfirmationRequired,
}

pub struct StampSession {
    application_id: String,
    classifier: Classifier,
    grouping: GroupingPipeline,
    raw: Vec<RawAttachment>,
    filters: Box<dyn FilterSet>,
    allowed_types: Vec<AttachmentType>,
    selection: SelectionState,
    editor: StampEditor,
    state: WorkflowState,
    transport: Arc<dyn StampTransport>,
    submitter: JobSubmitter,
    schedule: Arc<dyn PollSchedule>,
    max_consecutive_failures: u32,
    poller: Option<JobPoller>,
    tracker: Option<JobProgressTracker>,
    progress: JobProgressBroadcaster,
    hub: Arc<dyn EventBus>,
    authorizer: Arc<dyn Authorizer>,
}

impl StampSession {
    pub fn new(
        application_id: impl Into<String>,
        settings: &StampingSettings,
        stamps: StampRegistry,
        transport: Arc<dyn StampTransport>,
    ) -> Self {
        let schedule: Arc<dyn PollSchedule> = Arc::from(schedule::from_config(&settings.polling));
        Self {
            application_id: application_id.into(),
            classifier: Classifier::from_settings(settings),
            grouping: GroupingPipeline::from_settings(settings),
            raw: Vec::new(),
            filters: Box::new(NoFilters),
            allowed_types: Vec::new(),
            selection: SelectionState::new(),
            editor: StampEditor::new(stamps),
            state: WorkflowState::Init,
            submitter: JobSubmitter::new(Arc::clone(&transport), settings.language.clone()),
            transport,
            schedule,
            max_consecutive_failures: settings.polling.max_consecutive_failures,
            poller: None,
            tracker: None,
            progress: JobProgressBroadcaster::default(),
            hub: Arc::new(Hub::new()),
            authorizer: Arc::new(AllowAll),
        }
    }

    pub fn with_hub(mut self, hub: Arc<dyn EventBus>) -> Self {
        self.hub = hub;
        self
    }

    pub fn with_authorizer(mut self, authorizer: Arc<dyn Authorizer>) -> Self {
        self.authorizer = authorizer;
        self
    }

    pub fn with_progress(mut self, progress: JobProgressBroadcaster) -> Self {
        self.progress = progress;
        self
    }

    pub fn with_schedule(mut self, schedule: Arc<dyn PollSchedule>) -> Self {
        self.schedule = schedule;
        self
    }

    pub fn application_id(&self) -> &str {
        &self.application_id
    }

    pub fn state(&self) -> WorkflowState {
        self.state
    }

    pub fn groups(&self) -> &GroupedAttachments {
        self.selection.groups()
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    pub fn editor(&self) -> &StampEditor {
        &self.editor
    }

    pub fn editor_mut(&mut self) -> &mut StampEditor {
        &mut self.editor
    }

    pub fn job(&self) -> Option<&StampingJob> {
        self.poller.as_ref().map(JobPoller::job)
    }

    pub fn progress(&self) -> &JobProgressBroadcaster {
        &self.progress
    }

    fn authorized(&self) -> bool {
        self.authorizer.can_perform(STAMP_COMMAND)
    }

    /// Enabled dialog buttons. Start and selection need permission to run
    /// the stamping command.
    pub fn available_actions(&self) -> AvailableActions {
        let mut actions = self.state.available_actions();
        if !self.authorized() {
            actions.start = false;
        }
        actions
    }

    pub fn can_edit_selection(&self) -> bool {
        self.authorized() && self.state.permits(Action::EditSelection)
    }

    pub fn set_attachments(&mut self, raw: Vec<RawAttachment>) -> RecomputeSummary {
        self.raw = raw;
        self.recompute()
    }

    pub fn set_filters(&mut self, filters: Box<dyn FilterSet>) -> RecomputeSummary {
        self.filters = filters;
        self.recompute()
    }

    pub fn set_allowed_types(&mut self, allowed_types: Vec<AttachmentType>) -> RecomputeSummary {
        self.allowed_types = allowed_types;
        self.recompute()
    }

    /// Re-derives the eligible groups from the raw list, filters and allowed
    /// types, keeping selection and job results by attachment id.
    pub fn recompute(&mut self) -> RecomputeSummary {
        let eligible = self.classifier.classify(&self.raw, self.filters.as_ref());
        let grouped = self.grouping.group(eligible, &self.allowed_types);
        let count = grouped.len();
        let summary = self.selection.replace(grouped);

        debug!(
            "Recomputed stampable attachments for {}: {} eligible ({} kept, {} new, {} dropped)",
            self.application_id, count, summary.retained, summary.added, summary.dropped
        );

        // Only fails for triggers other than EligibleChanged.
        if let Err(e) = self.advance(Trigger::EligibleChanged { count }) {
            warn!("{}", e);
        }
        summary
    }

    pub fn toggle(&mut self, attachment_id: &str) -> bool {
        self.can_edit_selection() && self.selection.toggle(attachment_id)
    }

    pub fn toggle_group(&mut self, group: &GroupRef) -> bool {
        self.can_edit_selection() && self.selection.toggle_group(group)
    }

    pub fn select_all(&mut self) -> bool {
        self.can_edit_selection() && self.selection.select_all()
    }

    pub fn select_none(&mut self) -> bool {
        self.can_edit_selection() && self.selection.select_none()
    }

    /// Validates the selection and stamp form and submits the job.
    ///
    /// When a selected attachment is already stamped and `confirmed` is
    /// false, a confirmation dialog is requested instead and nothing is sent.
    pub async fn start(&mut self, confirmed: bool) -> Result<StartOutcome> {
        if !self.authorized() {
            return Err(StampError::Unauthorized(STAMP_COMMAND.to_string()));
        }
        // Surfaces a transition error before anything else is checked.
        self.state.transition(Trigger::Start)?;

        if !confirmed && self.selection.needs_restamp_confirmation() {
            info!("Re-stamp confirmation needed for {}", self.application_id);
            self.hub.publish(
                SHOW_DIALOG_EVENT,
                json!({
                    "ltitle": RESTAMP_DIALOG_TITLE,
                    "size": "medium",
                    "component": "yes-no-dialog",
                    "componentParams": {"ltext": "application.restamp.confirmation"},
                }),
            );
            return Ok(StartOutcome::ConfirmationRequired);
        }

        let selected = self.selection.selected_attachments();
        let request = self
            .submitter
            .build_request(&self.application_id, &selected, self.editor.form())?;
        self.advance(Trigger::Start)?;

        match self
            .submitter
            .submit_request(&self.application_id, &request)
            .await
        {
            Ok(job) => {
                let job_id = job.job_id.clone();
                self.tracker = Some(
                    self.progress
                        .start_job(job_id.as_str(), request.attachment_ids.len()),
                );
                self.poller = Some(JobPoller::new(
                    job,
                    Arc::clone(&self.transport),
                    Arc::clone(&self.schedule),
                    self.max_consecutive_failures,
                ));
                self.advance(Trigger::Submitted)?;
                Ok(StartOutcome::Started { job_id })
            }
            Err(e) => {
                warn!("Stamping could not be started for {}: {}", self.application_id, e);
                self.advance(Trigger::SubmissionFailed)?;
                Err(e.into())
            }
        }
    }

    /// Polls the running job once.
    pub async fn poll_once(&mut self) -> Result<PollOutcome> {
        if self.state != WorkflowState::Running {
            return Err(PollError::NoActiveJob.into());
        }
        let poller = self.poller.as_mut().ok_or(PollError::NoActiveJob)?;

        match poller.poll_once(&mut self.selection).await {
            Ok(outcome) => {
                let version = poller.job().version;
                match outcome {
                    PollOutcome::Continue { applied } => {
                        if let Some(tracker) = &self.tracker {
                            tracker.update(version, applied);
                        }
                    }
                    PollOutcome::Done { applied, .. } => {
                        if let Some(tracker) = &self.tracker {
                            tracker.done(version, applied);
                        }
                        self.advance(Trigger::JobDone)?;
                    }
                }
                Ok(outcome)
            }
            Err(e) => {
                let version = poller.job().version;
                if let PollError::Exhausted { .. } = e {
                    if let Some(tracker) = &self.tracker {
                        tracker.interrupted(version, &e.to_string());
                    }
                    self.advance(Trigger::PollingExhausted)?;
                } else if let Some(tracker) = &self.tracker {
                    tracker.poll_failed(version, &e.to_string());
                }
                Err(e.into())
            }
        }
    }

    /// Polls until the job is done, waiting between polls as the schedule
    /// says. Failed polls are retried until polling is interrupted.
    pub async fn run_until_done(&mut self) -> Result<WorkflowState> {
        while self.state == WorkflowState::Running {
            let delay = self
                .poller
                .as_ref()
                .map(JobPoller::next_delay)
                .unwrap_or_default();
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }

            match self.poll_once().await {
                Ok(_) => {}
                Err(e @ StampError::Poll(PollError::Exhausted { .. })) => return Err(e),
                Err(StampError::Poll(e)) => debug!("Retrying after poll failure: {}", e),
                Err(e) => return Err(e),
            }
        }
        Ok(self.state)
    }

    /// Continues an interrupted job with the same job id and version.
    pub fn resume(&mut self) -> Result<()> {
        self.advance(Trigger::Resume)?;
        if let Some(poller) = self.poller.as_mut() {
            poller.reset_failures();
            let version = poller.job().version;
            if let Some(tracker) = &self.tracker {
                tracker.resumed(version);
            }
            info!("Resuming stamping job {} at version {}", poller.job().job_id, version);
        }
        Ok(())
    }

    /// Leaves a finished or interrupted run so a new one can be started.
    pub fn reset(&mut self) -> Result<WorkflowState> {
        let count = self.selection.eligible_count();
        self.advance(Trigger::Reset { count })?;
        self.poller = None;
        self.tracker = None;
        Ok(self.state)
    }

    fn advance(&mut self, trigger: Trigger) -> std::result::Result<WorkflowState, TransitionError> {
        let next = self.state.transition(trigger)?;
        if next != self.state {
            debug!("Stamping workflow {} -> {} on {}", self.state, next, trigger);
            self.state = next;
            self.selection.set_editable(next.permits(Action::EditSelection));
            self.publish_status();
        }
        Ok(next)
    }

    fn publish_status(&self) {
        let job = self.job();
        self.hub.publish(
            STAMPING_STATUS_EVENT,
            json!({
                "applicationId": self.application_id,
                "status": self.state.to_string(),
                "jobId": job.map(|j| j.job_id.to_string()),
                "version": job.map(|j| j.version),
            }),
        );
    }
}
