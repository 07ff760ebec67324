//! Builds and sends the batch stamping command.

use std::sync::Arc;

use log::{info, warn};
use tracing::{info_span, Instrument};

use crate::error::{SubmissionError, ValidationError};
use crate::model::{Attachment, StampingJob};
use crate::stamp::StampForm;

use super::transport::StampTransport;
use super::wire::{StampConfigPayload, SubmitRequest};

pub struct JobSubmitter {
    transport: Arc<dyn StampTransport>,
    language: String,
}

impl JobSubmitter {
    pub fn new(transport: Arc<dyn StampTransport>, language: impl Into<String>) -> Self {
        Self {
            transport,
            language: language.into(),
        }
    }

    /// Validates the selection and the form and builds the command body.
    pub fn build_request(
        &self,
        application_id: &str,
        selection: &[&Attachment],
        form: &StampForm,
    ) -> Result<SubmitRequest, ValidationError> {
        if selection.is_empty() {
            return Err(ValidationError::EmptySelection);
        }
        let config = form.configuration()?;

        Ok(SubmitRequest {
            id: application_id.to_string(),
            attachment_ids: selection.iter().map(|a| a.id.clone()).collect(),
            stamp_config: StampConfigPayload::new(&config, &self.language),
        })
    }

    /// Sends one stamping command. Nothing is sent when validation fails.
    pub async fn submit(
        &self,
        application_id: &str,
        selection: &[&Attachment],
        form: &StampForm,
    ) -> Result<StampingJob, SubmissionError> {
        let request = self.build_request(application_id, selection, form)?;
        self.submit_request(application_id, &request).await
    }

    /// Sends an already validated request.
    pub async fn submit_request(
        &self,
        application_id: &str,
        request: &SubmitRequest,
    ) -> Result<StampingJob, SubmissionError> {
        let span = info_span!(
            "submit_stamp_job",
            application_id = %application_id,
            attachments = request.attachment_ids.len(),
        );
        self.send(application_id, request).instrument(span).await
    }

    async fn send(
        &self,
        application_id: &str,
        request: &SubmitRequest,
    ) -> Result<StampingJob, SubmissionError> {
        let response = self.transport.submit(request).await?;
        if !response.ok {
            let reason = response.text.unwrap_or_else(|| "unknown error".to_string());
            warn!("Stamp request for {} was rejected: {}", application_id, reason);
            return Err(SubmissionError::Rejected(reason));
        }
        let job = response.job.ok_or_else(|| {
            SubmissionError::Rejected("Response did not contain a job".to_string())
        })?;

        info!(
            "Stamping job {} started for {} attachments",
            job.id,
            request.attachment_ids.len()
        );
        Ok(StampingJob::submitted(job.id))
    }
}
