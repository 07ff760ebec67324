//! In-memory command/query endpoint with scripted responses.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use permit_stamp::error::TransportError;
use permit_stamp::job::wire::{PollRequest, PollResponse, SubmitRequest, SubmitResponse};
use permit_stamp::job::StampTransport;

type Scripted<T> = Mutex<VecDeque<Result<T, TransportError>>>;

/// Answers submissions and polls from queues, recording every request.
/// An empty poll queue answers with `repeat_poll` if set, else fails.
#[derive(Default)]
pub struct ScriptedTransport {
    submits: Scripted<SubmitResponse>,
    polls: Scripted<PollResponse>,
    repeat_poll: Mutex<Option<Value>>,
    pub submit_requests: Mutex<Vec<SubmitRequest>>,
    pub poll_requests: Mutex<Vec<PollRequest>>,
}

fn decode<T: serde::de::DeserializeOwned>(json: Value) -> T {
    serde_json::from_value(json).expect("scripted response must decode")
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn submit_ok(self, job_id: Value) -> Self {
        self.submit_json(serde_json::json!({"ok": true, "job": {"id": job_id}}))
    }

    pub fn submit_json(self, json: Value) -> Self {
        self.submits.lock().unwrap().push_back(Ok(decode(json)));
        self
    }

    pub fn submit_error(self, error: TransportError) -> Self {
        self.submits.lock().unwrap().push_back(Err(error));
        self
    }

    pub fn poll_json(self, json: Value) -> Self {
        self.polls.lock().unwrap().push_back(Ok(decode(json)));
        self
    }

    pub fn poll_error(self, error: TransportError) -> Self {
        self.polls.lock().unwrap().push_back(Err(error));
        self
    }

    pub fn repeat_poll(self, json: Value) -> Self {
        *self.repeat_poll.lock().unwrap() = Some(json);
        self
    }

    pub fn submit_count(&self) -> usize {
        self.submit_requests.lock().unwrap().len()
    }

    pub fn polled_versions(&self) -> Vec<u64> {
        self.poll_requests
            .lock()
            .unwrap()
            .iter()
            .map(|r| r.version)
            .collect()
    }
}

#[async_trait]
impl StampTransport for ScriptedTransport {
    async fn submit(&self, request: &SubmitRequest) -> Result<SubmitResponse, TransportError> {
        self.submit_requests.lock().unwrap().push(request.clone());
        self.submits
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::Unavailable("no scripted submit".to_string())))
    }

    async fn poll(&self, request: &PollRequest) -> Result<PollResponse, TransportError> {
        self.poll_requests.lock().unwrap().push(request.clone());
        if let Some(next) = self.polls.lock().unwrap().pop_front() {
            return next;
        }
        match self.repeat_poll.lock().unwrap().clone() {
            Some(json) => Ok(decode(json)),
            None => Err(TransportError::Unavailable("no scripted poll".to_string())),
        }
    }
}

/// A poll reply with result `update`.
pub fn update(version: u64, status: &str, value: Value) -> Value {
    serde_json::json!({
        "ok": true,
        "result": "update",
        "job": {"version": version, "status": status, "value": value}
    })
}
