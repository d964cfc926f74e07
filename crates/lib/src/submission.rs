//! Submitting a form and tracking the outcome shown next to it.

use crate::api::{PlaygroundApi, SubmissionResult};
use crate::error::PlaygroundError;
use crate::form::FunctionForm;

/// Run `name` with the form's payload. A closed gate never reaches the server.
pub async fn submit(
    api: &dyn PlaygroundApi,
    name: &str,
    form: &FunctionForm,
) -> Result<SubmissionResult, PlaygroundError> {
    if !form.can_submit() {
        return Err(PlaygroundError::ValidationBlocked {
            missing: form.missing_required(),
        });
    }
    let result = api.inference(name, form.payload()).await?;
    Ok(result)
}

/// What the output area shows.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum SubmissionState {
    #[default]
    Idle,
    InFlight,
    Failed(String),
    Succeeded(SubmissionResult),
}

/// Identifies one started submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmissionTicket(u64);

/// Four-state submission tracker for one form instance.
#[derive(Debug, Default)]
pub struct SubmissionTracker {
    state: SubmissionState,
    issued: u64,
}

impl SubmissionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &SubmissionState {
        &self.state
    }

    pub fn in_flight(&self) -> bool {
        self.state == SubmissionState::InFlight
    }

    /// Submit control enablement.
    pub fn can_start(&self, form: &FunctionForm) -> bool {
        form.can_submit() && !self.in_flight()
    }

    /// Move to in-flight. Returns `None` while another submission is outstanding.
    pub fn begin(&mut self) -> Option<SubmissionTicket> {
        if self.in_flight() {
            return None;
        }
        self.issued += 1;
        self.state = SubmissionState::InFlight;
        Some(SubmissionTicket(self.issued))
    }

    /// Apply the outcome of `ticket`. Outcomes of superseded tickets are dropped.
    pub fn finish<E: std::fmt::Display>(
        &mut self,
        ticket: SubmissionTicket,
        outcome: Result<SubmissionResult, E>,
    ) -> bool {
        if ticket.0 != self.issued || !self.in_flight() {
            log::debug!("dropping stale submission outcome #{}", ticket.0);
            return false;
        }
        self.state = match outcome {
            Ok(result) => SubmissionState::Succeeded(result),
            Err(e) => SubmissionState::Failed(e.to_string()),
        };
        true
    }

    /// Back to idle, e.g. when the form is discarded.
    pub fn reset(&mut self) {
        self.state = SubmissionState::Idle;
    }

    /// Rendered output of the last success, if that is what is showing.
    pub fn output(&self) -> Option<String> {
        match &self.state {
            SubmissionState::Succeeded(result) => Some(result.render()),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.state {
            SubmissionState::Failed(e) => Some(e.as_str()),
            _ => None,
        }
    }
}
