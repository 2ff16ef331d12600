//! # Console Session
//!
//! Parses transporter commands and drives the lifecycle and earnings
//! subsystems with them.
//!
//! | Command | Effect |
//! |---------|--------|
//! | `pickup <camera\|library> <path>` | open the pickup gate and capture `path` |
//! | `transit` | open the transit confirmation |
//! | `confirm` / `dismiss` | answer the confirmation |
//! | `deliver` | open the delivery code gate |
//! | `digit <slot> <d>` / `erase <slot>` | edit one code slot |
//! | `code <dddd>` | enter the whole code |
//! | `verify` | explicit Verify trigger |
//! | `cancel` / `back` | abandon the open gate |
//! | `status` / `earnings` / `history` | show state |
//! | `quit` | end the session |

use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, SecondsFormat};
use pr_01_shipment_lifecycle::{
    CancelCause, GatePrompt, LifecycleError, RequestOutcome, ShipmentLifecycleApi,
    TransitionOutcome, TransitionReport, VerifyOutcome,
};
use pr_02_earnings_ledger::EarningsApi;
use shared_types::confirmation::ConfirmationAction;
use shared_types::entities::{MediaSource, Milestone, Timestamp};
use thiserror::Error;

use crate::adapters::LocalFileMediaPicker;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Pickup { source: MediaSource, path: PathBuf },
    Transit,
    Respond(ConfirmationAction),
    Deliver,
    Digit { slot: usize, digit: char },
    Erase { slot: usize },
    Code(String),
    Verify,
    Cancel(CancelCause),
    Status,
    Earnings,
    History,
    Help,
    Quit,
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("unknown command: {0} (try 'help')")]
    UnknownCommand(String),

    #[error("usage: {0}")]
    Usage(&'static str),

    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),
}

impl Command {
    pub fn parse(line: &str) -> Result<Self, SessionError> {
        let mut words = line.split_whitespace();
        let Some(name) = words.next() else {
            return Err(SessionError::Usage("<command> [args]"));
        };
        let args: Vec<&str> = words.collect();

        let command = match (name.to_ascii_lowercase().as_str(), args.as_slice()) {
            ("pickup", [source, path]) => {
                let source = match source.to_ascii_lowercase().as_str() {
                    "camera" => MediaSource::Camera,
                    "library" => MediaSource::Library,
                    _ => return Err(SessionError::Usage("pickup <camera|library> <path>")),
                };
                Command::Pickup {
                    source,
                    path: PathBuf::from(path),
                }
            }
            ("pickup", _) => return Err(SessionError::Usage("pickup <camera|library> <path>")),
            ("transit", []) => Command::Transit,
            ("confirm", []) => Command::Respond(ConfirmationAction::Confirm),
            ("dismiss", []) => Command::Respond(ConfirmationAction::Dismiss),
            ("deliver", []) => Command::Deliver,
            ("digit", [slot, digit]) => {
                let slot = slot
                    .parse()
                    .map_err(|_| SessionError::Usage("digit <slot> <d>"))?;
                let mut chars = digit.chars();
                match (chars.next(), chars.next()) {
                    (Some(digit), None) => Command::Digit { slot, digit },
                    _ => return Err(SessionError::Usage("digit <slot> <d>")),
                }
            }
            ("digit", _) => return Err(SessionError::Usage("digit <slot> <d>")),
            ("erase", [slot]) => Command::Erase {
                slot: slot.parse().map_err(|_| SessionError::Usage("erase <slot>"))?,
            },
            ("erase", _) => return Err(SessionError::Usage("erase <slot>")),
            ("code", [code]) => Command::Code(code.to_string()),
            ("code", _) => return Err(SessionError::Usage("code <dddd>")),
            ("verify", []) => Command::Verify,
            ("cancel", []) => Command::Cancel(CancelCause::Explicit),
            ("back", []) => Command::Cancel(CancelCause::NavigatedAway),
            ("status", []) => Command::Status,
            ("earnings", []) => Command::Earnings,
            ("history", []) => Command::History,
            ("help", _) => Command::Help,
            ("quit" | "exit", _) => Command::Quit,
            _ => return Err(SessionError::UnknownCommand(line.trim().to_string())),
        };
        Ok(command)
    }
}

/// What the console loop should do after a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Flow {
    Continue(Vec<String>),
    Quit,
}

/// One transporter's console session.
pub struct Session {
    lifecycle: Arc<dyn ShipmentLifecycleApi>,
    earnings: Arc<dyn EarningsApi>,
    picker: Arc<LocalFileMediaPicker>,
}

impl Session {
    pub fn new(
        lifecycle: Arc<dyn ShipmentLifecycleApi>,
        earnings: Arc<dyn EarningsApi>,
        picker: Arc<LocalFileMediaPicker>,
    ) -> Self {
        Self {
            lifecycle,
            earnings,
            picker,
        }
    }

    /// Parse and run one input line.
    pub async fn handle_line(&self, line: &str) -> Result<Flow, SessionError> {
        self.execute(Command::parse(line)?).await
    }

    pub async fn execute(&self, command: Command) -> Result<Flow, SessionError> {
        let lines = match command {
            Command::Pickup { source, path } => {
                let mut lines = self.request(Milestone::PickedUp).await?;
                if self.lifecycle.pending().is_some() {
                    self.picker.stage(&path);
                    let report = self.lifecycle.capture_media(source).await?;
                    lines.extend(render_report(&report));
                }
                lines
            }
            Command::Transit => self.request(Milestone::InTransit).await?,
            Command::Respond(action) => render_report(&self.lifecycle.respond(action).await?),
            Command::Deliver => self.request(Milestone::Delivered).await?,
            Command::Digit { slot, digit } => {
                render_verify(self.lifecycle.enter_code_digit(slot, digit).await?)
            }
            Command::Erase { slot } => {
                let focus = self.lifecycle.erase_code_digit(slot)?;
                vec![format!("Slot {slot} cleared, focus on slot {focus}")]
            }
            Command::Code(code) => render_verify(self.lifecycle.enter_code(&code).await?),
            Command::Verify => render_verify(self.lifecycle.verify_code().await?),
            Command::Cancel(cause) => match self.lifecycle.cancel_pending(cause).await? {
                Some(report) => vec![format!(
                    "{} rolled back ({}); status {}",
                    report.milestone, report.reason, report.restored
                )],
                None => vec!["Nothing to cancel".to_string()],
            },
            Command::Status => self.status(),
            Command::Earnings => self.earnings(),
            Command::History => self.history(),
            Command::Help => HELP.lines().map(str::to_string).collect(),
            Command::Quit => return Ok(Flow::Quit),
        };
        Ok(Flow::Continue(lines))
    }

    async fn request(&self, milestone: Milestone) -> Result<Vec<String>, SessionError> {
        let outcome = self.lifecycle.request_transition(milestone).await?;
        Ok(match outcome {
            RequestOutcome::Ignored => vec!["Shipment already delivered".to_string()],
            RequestOutcome::Opened(GatePrompt::Media { kind, .. }) => {
                vec![format!("{milestone}: capture a {kind:?} of the parcel")]
            }
            RequestOutcome::Opened(GatePrompt::Confirm { request, .. }) => vec![
                format!("{}: {}", request.title, request.message),
                "Answer with 'confirm' or 'dismiss', or 'cancel'".to_string(),
            ],
            RequestOutcome::Opened(GatePrompt::Code { slots, .. }) => {
                vec![format!("{milestone}: enter the {slots}-digit delivery code")]
            }
        })
    }

    fn status(&self) -> Vec<String> {
        let mut lines = vec![format!(
            "Shipment {}: {}",
            self.lifecycle.shipment(),
            self.lifecycle.status()
        )];
        if let Some(pending) = self.lifecycle.pending() {
            lines.push(format!(
                "Awaiting {} for {}",
                pending.gate, pending.target
            ));
        }
        if self.lifecycle.is_terminal() {
            lines.push("Delivered".to_string());
        }
        lines
    }

    fn earnings(&self) -> Vec<String> {
        let shipment = self.lifecycle.shipment();
        let mut lines: Vec<String> = self
            .earnings
            .events(shipment)
            .iter()
            .map(|e| format!("{:>4}  {}  {}", e.amount, e.milestone, format_time(e.awarded_at)))
            .collect();
        lines.push(format!("Total: {}", self.earnings.total(shipment)));
        lines
    }

    fn history(&self) -> Vec<String> {
        let history = self.lifecycle.history();
        if history.is_empty() {
            return vec!["No transitions yet".to_string()];
        }
        history
            .iter()
            .map(|record| {
                let outcome = match &record.outcome {
                    TransitionOutcome::Committed => "committed".to_string(),
                    TransitionOutcome::RolledBack(reason) => format!("rolled back ({reason})"),
                };
                format!("{}  {}  {}", format_time(record.at), record.milestone, outcome)
            })
            .collect()
    }
}

fn render_report(report: &TransitionReport) -> Vec<String> {
    match report {
        TransitionReport::Committed(r) => {
            let mut lines = vec![format!("{} committed; status {}", r.milestone, r.status)];
            if let Some(evidence) = &r.evidence {
                lines.push(format!("Evidence: {evidence}"));
            }
            lines
        }
        TransitionReport::RolledBack(r) => vec![format!(
            "{} rolled back ({}); status {}",
            r.milestone, r.reason, r.restored
        )],
    }
}

fn render_verify(outcome: VerifyOutcome) -> Vec<String> {
    match outcome {
        VerifyOutcome::Incomplete { focus } => vec![format!("Next slot: {focus}")],
        VerifyOutcome::InProgress => vec!["Verification already running".to_string()],
        VerifyOutcome::Mismatch { remaining: Some(n) } => {
            vec![format!("Incorrect code, {n} attempt(s) left")]
        }
        VerifyOutcome::Mismatch { remaining: None } => vec!["Incorrect code".to_string()],
        VerifyOutcome::Unavailable { reason } => {
            vec![format!("Could not verify the code ({reason}), try again")]
        }
        VerifyOutcome::AlreadyCommitted => vec!["Delivery already confirmed".to_string()],
        VerifyOutcome::Resolved(report) => render_report(&report),
    }
}

fn format_time(ms: Timestamp) -> String {
    i64::try_from(ms)
        .ok()
        .and_then(DateTime::from_timestamp_millis)
        .map(|t| t.to_rfc3339_opts(SecondsFormat::Secs, true))
        .unwrap_or_else(|| ms.to_string())
}

const HELP: &str = "\
pickup <camera|library> <path>   capture the pickup photo
transit                          start transit
confirm | dismiss                answer the confirmation
deliver                          start delivery
digit <slot> <d> | erase <slot>  edit the delivery code
code <dddd> | verify             submit the delivery code
cancel | back                    abandon the open step
status | earnings | history      show state
quit";
