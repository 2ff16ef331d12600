//! # Runtime Configuration
//!
//! Unified configuration for the lifecycle and earnings subsystems and the
//! console session.
//!
//! Every value has a default. `PR_*` variables override them; a malformed
//! value is logged with `warn!` and ignored. `load_with` reads the logging
//! settings first and installs the logger before anything else is parsed,
//! so those warnings have somewhere to go.

use std::path::PathBuf;

use pr_01_shipment_lifecycle::{LifecycleConfig, LifecycleError, CODE_LENGTH};
use pr_02_earnings_ledger::{CreditTable, LedgerError};
use shared_types::entities::{Credits, MediaKind, Milestone, ShipmentId, ShipmentStatus};
use thiserror::Error;
use tracing::warn;

/// Complete runtime configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Shipment driven by this session.
    pub shipment: ShipmentId,
    /// Milestone the order had already reached before this session.
    pub prior_milestone: Option<Milestone>,
    /// Reference code the delivery gate checks against.
    pub delivery_code: String,
    /// Relative media paths are resolved against this directory.
    pub media_root: PathBuf,
    pub lifecycle: LifecycleConfig,
    pub credits: CreditTable,
    pub logging: LoggingConfig,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            shipment: ShipmentId::new("SHP-0001"),
            prior_milestone: None,
            delivery_code: "0000".to_string(),
            media_root: PathBuf::from("."),
            lifecycle: LifecycleConfig::default(),
            credits: CreditTable::default(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    /// `EnvFilter` directive.
    pub filter: String,
    /// Emit JSON lines instead of human-readable output.
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            json: false,
        }
    }
}

impl LoggingConfig {
    /// Read `PR_LOG` and `PR_LOG_JSON`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(filter) = lookup("PR_LOG") {
            config.filter = filter;
        }
        if let Some(value) = lookup("PR_LOG_JSON") {
            config.json = value == "1" || value.eq_ignore_ascii_case("true");
        }
        config
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("delivery code must be 4 digits, got {0:?}")]
    MalformedCode(String),

    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),

    #[error(transparent)]
    Credits(#[from] LedgerError),
}

impl RuntimeConfig {
    /// Install logging with `install`, then read everything else from
    /// `lookup` so parse warnings reach the installed subscriber.
    pub fn load_with<E>(
        lookup: impl Fn(&str) -> Option<String>,
        install: impl FnOnce(&LoggingConfig) -> Result<(), E>,
    ) -> Result<Self, E> {
        install(&LoggingConfig::from_lookup(&lookup))?;
        Ok(Self::from_lookup(lookup))
    }

    /// Load from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(id) = lookup("PR_SHIPMENT_ID") {
            if id.trim().is_empty() {
                warn!("PR_SHIPMENT_ID is empty, keeping {}", config.shipment);
            } else {
                config.shipment = ShipmentId::new(id.trim());
            }
        }

        if let Some(value) = lookup("PR_PRIOR_MILESTONE") {
            match parse_milestone(&value) {
                Some(prior) => config.prior_milestone = prior,
                None => warn!(value = %value, "PR_PRIOR_MILESTONE not recognised"),
            }
        }

        if let Some(code) = lookup("PR_DELIVERY_CODE") {
            config.delivery_code = code.trim().to_string();
        }

        if let Some(root) = lookup("PR_MEDIA_ROOT") {
            config.media_root = PathBuf::from(root);
        }

        if let Some(value) = lookup("PR_MAX_CODE_ATTEMPTS") {
            if value.eq_ignore_ascii_case("unlimited") {
                config.lifecycle.max_code_attempts = None;
            } else if let Ok(n) = value.parse() {
                config.lifecycle.max_code_attempts = Some(n);
            } else {
                warn!(value = %value, "PR_MAX_CODE_ATTEMPTS must be a number or 'unlimited'");
            }
        }

        if let Some(value) = lookup("PR_PENDING_TIMEOUT_MS") {
            match value.parse() {
                Ok(ms) => config.lifecycle.pending_timeout_ms = Some(ms),
                Err(_) => warn!(value = %value, "PR_PENDING_TIMEOUT_MS must be a number"),
            }
        }

        if let Some(value) = lookup("PR_MEDIA_KIND") {
            match value.to_ascii_lowercase().as_str() {
                "photo" => config.lifecycle.pickup_media_kind = MediaKind::Photo,
                "video" => config.lifecycle.pickup_media_kind = MediaKind::Video,
                _ => warn!(value = %value, "PR_MEDIA_KIND must be 'photo' or 'video'"),
            }
        }

        let credits = &mut config.credits;
        for (key, slot) in [
            ("PR_CREDIT_ACCESS_UNLOCK", &mut credits.access_unlock),
            ("PR_CREDIT_PICKED_UP", &mut credits.picked_up),
            ("PR_CREDIT_IN_TRANSIT", &mut credits.in_transit),
            ("PR_CREDIT_DELIVERED", &mut credits.delivered),
        ] {
            if let Some(value) = lookup(key) {
                match value.parse() {
                    Ok(amount) => *slot = Credits(amount),
                    Err(_) => warn!(key, value = %value, "Credit amount must be a number"),
                }
            }
        }

        config.logging = LoggingConfig::from_lookup(&lookup);

        config
    }

    /// Reject settings the session can't run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let code = &self.delivery_code;
        if code.len() != CODE_LENGTH || !code.chars().all(|c| c.is_ascii_digit()) {
            return Err(ConfigError::MalformedCode(code.clone()));
        }
        self.lifecycle.validate()?;
        self.credits.validate()?;
        Ok(())
    }

    /// Status the shipment starts from.
    pub fn prior_status(&self) -> ShipmentStatus {
        ShipmentStatus::reached(self.prior_milestone)
    }
}

/// `none`, `picked_up`, `in_transit` or `delivered`, any case.
fn parse_milestone(value: &str) -> Option<Option<Milestone>> {
    match value.trim().to_ascii_lowercase().replace('-', "_").as_str() {
        "" | "none" => Some(None),
        "picked_up" => Some(Some(Milestone::PickedUp)),
        "in_transit" => Some(Some(Milestone::InTransit)),
        "delivered" => Some(Some(Milestone::Delivered)),
        _ => None,
    }
}
