//! Code verifier backed by a fixed reference table.
//!
//! Used by the console runtime and tests. A real deployment asks the
//! shipment backend instead.

use async_trait::async_trait;
use parking_lot::RwLock;
use shared_types::entities::{Milestone, ShipmentId};
use std::collections::HashMap;

use crate::domain::VerifierError;
use crate::ports::CodeVerifier;

/// Reference codes per milestone, shared by every shipment.
#[derive(Debug, Default)]
pub struct StaticCodeVerifier {
    codes: RwLock<HashMap<Milestone, String>>,
}

impl StaticCodeVerifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Verifier that only knows the delivery code.
    pub fn with_delivery_code(code: impl Into<String>) -> Self {
        let verifier = Self::new();
        verifier.set_code(Milestone::Delivered, code);
        verifier
    }

    pub fn set_code(&self, milestone: Milestone, code: impl Into<String>) {
        self.codes.write().insert(milestone, code.into());
    }
}

#[async_trait]
impl CodeVerifier for StaticCodeVerifier {
    async fn verify(
        &self,
        _shipment: &ShipmentId,
        milestone: Milestone,
        code: &str,
    ) -> Result<bool, VerifierError> {
        let codes = self.codes.read();
        let reference = codes
            .get(&milestone)
            .ok_or(VerifierError::NoReferenceCode(milestone))?;
        Ok(reference == code)
    }
}
