//! # Confirmation Requests
//!
//! A single tagged request type for every "are you sure?" prompt the
//! lifecycle raises. The set of actions is fixed, so the engine never
//! depends on how a particular dialog renders its buttons.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::Milestone;

/// The closed set of answers to a confirmation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConfirmationAction {
    /// Proceed with the transition.
    Confirm,
    /// Explicitly abandon the transition.
    Cancel,
    /// The prompt was closed without an answer (back gesture, tap outside).
    Dismiss,
}

impl ConfirmationAction {
    /// Every action, in display order.
    pub const ALL: [ConfirmationAction; 3] = [Self::Confirm, Self::Cancel, Self::Dismiss];

    /// Whether this answer lets the transition proceed.
    pub fn is_affirmative(&self) -> bool {
        matches!(self, Self::Confirm)
    }
}

/// A prompt asking the transporter to confirm a milestone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfirmationRequest {
    /// Correlates the answer with the prompt.
    pub id: Uuid,
    /// The milestone being confirmed.
    pub milestone: Milestone,
    /// Short heading.
    pub title: String,
    /// Body text.
    pub message: String,
}

impl ConfirmationRequest {
    /// Build the prompt for a milestone.
    pub fn for_milestone(milestone: Milestone) -> Self {
        let (title, message) = match milestone {
            Milestone::PickedUp => ("Confirm pickup", "Mark this parcel as picked up?"),
            Milestone::InTransit => ("Confirm transit", "Mark this parcel as in transit?"),
            Milestone::Delivered => ("Confirm delivery", "Mark this parcel as delivered?"),
        };
        Self {
            id: Uuid::new_v4(),
            milestone,
            title: title.to_string(),
            message: message.to_string(),
        }
    }

    /// The actions offered by every confirmation prompt.
    pub fn actions(&self) -> &'static [ConfirmationAction] {
        &ConfirmationAction::ALL
    }
}
