//! Hour-tracking value objects.
//!
//! Estimates and actuals are whole hours clamped to `[0, MAX_HOURS]`.
//! Clamping (rather than rejecting) matches how the planning UI treats
//! oversized inputs: the value saturates at the cap. Deserialization goes
//! through the same constructor, so persisted data obeys the bound too.

use serde::{Deserialize, Serialize};

use devplan_core::ValueObject;

/// Upper bound for any hour value, in whole hours.
pub const MAX_HOURS: u32 = 1000;

/// Estimated effort for a task, in whole hours.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "u32", into = "u32")]
pub struct EstimatedHours(u32);

impl EstimatedHours {
    pub fn new(hours: u32) -> Self {
        Self(hours.min(MAX_HOURS))
    }

    pub fn get(&self) -> u32 {
        self.0
    }
}

impl ValueObject for EstimatedHours {}

impl From<u32> for EstimatedHours {
    fn from(value: u32) -> Self {
        Self::new(value)
    }
}

impl From<EstimatedHours> for u32 {
    fn from(value: EstimatedHours) -> Self {
        value.0
    }
}

/// Hours actually worked on a task, in whole hours.
///
/// Accumulates via [`ActualHours::add`]; the total saturates at `MAX_HOURS`.
#[derive(
    Debug, Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(from = "u32", into = "u32")]
pub struct ActualHours(u32);

impl ActualHours {
    pub fn new(hours: u32) -> Self {
        Self(hours.min(MAX_HOURS))
    }

    pub fn get(&self) -> u32 {
        self.0
    }

    /// Add worked hours, saturating at the cap.
    #[must_use]
    pub fn add(self, hours: u32) -> Self {
        Self::new(self.0.saturating_add(hours))
    }
}

impl ValueObject for ActualHours {}

impl From<u32> for ActualHours {
    fn from(value: u32) -> Self {
        Self::new(value)
    }
}

impl From<ActualHours> for u32 {
    fn from(value: ActualHours) -> Self {
        value.0
    }
}
