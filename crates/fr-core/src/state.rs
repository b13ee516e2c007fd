//! # Store State
//!
//! The aggregate persisted as a single JSON document:
//! `{"donations": [...], "requests": [...], "activityLogs": [...]}`.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::models::{ActivityLogEntry, Donation, Request};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreState {
    pub donations: Vec<Donation>,
    pub requests: Vec<Request>,
    #[serde(default)]
    pub activity_logs: Vec<ActivityLogEntry>,
}

impl StoreState {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parses a persisted document and checks every record's invariants.
    pub fn from_json(text: &str) -> Result<Self> {
        let state: Self = serde_json::from_str(text)?;
        state.check_invariants()?;
        Ok(state)
    }

    pub fn check_invariants(&self) -> Result<()> {
        self.donations.iter().try_for_each(Donation::check_invariants)?;
        self.requests.iter().try_for_each(Request::check_invariants)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::seed;

    #[test]
    fn test_round_trip_preserves_order_and_fields() {
        let state = seed::initial_state();
        let json = state.to_json().unwrap();
        let reloaded = StoreState::from_json(&json).unwrap();
        assert_eq!(reloaded, state);
        assert_eq!(reloaded.to_json().unwrap(), json);
    }

    #[test]
    fn test_round_trip_keeps_fractional_quantities_exact() {
        let mut state = seed::initial_state();
        let quantities = [188.95088582774554, 0.1 + 0.2, 985.6916946328695, 92.42232512813595];
        for (donation, quantity) in state.donations.iter_mut().zip(quantities) {
            donation.quantity = quantity;
        }
        state.requests[0].quantity = 1.0 / 3.0;

        let reloaded = StoreState::from_json(&state.to_json().unwrap()).unwrap();
        assert_eq!(reloaded, state);
        for (donation, quantity) in reloaded.donations.iter().zip(quantities) {
            assert_eq!(donation.quantity.to_bits(), quantity.to_bits());
        }
    }

    #[test]
    fn test_top_level_keys() {
        let json: serde_json::Value =
            serde_json::from_str(&StoreState::default().to_json().unwrap()).unwrap();
        assert!(json.get("donations").is_some());
        assert!(json.get("requests").is_some());
        assert!(json.get("activityLogs").is_some());
    }

    #[test]
    fn test_garbage_is_a_serialization_error() {
        let err = StoreState::from_json("{not json").unwrap_err();
        assert!(matches!(err, AppError::Serialization(_)));
    }

    #[test]
    fn test_claimed_without_claimant_is_rejected() {
        let mut state = seed::initial_state();
        state.donations[1].claimed_by = None;
        let json = state.to_json().unwrap();
        let err = StoreState::from_json(&json).unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
    }

    #[test]
    fn test_missing_activity_logs_defaults_to_empty() {
        let state = StoreState::from_json(r#"{"donations":[],"requests":[]}"#).unwrap();
        assert!(state.activity_logs.is_empty());
    }
}
