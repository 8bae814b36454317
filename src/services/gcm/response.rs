//! Provider response body.

use serde::{Deserialize, Serialize};

/// Per-token errors worth sending again
const RETRIABLE_TOKEN_ERRORS: &[&str] = &["Unavailable", "InternalServerError"];

/// Body of a successful (HTTP 200) send
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GcmResponse {
    pub multicast_id: Option<i64>,
    #[serde(default)]
    pub success: u32,
    #[serde(default)]
    pub failure: u32,
    #[serde(default)]
    pub canonical_ids: u32,
    /// One entry per submitted token, in submission order. Absent in some
    /// responses that only report counts.
    pub results: Option<Vec<GcmResult>>,
}

impl GcmResponse {
    /// Positions whose error is transient and may succeed on resend
    pub fn retriable_positions(&self) -> Vec<usize> {
        self.results
            .iter()
            .flatten()
            .enumerate()
            .filter(|(_, result)| result.is_retriable())
            .map(|(index, _)| index)
            .collect()
    }

    /// Replace the results at `positions` with those of a resend of exactly
    /// those tokens, keeping counts consistent.
    pub fn patch(&mut self, positions: &[usize], retry: GcmResponse) {
        let (Some(results), Some(fresh_results)) = (self.results.as_mut(), retry.results) else {
            return;
        };

        for (&index, fresh) in positions.iter().zip(fresh_results) {
            let Some(slot) = results.get_mut(index) else {
                continue;
            };
            if slot.error.is_some() && fresh.error.is_none() {
                self.success = self.success.saturating_add(1);
                self.failure = self.failure.saturating_sub(1);
            }
            if slot.registration_id.is_none() && fresh.registration_id.is_some() {
                self.canonical_ids = self.canonical_ids.saturating_add(1);
            }
            *slot = fresh;
        }
    }
}

/// Outcome for one token inside a [`GcmResponse`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GcmResult {
    pub message_id: Option<String>,
    /// Canonical token the caller should store instead of the submitted one
    pub registration_id: Option<String>,
    pub error: Option<String>,
}

impl GcmResult {
    pub fn is_retriable(&self) -> bool {
        self.error
            .as_deref()
            .is_some_and(|error| RETRIABLE_TOKEN_ERRORS.contains(&error))
    }
}
