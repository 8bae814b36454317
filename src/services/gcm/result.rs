//! Delivery results: per token, per chunk, and for a whole dispatch.

use serde::Serialize;
use thiserror::Error;

use super::response::{GcmResponse, GcmResult};
use super::sender::SendError;

/// Method tag carried by every summary
pub const METHOD: &str = "gcm";

/// Why a single token did not get a message id
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[serde(tag = "type", content = "reason", rename_all = "snake_case")]
pub enum DeliveryError {
    /// The whole chunk failed before the provider reported per-token results
    #[error("{0}")]
    Transport(String),

    /// Error code reported by the provider for this token, e.g. `NotRegistered`
    #[error("{0}")]
    Provider(String),

    /// The provider gave no per-token detail
    #[error("unknown")]
    Unknown,
}

/// Outcome for one submitted token
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryOutcome {
    pub token: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
    /// Canonical token reported by the provider
    #[serde(skip_serializing_if = "Option::is_none")]
    pub registration_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<DeliveryError>,
}

impl DeliveryOutcome {
    pub fn failed(token: String, error: DeliveryError) -> Self {
        Self {
            token,
            message_id: None,
            registration_id: None,
            error: Some(error),
        }
    }

    fn from_result(token: String, result: GcmResult) -> Self {
        Self {
            token,
            message_id: result.message_id,
            registration_id: result.registration_id,
            error: result.error.map(DeliveryError::Provider),
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// What came back for one chunk, before normalization
#[derive(Debug, Clone, PartialEq)]
pub enum ChunkOutcome {
    /// The request itself failed; every token in the chunk failed with it
    TransportError {
        tokens: Vec<String>,
        error: SendError,
    },
    /// The provider reported a result per token
    Normalized {
        tokens: Vec<String>,
        response: GcmResponse,
        results: Vec<GcmResult>,
    },
    /// The provider reported counts but no per-token results
    CountsOnly {
        tokens: Vec<String>,
        response: GcmResponse,
    },
}

impl ChunkOutcome {
    /// Classify the sender's answer for `tokens`
    pub fn from_response(tokens: Vec<String>, result: Result<GcmResponse, SendError>) -> Self {
        match result {
            Err(error) => ChunkOutcome::TransportError { tokens, error },
            Ok(mut response) => match response.results.take() {
                Some(results) => ChunkOutcome::Normalized {
                    tokens,
                    response,
                    results,
                },
                None => ChunkOutcome::CountsOnly { tokens, response },
            },
        }
    }

    /// Normalize into exactly one outcome per token, in token order.
    ///
    /// Results are matched to tokens by position. A results array shorter
    /// than the chunk leaves the tail as [`DeliveryError::Unknown`]; extra
    /// entries are dropped.
    pub fn into_report(self) -> ChunkReport {
        match self {
            ChunkOutcome::TransportError { tokens, error } => {
                let reason = error.to_string();
                ChunkReport {
                    multicast_id: None,
                    success: 0,
                    failure: tokens.len() as u32,
                    outcomes: tokens
                        .into_iter()
                        .map(|token| {
                            DeliveryOutcome::failed(token, DeliveryError::Transport(reason.clone()))
                        })
                        .collect(),
                }
            }
            ChunkOutcome::Normalized {
                tokens,
                response,
                results,
            } => {
                let mut results = results.into_iter();
                let outcomes = tokens
                    .into_iter()
                    .map(|token| match results.next() {
                        Some(result) => DeliveryOutcome::from_result(token, result),
                        None => DeliveryOutcome::failed(token, DeliveryError::Unknown),
                    })
                    .collect();
                ChunkReport {
                    multicast_id: response.multicast_id,
                    success: response.success,
                    failure: response.failure,
                    outcomes,
                }
            }
            ChunkOutcome::CountsOnly { tokens, response } => ChunkReport {
                multicast_id: response.multicast_id,
                success: response.success,
                failure: response.failure,
                outcomes: tokens
                    .into_iter()
                    .map(|token| DeliveryOutcome::failed(token, DeliveryError::Unknown))
                    .collect(),
            },
        }
    }
}

/// Normalized result of one chunk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkReport {
    pub multicast_id: Option<i64>,
    pub success: u32,
    pub failure: u32,
    pub outcomes: Vec<DeliveryOutcome>,
}

/// Aggregate result of a dispatch
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DispatchSummary {
    pub method: &'static str,
    /// One per chunk that reported one, in chunk order
    pub multicast_ids: Vec<i64>,
    pub success: u32,
    pub failure: u32,
    /// One per submitted token, in submission order
    pub outcomes: Vec<DeliveryOutcome>,
}

impl DispatchSummary {
    pub fn empty() -> Self {
        Self {
            method: METHOD,
            multicast_ids: Vec::new(),
            success: 0,
            failure: 0,
            outcomes: Vec::new(),
        }
    }

    /// Merge chunk outcomes, which must be in chunk order
    pub fn merge(chunks: impl IntoIterator<Item = ChunkOutcome>) -> Self {
        chunks
            .into_iter()
            .map(ChunkOutcome::into_report)
            .fold(Self::empty(), |mut summary, report| {
                summary.multicast_ids.extend(report.multicast_id);
                // counts come from the provider and are not trusted
                summary.success = summary.success.saturating_add(report.success);
                summary.failure = summary.failure.saturating_add(report.failure);
                summary.outcomes.extend(report.outcomes);
                summary
            })
    }

    /// Tokens the provider asked to replace, as `(old, canonical)` pairs
    pub fn canonical_updates(&self) -> impl Iterator<Item = (&str, &str)> {
        self.outcomes.iter().filter_map(|outcome| {
            outcome
                .registration_id
                .as_deref()
                .map(|canonical| (outcome.token.as_str(), canonical))
        })
    }

    /// Tokens the provider reports as no longer valid; callers should drop them
    pub fn stale_tokens(&self) -> impl Iterator<Item = &str> {
        self.outcomes
            .iter()
            .filter(|outcome| {
                matches!(
                    &outcome.error,
                    Some(DeliveryError::Provider(code))
                        if code == "NotRegistered" || code == "InvalidRegistration"
                )
            })
            .map(|outcome| outcome.token.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn tokens(names: &[&str]) -> Vec<String> {
        names.iter().map(|name| name.to_string()).collect()
    }

    fn ok(id: &str) -> GcmResult {
        GcmResult {
            message_id: Some(id.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_transport_error_fails_every_token() {
        let outcome = ChunkOutcome::from_response(
            tokens(&["a", "b"]),
            Err(SendError::Transport("connection reset".to_string())),
        );
        assert!(matches!(outcome, ChunkOutcome::TransportError { .. }));

        let report = outcome.into_report();
        assert_eq!(report.success, 0);
        assert_eq!(report.failure, 2);
        for (outcome, token) in report.outcomes.iter().zip(["a", "b"]) {
            assert_eq!(outcome.token, token);
            assert_eq!(
                outcome.error,
                Some(DeliveryError::Transport(
                    "transport error: connection reset".to_string()
                ))
            );
        }
    }

    #[test]
    fn test_normalized_aligns_by_position() {
        let response = GcmResponse {
            multicast_id: Some(11),
            success: 1,
            failure: 1,
            canonical_ids: 1,
            results: Some(vec![
                GcmResult {
                    message_id: Some("m1".to_string()),
                    registration_id: Some("a2".to_string()),
                    error: None,
                },
                GcmResult {
                    error: Some("NotRegistered".to_string()),
                    ..Default::default()
                },
            ]),
        };

        let report = ChunkOutcome::from_response(tokens(&["a", "b"]), Ok(response)).into_report();

        assert_eq!(report.multicast_id, Some(11));
        assert_eq!(report.outcomes[0].token, "a");
        assert_eq!(report.outcomes[0].message_id.as_deref(), Some("m1"));
        assert_eq!(report.outcomes[0].registration_id.as_deref(), Some("a2"));
        assert_eq!(report.outcomes[1].token, "b");
        assert_eq!(
            report.outcomes[1].error,
            Some(DeliveryError::Provider("NotRegistered".to_string()))
        );
    }

    #[test]
    fn test_short_results_pad_with_unknown() {
        let response = GcmResponse {
            success: 1,
            results: Some(vec![ok("m1")]),
            ..Default::default()
        };
        let report =
            ChunkOutcome::from_response(tokens(&["a", "b", "c"]), Ok(response)).into_report();

        assert_eq!(report.outcomes.len(), 3);
        assert!(report.outcomes[0].is_success());
        assert_eq!(report.outcomes[1].error, Some(DeliveryError::Unknown));
        assert_eq!(report.outcomes[2].error, Some(DeliveryError::Unknown));
    }

    #[test]
    fn test_counts_only_marks_unknown() {
        let response = GcmResponse {
            multicast_id: Some(5),
            success: 2,
            failure: 0,
            ..Default::default()
        };
        let outcome = ChunkOutcome::from_response(tokens(&["a", "b"]), Ok(response));
        assert!(matches!(outcome, ChunkOutcome::CountsOnly { .. }));

        let report = outcome.into_report();
        assert_eq!(report.success, 2);
        assert_eq!(report.failure, 0);
        assert!(
            report
                .outcomes
                .iter()
                .all(|outcome| outcome.error == Some(DeliveryError::Unknown))
        );
    }

    #[test]
    fn test_merge_preserves_chunk_order_and_sums() {
        let first = ChunkOutcome::from_response(
            tokens(&["a", "b"]),
            Ok(GcmResponse {
                multicast_id: Some(1),
                success: 2,
                results: Some(vec![ok("m-a"), ok("m-b")]),
                ..Default::default()
            }),
        );
        let second = ChunkOutcome::from_response(
            tokens(&["c"]),
            Err(SendError::Unauthorized),
        );
        let third = ChunkOutcome::from_response(
            tokens(&["d"]),
            Ok(GcmResponse {
                multicast_id: Some(3),
                success: 1,
                results: Some(vec![ok("m-d")]),
                ..Default::default()
            }),
        );

        let summary = DispatchSummary::merge([first, second, third]);

        assert_eq!(summary.method, "gcm");
        assert_eq!(summary.multicast_ids, vec![1, 3]);
        assert_eq!(summary.success, 3);
        assert_eq!(summary.failure, 1);
        let order: Vec<&str> = summary.outcomes.iter().map(|o| o.token.as_str()).collect();
        assert_eq!(order, vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn test_merge_saturates_provider_counts() {
        let huge = ChunkOutcome::from_response(
            tokens(&["a"]),
            Ok(GcmResponse {
                success: u32::MAX,
                failure: u32::MAX,
                ..Default::default()
            }),
        );
        let small = ChunkOutcome::from_response(
            tokens(&["b"]),
            Ok(GcmResponse {
                success: 1,
                failure: 1,
                ..Default::default()
            }),
        );

        let summary = DispatchSummary::merge([huge, small]);

        assert_eq!(summary.success, u32::MAX);
        assert_eq!(summary.failure, u32::MAX);
        assert_eq!(summary.outcomes.len(), 2);
    }

    #[test]
    fn test_token_maintenance_helpers() {
        let summary = DispatchSummary {
            outcomes: vec![
                DeliveryOutcome {
                    token: "old".to_string(),
                    message_id: Some("m".to_string()),
                    registration_id: Some("new".to_string()),
                    error: None,
                },
                DeliveryOutcome::failed(
                    "gone".to_string(),
                    DeliveryError::Provider("NotRegistered".to_string()),
                ),
                DeliveryOutcome::failed(
                    "busy".to_string(),
                    DeliveryError::Provider("Unavailable".to_string()),
                ),
            ],
            ..DispatchSummary::empty()
        };

        assert_eq!(summary.canonical_updates().collect::<Vec<_>>(), vec![("old", "new")]);
        assert_eq!(summary.stale_tokens().collect::<Vec<_>>(), vec!["gone"]);
    }

    #[test]
    fn test_summary_json_shape() {
        let summary = DispatchSummary {
            multicast_ids: vec![9],
            success: 0,
            failure: 2,
            outcomes: vec![
                DeliveryOutcome::failed("a".to_string(), DeliveryError::Unknown),
                DeliveryOutcome::failed(
                    "b".to_string(),
                    DeliveryError::Provider("InvalidRegistration".to_string()),
                ),
            ],
            ..DispatchSummary::empty()
        };

        assert_eq!(
            serde_json::to_value(&summary).unwrap(),
            json!({
                "method": "gcm",
                "multicastIds": [9],
                "success": 0,
                "failure": 2,
                "outcomes": [
                    {"token": "a", "error": {"type": "unknown"}},
                    {"token": "b", "error": {"type": "provider", "reason": "InvalidRegistration"}}
                ]
            })
        );
    }
}
