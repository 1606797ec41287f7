//! Shared API request/response types used by the API server and its clients.

use garde::Validate;
use serde::{Deserialize, Serialize};

/// Max length for platform identifiers and device ids.
const MAX_IDENTIFIER_LEN: usize = 255;
/// Max size of the balance document. Generous for a game tuning table.
const MAX_BALANCE_LEN: usize = 1_048_576;

fn validate_finite(value: &f64, _: &()) -> garde::Result {
    if !value.is_finite() {
        return Err(garde::Error::new("must be a finite number"));
    }
    Ok(())
}

// ============================================================================
// Stage types
// ============================================================================

/// Identifies a game stage.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct StagePayload {
    #[garde(range(min = 1))]
    pub id: i64,
}

/// Attempt and clear counts for one stage. Zero when never recorded.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct StageInfo {
    pub id: i64,
    pub try_cnt: f64,
    pub clear_cnt: f64,
}

/// One member of a ranked collection with its cumulative score.
///
/// Field names are capitalised to keep the wire format existing clients
/// already parse.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct ScoreEntry {
    pub score: f64,
    pub member: String,
}

impl ScoreEntry {
    pub fn new(member: impl Into<String>, score: f64) -> Self {
        Self {
            score,
            member: member.into(),
        }
    }
}

/// Attempt and clear counts for every stage, highest first.
#[derive(Debug, Serialize, Deserialize)]
pub struct AllStagesResponse {
    pub start: Vec<ScoreEntry>,
    pub clear: Vec<ScoreEntry>,
}

// ============================================================================
// Ranking types
// ============================================================================

/// Add a score delta to a user's leaderboard entry.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct IncrScorePayload {
    #[garde(range(min = 1))]
    pub id: i64,
    /// Signed amount added to the user's cumulative score.
    #[garde(custom(validate_finite))]
    pub score: f64,
}

/// A user's cumulative score and zero-based leaderboard position.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct RankResponse {
    pub id: i64,
    pub score: f64,
    pub rank: u64,
}

// ============================================================================
// User types
// ============================================================================

/// Sign in with a platform account, signing up on first use.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoginPayload {
    #[garde(length(min = 1, max = MAX_IDENTIFIER_LEN))]
    pub platform_id: String,
    #[garde(length(min = 1, max = MAX_IDENTIFIER_LEN))]
    pub platform: String,
    #[garde(length(min = 1, max = MAX_IDENTIFIER_LEN))]
    pub device_id: String,
}

/// Re-link an existing user to another platform account.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ChangePlatformPayload {
    #[garde(range(min = 1))]
    pub id: i64,
    #[garde(length(min = 1, max = MAX_IDENTIFIER_LEN))]
    pub platform_id: String,
    #[garde(length(min = 1, max = MAX_IDENTIFIER_LEN))]
    pub platform: String,
    /// Must match the device the user signed up from.
    #[garde(length(min = 1, max = MAX_IDENTIFIER_LEN))]
    pub device_id: String,
}

/// A user's game id and platform link.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserResponse {
    pub id: i64,
    pub platform_id: String,
    pub platform: String,
    pub device_id: String,
}

// ============================================================================
// Balance types
// ============================================================================

/// Replace the game balance document. `data` holds the JSON text verbatim.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SetBalancePayload {
    #[garde(length(min = 1, max = MAX_BALANCE_LEN))]
    pub data: String,
}

/// Liveness response.
#[derive(Debug, Serialize, Deserialize)]
pub struct PingResponse {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use garde::Validate;

    mod stage {
        use super::*;

        #[test]
        fn rejects_zero_id() {
            assert!(StagePayload { id: 0 }.validate().is_err());
        }

        #[test]
        fn rejects_negative_id() {
            assert!(StagePayload { id: -7 }.validate().is_err());
        }

        #[test]
        fn accepts_positive_id() {
            assert!(StagePayload { id: 42 }.validate().is_ok());
        }
    }

    mod incr_score {
        use super::*;

        #[test]
        fn rejects_nan_delta() {
            let payload = IncrScorePayload {
                id: 1,
                score: f64::NAN,
            };

            assert!(payload.validate().is_err());
        }

        #[test]
        fn rejects_infinite_delta() {
            let payload = IncrScorePayload {
                id: 1,
                score: f64::NEG_INFINITY,
            };

            assert!(payload.validate().is_err());
        }

        #[test]
        fn accepts_negative_delta() {
            let payload = IncrScorePayload { id: 1, score: -3.5 };

            assert!(payload.validate().is_ok());
        }
    }

    mod login {
        use super::*;

        #[test]
        fn rejects_empty_platform() {
            let payload = LoginPayload {
                platform_id: "g-123".into(),
                platform: "".into(),
                device_id: "device".into(),
            };

            assert!(payload.validate().is_err());
        }

        #[test]
        fn rejects_oversized_device_id() {
            let payload = LoginPayload {
                platform_id: "g-123".into(),
                platform: "google".into(),
                device_id: "d".repeat(256),
            };

            assert!(payload.validate().is_err());
        }
    }

    #[test]
    fn empty_balance_rejected() {
        let payload = SetBalancePayload { data: "".into() };
        assert!(payload.validate().is_err());
    }

    #[test]
    fn score_entry_uses_capitalised_field_names() {
        let json = serde_json::to_value(ScoreEntry::new("42", 3.0)).unwrap();

        assert_eq!(json, serde_json::json!({ "Score": 3.0, "Member": "42" }));
    }
}
