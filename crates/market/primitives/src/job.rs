//! Transfer jobs and their lifecycle.

use crate::ContentHash;
use derive_more::{Display, From};
use serde::{Deserialize, Serialize};

/// Job identifier assigned by the remote job store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Display, From, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(String);

impl JobId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for JobId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Lifecycle state of a job.
///
/// ```text
/// Created ──► Running ◄──► Paused
///                │
///                ├──► Terminated
///                └──► Completed
/// ```
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum JobState {
    #[default]
    Created,
    Running,
    Paused,
    Terminated,
    Completed,
}

impl JobState {
    /// Whether moving from `self` to `next` is a legal transition.
    pub fn can_transition_to(self, next: JobState) -> bool {
        use JobState::*;
        matches!(
            (self, next),
            (Created, Running)
                | (Running, Paused)
                | (Paused, Running)
                | (Running, Terminated)
                | (Running, Completed)
        )
    }

    /// Terminated and completed jobs never change again.
    pub fn is_final(self) -> bool {
        matches!(self, JobState::Terminated | JobState::Completed)
    }
}

/// An externally controllable handle on an in-progress transfer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub job_id: JobId,
    pub content_hash: ContentHash,
    pub peer_address: String,
    pub state: JobState,
    pub cost_accrued: u64,
}

impl Job {
    pub fn new(job_id: JobId, content_hash: ContentHash, peer_address: impl Into<String>) -> Self {
        Self {
            job_id,
            content_hash,
            peer_address: peer_address.into(),
            state: JobState::Created,
            cost_accrued: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    const ALL: [JobState; 5] = [
        JobState::Created,
        JobState::Running,
        JobState::Paused,
        JobState::Terminated,
        JobState::Completed,
    ];

    #[test]
    fn test_final_states_are_sinks() {
        for from in [JobState::Terminated, JobState::Completed] {
            assert!(from.is_final());
            for to in ALL {
                assert!(!from.can_transition_to(to), "{from} -> {to}");
            }
        }
    }

    #[test]
    fn test_allowed_transitions() {
        assert!(JobState::Created.can_transition_to(JobState::Running));
        assert!(JobState::Running.can_transition_to(JobState::Paused));
        assert!(JobState::Paused.can_transition_to(JobState::Running));
        assert!(JobState::Running.can_transition_to(JobState::Terminated));
        assert!(JobState::Running.can_transition_to(JobState::Completed));

        assert!(!JobState::Created.can_transition_to(JobState::Paused));
        assert!(!JobState::Paused.can_transition_to(JobState::Terminated));
        assert!(!JobState::Running.can_transition_to(JobState::Running));
    }

    #[test]
    fn test_state_text_roundtrip() {
        assert_eq!(JobState::Paused.to_string(), "paused");
        assert_eq!(JobState::from_str("Terminated").unwrap(), JobState::Terminated);
        assert_eq!(
            serde_json::to_string(&JobState::Running).unwrap(),
            "\"running\""
        );
    }
}
