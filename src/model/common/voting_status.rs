use mongodb::bson::{to_bson, Bson};
use serde::{Deserialize, Serialize};

/// Where a student is in the voting lifecycle.
///
/// Kept alongside the `has_voted` flag for compatibility with existing
/// records; the two always move together under [`crate::api::voting`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VotingStatus {
    /// Registered but yet to cast a ballot.
    Pending,
    /// Ballot cast; may not vote again.
    Completed,
}

impl From<VotingStatus> for Bson {
    fn from(status: VotingStatus) -> Self {
        to_bson(&status).expect("Serialisation is infallible")
    }
}
