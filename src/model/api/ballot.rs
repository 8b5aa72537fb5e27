use std::collections::HashMap;

use chrono::{serde::ts_seconds, DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{common::Position, db::ballot::Ballot};

/// A ballot as submitted by the logged-in student: the chosen candidate
/// name per position. Positions may be omitted to abstain; an empty map is
/// a valid, fully abstaining ballot.
///
/// Selections are deliberately not checked against the candidate register
/// here; a selection that matches no candidate simply never scores in the
/// tally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BallotSubmission {
    pub selections: HashMap<Position, String>,
}

/// The stored ballot, echoed back to its caster and listed in the admin
/// audit view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BallotReceipt {
    pub student_school_id: String,
    pub student_name: String,
    pub selections: HashMap<Position, String>,
    #[serde(with = "ts_seconds")]
    pub submitted_at: DateTime<Utc>,
}

impl From<Ballot> for BallotReceipt {
    fn from(ballot: Ballot) -> Self {
        Self {
            student_school_id: ballot.ballot.student_school_id,
            student_name: ballot.ballot.student_name,
            selections: ballot.ballot.selections,
            submitted_at: ballot.ballot.submitted_at,
        }
    }
}
