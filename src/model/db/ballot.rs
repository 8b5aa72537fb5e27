use std::collections::HashMap;
use std::ops::Deref;

use chrono::{DateTime, Utc};
use mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime;
use serde::{Deserialize, Serialize};

use crate::model::{common::Position, mongodb::Id};

/// Core ballot data.
///
/// Ballots are append-only: nothing in the crate exposes an update or
/// replace path for them, and `student_school_id` carries a unique index,
/// so a student's ballot can exist at most once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BallotCore {
    /// School ID of the student who cast this ballot.
    pub student_school_id: String,
    /// The student's display name at the time of casting.
    pub student_name: String,
    /// Chosen candidate name per position. Positions the student skipped
    /// are absent; an empty map is a valid, fully abstaining ballot.
    pub selections: HashMap<Position, String>,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub submitted_at: DateTime<Utc>,
}

impl BallotCore {
    /// Assemble a ballot stamped with the current time.
    pub fn new(
        student_school_id: String,
        student_name: String,
        selections: HashMap<Position, String>,
    ) -> Self {
        Self {
            student_school_id,
            student_name,
            selections,
            submitted_at: Utc::now(),
        }
    }
}

/// A ballot without an ID.
pub type NewBallot = BallotCore;

/// A ballot from the database, with its unique ID.
///
/// No `DerefMut`: cast ballots never change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ballot {
    #[serde(rename = "_id")]
    pub id: Id,
    #[serde(flatten)]
    pub ballot: BallotCore,
}

impl Deref for Ballot {
    type Target = BallotCore;

    fn deref(&self) -> &Self::Target {
        &self.ballot
    }
}

/// Example data for tests.
#[cfg(test)]
mod examples {
    use super::*;
    use crate::model::db::{candidate::CandidateCore, student::StudentCore};

    impl BallotCore {
        /// [`StudentCore::example3`]'s ballot: a vote for
        /// [`CandidateCore::example`] as president, abstaining elsewhere.
        pub fn example() -> Self {
            let student = StudentCore::example3();
            Self::new(
                student.school_id,
                student.full_name,
                HashMap::from([(Position::President, CandidateCore::example().name)]),
            )
        }
    }
}
