use std::ops::{Deref, DerefMut};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{
    common::VotingStatus,
    mongodb::{chrono_datetime_option_as_bson_datetime, Id},
};

/// Core student record data.
///
/// Students are created by admin registration and their voting fields are
/// only ever advanced by ballot submission; see [`crate::api::voting`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentCore {
    /// School-issued ID, unique across the student body.
    pub school_id: String,
    pub first_name: String,
    pub last_name: String,
    /// Middle initial without the trailing dot; empty if the student has none.
    pub middle_initial: String,
    /// Display name, derived from the name parts at registration time.
    pub full_name: String,
    /// Opaque reference to the student's photo, if one was captured.
    pub photo: Option<String>,
    /// Opaque enrolment token from the fingerprint scanner, if captured.
    /// Never used for verification here; it is carried for the kiosk client.
    pub fingerprint: Option<String>,
    pub has_voted: bool,
    pub voting_status: VotingStatus,
    #[serde(with = "chrono_datetime_option_as_bson_datetime")]
    pub voted_at: Option<DateTime<Utc>>,
}

/// Build the canonical display name: `First M. Last`, with the middle
/// initial omitted entirely when absent.
pub fn full_name(first_name: &str, middle_initial: &str, last_name: &str) -> String {
    let first = first_name.trim();
    let middle = middle_initial.trim();
    let last = last_name.trim();
    if middle.is_empty() {
        format!("{first} {last}")
    } else {
        format!("{first} {middle}. {last}")
    }
}

/// A student without an ID.
pub type NewStudent = StudentCore;

/// A student record from the database, with its unique ID.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Student {
    #[serde(rename = "_id")]
    pub id: Id,
    #[serde(flatten)]
    pub student: StudentCore,
}

impl Deref for Student {
    type Target = StudentCore;

    fn deref(&self) -> &Self::Target {
        &self.student
    }
}

impl DerefMut for Student {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.student
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_name_with_middle_initial() {
        assert_eq!(full_name("Maria", "S", "Santos"), "Maria S. Santos");
    }

    #[test]
    fn full_name_without_middle_initial() {
        assert_eq!(full_name("Juan", "", "Dela Cruz"), "Juan Dela Cruz");
        assert_eq!(full_name("Juan", "   ", "Dela Cruz"), "Juan Dela Cruz");
    }

    #[test]
    fn full_name_trims_parts() {
        assert_eq!(full_name(" Ana ", " B ", " Reyes "), "Ana B. Reyes");
    }
}
