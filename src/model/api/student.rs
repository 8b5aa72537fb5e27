use chrono::{serde::ts_seconds_option, DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{
    common::VotingStatus,
    db::student::{full_name, NewStudent, Student, StudentCore},
};

/// A student registration, as submitted by an admin.
///
/// The voting fields never appear here; a student always starts out
/// `pending` and only ballot submission can advance them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentRegistration {
    pub school_id: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub middle_initial: String,
    #[serde(default)]
    pub photo: Option<String>,
    #[serde(default)]
    pub fingerprint: Option<String>,
}

impl TryFrom<StudentRegistration> for NewStudent {
    type Error = ();

    /// Normalise and validate the registration: school ID, first, and last
    /// names must be non-empty after trimming. Derives the full name.
    fn try_from(registration: StudentRegistration) -> Result<Self, Self::Error> {
        let school_id = registration.school_id.trim().to_string();
        let first_name = registration.first_name.trim().to_string();
        let last_name = registration.last_name.trim().to_string();
        let middle_initial = registration.middle_initial.trim().to_string();
        if school_id.is_empty() || first_name.is_empty() || last_name.is_empty() {
            return Err(());
        }
        let full_name = full_name(&first_name, &middle_initial, &last_name);
        Ok(StudentCore {
            school_id,
            first_name,
            last_name,
            middle_initial,
            full_name,
            photo: registration.photo,
            fingerprint: registration.fingerprint,
            has_voted: false,
            voting_status: VotingStatus::Pending,
            voted_at: None,
        })
    }
}

/// The editable part of a student record. Everything else (the school ID,
/// the voting fields) is fixed or ledger-owned.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentProfile {
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub middle_initial: String,
    #[serde(default)]
    pub photo: Option<String>,
    #[serde(default)]
    pub fingerprint: Option<String>,
}

impl StudentProfile {
    /// Trim all name parts and reject empty first/last names.
    pub fn normalise(mut self) -> Result<Self, ()> {
        self.first_name = self.first_name.trim().to_string();
        self.last_name = self.last_name.trim().to_string();
        self.middle_initial = self.middle_initial.trim().to_string();
        if self.first_name.is_empty() || self.last_name.is_empty() {
            return Err(());
        }
        Ok(self)
    }

    /// The display name this profile derives to.
    pub fn full_name(&self) -> String {
        full_name(&self.first_name, &self.middle_initial, &self.last_name)
    }
}

/// API-friendly representation of a student record.
///
/// The fingerprint token deliberately never leaves the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentDescription {
    pub school_id: String,
    pub first_name: String,
    pub last_name: String,
    pub middle_initial: String,
    pub full_name: String,
    pub photo: Option<String>,
    pub has_voted: bool,
    pub voting_status: VotingStatus,
    #[serde(with = "ts_seconds_option")]
    pub voted_at: Option<DateTime<Utc>>,
}

impl From<Student> for StudentDescription {
    fn from(student: Student) -> Self {
        Self {
            school_id: student.student.school_id,
            first_name: student.student.first_name,
            last_name: student.student.last_name,
            middle_initial: student.student.middle_initial,
            full_name: student.student.full_name,
            photo: student.student.photo,
            has_voted: student.student.has_voted,
            voting_status: student.student.voting_status,
            voted_at: student.student.voted_at,
        }
    }
}

/// The logged-in student's own view of where they stand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoterStatus {
    pub has_voted: bool,
    pub voting_status: VotingStatus,
    #[serde(with = "ts_seconds_option")]
    pub voted_at: Option<DateTime<Utc>>,
}

impl From<Student> for VoterStatus {
    fn from(student: Student) -> Self {
        Self {
            has_voted: student.student.has_voted,
            voting_status: student.student.voting_status,
            voted_at: student.student.voted_at,
        }
    }
}

#[cfg(test)]
mod examples {
    use super::*;

    impl StudentRegistration {
        /// Registration producing [`StudentCore::example`]
        /// (modulo the fingerprint token, which registration carries too).
        pub fn example() -> Self {
            let student = StudentCore::example();
            Self {
                school_id: student.school_id,
                first_name: student.first_name,
                last_name: student.last_name,
                middle_initial: student.middle_initial,
                photo: student.photo,
                fingerprint: student.fingerprint,
            }
        }

        pub fn example2() -> Self {
            let student = StudentCore::example2();
            Self {
                school_id: student.school_id,
                first_name: student.first_name,
                last_name: student.last_name,
                middle_initial: student.middle_initial,
                photo: student.photo,
                fingerprint: student.fingerprint,
            }
        }
    }
}
