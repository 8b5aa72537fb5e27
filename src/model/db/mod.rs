//! DB-compatible (e.g. de/serialisable) types.
//!
//! The types in this module are serialised in a DB-friendly way, e.g.:
//!
//! - IDs and datetimes are serialised in MongoDB's own format.

pub mod admin;
pub use admin::{Admin, NewAdmin};

pub mod ballot;
pub use ballot::{Ballot, NewBallot};

pub mod candidate;
pub use candidate::{Candidate, NewCandidate};

pub mod election_status;
pub use election_status::ElectionStatus;

pub mod party;
pub use party::{NewParty, Party};

pub mod student;
pub use student::{NewStudent, Student};
