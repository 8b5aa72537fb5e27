use serde::{Deserialize, Serialize};

use crate::model::{api::id::ApiId, common::Position, db::candidate::Candidate};

/// An admin request to field a candidate: the standing student, the office
/// they stand for, and the party list fielding them. The candidate's ballot
/// name is the student's registered full name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateRequest {
    pub school_id: String,
    pub position: Position,
    pub party_list: String,
}

/// API-friendly representation of a candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateDescription {
    pub id: ApiId,
    pub school_id: String,
    pub name: String,
    pub position: Position,
    pub party_list: String,
}

impl From<Candidate> for CandidateDescription {
    fn from(candidate: Candidate) -> Self {
        Self {
            id: candidate.id.into(),
            school_id: candidate.candidate.school_id,
            name: candidate.candidate.name,
            position: candidate.candidate.position,
            party_list: candidate.candidate.party_list,
        }
    }
}

/// One section of the ballot paper: every candidate standing for a single
/// position, in registration order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionCandidates {
    pub position: Position,
    pub label: String,
    pub candidates: Vec<CandidateDescription>,
}
