use serde::{Deserialize, Serialize};

/// The dashboard stats grid: headline counts plus whether voting is open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub students: u64,
    pub candidates: u64,
    pub parties: u64,
    pub ballots_cast: u64,
    pub voting_open: bool,
}
