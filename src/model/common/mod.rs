//! Types shared between the API and DB representations.

mod position;
mod voting_status;

pub use position::Position;
pub use voting_status::VotingStatus;
