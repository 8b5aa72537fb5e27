use mongodb::bson::{to_bson, Bson};
use serde::{Deserialize, Serialize};

/// The elected positions, as a closed set.
///
/// The serialized key (`president`, `vicePresident`, ..., `pio`) is the
/// canonical form used in ballot selection maps, candidate records, and the
/// API alike; the human-readable name is only ever produced via
/// [`Position::label`]. Anything claiming to be a position that fails to
/// deserialize to one of these variants is rejected at the boundary.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Position {
    President,
    VicePresident,
    Secretary,
    Treasurer,
    Auditor,
    #[serde(rename = "pio")]
    PublicInformationOfficer,
    Representative,
}

impl Position {
    /// Every position, in ballot-paper order.
    pub const ALL: [Position; 7] = [
        Position::President,
        Position::VicePresident,
        Position::Secretary,
        Position::Treasurer,
        Position::Auditor,
        Position::PublicInformationOfficer,
        Position::Representative,
    ];

    /// The display name for this position.
    pub fn label(self) -> &'static str {
        match self {
            Position::President => "President",
            Position::VicePresident => "Vice President",
            Position::Secretary => "Secretary",
            Position::Treasurer => "Treasurer",
            Position::Auditor => "Auditor",
            Position::PublicInformationOfficer => "Public Information Officer",
            Position::Representative => "Representative",
        }
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl From<Position> for Bson {
    fn from(position: Position) -> Self {
        to_bson(&position).expect("Serialisation is infallible")
    }
}
