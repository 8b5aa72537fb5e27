use std::ops::{Deref, DerefMut};

use serde::{Deserialize, Serialize};

use crate::model::mongodb::Id;

/// Core party list data. Candidates reference parties by name, so a party
/// may only be deleted once nothing references it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartyCore {
    pub name: String,
}

/// A party list without an ID.
pub type NewParty = PartyCore;

/// A party list from the database, with its unique ID.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Party {
    #[serde(rename = "_id")]
    pub id: Id,
    #[serde(flatten)]
    pub party: PartyCore,
}

impl Deref for Party {
    type Target = PartyCore;

    fn deref(&self) -> &Self::Target {
        &self.party
    }
}

impl DerefMut for Party {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.party
    }
}

/// Example data for tests.
#[cfg(test)]
mod examples {
    use super::*;

    impl PartyCore {
        pub fn example() -> Self {
            Self {
                name: "Unity Party".to_string(),
            }
        }

        pub fn example2() -> Self {
            Self {
                name: "Progress Party".to_string(),
            }
        }
    }
}
