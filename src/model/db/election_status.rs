use chrono::{DateTime, Utc};
use mongodb::error::Error as DbError;
use serde::{Deserialize, Serialize};

use crate::model::mongodb::{chrono_datetime_option_as_bson_datetime, Coll};

/// The single switch controlling whether ballots are accepted.
///
/// Stored as a singleton document; [`ensure_election_status_exists`] seeds
/// it and all reads/writes go through an empty filter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElectionStatus {
    pub voting_open: bool,
    #[serde(with = "chrono_datetime_option_as_bson_datetime")]
    pub ended_at: Option<DateTime<Utc>>,
}

impl ElectionStatus {
    /// The state of a fresh election: accepting ballots.
    pub fn open() -> Self {
        Self {
            voting_open: true,
            ended_at: None,
        }
    }
}

impl Default for ElectionStatus {
    fn default() -> Self {
        Self::open()
    }
}

/// Seed the election status singleton on first launch.
pub async fn ensure_election_status_exists(
    settings: &Coll<ElectionStatus>,
) -> Result<(), DbError> {
    let existing = settings.find_one(None, None).await?;
    if existing.is_none() {
        settings.insert_one(ElectionStatus::open(), None).await?;
        info!("Initialised election status: voting open");
    }
    Ok(())
}
