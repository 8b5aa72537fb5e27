use std::ops::Deref;

use mongodb::{
    bson::doc, error::Error as DbError, options::IndexOptions, Collection, Database, IndexModel,
};
use rocket::{
    request::{self, FromRequest, Request},
    State,
};

use crate::model::db::{
    admin::{Admin, AdminCore},
    ballot::{Ballot, BallotCore},
    candidate::{Candidate, CandidateCore},
    election_status::ElectionStatus,
    party::{Party, PartyCore},
    student::{Student, StudentCore},
};

/// A type that can be directly inserted/read to/from the database.
pub trait MongoCollection {
    /// The name of the collection.
    const NAME: &'static str;
}

/// A database collection of the given type.
pub struct Coll<T>(Collection<T>);

impl<T> Coll<T>
where
    T: MongoCollection,
{
    /// Get a handle on this collection in the given database.
    pub fn from_db(db: &Database) -> Self {
        Self(db.collection(T::NAME))
    }
}

// `derive(Clone)` would ask for `T: Clone`, which we don't need.
impl<T> Clone for Coll<T> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<T> Deref for Coll<T> {
    type Target = Collection<T>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

#[rocket::async_trait]
impl<'r, T> FromRequest<'r> for Coll<T>
where
    T: MongoCollection,
{
    type Error = ();

    /// Get the database connection from the managed state and wrap it in a collection.
    ///
    /// Panics iff the [`Database`] is not managed by [`rocket::Rocket`].
    async fn from_request(req: &'r Request<'_>) -> request::Outcome<Self, Self::Error> {
        let db = req.guard::<&State<Database>>().await.unwrap();
        request::Outcome::Success(Coll::from_db(db))
    }
}

// Student collections
const STUDENTS: &str = "students";
impl MongoCollection for Student {
    const NAME: &'static str = STUDENTS;
}
impl MongoCollection for StudentCore {
    const NAME: &'static str = STUDENTS;
}

// Candidate collections
const CANDIDATES: &str = "candidates";
impl MongoCollection for Candidate {
    const NAME: &'static str = CANDIDATES;
}
impl MongoCollection for CandidateCore {
    const NAME: &'static str = CANDIDATES;
}

// Party list collections
const PARTY_LISTS: &str = "party_lists";
impl MongoCollection for Party {
    const NAME: &'static str = PARTY_LISTS;
}
impl MongoCollection for PartyCore {
    const NAME: &'static str = PARTY_LISTS;
}

// Ballot collections
const BALLOTS: &str = "ballots";
impl MongoCollection for Ballot {
    const NAME: &'static str = BALLOTS;
}
impl MongoCollection for BallotCore {
    const NAME: &'static str = BALLOTS;
}

// Admin collections
const ADMINS: &str = "admins";
impl MongoCollection for Admin {
    const NAME: &'static str = ADMINS;
}
impl MongoCollection for AdminCore {
    const NAME: &'static str = ADMINS;
}

// Election status singleton
const SETTINGS: &str = "settings";
impl MongoCollection for ElectionStatus {
    const NAME: &'static str = SETTINGS;
}

/// Ensure that all the required indexes exist on the given database.
///
/// This operation is idempotent.
///
/// The unique index on `ballots.student_school_id` is the authoritative
/// one-ballot-per-student guarantee; everything else (the `has_voted` flag,
/// the pre-submission check) is a fast path on top of it.
pub async fn ensure_indexes_exist(db: &Database) -> Result<(), DbError> {
    debug!("Ensuring collection indexes exist");

    let unique = IndexOptions::builder().unique(true).build();

    // Student collection: school IDs are unique.
    let student_index = IndexModel::builder()
        .keys(doc! {"school_id": 1})
        .options(unique.clone())
        .build();
    Coll::<Student>::from_db(db)
        .create_index(student_index, None)
        .await?;

    // Ballot collection: at most one ballot per student, ever.
    let ballot_index = IndexModel::builder()
        .keys(doc! {"student_school_id": 1})
        .options(unique.clone())
        .build();
    Coll::<Ballot>::from_db(db)
        .create_index(ballot_index, None)
        .await?;

    // Candidate collection: a name stands at most once per position,
    // so tallying by (position, name) is unambiguous.
    let candidate_index = IndexModel::builder()
        .keys(doc! {"position": 1, "name": 1})
        .options(unique.clone())
        .build();
    Coll::<Candidate>::from_db(db)
        .create_index(candidate_index, None)
        .await?;

    // Party list collection: party names are unique.
    let party_index = IndexModel::builder()
        .keys(doc! {"name": 1})
        .options(unique.clone())
        .build();
    Coll::<Party>::from_db(db)
        .create_index(party_index, None)
        .await?;

    // Admin collection.
    let admin_index = IndexModel::builder()
        .keys(doc! {"username": 1})
        .options(unique)
        .build();
    Coll::<Admin>::from_db(db)
        .create_index(admin_index, None)
        .await?;

    Ok(())
}
