use rocket::{futures::TryStreamExt, serde::json::Json, Route};

use crate::error::Result;
use crate::model::{
    api::auth::AuthToken,
    db::{admin::Admin, ballot::Ballot, candidate::Candidate, student::Student},
    mongodb::Coll,
};
use crate::tally::{compute_tally, Tally};

pub fn routes() -> Vec<Route> {
    routes![get_tally]
}

/// The full derived election report: standings and winner per position,
/// party and position aggregates, totals, and turnout.
///
/// Recomputed from scratch on every call; a live dashboard simply polls at
/// whatever interval suits it. Any storage read failure surfaces as 503
/// with no partial output, and is safe to retry.
#[get("/tally")]
async fn get_tally(
    _token: AuthToken<Admin>,
    candidates: Coll<Candidate>,
    ballots: Coll<Ballot>,
    students: Coll<Student>,
) -> Result<Json<Tally>> {
    let candidates: Vec<Candidate> = candidates.find(None, None).await?.try_collect().await?;
    let ballots: Vec<Ballot> = ballots.find(None, None).await?.try_collect().await?;
    let registered_students = students.count_documents(None, None).await?;

    Ok(Json(compute_tally(&candidates, &ballots, registered_students)))
}
