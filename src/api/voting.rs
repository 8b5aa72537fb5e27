use mongodb::{
    bson::{doc, DateTime as BsonDateTime},
    Client,
};
use rocket::{futures::TryStreamExt, http::Status, serde::json::Json, Route, State};

use crate::error::{Error, Result};
use crate::model::{
    api::{
        auth::AuthToken,
        ballot::{BallotReceipt, BallotSubmission},
        candidate::{CandidateDescription, PositionCandidates},
        student::VoterStatus,
    },
    common::{Position, VotingStatus},
    db::{
        ballot::{Ballot, BallotCore, NewBallot},
        candidate::Candidate,
        election_status::ElectionStatus,
        student::Student,
    },
    mongodb::{is_duplicate_key_error, Coll},
};

use super::common::student_by_token;

pub fn routes() -> Vec<Route> {
    routes![ballot_paper, voter_status, submit_ballot, own_ballot]
}

/// The candidates up for election, grouped by position in ballot-paper
/// order, for rendering the voting form.
#[get("/voter/ballot-paper")]
async fn ballot_paper(
    _token: AuthToken<Student>,
    candidates: Coll<Candidate>,
) -> Result<Json<Vec<PositionCandidates>>> {
    let all: Vec<Candidate> = candidates.find(None, None).await?.try_collect().await?;

    let mut paper = Vec::new();
    for position in Position::ALL {
        let entrants: Vec<CandidateDescription> = all
            .iter()
            .filter(|candidate| candidate.position == position)
            .cloned()
            .map(Into::into)
            .collect();
        if !entrants.is_empty() {
            paper.push(PositionCandidates {
                position,
                label: position.label().to_string(),
                candidates: entrants,
            });
        }
    }

    Ok(Json(paper))
}

/// Where the logged-in student stands in the voting lifecycle.
#[get("/voter/status")]
async fn voter_status(
    token: AuthToken<Student>,
    students: Coll<Student>,
) -> Result<Json<VoterStatus>> {
    let student = student_by_token(&token, &students).await?;
    Ok(Json(student.into()))
}

/// Cast the logged-in student's one ballot.
///
/// The pre-checks (voting open, not yet voted) give friendly rejections,
/// but the unique index on `ballots.student_school_id` is the authoritative
/// duplicate guard: two racing submissions both pass the read-side check,
/// and the index rejects the loser's insert. The ballot insert and the
/// student update share one transaction, so the `has_voted` flag can never
/// disagree with ballot existence.
#[post("/voter/ballot", data = "<submission>", format = "json")]
async fn submit_ballot(
    token: AuthToken<Student>,
    submission: Json<BallotSubmission>,
    students: Coll<Student>,
    new_ballots: Coll<NewBallot>,
    ballots: Coll<Ballot>,
    settings: Coll<ElectionStatus>,
    db_client: &State<Client>,
) -> Result<Json<BallotReceipt>> {
    // Resolve the student; absent means the account was deleted mid-session.
    let student = student_by_token(&token, &students).await?;

    // Reject ballots once the election has ended.
    let status = settings.find_one(None, None).await?.ok_or_else(|| {
        Error::Status(
            Status::InternalServerError,
            "Election status missing".to_string(),
        )
    })?;
    if !status.voting_open {
        return Err(Error::Status(
            Status::UnprocessableEntity,
            "Voting has ended; no further ballots are accepted".to_string(),
        ));
    }

    // One ballot per student, ever. A second attempt is rejected outright,
    // never silently accepted.
    if student.has_voted {
        return Err(Error::DuplicateVote(format!(
            "Student {} has already cast their ballot",
            student.school_id
        )));
    }

    let ballot = BallotCore::new(
        student.school_id.clone(),
        student.full_name.clone(),
        submission.0.selections,
    );

    // Insert the ballot and mark the student voted as a single unit.
    {
        let mut session = db_client.start_session(None).await?;
        session.start_transaction(None).await?;

        if let Err(e) = new_ballots
            .insert_one_with_session(&ballot, None, &mut session)
            .await
        {
            // Unique index violation: a racing submission won.
            // Dropping the session aborts the transaction.
            if is_duplicate_key_error(&e) {
                return Err(Error::DuplicateVote(format!(
                    "Student {} has already cast their ballot",
                    student.school_id
                )));
            }
            return Err(e.into());
        }

        let mark_voted = doc! {
            "$set": {
                "has_voted": true,
                "voting_status": VotingStatus::Completed,
                "voted_at": BsonDateTime::from_chrono(ballot.submitted_at),
            }
        };
        students
            .update_one_with_session(student.id.as_doc(), mark_voted, None, &mut session)
            .await?;

        session.commit_transaction().await?;
    }
    info!("Student {} cast their ballot", student.school_id);

    // Echo the stored ballot back as the receipt.
    let stored = ballots
        .find_one(doc! { "student_school_id": &ballot.student_school_id }, None)
        .await?
        .ok_or_else(|| Error::not_found(format!("Ballot for student {}", student.school_id)))?;
    Ok(Json(stored.into()))
}

/// The logged-in student's own ballot receipt.
#[get("/voter/ballot")]
async fn own_ballot(
    token: AuthToken<Student>,
    students: Coll<Student>,
    ballots: Coll<Ballot>,
) -> Result<Json<BallotReceipt>> {
    let student = student_by_token(&token, &students).await?;
    let ballot = ballots
        .find_one(doc! { "student_school_id": &student.school_id }, None)
        .await?
        .ok_or_else(|| Error::not_found(format!("Ballot for student {}", student.school_id)))?;
    Ok(Json(ballot.into()))
}

#[cfg(test)]
mod tests {
    use rocket::{http::ContentType, local::asynchronous::Client, serde::json::serde_json::json};

    use crate::model::db::{
        candidate::{CandidateCore, NewCandidate},
        student::StudentCore,
    };

    use super::*;

    async fn insert_candidates(candidates: &Coll<NewCandidate>) {
        candidates
            .insert_many(
                [
                    CandidateCore::example(),
                    CandidateCore::example2(),
                    CandidateCore::example3(),
                ],
                None,
            )
            .await
            .unwrap();
    }

    async fn submit(client: &Client, submission: &BallotSubmission) -> rocket::http::Status {
        client
            .post(uri!(submit_ballot))
            .header(ContentType::JSON)
            .body(json!(submission).to_string())
            .dispatch()
            .await
            .status()
    }

    #[backend_test(student)]
    async fn ballot_paper_groups_by_position(client: Client, candidates: Coll<NewCandidate>) {
        insert_candidates(&candidates).await;

        let response = client.get(uri!(ballot_paper)).dispatch().await;
        assert_eq!(Status::Ok, response.status());

        let raw_response = response.into_string().await.unwrap();
        let paper: Vec<PositionCandidates> =
            rocket::serde::json::serde_json::from_str(&raw_response).unwrap();

        // Two presidents, one treasurer; empty positions absent.
        assert_eq!(paper.len(), 2);
        assert_eq!(paper[0].position, Position::President);
        assert_eq!(paper[0].label, "President");
        assert_eq!(paper[0].candidates.len(), 2);
        assert_eq!(paper[1].position, Position::Treasurer);
        assert_eq!(paper[1].candidates.len(), 1);
    }

    #[backend_test(student)]
    async fn cast_ballot(
        client: Client,
        candidates: Coll<NewCandidate>,
        students: Coll<Student>,
        ballots: Coll<Ballot>,
    ) {
        insert_candidates(&candidates).await;

        // Not voted yet: no ballot, pending status.
        let response = client.get(uri!(own_ballot)).dispatch().await;
        assert_eq!(Status::NotFound, response.status());

        let response = client.get(uri!(voter_status)).dispatch().await;
        let raw_response = response.into_string().await.unwrap();
        let status: VoterStatus =
            rocket::serde::json::serde_json::from_str(&raw_response).unwrap();
        assert!(!status.has_voted);
        assert_eq!(status.voting_status, VotingStatus::Pending);

        // Cast the ballot.
        let submission = BallotSubmission::example();
        let response = client
            .post(uri!(submit_ballot))
            .header(ContentType::JSON)
            .body(json!(submission).to_string())
            .dispatch()
            .await;
        assert_eq!(Status::Ok, response.status());

        let raw_response = response.into_string().await.unwrap();
        let receipt: BallotReceipt =
            rocket::serde::json::serde_json::from_str(&raw_response).unwrap();
        assert_eq!(receipt.student_school_id, StudentCore::example().school_id);
        assert_eq!(receipt.student_name, StudentCore::example().full_name);
        assert_eq!(receipt.selections, submission.selections);

        // The ballot is stored and the student is marked voted.
        let stored = ballots
            .find_one(
                doc! { "student_school_id": &StudentCore::example().school_id },
                None,
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.selections, submission.selections);

        let student = students
            .find_one(doc! { "school_id": &StudentCore::example().school_id }, None)
            .await
            .unwrap()
            .unwrap();
        assert!(student.has_voted);
        assert_eq!(student.voting_status, VotingStatus::Completed);
        assert!(student.voted_at.is_some());

        // The receipt is now retrievable.
        let response = client.get(uri!(own_ballot)).dispatch().await;
        assert_eq!(Status::Ok, response.status());
    }

    #[backend_test(student)]
    async fn duplicate_vote_rejected(
        client: Client,
        candidates: Coll<NewCandidate>,
        ballots: Coll<Ballot>,
    ) {
        insert_candidates(&candidates).await;

        assert_eq!(Status::Ok, submit(&client, &BallotSubmission::example()).await);

        // A second attempt with a different payload is rejected and leaves
        // no trace.
        let second = BallotSubmission {
            selections: std::collections::HashMap::from([(
                Position::President,
                CandidateCore::example2().name,
            )]),
        };
        assert_eq!(Status::Conflict, submit(&client, &second).await);

        let stored: Vec<Ballot> = ballots
            .find(None, None)
            .await
            .unwrap()
            .try_collect()
            .await
            .unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].selections, BallotSubmission::example().selections);
    }

    #[backend_test(student)]
    async fn abstaining_ballot_is_valid(client: Client, ballots: Coll<Ballot>) {
        assert_eq!(
            Status::Ok,
            submit(&client, &BallotSubmission::abstaining()).await
        );

        let stored = ballots.find_one(None, None).await.unwrap().unwrap();
        assert!(stored.selections.is_empty());
    }

    #[backend_test(student)]
    async fn closed_election_rejects_ballots(
        client: Client,
        settings: Coll<ElectionStatus>,
        ballots: Coll<Ballot>,
    ) {
        settings
            .update_one(
                doc! {},
                doc! { "$set": { "voting_open": false } },
                None,
            )
            .await
            .unwrap();

        assert_eq!(
            Status::UnprocessableEntity,
            submit(&client, &BallotSubmission::abstaining()).await
        );
        assert_eq!(ballots.count_documents(None, None).await.unwrap(), 0);
    }

    #[backend_test]
    async fn voting_requires_login(client: Client) {
        let response = client.get(uri!(ballot_paper)).dispatch().await;
        assert_eq!(Status::NotFound, response.status());

        let response = client
            .post(uri!(submit_ballot))
            .header(ContentType::JSON)
            .body(json!(BallotSubmission::abstaining()).to_string())
            .dispatch()
            .await;
        assert_eq!(Status::NotFound, response.status());
    }
}
