use mongodb::{
    bson::{doc, Bson, DateTime as BsonDateTime},
    options::FindOptions,
};
use rocket::{futures::TryStreamExt, http::Status, serde::json::Json, Route};

use crate::error::{Error, Result};
use crate::model::{
    api::{
        admin::AdminCredentials,
        auth::AuthToken,
        ballot::BallotReceipt,
        candidate::{CandidateDescription, CandidateRequest},
        pagination::{Paginated, PaginationRequest},
        student::{StudentDescription, StudentProfile, StudentRegistration},
        summary::Summary,
    },
    db::{
        admin::{Admin, NewAdmin},
        ballot::Ballot,
        candidate::{Candidate, CandidateCore, NewCandidate},
        election_status::ElectionStatus,
        party::{NewParty, Party},
        student::{NewStudent, Student},
    },
    mongodb::{is_duplicate_key_error, Coll, Id},
};

pub fn routes() -> Vec<Route> {
    routes![
        get_students,
        create_student,
        update_student,
        delete_student,
        get_candidates,
        create_candidate,
        delete_candidate,
        get_parties,
        create_party,
        delete_party,
        get_ballots,
        get_summary,
        end_election,
        reopen_election,
        get_admins,
        create_admin,
        delete_admin,
    ]
}

#[get("/students")]
async fn get_students(
    _token: AuthToken<Admin>,
    students: Coll<Student>,
) -> Result<Json<Vec<StudentDescription>>> {
    let students: Vec<Student> = students.find(None, None).await?.try_collect().await?;
    Ok(Json(students.into_iter().map(Into::into).collect()))
}

#[post("/students", data = "<registration>", format = "json")]
async fn create_student(
    _token: AuthToken<Admin>,
    registration: Json<StudentRegistration>,
    new_students: Coll<NewStudent>,
    students: Coll<Student>,
) -> Result<Json<StudentDescription>> {
    let student: NewStudent = registration.0.try_into().map_err(|_| {
        Error::BadRequest(
            "School ID, first name, and last name must be non-empty".to_string(),
        )
    })?;

    if let Err(e) = new_students.insert_one(&student, None).await {
        if is_duplicate_key_error(&e) {
            return Err(Error::BadRequest(format!(
                "School ID already registered: {}",
                student.school_id
            )));
        }
        return Err(e.into());
    }
    info!("Registered student {}", student.school_id);

    let inserted = students
        .find_one(doc! { "school_id": &student.school_id }, None)
        .await?
        .ok_or_else(|| Error::not_found(format!("Student {}", student.school_id)))?;
    Ok(Json(inserted.into()))
}

/// Update a student's profile. The school ID and the ledger-owned voting
/// fields (`has_voted`, `voting_status`, `voted_at`) cannot be touched here.
#[put("/students/<school_id>", data = "<profile>", format = "json")]
async fn update_student(
    _token: AuthToken<Admin>,
    school_id: String,
    profile: Json<StudentProfile>,
    students: Coll<Student>,
) -> Result<Json<StudentDescription>> {
    let profile = profile.0.normalise().map_err(|_| {
        Error::BadRequest("First and last names must be non-empty".to_string())
    })?;

    let student = students
        .find_one(doc! { "school_id": &school_id }, None)
        .await?
        .ok_or_else(|| Error::not_found(format!("Student with school ID '{school_id}'")))?;

    let update = doc! {
        "$set": {
            "first_name": &profile.first_name,
            "last_name": &profile.last_name,
            "middle_initial": &profile.middle_initial,
            "full_name": profile.full_name(),
            "photo": profile.photo.clone().map_or(Bson::Null, Bson::String),
            "fingerprint": profile.fingerprint.clone().map_or(Bson::Null, Bson::String),
        }
    };
    students.update_one(student.id.as_doc(), update, None).await?;

    let updated = students
        .find_one(student.id.as_doc(), None)
        .await?
        .ok_or_else(|| Error::not_found(format!("Student with school ID '{school_id}'")))?;
    Ok(Json(updated.into()))
}

#[delete("/students/<school_id>")]
async fn delete_student(
    _token: AuthToken<Admin>,
    school_id: String,
    students: Coll<Student>,
) -> Result<()> {
    let result = students
        .delete_one(doc! { "school_id": &school_id }, None)
        .await?;
    if result.deleted_count == 0 {
        return Err(Error::not_found(format!(
            "Student with school ID '{school_id}'"
        )));
    }
    Ok(())
}

#[get("/candidates")]
async fn get_candidates(
    _token: AuthToken<Admin>,
    candidates: Coll<Candidate>,
) -> Result<Json<Vec<CandidateDescription>>> {
    let candidates: Vec<Candidate> = candidates.find(None, None).await?.try_collect().await?;
    Ok(Json(candidates.into_iter().map(Into::into).collect()))
}

/// Field a candidate. The referenced student and party must both exist; the
/// candidate's ballot name is the student's registered full name.
#[post("/candidates", data = "<request>", format = "json")]
async fn create_candidate(
    _token: AuthToken<Admin>,
    request: Json<CandidateRequest>,
    students: Coll<Student>,
    parties: Coll<Party>,
    new_candidates: Coll<NewCandidate>,
    candidates: Coll<Candidate>,
) -> Result<Json<CandidateDescription>> {
    let CandidateRequest {
        school_id,
        position,
        party_list,
    } = request.0;

    let student = students
        .find_one(doc! { "school_id": &school_id }, None)
        .await?
        .ok_or_else(|| Error::not_found(format!("Student with school ID '{school_id}'")))?;
    parties
        .find_one(doc! { "name": &party_list }, None)
        .await?
        .ok_or_else(|| Error::not_found(format!("Party list '{party_list}'")))?;

    let candidate = CandidateCore {
        school_id: student.school_id.clone(),
        name: student.full_name.clone(),
        position,
        party_list,
    };
    if let Err(e) = new_candidates.insert_one(&candidate, None).await {
        if is_duplicate_key_error(&e) {
            return Err(Error::BadRequest(format!(
                "{} is already standing for {}",
                candidate.name, candidate.position
            )));
        }
        return Err(e.into());
    }

    let inserted = candidates
        .find_one(
            doc! { "position": candidate.position, "name": &candidate.name },
            None,
        )
        .await?
        .ok_or_else(|| Error::not_found(format!("Candidate {}", candidate.name)))?;
    Ok(Json(inserted.into()))
}

#[delete("/candidates/<candidate_id>")]
async fn delete_candidate(
    _token: AuthToken<Admin>,
    candidate_id: Id,
    candidates: Coll<Candidate>,
) -> Result<()> {
    let result = candidates.delete_one(candidate_id.as_doc(), None).await?;
    if result.deleted_count == 0 {
        return Err(Error::not_found(format!("Candidate {candidate_id}")));
    }
    Ok(())
}

#[get("/parties")]
async fn get_parties(_token: AuthToken<Admin>, parties: Coll<Party>) -> Result<Json<Vec<String>>> {
    let parties: Vec<Party> = parties.find(None, None).await?.try_collect().await?;
    Ok(Json(parties.into_iter().map(|party| party.party.name).collect()))
}

#[post("/parties", data = "<party>", format = "json")]
async fn create_party(
    _token: AuthToken<Admin>,
    party: Json<NewParty>,
    parties: Coll<NewParty>,
) -> Result<()> {
    let name = party.0.name.trim().to_string();
    if name.is_empty() {
        return Err(Error::BadRequest("Party name must be non-empty".to_string()));
    }

    if let Err(e) = parties.insert_one(NewParty { name: name.clone() }, None).await {
        if is_duplicate_key_error(&e) {
            return Err(Error::BadRequest(format!("Party list already exists: {name}")));
        }
        return Err(e.into());
    }
    Ok(())
}

/// Delete a party list. Refused while any candidate still references it.
#[delete("/parties/<name>")]
async fn delete_party(
    _token: AuthToken<Admin>,
    name: String,
    parties: Coll<Party>,
    candidates: Coll<Candidate>,
) -> Result<()> {
    let referencing = candidates
        .count_documents(doc! { "party_list": &name }, None)
        .await?;
    if referencing > 0 {
        return Err(Error::Status(
            Status::Conflict,
            format!("Party list '{name}' still has {referencing} candidate(s)"),
        ));
    }

    let result = parties.delete_one(doc! { "name": &name }, None).await?;
    if result.deleted_count == 0 {
        return Err(Error::not_found(format!("Party list '{name}'")));
    }
    Ok(())
}

/// Raw ballot audit listing, paginated.
#[get("/ballots?<pagination..>")]
async fn get_ballots(
    _token: AuthToken<Admin>,
    pagination: PaginationRequest,
    ballots: Coll<Ballot>,
) -> Result<Json<Paginated<BallotReceipt>>> {
    let options = FindOptions::builder()
        .skip(u64::from(pagination.skip()))
        .limit(i64::from(pagination.page_size()))
        .build();

    let page: Vec<BallotReceipt> = ballots
        .find(None, options)
        .await?
        .map_ok(Into::into)
        .try_collect()
        .await?;
    let total = ballots.count_documents(None, None).await?;

    Ok(Json(pagination.to_paginated(total, page)))
}

/// Headline counts for the dashboard.
#[get("/summary")]
async fn get_summary(
    _token: AuthToken<Admin>,
    students: Coll<Student>,
    candidates: Coll<Candidate>,
    parties: Coll<Party>,
    ballots: Coll<Ballot>,
    settings: Coll<ElectionStatus>,
) -> Result<Json<Summary>> {
    let status = settings.find_one(None, None).await?.ok_or_else(|| {
        Error::Status(
            Status::InternalServerError,
            "Election status missing".to_string(),
        )
    })?;

    Ok(Json(Summary {
        students: students.count_documents(None, None).await?,
        candidates: candidates.count_documents(None, None).await?,
        parties: parties.count_documents(None, None).await?,
        ballots_cast: ballots.count_documents(None, None).await?,
        voting_open: status.voting_open,
    }))
}

/// Close the election. Further ballot submissions are rejected until an
/// admin reopens it.
#[post("/election/end")]
async fn end_election(_token: AuthToken<Admin>, settings: Coll<ElectionStatus>) -> Result<()> {
    let update = doc! {
        "$set": {
            "voting_open": false,
            "ended_at": BsonDateTime::now(),
        }
    };
    let result = settings
        .update_one(doc! { "voting_open": true }, update, None)
        .await?;
    if result.modified_count != 1 {
        return Err(Error::Status(
            Status::UnprocessableEntity,
            "Voting has already ended".to_string(),
        ));
    }
    warn!("Election ended; no further ballots will be accepted");
    Ok(())
}

/// Reopen a closed election. Nothing is wiped; cast ballots stand.
#[post("/election/reopen")]
async fn reopen_election(_token: AuthToken<Admin>, settings: Coll<ElectionStatus>) -> Result<()> {
    let update = doc! {
        "$set": {
            "voting_open": true,
            "ended_at": Bson::Null,
        }
    };
    let result = settings
        .update_one(doc! { "voting_open": false }, update, None)
        .await?;
    if result.modified_count != 1 {
        return Err(Error::Status(
            Status::UnprocessableEntity,
            "Voting is already open".to_string(),
        ));
    }
    warn!("Election reopened");
    Ok(())
}

#[get("/admins")]
async fn get_admins(_token: AuthToken<Admin>, admins: Coll<Admin>) -> Result<Json<Vec<String>>> {
    let admin_list: Vec<Admin> = admins.find(None, None).await?.try_collect().await?;
    let admin_names = admin_list
        .into_iter()
        .map(|admin| admin.admin.username)
        .collect();
    Ok(Json(admin_names))
}

#[post("/admins", data = "<new_admin>", format = "json")]
async fn create_admin(
    _token: AuthToken<Admin>,
    new_admin: Json<AdminCredentials>,
    admins: Coll<NewAdmin>,
) -> Result<()> {
    let admin: NewAdmin = new_admin
        .0
        .try_into()
        .map_err(|_| Error::BadRequest("Illegal admin credentials".to_string()))?;

    if let Err(e) = admins.insert_one(&admin, None).await {
        if is_duplicate_key_error(&e) {
            return Err(Error::BadRequest(format!(
                "Admin username already in use: {}",
                admin.username
            )));
        }
        return Err(e.into());
    }
    Ok(())
}

#[delete("/admins", data = "<username>", format = "json")]
async fn delete_admin(
    _token: AuthToken<Admin>,
    username: String,
    admins: Coll<Admin>,
) -> Result<()> {
    // Prevent deleting the last admin.
    let count = admins.count_documents(None, None).await?;
    if count == 1 {
        return Err(Error::Status(
            Status::UnprocessableEntity,
            "Cannot delete last admin!".to_string(),
        ));
    }

    let result = admins.delete_one(doc! { "username": &username }, None).await?;
    if result.deleted_count == 0 {
        Err(Error::not_found(format!("Admin {username}")))
    } else {
        Ok(())
    }
}
