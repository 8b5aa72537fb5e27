use mongodb::bson::doc;

use crate::error::{Error, Result};
use crate::model::{api::auth::AuthToken, db::student::Student, mongodb::Coll};

/// Look up the student record behind an auth token.
pub async fn student_by_token(
    token: &AuthToken<Student>,
    students: &Coll<Student>,
) -> Result<Student> {
    students
        .find_one(token.id.as_doc(), None)
        .await?
        .ok_or_else(|| Error::not_found(format!("Student with ID {}", token.id)))
}
