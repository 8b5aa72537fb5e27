use mongodb::bson::doc;
use rocket::{
    http::{Cookie, CookieJar, Status},
    serde::json::Json,
    Route, State,
};

use crate::{
    config::Config,
    error::{Error, Result},
    model::{
        api::{
            admin::AdminCredentials,
            auth::{AuthToken, StudentLoginRequest, AUTH_TOKEN_COOKIE},
            student::StudentDescription,
        },
        db::{admin::Admin, student::Student},
        mongodb::Coll,
    },
};

pub fn routes() -> Vec<Route> {
    routes![admin_login, student_login, logout]
}

#[post("/auth/admin", data = "<credentials>", format = "json")]
pub async fn admin_login(
    cookies: &CookieJar<'_>,
    credentials: Json<AdminCredentials>,
    admins: Coll<Admin>,
    config: &State<Config>,
) -> Result<()> {
    let with_username = doc! {
        "username": &credentials.username,
    };

    let admin = admins
        .find_one(with_username, None)
        .await?
        .filter(|admin| admin.verify_password(&credentials.password))
        .ok_or_else(|| {
            Error::Unauthorized(
                "No admin found with the provided username and password combination.".to_string(),
            )
        })?;

    let token = AuthToken::new(&admin);
    cookies.add(token.into_cookie(config));

    Ok(())
}

/// Student sign-in is a school-ID lookup: the kiosk submits the ID typed or
/// scanned at the login screen, and gets the student's details back for the
/// greeting screen.
#[post("/auth/student", data = "<request>", format = "json")]
pub async fn student_login(
    cookies: &CookieJar<'_>,
    request: Json<StudentLoginRequest>,
    students: Coll<Student>,
    config: &State<Config>,
) -> Result<Json<StudentDescription>> {
    let school_id = request.school_id.trim();
    let with_school_id = doc! {
        "school_id": school_id,
    };

    let student = students
        .find_one(with_school_id, None)
        .await?
        .ok_or_else(|| Error::not_found(format!("Student with school ID '{school_id}'")))?;

    let token = AuthToken::new(&student);
    cookies.add(token.into_cookie(config));

    Ok(Json(student.into()))
}

#[delete("/auth")]
pub fn logout(cookies: &CookieJar) -> Status {
    cookies.remove(Cookie::named(AUTH_TOKEN_COOKIE));
    Status::Ok
}
