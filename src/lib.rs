#[macro_use]
extern crate rocket;

#[macro_use]
extern crate log;

#[cfg(test)]
#[macro_use]
extern crate backend_test;

pub mod api;
pub mod config;
pub mod error;
pub mod logging;
pub mod model;
pub mod tally;

use rocket::{Build, Rocket};

use crate::config::{ConfigFairing, DatabaseFairing};
use crate::logging::LoggerFairing;

/// Assemble the server: logging, config, database, and all routes.
pub fn build() -> Rocket<Build> {
    rocket::build()
        .attach(LoggerFairing)
        .attach(ConfigFairing)
        .attach(DatabaseFairing)
        .mount("/", api::routes())
}

/// Get a database client for testing, using the configured `db_uri`.
#[cfg(test)]
pub(crate) async fn db_client() -> mongodb::Client {
    let db_uri = rocket::Config::figment()
        .extract_inner::<String>("db_uri")
        .expect("`db_uri` not set");
    mongodb::Client::with_uri_str(&db_uri)
        .await
        .expect("Failed to connect to database")
}

/// Get a random database name for testing, to avoid collisions.
#[cfg(test)]
pub(crate) fn database() -> String {
    let random: u32 = rand::random();
    format!("test{random}")
}

/// Build a test rocket against the given database, with the same indexes
/// and bootstrap documents the `DatabaseFairing` would create.
#[cfg(test)]
pub(crate) async fn rocket_for_db(client: mongodb::Client, db_name: &str) -> Rocket<Build> {
    use crate::model::{
        db::{admin::ensure_admin_exists, election_status::ensure_election_status_exists},
        mongodb::{ensure_indexes_exist, Coll},
    };

    log4rs_test_utils::test_logging::init_logging_once_for(["scivote_backend"], None, None);

    let config = rocket::Config::figment()
        .extract::<crate::config::Config>()
        .expect("Invalid application config");
    let db = client.database(db_name);
    ensure_indexes_exist(&db).await.expect("Failed to create indexes");
    ensure_admin_exists(&Coll::from_db(&db), &config)
        .await
        .expect("Failed to bootstrap default admin");
    ensure_election_status_exists(&Coll::from_db(&db))
        .await
        .expect("Failed to bootstrap election status");

    rocket::build()
        .attach(LoggerFairing)
        .attach(ConfigFairing)
        .mount("/", api::routes())
        .manage(client)
        .manage(db)
}
