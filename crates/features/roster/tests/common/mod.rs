#![allow(dead_code)]

use hq_database::Database;
use hq_roster::model::{Hero, Power};
use hq_roster::{MIGRATIONS, Repository};

pub const FLIGHT: &str = "gives the wielder the ability to fly through the skies";

/// A fresh in-memory store with the roster schema applied.
pub async fn database() -> Database {
    Database::builder()
        .url("mem://")
        .session("hq", "roster_test")
        .migrations(MIGRATIONS)
        .init()
        .await
        .expect("in-memory database")
}

pub async fn repository() -> Repository {
    Repository::new(database().await)
}

pub async fn hero(repository: &Repository, name: &str, super_name: &str) -> Hero {
    repository.create_hero(name, super_name).await.expect("create hero")
}

pub async fn power(repository: &Repository, name: &str) -> Power {
    repository.create_power(name, FLIGHT).await.expect("create power")
}
