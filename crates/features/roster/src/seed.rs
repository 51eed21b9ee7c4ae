//! The canonical demo roster, loaded on start when `seed.enabled` is set.

use crate::error::RosterError;
use crate::model::{Id, Strength};
use crate::repository::{NewHeroPower, Repository};
use rand::seq::IndexedRandom;
use tracing::info;

pub const POWERS: [(&str, &str); 4] = [
    ("super strength", "gives the wielder super-human strengths"),
    ("flight", "gives the wielder the ability to fly through the skies at supersonic speed"),
    ("super human senses", "allows the wielder to use her senses at a super-human level"),
    ("elasticity", "can stretch the human body to extreme lengths"),
];

pub const HEROES: [(&str, &str); 10] = [
    ("Kamala Khan", "Ms. Marvel"),
    ("Doreen Green", "Squirrel Girl"),
    ("Gwen Stacy", "Spider-Gwen"),
    ("Janet Van Dyne", "The Wasp"),
    ("Wanda Maximoff", "Scarlet Witch"),
    ("Carol Danvers", "Captain Marvel"),
    ("Jean Grey", "Dark Phoenix"),
    ("Ororo Munroe", "Storm"),
    ("Kitty Pryde", "Shadowcat"),
    ("Elektra Natchios", "Elektra"),
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub heroes: usize,
    pub powers: usize,
    pub hero_powers: usize,
}

/// Replaces the roster with [`POWERS`], [`HEROES`] and one random association per hero.
///
/// Every row goes through the repository, so the usual validation applies.
///
/// # Errors
/// Any [`RosterError`] raised while clearing or inserting.
pub async fn seed(repository: &Repository) -> Result<SeedReport, RosterError> {
    info!("Clearing roster before seeding");
    repository.clear().await?;

    let mut power_ids: Vec<Id> = Vec::with_capacity(POWERS.len());
    for (name, description) in POWERS {
        power_ids.push(repository.create_power(name, description).await?.id);
    }

    let mut hero_ids: Vec<Id> = Vec::with_capacity(HEROES.len());
    for (name, super_name) in HEROES {
        hero_ids.push(repository.create_hero(name, super_name).await?.id);
    }

    let links: Vec<NewHeroPower> = {
        let mut rng = rand::rng();
        hero_ids
            .iter()
            .filter_map(|&hero_id| {
                let power_id = *power_ids.choose(&mut rng)?;
                let strength = Strength::ALL.choose(&mut rng)?;
                Some(NewHeroPower { hero_id, power_id, strength: strength.to_string() })
            })
            .collect()
    };

    for link in &links {
        repository.create_hero_power(link.clone()).await?;
    }

    let report =
        SeedReport { heroes: hero_ids.len(), powers: power_ids.len(), hero_powers: links.len() };
    info!(heroes = report.heroes, powers = report.powers, hero_powers = report.hero_powers, "Roster seeded");
    Ok(report)
}
