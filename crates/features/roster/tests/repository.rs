mod common;

use common::{FLIGHT, database, hero, power, repository};
use hq_roster::Repository;
use hq_roster::model::Strength;
use hq_roster::{NewHeroPower, RosterError};

fn link(hero_id: i64, power_id: i64, strength: &str) -> NewHeroPower {
    NewHeroPower { hero_id, power_id, strength: strength.to_owned() }
}

#[tokio::test]
async fn identities_are_ascending_and_lists_are_ordered() {
    let repo = repository().await;
    let first = hero(&repo, "Kamala Khan", "Ms. Marvel").await;
    let second = hero(&repo, "Doreen Green", "Squirrel Girl").await;
    assert!(second.id > first.id);

    let heroes = repo.list_heroes().await.expect("list heroes");
    assert_eq!(heroes, vec![first.clone(), second]);
    assert_eq!(repo.get_hero(first.id).await.expect("get hero"), first);
}

#[tokio::test]
async fn missing_entities_are_not_found() {
    let repo = repository().await;

    let err = repo.get_hero(42).await.unwrap_err();
    assert_eq!(err.to_string(), "Hero not found");
    let err = repo.get_power(42).await.unwrap_err();
    assert_eq!(err.to_string(), "Power not found");
    assert!(repo.get_hero_with_powers(42).await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn create_hero_power_checks_hero_then_power_then_strength() {
    let repo = repository().await;
    let storm = hero(&repo, "Ororo Munroe", "Storm").await;
    let flight = power(&repo, "flight").await;

    let err = repo.create_hero_power(link(999, 999, "Invalid")).await.unwrap_err();
    assert_eq!(err.to_string(), "Hero not found");

    let err = repo.create_hero_power(link(storm.id, 999, "Invalid")).await.unwrap_err();
    assert_eq!(err.to_string(), "Power not found");

    let err = repo.create_hero_power(link(storm.id, flight.id, "Invalid")).await.unwrap_err();
    assert!(matches!(err, RosterError::InvalidValue { .. }));

    let view = repo.create_hero_power(link(storm.id, flight.id, "Average")).await.expect("link");
    assert_eq!(view.strength, Strength::Average);
    assert_eq!(view.hero.as_ref(), Some(&storm));
    assert_eq!(view.power.as_ref(), Some(&flight));

    let detail = repo.get_hero_with_powers(storm.id).await.expect("detail");
    assert_eq!(detail.hero_powers, vec![view]);
}

#[tokio::test]
async fn rejected_writes_leave_no_rows() {
    let repo = repository().await;
    let storm = hero(&repo, "Ororo Munroe", "Storm").await;
    let flight = power(&repo, "flight").await;

    assert!(repo.create_hero_power(link(storm.id, flight.id, "strong")).await.is_err());
    assert!(repo.create_power("blank", "Too short").await.is_err());
    assert!(repo.create_hero(" ", "Nobody").await.is_err());

    assert!(repo.get_hero_with_powers(storm.id).await.expect("detail").hero_powers.is_empty());
    assert_eq!(repo.list_powers().await.expect("powers").len(), 1);
    assert_eq!(repo.list_heroes().await.expect("heroes").len(), 1);
}

#[tokio::test]
async fn update_power_validates_and_is_idempotent() {
    let repo = repository().await;
    let flight = power(&repo, "flight").await;

    let err = repo.update_power(flight.id, "Too short").await.unwrap_err();
    assert_eq!(err.to_string(), "Description must be at least 20 characters long");
    assert_eq!(repo.get_power(flight.id).await.expect("power").description, FLIGHT);

    let description = "Updated description with more than twenty characters";
    let once = repo.update_power(flight.id, description).await.expect("first update");
    let twice = repo.update_power(flight.id, description).await.expect("second update");
    assert_eq!(once, twice);
    assert_eq!(repo.get_power(flight.id).await.expect("power"), once);

    let err = repo.update_power(999, "Too short").await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn projections_follow_link_order_without_duplicates() {
    let repo = repository().await;
    let jean = hero(&repo, "Jean Grey", "Dark Phoenix").await;
    let kitty = hero(&repo, "Kitty Pryde", "Shadowcat").await;
    let flight = power(&repo, "flight").await;
    let senses = power(&repo, "super human senses").await;

    for (h, p, s) in [
        (jean.id, senses.id, "Strong"),
        (jean.id, flight.id, "Weak"),
        (jean.id, senses.id, "Average"),
        (kitty.id, senses.id, "Weak"),
    ] {
        repo.create_hero_power(link(h, p, s)).await.expect("link");
    }

    let powers = repo.powers_of_hero(jean.id).await.expect("powers of jean");
    assert_eq!(powers, vec![senses.clone(), flight.clone()]);

    let heroes = repo.heroes_with_power(senses.id).await.expect("heroes with senses");
    assert_eq!(heroes, vec![jean.clone(), kitty]);

    let detail = repo.get_hero_with_powers(jean.id).await.expect("detail");
    assert_eq!(detail.hero_powers.len(), 3);
    assert_eq!(detail.powers(), vec![&senses, &flight]);
}

#[tokio::test]
async fn deleting_a_parent_cascades_to_its_links() {
    let repo = repository().await;
    let wanda = hero(&repo, "Wanda Maximoff", "Scarlet Witch").await;
    let carol = hero(&repo, "Carol Danvers", "Captain Marvel").await;
    let flight = power(&repo, "flight").await;
    let senses = power(&repo, "super human senses").await;

    repo.create_hero_power(link(wanda.id, flight.id, "Strong")).await.expect("link");
    repo.create_hero_power(link(carol.id, flight.id, "Strong")).await.expect("link");
    repo.create_hero_power(link(carol.id, senses.id, "Weak")).await.expect("link");

    repo.delete_hero(wanda.id).await.expect("delete hero");
    assert!(repo.get_hero(wanda.id).await.unwrap_err().is_not_found());
    assert_eq!(repo.heroes_with_power(flight.id).await.expect("heroes"), vec![carol.clone()]);

    repo.delete_power(flight.id).await.expect("delete power");
    assert!(repo.heroes_with_power(flight.id).await.unwrap_err().is_not_found());
    assert_eq!(repo.powers_of_hero(carol.id).await.expect("powers"), vec![senses]);

    assert!(repo.delete_hero(wanda.id).await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn clear_restarts_identities() {
    let repo = repository().await;
    let first = hero(&repo, "Gwen Stacy", "Spider-Gwen").await;
    hero(&repo, "Janet Van Dyne", "The Wasp").await;

    repo.clear().await.expect("clear");
    assert!(repo.list_heroes().await.expect("heroes").is_empty());

    let again = hero(&repo, "Gwen Stacy", "Spider-Gwen").await;
    assert_eq!(again.id, first.id);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_creates_get_distinct_identities() {
    let repo = repository().await;
    let storm = hero(&repo, "Ororo Munroe", "Storm").await;
    let flight = power(&repo, "flight").await;

    let tasks: Vec<_> = (0..16)
        .map(|_| {
            let repo = repo.clone();
            tokio::spawn(async move { repo.create_hero_power(link(storm.id, flight.id, "Weak")).await })
        })
        .collect();

    let mut ids = Vec::new();
    for task in tasks {
        ids.push(task.await.expect("join").expect("link").id);
    }
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), 16);

    let detail = repo.get_hero_with_powers(storm.id).await.expect("detail");
    assert_eq!(detail.hero_powers.len(), 16);
}

#[tokio::test]
async fn rejected_insert_consumes_no_identity() {
    let db = database().await;
    db.query("DEFINE FIELD OVERWRITE super_name ON hero TYPE string ASSERT $value != 'Rejected';")
        .await
        .expect("define")
        .check()
        .expect("assertion installed");
    let repo = Repository::new(db.clone());

    let first = hero(&repo, "Kamala Khan", "Ms. Marvel").await;
    let err = repo.create_hero("Nobody", "Rejected").await.unwrap_err();
    assert!(matches!(err, RosterError::Persistence { .. }));

    let last: Option<i64> = db
        .query("SELECT VALUE last FROM ONLY counter:hero")
        .await
        .expect("counter query")
        .take(0)
        .expect("counter value");
    assert_eq!(last, Some(first.id));

    let second = hero(&repo, "Doreen Green", "Squirrel Girl").await;
    assert_eq!(second.id, first.id + 1);
    assert_eq!(repo.list_heroes().await.expect("heroes"), vec![first, second]);
}

#[tokio::test]
async fn rejected_link_leaves_parents_unlinked() {
    let db = database().await;
    db.query("DEFINE FIELD OVERWRITE strength ON hero_power TYPE string ASSERT $value != 'Weak';")
        .await
        .expect("define")
        .check()
        .expect("assertion installed");
    let repo = Repository::new(db);
    let storm = hero(&repo, "Ororo Munroe", "Storm").await;
    let flight = power(&repo, "flight").await;

    let err = repo.create_hero_power(link(storm.id, flight.id, "Weak")).await.unwrap_err();
    assert!(matches!(err, RosterError::Persistence { .. }));
    assert!(repo.get_hero_with_powers(storm.id).await.expect("detail").hero_powers.is_empty());

    let view = repo.create_hero_power(link(storm.id, flight.id, "Strong")).await.expect("link");
    assert_eq!(view.id, 1);
}
