//! The only code that reads or writes the roster tables.
//!
//! Reads share a gate; writes hold it exclusively from the parent lookups through the
//! final statement, so existence checks cannot race with a cascading delete and no
//! reader observes half of a write. Inserts allocate their identity inside the `CREATE`
//! itself; cascades run inside a single `BEGIN ... COMMIT` block. Either way a failed write
//! is discarded as a whole.

use crate::error::{RosterError, RosterErrorExt};
use crate::model::{Hero, HeroDetail, HeroPower, HeroPowerView, Id, Power, Strength};
use crate::validation::{validate_description, validate_name, validate_strength};
use hq_database::Database;
use std::collections::HashMap;
use std::sync::Arc;
use surrealdb::types::SurrealValue;
use tokio::sync::RwLock;
use tracing::{debug, info, instrument};

const HERO_FIELDS: &str = "id.id() AS id, name, super_name";
const POWER_FIELDS: &str = "id.id() AS id, name, description";
const LINK_FIELDS: &str = "id.id() AS id, hero_id, power_id, strength";

/// Input for [`Repository::create_hero_power`]. `strength` is validated, not trusted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewHeroPower {
    pub hero_id: Id,
    pub power_id: Id,
    pub strength: String,
}

#[derive(Debug, SurrealValue)]
struct HeroRow {
    id: i64,
    name: String,
    super_name: String,
}

impl From<HeroRow> for Hero {
    fn from(row: HeroRow) -> Self {
        Self { id: row.id, name: row.name, super_name: row.super_name }
    }
}

#[derive(Debug, SurrealValue)]
struct PowerRow {
    id: i64,
    name: String,
    description: String,
}

impl From<PowerRow> for Power {
    fn from(row: PowerRow) -> Self {
        Self { id: row.id, name: row.name, description: row.description }
    }
}

#[derive(Debug, SurrealValue)]
struct LinkRow {
    id: i64,
    hero_id: i64,
    power_id: i64,
    strength: String,
}

impl TryFrom<LinkRow> for HeroPower {
    type Error = RosterError;

    fn try_from(row: LinkRow) -> Result<Self, Self::Error> {
        let strength = row.strength.parse::<Strength>().map_err(|_| RosterError::Internal {
            message: format!("hero_power:{} has unknown strength '{}'", row.id, row.strength).into(),
            context: None,
        })?;
        Ok(Self { id: row.id, hero_id: row.hero_id, power_id: row.power_id, strength })
    }
}

/// Which association column a link query filters on.
#[derive(Debug, Clone, Copy)]
enum LinkColumn {
    Hero,
    Power,
}

impl LinkColumn {
    const fn name(self) -> &'static str {
        match self {
            Self::Hero => "hero_id",
            Self::Power => "power_id",
        }
    }
}

/// Tables whose identities come from `counter:<table>`.
#[derive(Debug, Clone, Copy)]
enum Table {
    Hero,
    Power,
    HeroPower,
}

impl Table {
    const fn name(self) -> &'static str {
        match self {
            Self::Hero => "hero",
            Self::Power => "power",
            Self::HeroPower => "hero_power",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Repository {
    db: Database,
    gate: Arc<RwLock<()>>,
}

impl Repository {
    #[must_use]
    pub fn new(db: Database) -> Self {
        Self { db, gate: Arc::new(RwLock::new(())) }
    }

    // --- Heroes ---

    /// All heroes, ascending by id.
    ///
    /// # Errors
    /// [`RosterError::Persistence`] if the store fails.
    pub async fn list_heroes(&self) -> Result<Vec<Hero>, RosterError> {
        let _read = self.gate.read().await;
        let rows: Vec<HeroRow> = self
            .db
            .query(format!("SELECT {HERO_FIELDS} FROM hero ORDER BY id"))
            .await
            .context("loading heroes")?
            .take(0)
            .context("loading heroes")?;
        Ok(rows.into_iter().map(Hero::from).collect())
    }

    /// # Errors
    /// [`RosterError::NotFound`] (`Hero not found`) or [`RosterError::Persistence`].
    pub async fn get_hero(&self, id: Id) -> Result<Hero, RosterError> {
        let _read = self.gate.read().await;
        self.find_hero(id).await?.ok_or_else(RosterError::hero_not_found)
    }

    /// The hero with every association and both parents of each resolved.
    ///
    /// # Errors
    /// [`RosterError::NotFound`] or [`RosterError::Persistence`].
    pub async fn get_hero_with_powers(&self, id: Id) -> Result<HeroDetail, RosterError> {
        let _read = self.gate.read().await;
        let hero = self.find_hero(id).await?.ok_or_else(RosterError::hero_not_found)?;
        let links = self.links(LinkColumn::Hero, id).await?;
        let powers = self.powers_by_id(links.iter().map(|l| l.power_id).collect()).await?;

        let views = links
            .into_iter()
            .map(|link| {
                let power = powers.get(&link.power_id).cloned();
                link.resolve(Some(hero.clone()), power)
            })
            .collect();
        Ok(hero.with_powers(views))
    }

    /// Powers linked to the hero, in association order, each once.
    ///
    /// # Errors
    /// [`RosterError::NotFound`] if the hero does not exist.
    pub async fn powers_of_hero(&self, id: Id) -> Result<Vec<Power>, RosterError> {
        let _read = self.gate.read().await;
        self.find_hero(id).await?.ok_or_else(RosterError::hero_not_found)?;
        let links = self.links(LinkColumn::Hero, id).await?;
        let order = distinct(links.iter().map(|l| l.power_id));
        let mut powers = self.powers_by_id(order.clone()).await?;
        Ok(order.into_iter().filter_map(|id| powers.remove(&id)).collect())
    }

    /// # Errors
    /// [`RosterError::InvalidValue`] for a blank name or [`RosterError::Persistence`].
    #[instrument(skip(self))]
    pub async fn create_hero(&self, name: &str, super_name: &str) -> Result<Hero, RosterError> {
        let name = validate_name("name", name)?;
        let super_name = validate_name("super_name", super_name)?;

        let _write = self.gate.write().await;
        let id: Option<Id> = self
            .db
            .query(insert_statement(Table::Hero, "name: $name, super_name: $super_name"))
            .bind(("name", name.to_owned()))
            .bind(("super_name", super_name.to_owned()))
            .await
            .context("creating the hero")?
            .take(0)
            .context("creating the hero")?;
        let id = allocated(Table::Hero, id)?;

        debug!(id, "Hero created");
        Ok(Hero { id, name: name.to_owned(), super_name: super_name.to_owned() })
    }

    /// Deletes the hero and all of its associations in one transaction.
    ///
    /// # Errors
    /// [`RosterError::NotFound`] or [`RosterError::Persistence`].
    #[instrument(skip(self))]
    pub async fn delete_hero(&self, id: Id) -> Result<(), RosterError> {
        let _write = self.gate.write().await;
        self.find_hero(id).await?.ok_or_else(RosterError::hero_not_found)?;
        self.cascade_delete(Table::Hero, LinkColumn::Hero, id, "deleting the hero").await?;
        info!(id, "Hero deleted");
        Ok(())
    }

    // --- Powers ---

    /// # Errors
    /// [`RosterError::Persistence`] if the store fails.
    pub async fn list_powers(&self) -> Result<Vec<Power>, RosterError> {
        let _read = self.gate.read().await;
        let rows: Vec<PowerRow> = self
            .db
            .query(format!("SELECT {POWER_FIELDS} FROM power ORDER BY id"))
            .await
            .context("loading powers")?
            .take(0)
            .context("loading powers")?;
        Ok(rows.into_iter().map(Power::from).collect())
    }

    /// # Errors
    /// [`RosterError::NotFound`] (`Power not found`) or [`RosterError::Persistence`].
    pub async fn get_power(&self, id: Id) -> Result<Power, RosterError> {
        let _read = self.gate.read().await;
        self.find_power(id).await?.ok_or_else(RosterError::power_not_found)
    }

    /// Heroes linked to the power, in association order, each once.
    ///
    /// # Errors
    /// [`RosterError::NotFound`] if the power does not exist.
    pub async fn heroes_with_power(&self, id: Id) -> Result<Vec<Hero>, RosterError> {
        let _read = self.gate.read().await;
        self.find_power(id).await?.ok_or_else(RosterError::power_not_found)?;
        let links = self.links(LinkColumn::Power, id).await?;
        let order = distinct(links.iter().map(|l| l.hero_id));
        let mut heroes = self.heroes_by_id(order.clone()).await?;
        Ok(order.into_iter().filter_map(|id| heroes.remove(&id)).collect())
    }

    /// # Errors
    /// [`RosterError::InvalidValue`] for a blank name or a short description.
    #[instrument(skip(self, description))]
    pub async fn create_power(&self, name: &str, description: &str) -> Result<Power, RosterError> {
        let name = validate_name("name", name)?;
        let description = validate_description(description)?;

        let _write = self.gate.write().await;
        let id: Option<Id> = self
            .db
            .query(insert_statement(Table::Power, "name: $name, description: $description"))
            .bind(("name", name.to_owned()))
            .bind(("description", description.to_owned()))
            .await
            .context("creating the power")?
            .take(0)
            .context("creating the power")?;
        let id = allocated(Table::Power, id)?;

        debug!(id, "Power created");
        Ok(Power { id, name: name.to_owned(), description: description.to_owned() })
    }

    /// Replaces the description. Existence is checked before validation; repeating the
    /// same update leaves the same state.
    ///
    /// # Errors
    /// [`RosterError::NotFound`], [`RosterError::InvalidValue`] or [`RosterError::Persistence`].
    #[instrument(skip(self, description))]
    pub async fn update_power(&self, id: Id, description: &str) -> Result<Power, RosterError> {
        let _write = self.gate.write().await;
        let power = self.find_power(id).await?.ok_or_else(RosterError::power_not_found)?;
        let description = validate_description(description)?;

        self.db
            .query("UPDATE power SET description = $description WHERE id.id() = $id RETURN NONE")
            .bind(("id", id))
            .bind(("description", description.to_owned()))
            .await
            .context("updating the power")?
            .check()
            .map_err(surrealdb::Error::from)
            .context("updating the power")?;

        info!(id, "Power description updated");
        Ok(Power { description: description.to_owned(), ..power })
    }

    /// Deletes the power and all of its associations in one transaction.
    ///
    /// # Errors
    /// [`RosterError::NotFound`] or [`RosterError::Persistence`].
    #[instrument(skip(self))]
    pub async fn delete_power(&self, id: Id) -> Result<(), RosterError> {
        let _write = self.gate.write().await;
        self.find_power(id).await?.ok_or_else(RosterError::power_not_found)?;
        self.cascade_delete(Table::Power, LinkColumn::Power, id, "deleting the power").await?;
        info!(id, "Power deleted");
        Ok(())
    }

    // --- Associations ---

    /// Links a hero to a power.
    ///
    /// Checks run in a fixed order: hero exists, power exists, strength is valid.
    ///
    /// # Errors
    /// [`RosterError::NotFound`], [`RosterError::InvalidValue`] or [`RosterError::Persistence`].
    #[instrument(skip(self))]
    pub async fn create_hero_power(&self, new: NewHeroPower) -> Result<HeroPowerView, RosterError> {
        let _write = self.gate.write().await;
        let hero = self.find_hero(new.hero_id).await?.ok_or_else(RosterError::hero_not_found)?;
        let power = self.find_power(new.power_id).await?.ok_or_else(RosterError::power_not_found)?;
        let strength = validate_strength(&new.strength)?;

        let id: Option<Id> = self
            .db
            .query(insert_statement(
                Table::HeroPower,
                "hero_id: $hero_id, power_id: $power_id, strength: $strength",
            ))
            .bind(("hero_id", hero.id))
            .bind(("power_id", power.id))
            .bind(("strength", strength.to_string()))
            .await
            .context("creating the hero power")?
            .take(0)
            .context("creating the hero power")?;
        let id = allocated(Table::HeroPower, id)?;

        debug!(id, hero_id = hero.id, power_id = power.id, %strength, "Hero power created");
        let link = HeroPower { id, hero_id: hero.id, power_id: power.id, strength };
        Ok(link.resolve(Some(hero), Some(power)))
    }

    /// Removes every association, power and hero and restarts the identity counters.
    ///
    /// # Errors
    /// [`RosterError::Persistence`] if the transaction fails.
    #[instrument(skip(self))]
    pub async fn clear(&self) -> Result<(), RosterError> {
        let _write = self.gate.write().await;
        self.db
            .query(
                "BEGIN TRANSACTION;
                DELETE hero_power;
                DELETE power;
                DELETE hero;
                DELETE counter:hero, counter:power, counter:hero_power;
                COMMIT TRANSACTION;",
            )
            .await
            .context("clearing the roster")?
            .check()
            .map_err(surrealdb::Error::from)
            .context("clearing the roster")?;

        info!("Roster cleared");
        Ok(())
    }

    // --- Unlocked helpers; callers hold the gate ---

    async fn find_hero(&self, id: Id) -> Result<Option<Hero>, RosterError> {
        let rows: Vec<HeroRow> = self
            .db
            .query(format!("SELECT {HERO_FIELDS} FROM hero WHERE id.id() = $id"))
            .bind(("id", id))
            .await
            .context("loading the hero")?
            .take(0)
            .context("loading the hero")?;
        Ok(rows.into_iter().next().map(Hero::from))
    }

    async fn find_power(&self, id: Id) -> Result<Option<Power>, RosterError> {
        let rows: Vec<PowerRow> = self
            .db
            .query(format!("SELECT {POWER_FIELDS} FROM power WHERE id.id() = $id"))
            .bind(("id", id))
            .await
            .context("loading the power")?
            .take(0)
            .context("loading the power")?;
        Ok(rows.into_iter().next().map(Power::from))
    }

    async fn heroes_by_id(&self, ids: Vec<Id>) -> Result<HashMap<Id, Hero>, RosterError> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let rows: Vec<HeroRow> = self
            .db
            .query(format!("SELECT {HERO_FIELDS} FROM hero WHERE id.id() IN $ids"))
            .bind(("ids", ids))
            .await
            .context("loading heroes")?
            .take(0)
            .context("loading heroes")?;
        Ok(rows.into_iter().map(|row| (row.id, Hero::from(row))).collect())
    }

    async fn powers_by_id(&self, ids: Vec<Id>) -> Result<HashMap<Id, Power>, RosterError> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let rows: Vec<PowerRow> = self
            .db
            .query(format!("SELECT {POWER_FIELDS} FROM power WHERE id.id() IN $ids"))
            .bind(("ids", ids))
            .await
            .context("loading powers")?
            .take(0)
            .context("loading powers")?;
        Ok(rows.into_iter().map(|row| (row.id, Power::from(row))).collect())
    }

    /// Associations of one parent, ascending by id (creation order).
    async fn links(&self, column: LinkColumn, id: Id) -> Result<Vec<HeroPower>, RosterError> {
        let rows: Vec<LinkRow> = self
            .db
            .query(format!(
                "SELECT {LINK_FIELDS} FROM hero_power WHERE {} = $id ORDER BY id",
                column.name()
            ))
            .bind(("id", id))
            .await
            .context("loading hero powers")?
            .take(0)
            .context("loading hero powers")?;
        rows.into_iter().map(HeroPower::try_from).collect()
    }

    async fn cascade_delete(
        &self,
        table: Table,
        column: LinkColumn,
        id: Id,
        action: &'static str,
    ) -> Result<(), RosterError> {
        self.db
            .query(format!(
                "BEGIN TRANSACTION;
                DELETE hero_power WHERE {column} = $id;
                DELETE {table} WHERE id.id() = $id;
                COMMIT TRANSACTION;",
                column = column.name(),
                table = table.name(),
            ))
            .bind(("id", id))
            .await
            .context(action)?
            .check()
            .map_err(surrealdb::Error::from)
            .context(action)?;
        Ok(())
    }
}

/// One `CREATE` whose identity is the next value of `counter:<table>`.
///
/// The counter bump is a subquery of the same statement, so the store commits both or
/// neither and a rejected row never consumes an identity.
fn insert_statement(table: Table, fields: &str) -> String {
    let table = table.name();
    format!(
        "CREATE ONLY {table} CONTENT {{ \
         id: (UPSERT ONLY counter:{table} SET last = (last ?? 0) + 1 RETURN VALUE last), \
         {fields} }} RETURN VALUE id.id()"
    )
}

fn allocated(table: Table, id: Option<Id>) -> Result<Id, RosterError> {
    id.ok_or_else(|| RosterError::Internal {
        message: format!("{} insert returned no identity", table.name()).into(),
        context: Some("allocating an identity".into()),
    })
}

/// First occurrence of each id, in input order.
fn distinct(ids: impl Iterator<Item = Id>) -> Vec<Id> {
    let mut out: Vec<Id> = Vec::new();
    for id in ids {
        if !out.contains(&id) {
            out.push(id);
        }
    }
    out
}
