//! Roster entities and their JSON shapes.
//!
//! Everything here is plain data. Loading, validation and persistence live in
//! [`crate::repository`] and [`crate::validation`].

use hq_derive::api_model;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString, VariantNames};

/// Surrogate key assigned by the store on creation.
pub type Id = i64;

#[api_model]
#[derive(Clone, PartialEq, Eq)]
pub struct Hero {
    pub id: Id,
    pub name: String,
    pub super_name: String,
}

#[api_model]
#[derive(Clone, PartialEq, Eq)]
pub struct Power {
    pub id: Id,
    pub name: String,
    /// At least 20 characters.
    pub description: String,
}

/// How strongly a hero wields a power. Serialized with the exact variant names.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    EnumString,
    Display,
    AsRefStr,
    VariantNames,
)]
#[cfg_attr(feature = "server", derive(utoipa::ToSchema))]
pub enum Strength {
    Strong,
    Weak,
    Average,
}

impl Strength {
    pub const ALL: [Self; 3] = [Self::Strong, Self::Weak, Self::Average];
}

/// The association row linking one hero to one power. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeroPower {
    pub id: Id,
    pub hero_id: Id,
    pub power_id: Id,
    pub strength: Strength,
}

impl HeroPower {
    /// Attaches parent summaries; `None` renders as `null`.
    #[must_use]
    pub fn resolve(self, hero: Option<Hero>, power: Option<Power>) -> HeroPowerView {
        HeroPowerView {
            id: self.id,
            hero_id: self.hero_id,
            power_id: self.power_id,
            strength: self.strength,
            hero,
            power,
        }
    }
}

/// A [`HeroPower`] as returned by the API, with both parents embedded.
#[api_model]
#[derive(Clone, PartialEq, Eq)]
pub struct HeroPowerView {
    pub id: Id,
    pub hero_id: Id,
    pub power_id: Id,
    pub strength: Strength,
    pub hero: Option<Hero>,
    pub power: Option<Power>,
}

/// A hero together with its associations, in the order they were created.
#[api_model]
#[derive(Clone, PartialEq, Eq)]
pub struct HeroDetail {
    pub id: Id,
    pub name: String,
    pub super_name: String,
    pub hero_powers: Vec<HeroPowerView>,
}

impl Hero {
    #[must_use]
    pub fn with_powers(self, hero_powers: Vec<HeroPowerView>) -> HeroDetail {
        HeroDetail { id: self.id, name: self.name, super_name: self.super_name, hero_powers }
    }
}

impl HeroDetail {
    /// The powers reached through this hero's associations, each listed once.
    #[must_use]
    pub fn powers(&self) -> Vec<&Power> {
        let mut seen = Vec::with_capacity(self.hero_powers.len());
        self.hero_powers
            .iter()
            .filter_map(|link| link.power.as_ref())
            .filter(|power| {
                let first = !seen.contains(&power.id);
                seen.push(power.id);
                first
            })
            .collect()
    }
}
