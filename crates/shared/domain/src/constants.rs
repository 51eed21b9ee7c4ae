//! `OpenAPI` tags shared by the feature routers and the document builder.

pub const SYSTEM_TAG: &str = "System";
pub const HEROES_TAG: &str = "Heroes";
pub const POWERS_TAG: &str = "Powers";
pub const HERO_POWERS_TAG: &str = "Hero Powers";
pub const NOTIFICATIONS_TAG: &str = "Notifications";
