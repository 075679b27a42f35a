//! Commander profile document.
//!
//! The profile is a snapshot of the account at fetch time: commander and
//! ranks, owned ships, the current ship, and the last system and starport
//! visited including its commodity market. Missing fields decode to their
//! defaults. Fields the service sends as either strings or numbers go
//! through [`scalar`](crate::scalar).
use std::collections::BTreeMap;

use serde::Deserialize;

use crate::errors::ClientError;
use crate::net::SessionClient;
use crate::scalar;

pub const PROFILE_PATH: &str = "/profile";

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Rank {
    pub combat: i64,
    pub trade: i64,
    pub explore: i64,
    pub crime: i64,
    pub service: i64,
    pub empire: i64,
    pub federation: i64,
    pub power: i64,
    pub cqc: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Commander {
    pub name: String,
    pub id: i64,
    pub credits: i64,
    pub debt: i64,
    pub current_ship_id: i64,
    pub alive: bool,
    pub docked: bool,
    pub rank: Rank,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Starsystem {
    #[serde(rename = "systemaddress")]
    pub system_address: i64,
    pub name: String,
    pub id: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Station {
    pub name: String,
    pub id: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ShipValue {
    pub cargo: i64,
    pub modules: i64,
    pub unloaned: i64,
    pub hull: i64,
    pub total: i64,
}

/// A ship in the commander's fleet.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Ship {
    pub name: String,
    pub id: i64,
    pub free: bool,
    pub station: Station,
    pub value: ShipValue,
    pub starsystem: Starsystem,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ShipHealth {
    #[serde(rename = "shieldup")]
    pub shield_up: bool,
    pub shield: i64,
    pub hull: i64,
    pub integrity: i64,
    pub paintwork: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Module {
    pub name: String,
    pub id: i64,
    pub on: bool,
    pub health: i64,
    pub value: i64,
    pub free: bool,
    pub priority: i64,
}

/// The ship the commander is flying.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CurrentShip {
    pub name: String,
    pub id: i64,
    pub starsystem: Starsystem,
    pub free: bool,
    pub oxygen_remaining: i64,
    pub health: ShipHealth,
    pub value: ShipValue,
    pub alive: bool,
    pub cockpit_breached: bool,
    pub station: Station,
    /// Keyed by slot name (`"Armour"`, `"MediumHardpoint1"`, ...)
    pub modules: BTreeMap<String, Module>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct LastSystem {
    pub name: String,
    #[serde(deserialize_with = "scalar::int")]
    pub id: i64,
    pub faction: String,
}

/// A module offered by the outfitting service of a starport.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct SaleModule {
    pub name: String,
    pub id: i64,
    pub category: String,
    pub cost: i64,
    pub sku: Option<String>,
}

/// One row of a starport's commodity market.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Commodity {
    pub name: String,
    #[serde(deserialize_with = "scalar::int")]
    pub id: i64,
    pub sell_price: i64,
    pub buy_price: i64,
    pub capacity: i64,
    pub demand: i64,
    pub stock: i64,

    #[serde(rename = "sec_illegal_min", deserialize_with = "scalar::float")]
    pub sec_illegal_min: f64,
    #[serde(rename = "sec_illegal_max", deserialize_with = "scalar::float")]
    pub sec_illegal_max: f64,
    #[serde(rename = "cost_min", deserialize_with = "scalar::float")]
    pub cost_min: f64,
    #[serde(rename = "cost_mean", deserialize_with = "scalar::float")]
    pub cost_mean: f64,
    #[serde(rename = "cost_max", deserialize_with = "scalar::float")]
    pub cost_max: f64,
    #[serde(rename = "categoryname")]
    pub category_name: String,
    pub demand_bracket: i64,
    pub status_flags: Vec<String>,
    pub target_stock: i64,
    pub base_consumption_qty: f64,
    pub consumption_qty: i64,
    pub base_creation_qty: f64,
    pub creation_qty: i64,
    #[serde(rename = "consumebuy", deserialize_with = "scalar::int")]
    pub consume_buy: i64,
    #[serde(rename = "homebuy", deserialize_with = "scalar::int")]
    pub home_buy: i64,
    #[serde(rename = "homesell", deserialize_with = "scalar::int")]
    pub home_sell: i64,
    #[serde(rename = "stolenmod", deserialize_with = "scalar::float")]
    pub stolen_mod: f64,
    #[serde(rename = "rare_min_stock", deserialize_with = "scalar::int")]
    pub rare_min_stock: i64,
    #[serde(rename = "rare_max_stock", deserialize_with = "scalar::int")]
    pub rare_max_stock: i64,
    #[serde(rename = "volumescale", deserialize_with = "scalar::float")]
    pub volume_scale: f64,
    pub stock_bracket: i64,
    #[serde(rename = "market_id")]
    pub market_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct LastStarport {
    pub name: String,
    #[serde(deserialize_with = "scalar::int")]
    pub id: i64,
    pub faction: String,
    pub modules: BTreeMap<String, SaleModule>,
    /// Market rows in the order the server listed them
    pub commodities: Vec<Commodity>,
}

/// The full profile document.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Profile {
    pub commander: Commander,
    pub last_system: LastSystem,
    pub last_starport: LastStarport,
    /// Owned ships by fleet slot. The service keys the object with
    /// string-encoded integers (`"0"`, `"1"`, ...).
    pub ships: BTreeMap<i64, Ship>,
    pub ship: CurrentShip,
}

/// Fetches and decodes the profile document.
pub async fn fetch_profile(session: &SessionClient) -> Result<Profile, ClientError> {
    let profile: Profile = session.get_json(PROFILE_PATH).await?;
    log::info!(
        "Fetched profile for {} ({} ship(s), {} commodities at {})",
        profile.commander.name,
        profile.ships.len(),
        profile.last_starport.commodities.len(),
        profile.last_starport.name
    );
    Ok(profile)
}
