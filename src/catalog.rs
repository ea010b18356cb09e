//! Upgrade catalog: definitions from the remote source, renamed from the
//! fixed name table, with per-upgrade saved records overlaid on top.

use std::collections::HashSet;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::CatalogLoadError;
use crate::hobbits::state::{Upgrade, UpgradeState};
use crate::storage::KeyValueStore;

/// Display names, assigned by catalog position. The remote names are discarded.
pub const NAME_TABLE: [&str; 10] = [
    "Hobbit Hole",
    "Peace and Quiet",
    "Good Tilled Earth",
    "Pint of Ale",
    "Old Toby",
    "Bakery",
    "Gandalf's Fireworks",
    "Brewery",
    "Inn",
    "111tieth Birthday Party",
];

/// Bundled copy of the remote catalog, used when the fetch fails.
pub const BUILTIN_CATALOG: &str = include_str!("data/default_catalog.json");

/// Wire shape of one remote entry. Unknown fields are ignored.
#[derive(Debug, Deserialize)]
struct RemoteUpgrade {
    id: u32,
    #[serde(default)]
    name: String,
    cost: u64,
    increase: u64,
}

/// One purchasable upgrade. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpgradeDefinition {
    pub id: u32,
    pub name: String,
    pub base_cost: u64,
    /// Added to the per-second rate for every unit bought.
    pub increment: u64,
    /// The opening upgrade is bought silently; every other one has a cue.
    pub has_sound: bool,
}

/// Per-upgrade save record, stored under the upgrade's display name.
///
/// Older saves wrote `owned` as a string, so both forms are accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpgradeRecord {
    #[serde(default)]
    pub id: u32,
    pub cost_next: u64,
    #[serde(deserialize_with = "number_or_string")]
    pub owned: u64,
}

fn number_or_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(u64),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Number(n) => Ok(n),
        Raw::Text(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}

/// Parse a catalog document and assign display names.
pub fn parse_catalog(json: &str) -> Result<Vec<UpgradeDefinition>, CatalogLoadError> {
    let entries: Vec<RemoteUpgrade> = serde_json::from_str(json)?;
    let mut seen = HashSet::new();
    let mut defs = Vec::with_capacity(entries.len());

    for (i, entry) in entries.into_iter().enumerate() {
        if entry.cost == 0 {
            return Err(CatalogLoadError::Invalid(format!(
                "upgrade {} has zero cost",
                entry.id
            )));
        }
        if entry.increase == 0 {
            return Err(CatalogLoadError::Invalid(format!(
                "upgrade {} has zero increase",
                entry.id
            )));
        }
        if !seen.insert(entry.id) {
            return Err(CatalogLoadError::Invalid(format!(
                "duplicate upgrade id {}",
                entry.id
            )));
        }
        let name = match NAME_TABLE.get(i) {
            Some(name) => (*name).to_string(),
            None => entry.name,
        };
        defs.push(UpgradeDefinition {
            id: entry.id,
            name,
            base_cost: entry.cost,
            increment: entry.increase,
            has_sound: i > 0,
        });
    }

    Ok(defs)
}

/// The bundled catalog. Empty if the bundled file fails to parse, which
/// leaves the game playable with clicks only.
pub fn builtin_catalog() -> Vec<UpgradeDefinition> {
    parse_catalog(BUILTIN_CATALOG).unwrap_or_else(|err| {
        log::error!("bundled catalog is unusable: {err}");
        Vec::new()
    })
}

/// Fetch and parse the remote catalog.
pub async fn load_remote(url: &str, timeout_ms: u32) -> Result<Vec<UpgradeDefinition>, CatalogLoadError> {
    let body = crate::fetch::fetch_text(url, timeout_ms).await?;
    parse_catalog(&body)
}

/// Build live upgrades from definitions, restoring any saved records.
///
/// Every upgrade starts locked except the first; unlocks are recomputed by
/// the progression rules, not saved.
pub fn overlay_saved<S: KeyValueStore>(defs: Vec<UpgradeDefinition>, store: &S) -> Vec<Upgrade> {
    defs.into_iter()
        .enumerate()
        .map(|(i, def)| {
            let mut state = UpgradeState::fresh(&def, i);
            if let Some(record) = read_record(store, &def.name) {
                if record.id != def.id {
                    log::debug!(
                        "record for {:?} has id {} but catalog says {}",
                        def.name,
                        record.id,
                        def.id
                    );
                }
                if record.cost_next < def.base_cost {
                    log::warn!(
                        "saved price {} for {:?} is below its base price, using {}",
                        record.cost_next,
                        def.name,
                        def.base_cost
                    );
                }
                state.owned = record.owned;
                state.next_cost = record.cost_next.max(def.base_cost);
            }
            Upgrade { def, state }
        })
        .collect()
}

fn read_record<S: KeyValueStore>(store: &S, name: &str) -> Option<UpgradeRecord> {
    let raw = store.get(name)?;
    match serde_json::from_str(&raw) {
        Ok(record) => Some(record),
        Err(err) => {
            log::warn!("discarding unreadable save for {name:?}: {err}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    const TWO: &str = r#"[
        { "id": 1, "name": "Auto-Clicker", "cost": 10, "increase": 1 },
        { "id": 2, "name": "Enhanced Oven", "cost": 50, "increase": 2 }
    ]"#;

    #[test]
    fn names_come_from_the_table() {
        let defs = parse_catalog(TWO).unwrap();
        assert_eq!(defs.len(), 2);
        assert_eq!(defs[0].name, "Hobbit Hole");
        assert_eq!(defs[1].name, "Peace and Quiet");
        assert_eq!(defs[1].base_cost, 50);
        assert_eq!(defs[1].increment, 2);
    }

    #[test]
    fn only_the_first_upgrade_is_silent() {
        let defs = parse_catalog(TWO).unwrap();
        assert!(!defs[0].has_sound);
        assert!(defs[1].has_sound);
    }

    #[test]
    fn entries_beyond_the_table_keep_remote_names() {
        let json: String = format!(
            "[{}]",
            (1..=11)
                .map(|i| format!(r#"{{"id":{i},"name":"Extra {i}","cost":{i},"increase":1}}"#))
                .collect::<Vec<_>>()
                .join(",")
        );
        let defs = parse_catalog(&json).unwrap();
        assert_eq!(defs[9].name, "111tieth Birthday Party");
        assert_eq!(defs[10].name, "Extra 11");
    }

    #[test]
    fn builtin_catalog_has_ten_upgrades() {
        let defs = builtin_catalog();
        assert_eq!(defs.len(), 10);
        assert_eq!(defs[0].base_cost, 100);
        assert_eq!(defs[9].name, "111tieth Birthday Party");
    }

    #[test]
    fn malformed_json_is_rejected() {
        assert!(matches!(
            parse_catalog("<html>502</html>"),
            Err(CatalogLoadError::Malformed(_))
        ));
        assert!(matches!(
            parse_catalog(r#"{"upgrades": []}"#),
            Err(CatalogLoadError::Malformed(_))
        ));
        assert!(matches!(
            parse_catalog(r#"[{"id": 1, "cost": 10}]"#),
            Err(CatalogLoadError::Malformed(_))
        ));
    }

    #[test]
    fn zero_cost_or_increase_is_rejected() {
        assert!(matches!(
            parse_catalog(r#"[{"id": 1, "cost": 0, "increase": 1}]"#),
            Err(CatalogLoadError::Invalid(_))
        ));
        assert!(matches!(
            parse_catalog(r#"[{"id": 1, "cost": 5, "increase": 0}]"#),
            Err(CatalogLoadError::Invalid(_))
        ));
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let json = r#"[
            {"id": 1, "cost": 5, "increase": 1},
            {"id": 1, "cost": 9, "increase": 2}
        ]"#;
        assert!(matches!(parse_catalog(json), Err(CatalogLoadError::Invalid(_))));
    }

    #[test]
    fn empty_catalog_is_fine() {
        assert!(parse_catalog("[]").unwrap().is_empty());
    }

    #[test]
    fn overlay_without_saves_uses_defaults() {
        let store = MemoryStore::new();
        let upgrades = overlay_saved(parse_catalog(TWO).unwrap(), &store);
        assert_eq!(upgrades[0].state.owned, 0);
        assert_eq!(upgrades[0].state.next_cost, 10);
        assert!(upgrades[0].state.unlocked);
        assert_eq!(upgrades[1].state.next_cost, 50);
        assert!(!upgrades[1].state.unlocked);
    }

    #[test]
    fn overlay_restores_saved_record() {
        let mut store = MemoryStore::new();
        store
            .set("Peace and Quiet", r#"{"id":2,"costNext":150,"owned":2}"#)
            .unwrap();
        let upgrades = overlay_saved(parse_catalog(TWO).unwrap(), &store);
        assert_eq!(upgrades[1].state.owned, 2);
        assert_eq!(upgrades[1].state.next_cost, 150);
        // unlock state is never restored from storage
        assert!(!upgrades[1].state.unlocked);
    }

    #[test]
    fn overlay_accepts_owned_as_string() {
        let mut store = MemoryStore::new();
        store
            .set("Hobbit Hole", r#"{"id":1,"costNext":30,"owned":"2"}"#)
            .unwrap();
        let upgrades = overlay_saved(parse_catalog(TWO).unwrap(), &store);
        assert_eq!(upgrades[0].state.owned, 2);
        assert_eq!(upgrades[0].state.next_cost, 30);
    }

    #[test]
    fn overlay_ignores_corrupt_record() {
        let mut store = MemoryStore::new();
        store.set("Hobbit Hole", "not json").unwrap();
        store
            .set("Peace and Quiet", r#"{"id":2,"costNext":100,"owned":"lots"}"#)
            .unwrap();
        let upgrades = overlay_saved(parse_catalog(TWO).unwrap(), &store);
        assert_eq!(upgrades[0].state.owned, 0);
        assert_eq!(upgrades[0].state.next_cost, 10);
        assert_eq!(upgrades[1].state.owned, 0);
        assert_eq!(upgrades[1].state.next_cost, 50);
    }

    #[test]
    fn overlay_never_restores_a_price_below_base() {
        let mut store = MemoryStore::new();
        store
            .set("Hobbit Hole", r#"{"id":1,"costNext":0,"owned":0}"#)
            .unwrap();
        store
            .set("Peace and Quiet", r#"{"id":2,"costNext":20,"owned":1}"#)
            .unwrap();
        let upgrades = overlay_saved(parse_catalog(TWO).unwrap(), &store);
        assert_eq!(upgrades[0].state.next_cost, 10);
        assert_eq!(upgrades[1].state.next_cost, 50);
        assert_eq!(upgrades[1].state.owned, 1);
    }

    #[test]
    fn record_serializes_with_camel_case() {
        let record = UpgradeRecord {
            id: 3,
            cost_next: 2000,
            owned: 1,
        };
        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(json, r#"{"id":3,"costNext":2000,"owned":1}"#);
    }
}
