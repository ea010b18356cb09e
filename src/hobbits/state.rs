//! Hobbit Clicker state: resource counters, live upgrades, and the
//! progression container that owns both.

use crate::catalog::{UpgradeDefinition, UpgradeRecord};
use crate::error::{PurchaseError, StorageError};
use crate::storage::KeyValueStore;

/// Storage key for the current hobbit total.
pub const TOTAL_KEY: &str = "hobbits";
/// Storage key for hobbits per second.
pub const RATE_KEY: &str = "hps";

/// The player's economy.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ResourceState {
    /// Spendable hobbits.
    pub total: u64,
    /// Hobbits added every tick.
    pub rate: u64,
}

/// Resource counters bound to a store. Every mutation is written through.
pub struct GameState<S> {
    resources: ResourceState,
    store: S,
    /// Most recent failed write, kept until the UI picks it up.
    storage_fault: Option<StorageError>,
}

impl<S: KeyValueStore> GameState<S> {
    /// Read counters from `store`; missing or garbled values become 0.
    pub fn load(store: S) -> Self {
        let resources = ResourceState {
            total: parse_counter(store.get(TOTAL_KEY)),
            rate: parse_counter(store.get(RATE_KEY)),
        };
        Self {
            resources,
            store,
            storage_fault: None,
        }
    }

    pub fn resources(&self) -> ResourceState {
        self.resources
    }

    pub fn total(&self) -> u64 {
        self.resources.total
    }

    pub fn rate(&self) -> u64 {
        self.resources.rate
    }

    pub fn add_resource(&mut self, n: u64) {
        self.resources.total = self.resources.total.saturating_add(n);
        self.persist();
    }

    pub fn set_rate(&mut self, rate: u64) {
        self.resources.rate = rate;
        self.persist();
    }

    pub fn spend(&mut self, n: u64) -> Result<(), PurchaseError> {
        if n > self.resources.total {
            return Err(PurchaseError::InsufficientResource {
                needed: n,
                available: self.resources.total,
            });
        }
        self.resources.total -= n;
        self.persist();
        Ok(())
    }

    /// Wipe the store and zero both counters.
    pub fn reset(&mut self) {
        if let Err(err) = self.store.clear() {
            self.record_fault(err);
        }
        self.resources = ResourceState::default();
    }

    /// Write both counters.
    pub fn persist(&mut self) {
        let ResourceState { total, rate } = self.resources;
        self.write(TOTAL_KEY, &total.to_string());
        self.write(RATE_KEY, &rate.to_string());
    }

    /// Best-effort write; a failure is logged and kept for the UI.
    pub fn write(&mut self, key: &str, value: &str) {
        if let Err(err) = self.store.set(key, value) {
            self.record_fault(err);
        }
    }

    fn record_fault(&mut self, err: StorageError) {
        log::warn!("{err}");
        self.storage_fault = Some(err);
    }

    pub fn take_storage_fault(&mut self) -> Option<StorageError> {
        self.storage_fault.take()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    #[cfg(test)]
    pub fn into_store(self) -> S {
        self.store
    }
}

/// Lenient integer parse in the spirit of `parseInt`: leading whitespace,
/// optional `+`, then as many digits as there are. Anything else is 0.
fn parse_counter(raw: Option<String>) -> u64 {
    let Some(raw) = raw else {
        return 0;
    };
    let s = raw.trim_start();
    let s = s.strip_prefix('+').unwrap_or(s);
    let end = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
    match s[..end].parse() {
        Ok(n) => n,
        Err(_) => {
            if !raw.is_empty() {
                log::warn!("unreadable counter {raw:?}, starting from 0");
            }
            0
        }
    }
}

/// Mutable per-upgrade progress.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UpgradeState {
    pub owned: u64,
    pub next_cost: u64,
    pub unlocked: bool,
}

impl UpgradeState {
    /// State of an upgrade nobody has bought. Only the first is unlocked.
    pub fn fresh(def: &UpgradeDefinition, index: usize) -> Self {
        Self {
            owned: 0,
            next_cost: def.base_cost,
            unlocked: index == 0,
        }
    }
}

/// A catalog entry together with its progress.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Upgrade {
    pub def: UpgradeDefinition,
    pub state: UpgradeState,
}

impl Upgrade {
    pub fn record(&self) -> UpgradeRecord {
        UpgradeRecord {
            id: self.def.id,
            cost_next: self.state.next_cost,
            owned: self.state.owned,
        }
    }

    /// Back to zero owned and base price. The unlock flag is left alone.
    pub fn reset(&mut self) {
        self.state.owned = 0;
        self.state.next_cost = self.def.base_cost;
    }
}

/// Everything the progression rules operate on.
pub struct Progression<S> {
    pub game: GameState<S>,
    /// Catalog order. Empty until the catalog has been installed.
    pub upgrades: Vec<Upgrade>,
}

impl<S: KeyValueStore> Progression<S> {
    pub fn load(store: S) -> Self {
        Self {
            game: GameState::load(store),
            upgrades: Vec::new(),
        }
    }

    pub fn total(&self) -> u64 {
        self.game.total()
    }

    pub fn rate(&self) -> u64 {
        self.game.rate()
    }

    /// Indices of upgrades the player can currently see.
    pub fn unlocked_indices(&self) -> Vec<usize> {
        self.upgrades
            .iter()
            .enumerate()
            .filter(|(_, u)| u.state.unlocked)
            .map(|(i, _)| i)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    fn def(base_cost: u64) -> UpgradeDefinition {
        UpgradeDefinition {
            id: 1,
            name: "Hobbit Hole".into(),
            base_cost,
            increment: 1,
            has_sound: false,
        }
    }

    #[test]
    fn load_from_empty_store() {
        let gs = GameState::load(MemoryStore::new());
        assert_eq!(gs.resources(), ResourceState::default());
    }

    #[test]
    fn load_reads_both_keys() {
        let mut store = MemoryStore::new();
        store.set(TOTAL_KEY, "42").unwrap();
        store.set(RATE_KEY, "7").unwrap();
        let gs = GameState::load(store);
        assert_eq!(gs.total(), 42);
        assert_eq!(gs.rate(), 7);
    }

    #[test]
    fn counter_parse_is_lenient() {
        assert_eq!(parse_counter(Some("12abc".into())), 12);
        assert_eq!(parse_counter(Some("  +5".into())), 5);
        assert_eq!(parse_counter(Some("NaN".into())), 0);
        assert_eq!(parse_counter(Some("-3".into())), 0);
        assert_eq!(parse_counter(Some(String::new())), 0);
        assert_eq!(parse_counter(None), 0);
    }

    #[test]
    fn mutations_are_written_through() {
        let mut gs = GameState::load(MemoryStore::new());
        gs.add_resource(5);
        assert_eq!(gs.store().get(TOTAL_KEY).as_deref(), Some("5"));
        assert_eq!(gs.store().get(RATE_KEY).as_deref(), Some("0"));
        gs.set_rate(3);
        assert_eq!(gs.store().get(RATE_KEY).as_deref(), Some("3"));
        gs.spend(2).unwrap();
        assert_eq!(gs.store().get(TOTAL_KEY).as_deref(), Some("3"));
    }

    #[test]
    fn overspending_fails_without_change() {
        let mut gs = GameState::load(MemoryStore::new());
        gs.add_resource(4);
        assert_eq!(
            gs.spend(5),
            Err(PurchaseError::InsufficientResource {
                needed: 5,
                available: 4
            })
        );
        assert_eq!(gs.total(), 4);
    }

    #[test]
    fn add_saturates() {
        let mut gs = GameState::load(MemoryStore::new());
        gs.add_resource(u64::MAX);
        gs.add_resource(10);
        assert_eq!(gs.total(), u64::MAX);
    }

    #[test]
    fn write_failure_keeps_memory_and_reports() {
        let mut store = MemoryStore::new();
        store.fail_writes = true;
        let mut gs = GameState::load(store);
        gs.add_resource(9);
        assert_eq!(gs.total(), 9);
        assert!(matches!(
            gs.take_storage_fault(),
            Some(StorageError::Write { .. })
        ));
        assert_eq!(gs.take_storage_fault(), None);
    }

    #[test]
    fn reset_clears_store_and_counters() {
        let mut gs = GameState::load(MemoryStore::new());
        gs.add_resource(10);
        gs.set_rate(2);
        gs.write("Inn", "{}");
        gs.reset();
        assert_eq!(gs.resources(), ResourceState::default());
        assert!(gs.store().is_empty());
    }

    #[test]
    fn fresh_upgrade_state() {
        let d = def(25);
        assert_eq!(
            UpgradeState::fresh(&d, 0),
            UpgradeState {
                owned: 0,
                next_cost: 25,
                unlocked: true
            }
        );
        assert!(!UpgradeState::fresh(&d, 3).unlocked);
    }

    #[test]
    fn upgrade_reset_keeps_unlock() {
        let d = def(25);
        let mut u = Upgrade {
            state: UpgradeState {
                owned: 3,
                next_cost: 100,
                unlocked: true,
            },
            def: d,
        };
        u.reset();
        assert_eq!(u.state.owned, 0);
        assert_eq!(u.state.next_cost, 25);
        assert!(u.state.unlocked);
    }
}
