//! Hobbit Clicker progression rules — pure functions over [`Progression`].

use crate::catalog::{self, UpgradeDefinition};
use crate::error::PurchaseError;
use crate::storage::KeyValueStore;

use super::state::Progression;

/// A sound the presentation layer should try to play.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Cue {
    /// Opening theme, on the first click of a fresh game.
    Theme,
    /// Purchase sound for the upgrade at this catalog index.
    Purchase(usize),
}

/// What a successful purchase did.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Purchase {
    pub index: usize,
    pub spent: u64,
    pub owned: u64,
    pub cue: Option<Cue>,
    /// Upgrades revealed as a result of this purchase.
    pub unlocked: Vec<usize>,
}

/// Replace the catalog, restoring saved per-upgrade progress, then reveal
/// whatever the current totals already qualify for.
pub fn install_catalog<S: KeyValueStore>(p: &mut Progression<S>, defs: Vec<UpgradeDefinition>) -> Vec<usize> {
    p.upgrades = catalog::overlay_saved(defs, p.game.store());
    log::info!("catalog installed with {} upgrades", p.upgrades.len());
    unlock_upgrades(p)
}

/// One second of passive generation.
pub fn tick<S: KeyValueStore>(p: &mut Progression<S>) -> Vec<usize> {
    let rate = p.game.rate();
    p.game.add_resource(rate);
    unlock_upgrades(p)
}

/// Manual click: one hobbit. Returns the theme cue on the first click of a
/// fresh game.
pub fn click<S: KeyValueStore>(p: &mut Progression<S>) -> (Option<Cue>, Vec<usize>) {
    let fresh = p.game.total() == 0 && p.game.rate() == 0;
    p.game.add_resource(1);
    let unlocked = unlock_upgrades(p);
    (fresh.then_some(Cue::Theme), unlocked)
}

/// Buy one unit of the upgrade at `index`. Nothing changes on failure.
pub fn purchase<S: KeyValueStore>(p: &mut Progression<S>, index: usize) -> Result<Purchase, PurchaseError> {
    let upgrade = p
        .upgrades
        .get(index)
        .ok_or(PurchaseError::UnknownUpgrade(index))?;
    if !upgrade.state.unlocked {
        return Err(PurchaseError::Locked(index));
    }
    let cost = upgrade.state.next_cost;
    let increment = upgrade.def.increment;
    let has_sound = upgrade.def.has_sound;

    if let Err(err) = p.game.spend(cost) {
        log::info!("{err}");
        return Err(err);
    }

    let upgrade = &mut p.upgrades[index];
    upgrade.state.owned += 1;
    upgrade.state.next_cost = upgrade.state.next_cost.saturating_add(upgrade.def.base_cost);
    let owned = upgrade.state.owned;
    let name = upgrade.def.name.clone();
    let record = upgrade.record();

    let rate = p.game.rate().saturating_add(increment);
    p.game.set_rate(rate);
    match serde_json::to_string(&record) {
        Ok(json) => p.game.write(&name, &json),
        Err(err) => log::warn!("could not encode save for {name:?}: {err}"),
    }
    log::debug!("bought {name} #{owned} for {cost}");

    let unlocked = unlock_upgrades(p);
    Ok(Purchase {
        index,
        spent: cost,
        owned,
        cue: has_sound.then_some(Cue::Purchase(index)),
        unlocked,
    })
}

/// Reveal upgrades whose price the player has reached, or whose predecessor
/// they own. Never re-locks. Returns the newly revealed indices.
pub fn unlock_upgrades<S: KeyValueStore>(p: &mut Progression<S>) -> Vec<usize> {
    let mut revealed = Vec::new();
    match p.upgrades.last() {
        None => return revealed,
        Some(last) if last.state.unlocked => return revealed,
        Some(_) => {}
    }

    let total = p.game.total();
    for i in 1..p.upgrades.len() {
        if p.upgrades[i].state.unlocked {
            continue;
        }
        let affordable = total >= p.upgrades[i].def.base_cost;
        let predecessor_owned = p.upgrades[i - 1].state.owned > 0;
        if affordable || predecessor_owned {
            p.upgrades[i].state.unlocked = true;
            revealed.push(i);
        }
    }
    revealed
}

/// Start over: storage wiped, counters zeroed, every upgrade back to its
/// base price. Revealed upgrades stay revealed.
pub fn reset<S: KeyValueStore>(p: &mut Progression<S>) {
    p.game.reset();
    for upgrade in &mut p.upgrades {
        upgrade.reset();
    }
    log::info!("progress reset");
}

/// Format a count with thousands separators (e.g. 1234567 → "1,234,567").
pub fn format_number(n: u64) -> String {
    let s = n.to_string();
    let mut result = String::with_capacity(s.len() + s.len() / 3);
    for (i, c) in s.chars().enumerate() {
        if i > 0 && (s.len() - i) % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    result
}
