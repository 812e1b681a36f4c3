//! Ledger and upgrade catalog for the idle economy.

use std::fmt;

/// Kinds of purchasable upgrades, in catalog order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UpgradeKind {
    Cursor,
    Grandma,
    Farm,
    Mine,
    Factory,
    Bank,
    Temple,
    Wizard,
}

impl UpgradeKind {
    /// All kinds in catalog order.
    pub fn all() -> &'static [UpgradeKind] {
        &[
            UpgradeKind::Cursor,
            UpgradeKind::Grandma,
            UpgradeKind::Farm,
            UpgradeKind::Mine,
            UpgradeKind::Factory,
            UpgradeKind::Bank,
            UpgradeKind::Temple,
            UpgradeKind::Wizard,
        ]
    }

    /// Position in catalog order.
    pub fn index(&self) -> usize {
        match self {
            UpgradeKind::Cursor => 0,
            UpgradeKind::Grandma => 1,
            UpgradeKind::Farm => 2,
            UpgradeKind::Mine => 3,
            UpgradeKind::Factory => 4,
            UpgradeKind::Bank => 5,
            UpgradeKind::Temple => 6,
            UpgradeKind::Wizard => 7,
        }
    }

    /// Display name.
    pub fn name(&self) -> &'static str {
        match self {
            UpgradeKind::Cursor => "Cursor",
            UpgradeKind::Grandma => "Grandma",
            UpgradeKind::Farm => "Farm",
            UpgradeKind::Mine => "Mine",
            UpgradeKind::Factory => "Factory",
            UpgradeKind::Bank => "Bank",
            UpgradeKind::Temple => "Temple",
            UpgradeKind::Wizard => "Wizard",
        }
    }

    /// Key used for this kind in the persisted level map.
    pub fn key(&self) -> &'static str {
        match self {
            UpgradeKind::Cursor => "cursor",
            UpgradeKind::Grandma => "grandma",
            UpgradeKind::Farm => "farm",
            UpgradeKind::Mine => "mine",
            UpgradeKind::Factory => "factory",
            UpgradeKind::Bank => "bank",
            UpgradeKind::Temple => "temple",
            UpgradeKind::Wizard => "wizard",
        }
    }

    /// Cost of the first level.
    pub fn base_cost(&self) -> f64 {
        match self {
            UpgradeKind::Cursor => 10.0,
            UpgradeKind::Grandma => 100.0,
            UpgradeKind::Farm => 1_100.0,
            UpgradeKind::Mine => 12_000.0,
            UpgradeKind::Factory => 130_000.0,
            UpgradeKind::Bank => 1_400_000.0,
            UpgradeKind::Temple => 20_000_000.0,
            UpgradeKind::Wizard => 330_000_000.0,
        }
    }

    /// Units produced per second per level.
    pub fn base_rate(&self) -> f64 {
        match self {
            UpgradeKind::Cursor => 0.1,
            UpgradeKind::Grandma => 1.0,
            UpgradeKind::Farm => 8.0,
            UpgradeKind::Mine => 47.0,
            UpgradeKind::Factory => 260.0,
            UpgradeKind::Bank => 1_400.0,
            UpgradeKind::Temple => 7_800.0,
            UpgradeKind::Wizard => 44_000.0,
        }
    }
}

impl fmt::Display for UpgradeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A single upgrade track: its kind and how many levels are owned.
#[derive(Clone, Debug, PartialEq)]
pub struct Upgrade {
    pub kind: UpgradeKind,
    pub level: u32,
}

impl Upgrade {
    pub fn new(kind: UpgradeKind) -> Self {
        Self { kind, level: 0 }
    }

    /// Cost of the next level. The curve input is the *current* level, so
    /// an affordability check and the purchase that follows it agree.
    pub fn cost(&self) -> u64 {
        (self.kind.base_cost() * 1.15_f64.powi(self.level as i32)).floor() as u64
    }

    /// Production contributed by this track at its current level, before
    /// the prestige multiplier.
    pub fn rate(&self) -> f64 {
        self.level as f64 * self.kind.base_rate()
    }
}

/// The authoritative ledger. Exclusively owned by the engine; collaborators
/// read it or replace it wholesale on load, never mutate it.
#[derive(Clone, Debug, PartialEq)]
pub struct EconomyState {
    /// True accumulator carrying sub-unit fractions. Never shown directly.
    pub raw: f64,
    /// Floored whole-unit value. The only spendable and displayable number.
    pub display: u64,
    /// Cached aggregate production per second. Recomputed from scratch on
    /// every level or multiplier change, never patched incrementally.
    pub rate_per_second: f64,
    /// Permanent multiplier from prestige resets. Starts at 1.
    pub prestige_multiplier: f64,
    /// One track per kind, in `UpgradeKind::all()` order.
    pub upgrades: Vec<Upgrade>,
}

impl EconomyState {
    pub fn new() -> Self {
        Self {
            raw: 0.0,
            display: 0,
            rate_per_second: 0.0,
            prestige_multiplier: 1.0,
            upgrades: UpgradeKind::all().iter().map(|k| Upgrade::new(*k)).collect(),
        }
    }

    /// Current level of a kind.
    pub fn level(&self, kind: UpgradeKind) -> u32 {
        self.upgrades[kind.index()].level
    }

    /// Production gained by buying one more level of `kind`.
    pub fn effective_rate(&self, kind: UpgradeKind) -> f64 {
        kind.base_rate() * self.prestige_multiplier
    }

    /// Recompute the cached aggregate rate from levels and multiplier.
    pub fn recompute_rate(&mut self) {
        self.rate_per_second =
            self.upgrades.iter().map(Upgrade::rate).sum::<f64>() * self.prestige_multiplier;
    }
}

impl Default for EconomyState {
    fn default() -> Self {
        Self::new()
    }
}
