//! Engine facade: inbound intents, outbound notifications, autosave.
//!
//! The host shell forwards user intents in and renders from the returned
//! notifications plus [`Engine::state`]. The engine never draws and never
//! reads the clock itself; timestamps arrive through [`Engine::tick`].

use log::{info, warn};

use crate::logic::{self, EngineError};
use crate::save::{self, KeyValueStore, LoadError, AUTOSAVE_INTERVAL_SECS, STORAGE_KEY};
use crate::state::{EconomyState, UpgradeKind};
use crate::time::TickDriver;

/// What changed, for the host to render. Returned from every intent.
#[derive(Clone, Debug, PartialEq)]
pub enum Notification {
    /// The displayed value crossed a whole-unit boundary or was replaced
    /// outright (award, purchase, prestige, load).
    DisplayChanged { display: u64, rate_per_second: f64 },
    /// Kinds whose purchasability flipped since the last report.
    AffordabilityChanged { kinds: Vec<UpgradeKind> },
    /// Outcome of a purchase intent; success carries the new level.
    PurchaseResult {
        kind: UpgradeKind,
        outcome: Result<u32, EngineError>,
    },
    /// Outcome of a prestige intent; success carries the factor.
    PrestigeResult { outcome: Result<u32, EngineError> },
    /// Outcome of a save, manual or automatic.
    SaveResult { ok: bool },
}

/// The economy engine. Owns the ledger singleton, the persistence store,
/// the tick driver and the autosave timer.
pub struct Engine<S> {
    state: EconomyState,
    store: S,
    driver: TickDriver,
    /// Ticked seconds since the last periodic autosave.
    autosave_elapsed: f64,
    /// Last timestamp seen by `tick`; stamps snapshots.
    last_now_ms: f64,
    /// Affordability of each kind at the last report, catalog order.
    affordable: Vec<bool>,
}

impl<S: KeyValueStore> Engine<S> {
    pub fn new(store: S) -> Self {
        let state = EconomyState::new();
        let affordable = affordability(&state);
        Self {
            state,
            store,
            driver: TickDriver::new(),
            autosave_elapsed: 0.0,
            last_now_ms: 0.0,
            affordable,
        }
    }

    /// Read-only view for rendering.
    pub fn state(&self) -> &EconomyState {
        &self.state
    }

    /// Drive accumulation from a wall-clock timestamp (ms). Also advances
    /// the periodic autosave, which runs regardless of user activity.
    pub fn tick(&mut self, now_ms: f64) -> Vec<Notification> {
        let delta = self.driver.update(now_ms);
        self.last_now_ms = now_ms;
        let mut notes = Vec::new();
        if logic::accumulate(&mut self.state, delta) {
            self.push_display(&mut notes);
        }
        self.autosave_elapsed += delta;
        if self.autosave_elapsed >= AUTOSAVE_INTERVAL_SECS {
            self.autosave_elapsed = 0.0;
            let ok = self.persist();
            notes.push(Notification::SaveResult { ok });
        }
        notes
    }

    /// Manual click: grant `amount` whole units, multiplier-scaled.
    pub fn request_award(&mut self, amount: u64) -> Vec<Notification> {
        let mut notes = Vec::new();
        logic::award(&mut self.state, amount);
        self.push_display(&mut notes);
        notes
    }

    /// Buy one level of `kind`. A successful purchase is saved right away.
    pub fn request_purchase(&mut self, kind: UpgradeKind) -> Vec<Notification> {
        let mut notes = Vec::new();
        match logic::purchase(&mut self.state, kind) {
            Ok(level) => {
                notes.push(Notification::PurchaseResult {
                    kind,
                    outcome: Ok(level),
                });
                self.push_display(&mut notes);
                let ok = self.persist();
                notes.push(Notification::SaveResult { ok });
            }
            Err(err) => notes.push(Notification::PurchaseResult {
                kind,
                outcome: Err(err),
            }),
        }
        notes
    }

    /// Trade the bank for a permanent multiplier and reset the run.
    pub fn request_prestige(&mut self) -> Vec<Notification> {
        let mut notes = Vec::new();
        match logic::prestige(&mut self.state) {
            Ok(factor) => {
                notes.push(Notification::PrestigeResult {
                    outcome: Ok(factor),
                });
                self.push_display(&mut notes);
            }
            Err(err) => notes.push(Notification::PrestigeResult { outcome: Err(err) }),
        }
        notes
    }

    /// Manual save button.
    pub fn request_save(&mut self) -> Vec<Notification> {
        let ok = self.persist();
        vec![Notification::SaveResult { ok }]
    }

    /// Load from the store, replacing the whole state on success.
    ///
    /// A corrupt snapshot is deleted and replaced by a fresh zero-state; a
    /// store failure leaves the in-memory state untouched. Either way the
    /// tick driver restarts from "now": time spent offline is never
    /// credited.
    pub fn request_load(&mut self) -> Vec<Notification> {
        let mut notes = Vec::new();
        match save::load(&self.store) {
            Ok(Some(state)) => {
                self.state = state;
                self.after_load(&mut notes);
            }
            Ok(None) => {}
            Err(LoadError::Corrupt(err)) => {
                info!("discarding corrupt save and starting fresh: {err}");
                if let Err(remove_err) = self.store.remove(STORAGE_KEY) {
                    warn!("could not delete corrupt save: {remove_err}");
                }
                self.state = EconomyState::new();
                self.after_load(&mut notes);
            }
            Err(LoadError::Store(err)) => {
                warn!("load failed, keeping in-memory state: {err}");
            }
        }
        notes
    }

    fn after_load(&mut self, notes: &mut Vec<Notification>) {
        self.driver.reset();
        self.autosave_elapsed = 0.0;
        self.push_display(notes);
    }

    /// Display change plus, when relevant, the affordability diff.
    fn push_display(&mut self, notes: &mut Vec<Notification>) {
        notes.push(Notification::DisplayChanged {
            display: self.state.display,
            rate_per_second: self.state.rate_per_second,
        });
        let now = affordability(&self.state);
        let kinds: Vec<UpgradeKind> = UpgradeKind::all()
            .iter()
            .enumerate()
            .filter(|(i, _)| now[*i] != self.affordable[*i])
            .map(|(_, kind)| *kind)
            .collect();
        self.affordable = now;
        if !kinds.is_empty() {
            notes.push(Notification::AffordabilityChanged { kinds });
        }
    }

    /// Save, swallowing failures: in-memory state stays authoritative and
    /// is never rolled back because a write did not land.
    fn persist(&mut self) -> bool {
        match save::save(&mut self.store, &self.state, self.last_now_ms) {
            Ok(()) => true,
            Err(err) => {
                warn!("save failed, continuing from memory: {err}");
                false
            }
        }
    }
}

/// Whether each kind is purchasable at the current displayed value.
fn affordability(state: &EconomyState) -> Vec<bool> {
    state
        .upgrades
        .iter()
        .map(|u| state.display >= u.cost())
        .collect()
}
