//! Economy engine for a browser idle game.
//!
//! This crate owns the numbers: the raw/display resource ledgers, the
//! upgrade cost and production curves, prestige resets, and the save
//! format. Everything else lives in the host shell: rendering, input
//! wiring, and the frame scheduler. The shell feeds timestamps and user
//! intents in and renders from the returned [`Notification`]s.
//!
//! ```
//! use cookie_idle_engine::{Engine, MemoryStore, UpgradeKind};
//!
//! let mut engine = Engine::new(MemoryStore::new());
//! engine.request_load();
//! engine.request_award(1);
//! engine.tick(16.7);
//! let _ = engine.request_purchase(UpgradeKind::Cursor);
//! ```

pub mod engine;
pub mod logic;
pub mod save;
mod simulator;
pub mod state;
pub mod time;

pub use engine::{Engine, Notification};
pub use logic::{EngineError, PRESTIGE_THRESHOLD};
pub use save::{
    KeyValueStore, LoadError, MemoryStore, SaveError, Snapshot, SnapshotError, StoreError,
    AUTOSAVE_INTERVAL_SECS, STORAGE_KEY,
};
pub use state::{EconomyState, Upgrade, UpgradeKind};
pub use time::TickDriver;

#[cfg(target_arch = "wasm32")]
pub use save::LocalStorage;
