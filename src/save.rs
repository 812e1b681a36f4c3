//! セーブ/ロード機能。
//!
//! ## 互換性方針
//!
//! スナップショットはフラットな JSON 1 レコード。読み込み側は部分的・古い
//! データを許容する:
//!
//! - 欠けたフィールドはデフォルト値で補完する（`rawResource` 欠落時は
//!   `displayResource` に倒す）。
//! - `levels` の未知キーは無視し、既知の種別が無ければレベル 0 とする。
//! - `displayResource` が非整数かつ `rawResource` が無いセーブは、raw 台帳
//!   導入前の形式で信用できないため全体を破棄して新規状態から始める。

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::state::EconomyState;

/// key-value ストア上のセーブキー。
pub const STORAGE_KEY: &str = "idle_game_save";

/// 定期オートセーブの間隔（秒）。ユーザー操作とは独立に走る。
pub const AUTOSAVE_INTERVAL_SECS: f64 = 60.0;

/// ストア自体の失敗。セーブ時は呼び出し側が握りつぶす。
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("key-value store unavailable: {0}")]
    Unavailable(String),
}

/// スナップショットを復元できなかった理由。
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// JSON として読めない。
    #[error("snapshot is not valid JSON: {0}")]
    Malformed(#[from] serde_json::Error),
    /// raw 台帳を持たない旧形式。部分復元はせず全体を破棄する。
    #[error("legacy save format without a raw ledger")]
    LegacyFormat,
}

/// セーブの失敗。エンジンはログだけ残してメモリ上の状態を使い続ける。
#[derive(Debug, Error)]
pub enum SaveError {
    #[error("snapshot could not be serialized: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// ロードの失敗の分類。`Corrupt` は破棄して新規状態、`Store` は現状維持。
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("corrupt snapshot: {0}")]
    Corrupt(#[from] SnapshotError),
    #[error("load failed: {0}")]
    Store(#[from] StoreError),
}

/// 永続化されるスナップショット。Economy State の純粋な射影 + 保存時刻。
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub display_resource: u64,
    pub raw_resource: f64,
    pub rate_per_second: f64,
    pub prestige_multiplier: f64,
    pub levels: BTreeMap<String, u32>,
    pub saved_at: f64,
}

impl Snapshot {
    /// 状態からスナップショットを射影する。レベル 0 の種別も書き出す。
    pub fn capture(state: &EconomyState, saved_at: f64) -> Self {
        Self {
            display_resource: state.display,
            raw_resource: state.raw,
            rate_per_second: state.rate_per_second,
            prestige_multiplier: state.prestige_multiplier,
            levels: state
                .upgrades
                .iter()
                .map(|u| (u.kind.key().to_string(), u.level))
                .collect(),
            saved_at,
        }
    }
}

/// 読み込み専用の構造体。欠落を許容するため全フィールドが Option。
/// `savedAt` を含む未知・不要のトップレベルフィールドは serde が読み飛ばす。
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct RawSnapshot {
    display_resource: Option<f64>,
    raw_resource: Option<f64>,
    rate_per_second: Option<f64>,
    prestige_multiplier: Option<f64>,
    levels: Option<BTreeMap<String, u32>>,
}

/// JSON 文字列から状態を復元する。
///
/// `ratePerSecond` は書かれていればそのまま信用する（次のレベル変更操作で
/// 再計算される）。
pub fn restore(json: &str) -> Result<EconomyState, SnapshotError> {
    let raw: RawSnapshot = serde_json::from_str(json)?;

    if let Some(display) = raw.display_resource {
        if display.fract() != 0.0 && raw.raw_resource.is_none() {
            return Err(SnapshotError::LegacyFormat);
        }
    }

    let mut state = EconomyState::new();
    state.display = raw
        .display_resource
        .map_or(0, |d| d.max(0.0).floor() as u64);
    state.raw = raw
        .raw_resource
        .or(raw.display_resource)
        .unwrap_or(0.0)
        .max(0.0);
    state.rate_per_second = raw.rate_per_second.unwrap_or(0.0);
    state.prestige_multiplier = raw.prestige_multiplier.unwrap_or(1.0);
    if let Some(levels) = &raw.levels {
        for upgrade in &mut state.upgrades {
            upgrade.level = levels.get(upgrade.kind.key()).copied().unwrap_or(0);
        }
    }
    Ok(state)
}

/// 永続化先の key-value ストア。ブラウザでは localStorage、テストと
/// ネイティブ実行ではメモリ。
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&mut self, key: &str) -> Result<(), StoreError>;
}

/// インメモリストア。
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        self.entries.remove(key);
        Ok(())
    }
}

/// localStorage を使うストア。WASM 環境でのみ存在する。
#[cfg(target_arch = "wasm32")]
#[derive(Debug, Default)]
pub struct LocalStorage;

#[cfg(target_arch = "wasm32")]
impl LocalStorage {
    fn storage() -> Result<web_sys::Storage, StoreError> {
        web_sys::window()
            .and_then(|w| w.local_storage().ok().flatten())
            .ok_or_else(|| StoreError::Unavailable("localStorage is not accessible".into()))
    }
}

#[cfg(target_arch = "wasm32")]
impl KeyValueStore for LocalStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Self::storage()?
            .get_item(key)
            .map_err(|e| StoreError::Unavailable(format!("{e:?}")))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        Self::storage()?
            .set_item(key, value)
            .map_err(|e| StoreError::Unavailable(format!("{e:?}")))
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        Self::storage()?
            .remove_item(key)
            .map_err(|e| StoreError::Unavailable(format!("{e:?}")))
    }
}

/// 状態をストアに保存する。
pub fn save<S: KeyValueStore>(
    store: &mut S,
    state: &EconomyState,
    saved_at: f64,
) -> Result<(), SaveError> {
    let json = serde_json::to_string(&Snapshot::capture(state, saved_at))?;
    store.set(STORAGE_KEY, &json)?;
    Ok(())
}

/// ストアから状態を読み出す。セーブが無ければ `Ok(None)`。
pub fn load<S: KeyValueStore>(store: &S) -> Result<Option<EconomyState>, LoadError> {
    let json = match store.get(STORAGE_KEY)? {
        Some(j) => j,
        None => return Ok(None),
    };
    Ok(Some(restore(&json)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::UpgradeKind;

    fn sample_state() -> EconomyState {
        let mut state = EconomyState::new();
        state.raw = 12_345.6;
        state.display = 12_345;
        state.prestige_multiplier = 1.2;
        state.upgrades[UpgradeKind::Cursor.index()].level = 10;
        state.upgrades[UpgradeKind::Mine.index()].level = 3;
        state.recompute_rate();
        state
    }

    #[test]
    fn save_then_load_roundtrips_exactly() {
        let mut store = MemoryStore::new();
        let state = sample_state();
        save(&mut store, &state, 1_234.5).unwrap();
        let loaded = load(&store).unwrap().unwrap();
        assert_eq!(loaded, state);
    }

    #[test]
    fn snapshot_uses_wire_field_names() {
        let state = sample_state();
        let json = serde_json::to_string(&Snapshot::capture(&state, 99.0)).unwrap();
        for key in [
            "displayResource",
            "rawResource",
            "ratePerSecond",
            "prestigeMultiplier",
            "levels",
            "savedAt",
        ] {
            assert!(json.contains(key), "missing {key} in {json}");
        }
        assert!(json.contains("\"cursor\":10"));
        // レベル 0 の種別も省略しない
        assert!(json.contains("\"wizard\":0"));
    }

    #[test]
    fn restore_empty_object_is_zero_state() {
        let state = restore("{}").unwrap();
        assert_eq!(state, EconomyState::new());
    }

    #[test]
    fn restore_missing_raw_falls_back_to_display() {
        let state = restore(r#"{"displayResource": 12}"#).unwrap();
        assert_eq!(state.display, 12);
        assert!((state.raw - 12.0).abs() < f64::EPSILON);
    }

    #[test]
    fn restore_rejects_legacy_fractional_display() {
        // raw 台帳の無い旧形式: display=12 に切り詰めず全体を破棄する
        let err = restore(r#"{"displayResource": 12.5}"#).unwrap_err();
        assert!(matches!(err, SnapshotError::LegacyFormat));
    }

    #[test]
    fn restore_fractional_display_with_raw_is_accepted() {
        let state = restore(r#"{"displayResource": 12.5, "rawResource": 12.5}"#).unwrap();
        assert_eq!(state.display, 12);
        assert!((state.raw - 12.5).abs() < f64::EPSILON);
    }

    #[test]
    fn restore_integral_display_without_raw_is_accepted() {
        let state = restore(r#"{"displayResource": 7, "prestigeMultiplier": 1.1}"#).unwrap();
        assert_eq!(state.display, 7);
        assert!((state.raw - 7.0).abs() < f64::EPSILON);
        assert!((state.prestige_multiplier - 1.1).abs() < f64::EPSILON);
    }

    #[test]
    fn restore_ignores_unknown_level_keys() {
        let state =
            restore(r#"{"levels": {"cursor": 3, "spaceship": 9}}"#).unwrap();
        assert_eq!(state.level(UpgradeKind::Cursor), 3);
        for upgrade in &state.upgrades {
            if upgrade.kind != UpgradeKind::Cursor {
                assert_eq!(upgrade.level, 0);
            }
        }
    }

    #[test]
    fn restore_ignores_unknown_top_level_fields() {
        let state = restore(
            r#"{"displayResource": 5, "rawResource": 5.5, "futureField": [1, 2, 3]}"#,
        )
        .unwrap();
        assert_eq!(state.display, 5);
        assert!((state.raw - 5.5).abs() < f64::EPSILON);
    }

    #[test]
    fn restore_trusts_stale_rate_as_given() {
        let state = restore(r#"{"ratePerSecond": 42.5}"#).unwrap();
        assert!((state.rate_per_second - 42.5).abs() < f64::EPSILON);
    }

    #[test]
    fn restore_clamps_negative_values() {
        let state = restore(r#"{"displayResource": -3, "rawResource": -3.5}"#).unwrap();
        assert_eq!(state.display, 0);
        assert!((state.raw - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn restore_garbage_is_malformed() {
        assert!(matches!(
            restore("definitely not json").unwrap_err(),
            SnapshotError::Malformed(_)
        ));
    }

    #[test]
    fn load_from_empty_store_is_none() {
        let store = MemoryStore::new();
        assert!(load(&store).unwrap().is_none());
    }

    #[test]
    fn memory_store_set_get_remove() {
        let mut store = MemoryStore::new();
        store.set("k", "v").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("v"));
        store.remove("k").unwrap();
        assert!(store.get("k").unwrap().is_none());
    }
}
