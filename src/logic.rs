//! Economy operations — pure functions over the ledger, fully testable.

use thiserror::Error;

use crate::state::{EconomyState, UpgradeKind};

/// Displayed resource required before a prestige reset is allowed.
pub const PRESTIGE_THRESHOLD: u64 = 1_000_000;

/// Why an operation was refused. Nothing here is fatal; the engine keeps
/// running and the reason travels outward in a notification.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum EngineError {
    /// Purchase attempted with less displayed resource than the cost.
    #[error("{kind} costs {cost}, have {available}")]
    InsufficientResource {
        kind: UpgradeKind,
        cost: u64,
        available: u64,
    },
    /// Prestige attempted below the eligibility threshold.
    #[error("prestige needs {required}, have {available}")]
    PrestigeNotEligible { required: u64, available: u64 },
}

/// Advance production by `delta_seconds` of wall-clock time.
///
/// Production lands in the raw ledger; the displayed value moves only when
/// a whole-unit boundary is crossed, and never downward. Returns whether
/// the display changed, so the caller can skip redundant rendering.
pub fn accumulate(state: &mut EconomyState, delta_seconds: f64) -> bool {
    if delta_seconds <= 0.0 || state.rate_per_second <= 0.0 {
        return false;
    }
    state.raw += state.rate_per_second * delta_seconds;
    let whole = state.raw.floor() as u64;
    if whole > state.display {
        state.display = whole;
        true
    } else {
        false
    }
}

/// Grant `amount` whole units from a manual click, scaled by the prestige
/// multiplier. Both ledgers update immediately. Returns the raw amount
/// granted (the host's "+N" feedback value).
pub fn award(state: &mut EconomyState, amount: u64) -> f64 {
    let granted = amount as f64 * state.prestige_multiplier;
    state.raw += granted;
    state.display = state.raw.floor() as u64;
    granted
}

/// Buy one level of `kind`.
///
/// Affordability is judged against the displayed integer: fractional
/// resource below it can never be spent. On success the cost is subtracted
/// exactly from both ledgers, so sub-unit progress survives the purchase.
/// Returns the new level.
pub fn purchase(state: &mut EconomyState, kind: UpgradeKind) -> Result<u32, EngineError> {
    let idx = kind.index();
    let cost = state.upgrades[idx].cost();
    if state.display < cost {
        return Err(EngineError::InsufficientResource {
            kind,
            cost,
            available: state.display,
        });
    }
    state.display -= cost;
    state.raw -= cost as f64;
    if state.raw < 0.0 {
        // Only reachable when the ledgers were out of sync (a stale or
        // hand-edited save); the raw ledger never goes negative.
        state.raw = 0.0;
    }
    state.upgrades[idx].level += 1;
    state.recompute_rate();
    Ok(state.upgrades[idx].level)
}

/// Prestige factor the current displayed bank would yield.
pub fn prestige_factor(display: u64) -> u32 {
    (display as f64 / PRESTIGE_THRESHOLD as f64).sqrt().floor() as u32
}

/// Reset the run: trade the current bank for a permanent multiplier.
///
/// The multiplier is recomputed from the current bank alone and *replaces*
/// the previous value, it does not stack on it. Both ledgers and every
/// level reset to zero. Returns the factor.
pub fn prestige(state: &mut EconomyState) -> Result<u32, EngineError> {
    if state.display < PRESTIGE_THRESHOLD {
        return Err(EngineError::PrestigeNotEligible {
            required: PRESTIGE_THRESHOLD,
            available: state.display,
        });
    }
    let factor = prestige_factor(state.display);
    state.prestige_multiplier = 1.0 + f64::from(factor) * 0.1;
    state.raw = 0.0;
    state.display = 0;
    for upgrade in &mut state.upgrades {
        upgrade.level = 0;
    }
    state.recompute_rate();
    Ok(factor)
}

/// Format a value with K/M/B suffixes (e.g. 1_400_000 → "1.4M").
pub fn format_number(n: f64) -> String {
    if n >= 1e9 {
        format!("{:.1}B", n / 1e9)
    } else if n >= 1e6 {
        format!("{:.1}M", n / 1e6)
    } else if n >= 1e3 {
        format!("{:.1}K", n / 1e3)
    } else {
        format!("{n}")
    }
}
