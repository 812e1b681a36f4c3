//! Balance simulator for the idle economy.
//! Run with: cargo test simulate_greedy -- --nocapture

#[cfg(test)]
mod tests {
    use crate::logic::{self, PRESTIGE_THRESHOLD};
    use crate::state::{EconomyState, UpgradeKind};

    /// Pick the affordable purchase with the shortest payback time.
    fn find_best_purchase(state: &EconomyState) -> Option<UpgradeKind> {
        let mut best: Option<(f64, UpgradeKind)> = None;
        for upgrade in &state.upgrades {
            let cost = upgrade.cost();
            if state.display < cost {
                continue;
            }
            let gain = state.effective_rate(upgrade.kind);
            if gain <= 0.0 {
                continue;
            }
            let payback = cost as f64 / gain;
            let dominated = best.as_ref().map_or(false, |(bp, _)| *bp <= payback);
            if !dominated {
                best = Some((payback, upgrade.kind));
            }
        }
        best.map(|(_, kind)| kind)
    }

    /// Prestige only when the recomputed multiplier would beat the current
    /// one — with replace semantics an early reset can be a net loss.
    fn should_prestige(state: &EconomyState) -> bool {
        state.display >= PRESTIGE_THRESHOLD
            && 1.0 + f64::from(logic::prestige_factor(state.display)) * 0.1
                > state.prestige_multiplier
    }

    fn report_stats(state: &EconomyState, seconds: u32, purchases: u32, prestiges: u32) {
        let minutes = seconds / 60;
        let secs = seconds % 60;
        eprintln!("┌─── {}m{}s ─────────────────────────", minutes, secs);
        eprintln!(
            "│ Bank: {}  Rate: {}/s  Multiplier: x{:.1}",
            logic::format_number(state.display as f64),
            logic::format_number(state.rate_per_second),
            state.prestige_multiplier
        );
        let levels: Vec<String> = state
            .upgrades
            .iter()
            .map(|u| format!("{}:{}", u.kind.name(), u.level))
            .collect();
        eprintln!("│ Levels: {}", levels.join("  "));
        eprintln!("│ Purchases: {}  Prestiges: {}", purchases, prestiges);
        if let Some(kind) = find_best_purchase(state) {
            let cost = state.upgrades[kind.index()].cost();
            eprintln!(
                "│ Next buy: {} ({})",
                kind.name(),
                logic::format_number(cost as f64)
            );
        }
        eprintln!("└────────────────────────────────────");
    }

    /// Simulate greedy play for `total_seconds`.
    fn simulate(total_seconds: u32) {
        let mut state = EconomyState::new();
        let clicks_per_second: u32 = 5;

        let mut purchases: u32 = 0;
        let mut prestiges: u32 = 0;

        let report_times: Vec<u32> = vec![30, 60, 120, 300, 600, 900, 1800, 2700, 3600];
        let mut next_report_idx = 0;

        eprintln!("\n========================================");
        eprintln!("  idle economy balance simulator");
        eprintln!("  play time: {}min", total_seconds / 60);
        eprintln!("  click rate: {}/s", clicks_per_second);
        eprintln!("========================================\n");

        for second in 1..=total_seconds {
            for _ in 0..clicks_per_second {
                logic::award(&mut state, 1);
            }
            logic::accumulate(&mut state, 1.0);

            if should_prestige(&state) {
                let factor = logic::prestige(&mut state).unwrap();
                prestiges += 1;
                eprintln!(
                    "🌟 {}s: prestige x{} → multiplier {:.1}",
                    second, factor, state.prestige_multiplier
                );
            }

            // Greedy: buy best-payback upgrades until nothing is affordable
            for _ in 0..20 {
                match find_best_purchase(&state) {
                    Some(kind) => {
                        if logic::purchase(&mut state, kind).is_ok() {
                            purchases += 1;
                        } else {
                            break;
                        }
                    }
                    None => break,
                }
            }

            if next_report_idx < report_times.len() && second >= report_times[next_report_idx] {
                report_stats(&state, second, purchases, prestiges);
                next_report_idx += 1;
            }
        }

        eprintln!("\n======== final ========");
        report_stats(&state, total_seconds, purchases, prestiges);
    }

    #[test]
    fn simulate_greedy_30min() {
        simulate(1800);
    }

    #[test]
    fn simulate_greedy_1hour() {
        simulate(3600);
    }
}
