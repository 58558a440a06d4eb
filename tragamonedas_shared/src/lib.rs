use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tragamonedas_core::SpinOutcome;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct SpinReport {
    pub round: u64,
    pub bet: i64,
    pub symbols: Vec<String>,
    pub amount_won: i64,
    pub credits_after: i64,
    pub declined: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nonce: Option<u64>,
    pub ts: DateTime<Utc>,
}

impl SpinReport {
    pub fn from_outcome(round: u64, bet: i64, outcome: &SpinOutcome, nonce: Option<u64>) -> Self {
        Self {
            round,
            bet,
            symbols: outcome.tokens().into_iter().map(str::to_owned).collect(),
            amount_won: outcome.amount_won,
            credits_after: outcome.credits_after,
            declined: outcome.was_declined(),
            nonce: if outcome.was_declined() { None } else { nonce },
            ts: Utc::now(),
        }
    }
}

/// Seeds of a provably-fair session, published once play is over.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct FairReveal {
    pub server_seed: String,
    pub server_seed_hash: String,
    pub client_seed: String,
}

/// Running totals for one session. Money totals saturate at `i64::MAX`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct SessionSummary {
    pub spins: u64,
    pub declined: u64,
    pub wins: u64,
    pub wagered: i64,
    pub won: i64,
    pub biggest_win: i64,
    pub starting_credits: i64,
    pub final_credits: i64,
    pub theoretical_rtp: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fair: Option<FairReveal>,
}

impl SessionSummary {
    pub fn new(starting_credits: i64, theoretical_rtp: f64) -> Self {
        Self {
            starting_credits,
            final_credits: starting_credits,
            theoretical_rtp,
            ..Self::default()
        }
    }

    /// Fold in one spin attempt made at `bet`.
    pub fn record(&mut self, bet: i64, outcome: &SpinOutcome) {
        self.final_credits = outcome.credits_after;
        if outcome.was_declined() {
            self.declined += 1;
            return;
        }
        self.spins += 1;
        self.wagered = self.wagered.saturating_add(bet);
        self.won = self.won.saturating_add(outcome.amount_won);
        if outcome.is_win() {
            self.wins += 1;
            self.biggest_win = self.biggest_win.max(outcome.amount_won);
        }
    }

    pub fn observed_rtp(&self) -> Option<f64> {
        (self.wagered > 0).then(|| self.won as f64 / self.wagered as f64)
    }

    pub fn net(&self) -> i64 {
        self.final_credits.saturating_sub(self.starting_credits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tragamonedas_core::{Paytable, ScriptedRng, SpinEngine};

    #[test]
    fn summary_tracks_a_short_session() {
        // lemons, then a split, then nothing affordable
        let rng = ScriptedRng::new([1, 1, 1, 0, 2, 3]);
        let mut engine = SpinEngine::new(3, Paytable::classic(), 10, rng).unwrap();
        let mut summary = SessionSummary::new(10, Paytable::classic().theoretical_rtp(3));

        engine.set_bet(2);
        let first = engine.spin();
        summary.record(2, &first);
        let second = engine.spin();
        summary.record(2, &second);
        engine.set_bet(50);
        let third = engine.spin();
        summary.record(50, &third);

        assert_eq!(summary.spins, 2);
        assert_eq!(summary.declined, 1);
        assert_eq!(summary.wins, 1);
        assert_eq!(summary.wagered, 4);
        assert_eq!(summary.won, 10);
        assert_eq!(summary.biggest_win, 10);
        assert_eq!(summary.final_credits, 16);
        assert_eq!(summary.net(), 6);
        assert_eq!(summary.observed_rtp(), Some(2.5));
    }

    #[test]
    fn totals_saturate_on_huge_wins() {
        let rng = ScriptedRng::new([0]);
        let mut engine = SpinEngine::new(3, Paytable::classic(), i64::MAX, rng).unwrap();
        let mut summary = SessionSummary::new(i64::MAX, 0.3);
        engine.set_bet(i64::MAX);
        for _ in 0..2 {
            let outcome = engine.spin();
            summary.record(i64::MAX, &outcome);
        }
        assert_eq!(summary.spins, 2);
        assert_eq!(summary.wagered, i64::MAX);
        assert_eq!(summary.won, i64::MAX);
        assert_eq!(summary.final_credits, i64::MAX);
        assert_eq!(summary.net(), 0);
    }

    #[test]
    fn reveal_is_serialized_only_when_present() {
        let mut summary = SessionSummary::new(100, 0.3);
        let json = serde_json::to_value(&summary).unwrap();
        assert!(json.get("fair").is_none());

        summary.fair = Some(FairReveal {
            server_seed: "s".into(),
            server_seed_hash: "h".into(),
            client_seed: "c".into(),
        });
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["fair"]["server_seed"], "s");
        assert_eq!(json["fair"]["client_seed"], "c");
    }

    #[test]
    fn empty_session_has_no_rtp() {
        let summary = SessionSummary::new(100, 0.3);
        assert_eq!(summary.observed_rtp(), None);
        assert_eq!(summary.net(), 0);
    }

    #[test]
    fn declined_report_has_no_nonce() {
        let report = SpinReport::from_outcome(3, 10, &SpinOutcome::declined(5), Some(7));
        assert!(report.declined);
        assert!(report.symbols.is_empty());
        assert_eq!(report.nonce, None);

        let json = serde_json::to_value(&report).unwrap();
        assert!(json.get("nonce").is_none());
        assert_eq!(json["credits_after"], 5);
    }
}
