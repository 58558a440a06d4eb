use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{
    error::{CoreError, CoreResult},
    paytable::Paytable,
    rng::{ProvablyFairRng, ReelRng},
    symbols::{matched_symbol, Symbol},
};

pub const DEFAULT_CREDITS: i64 = 100;
pub const DEFAULT_REELS: usize = 3;

/// Result of one spin attempt.
///
/// `drawn` is `None` when the spin was declined; in that case nothing else
/// changed and `amount_won` is zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpinOutcome {
    pub drawn: Option<Vec<Symbol>>,
    pub amount_won: i64,
    pub credits_after: i64,
}

impl SpinOutcome {
    pub fn declined(credits: i64) -> Self {
        Self {
            drawn: None,
            amount_won: 0,
            credits_after: credits,
        }
    }

    pub fn was_declined(&self) -> bool {
        self.drawn.is_none()
    }

    pub fn is_win(&self) -> bool {
        self.amount_won > 0
    }

    pub fn tokens(&self) -> Vec<&str> {
        self.drawn
            .iter()
            .flatten()
            .map(Symbol::token)
            .collect()
    }
}

/// Credit and bet ledger for one session plus the reels it spins.
#[derive(Debug)]
pub struct SpinEngine<R> {
    reel_count: usize,
    paytable: Paytable,
    bet: i64,
    credits: i64,
    rng: R,
}

impl<R: ReelRng> SpinEngine<R> {
    pub fn new(
        reel_count: usize,
        paytable: Paytable,
        initial_credits: i64,
        rng: R,
    ) -> CoreResult<Self> {
        if reel_count == 0 {
            return Err(CoreError::NoReels);
        }
        Ok(Self {
            reel_count,
            paytable,
            bet: 0,
            credits: initial_credits,
            rng,
        })
    }

    /// Three reels over the classic table with the default starting credits.
    pub fn classic(rng: R) -> Self {
        Self {
            reel_count: DEFAULT_REELS,
            paytable: Paytable::classic(),
            bet: 0,
            credits: DEFAULT_CREDITS,
            rng,
        }
    }

    pub fn credits(&self) -> i64 {
        self.credits
    }

    pub fn bet(&self) -> i64 {
        self.bet
    }

    pub fn reel_count(&self) -> usize {
        self.reel_count
    }

    pub fn paytable(&self) -> &Paytable {
        &self.paytable
    }

    pub fn rng(&self) -> &R {
        &self.rng
    }

    /// Stores any amount. Out-of-range bets are legal but disable spinning.
    pub fn set_bet(&mut self, amount: i64) {
        self.bet = amount;
    }

    pub fn can_spin(&self) -> bool {
        self.credits >= self.bet && self.bet > 0
    }

    /// Moves the bet by `delta` if the result stays within `1..=credits`.
    /// Returns whether the bet changed.
    pub fn adjust_bet(&mut self, delta: i64) -> bool {
        match self.bet.checked_add(delta) {
            Some(proposed) if proposed >= 1 && proposed <= self.credits => {
                self.bet = proposed;
                true
            }
            _ => false,
        }
    }

    pub fn increase_bet(&mut self) -> bool {
        self.adjust_bet(1)
    }

    pub fn decrease_bet(&mut self) -> bool {
        self.adjust_bet(-1)
    }

    pub fn spin(&mut self) -> SpinOutcome {
        if !self.can_spin() {
            debug!(bet = self.bet, credits = self.credits, "spin declined");
            return SpinOutcome::declined(self.credits);
        }

        self.credits -= self.bet;
        self.rng.begin_round();
        let drawn: Vec<Symbol> = (0..self.reel_count)
            .map(|reel| {
                let symbol = self.paytable.draw(&mut self.rng).clone();
                debug!(reel, token = symbol.token(), "reel stopped");
                symbol
            })
            .collect();

        let amount_won = evaluate_payout(&drawn, self.bet);
        self.credits = self.credits.saturating_add(amount_won);
        info!(
            bet = self.bet,
            amount_won,
            credits = self.credits,
            "spin resolved"
        );

        SpinOutcome {
            drawn: Some(drawn),
            amount_won,
            credits_after: self.credits,
        }
    }
}

/// Exact match across every reel pays the symbol's multiplier times the bet.
/// Payouts and credits saturate at `i64::MAX`, so near that ceiling the
/// balance no longer equals `before - bet + amount_won`.
fn evaluate_payout(drawn: &[Symbol], bet: i64) -> i64 {
    matched_symbol(drawn)
        .map(|s| i64::from(s.multiplier()).saturating_mul(bet))
        .unwrap_or(0)
}

/// Recompute the symbols a provably-fair round drew.
pub fn replay_draw(
    server_seed: &str,
    client_seed: &str,
    nonce: u64,
    paytable: &Paytable,
    reel_count: usize,
) -> Vec<Symbol> {
    let mut rng = ProvablyFairRng::new(server_seed, client_seed, nonce);
    rng.begin_round();
    (0..reel_count)
        .map(|_| paytable.draw(&mut rng).clone())
        .collect()
}

/// Check that `tokens` are what the round with these seeds would have drawn.
pub fn verify_draw(
    server_seed: &str,
    client_seed: &str,
    nonce: u64,
    paytable: &Paytable,
    tokens: &[&str],
) -> bool {
    let actual = replay_draw(server_seed, client_seed, nonce, paytable, tokens.len());
    actual.iter().map(Symbol::token).eq(tokens.iter().copied())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::ScriptedRng;

    // classic indices: 0 cherry, 1 lemon, 2 orange, 3 star
    fn engine(script: &[usize], credits: i64, bet: i64) -> SpinEngine<ScriptedRng> {
        let mut engine =
            SpinEngine::new(3, Paytable::classic(), credits, ScriptedRng::new(script.to_vec()))
                .unwrap();
        engine.set_bet(bet);
        engine
    }

    #[test]
    fn three_cherries_pay_ten_times() {
        let mut e = engine(&[0, 0, 0], 100, 10);
        let out = e.spin();
        assert_eq!(out.tokens(), vec!["🍒", "🍒", "🍒"]);
        assert_eq!(out.amount_won, 100);
        assert_eq!(out.credits_after, 190);
        assert_eq!(e.credits(), 190);
    }

    #[test]
    fn split_draw_pays_nothing() {
        let mut e = engine(&[0, 1, 0], 100, 10);
        let out = e.spin();
        assert_eq!(out.tokens(), vec!["🍒", "🍋", "🍒"]);
        assert_eq!(out.amount_won, 0);
        assert_eq!(out.credits_after, 90);
    }

    #[test]
    fn bet_above_credits_is_declined() {
        let mut e = engine(&[0], 5, 10);
        assert!(!e.can_spin());
        let out = e.spin();
        assert_eq!(out, SpinOutcome::declined(5));
        assert_eq!(e.credits(), 5);
        assert_eq!(e.rng().rounds(), 0);
        assert_eq!(e.rng().picks(), 0);
    }

    #[test]
    fn non_positive_bets_are_declined() {
        for bet in [0, -3] {
            let mut e = engine(&[0], 100, bet);
            assert!(!e.can_spin());
            assert!(e.spin().was_declined());
            assert_eq!(e.credits(), 100);
            assert_eq!(e.bet(), bet);
        }
    }

    #[test]
    fn betting_everything_is_allowed() {
        let mut e = engine(&[3, 2, 1], 7, 7);
        assert!(e.can_spin());
        let out = e.spin();
        assert_eq!(out.credits_after, 0);
        assert!(!e.can_spin());
    }

    #[test]
    fn win_on_last_credit() {
        let mut e = engine(&[3, 3, 3], 4, 4);
        let out = e.spin();
        assert_eq!(out.amount_won, 4);
        assert_eq!(out.credits_after, 4);
    }

    #[test]
    fn one_round_per_accepted_spin() {
        let mut e = engine(&[1, 1, 1, 2, 0, 3], 100, 1);
        e.spin();
        e.spin();
        assert_eq!(e.rng().rounds(), 2);
        assert_eq!(e.rng().picks(), 6);
    }

    #[test]
    fn bet_adjustment_stays_in_range() {
        let mut e = engine(&[0], 3, 1);
        assert!(!e.decrease_bet());
        assert_eq!(e.bet(), 1);
        assert!(e.increase_bet());
        assert!(e.increase_bet());
        assert_eq!(e.bet(), 3);
        assert!(!e.increase_bet());
        assert_eq!(e.bet(), 3);
        assert!(e.decrease_bet());
        assert_eq!(e.bet(), 2);
    }

    #[test]
    fn adjustment_from_invalid_bet() {
        let mut e = engine(&[0], 10, 0);
        assert!(!e.decrease_bet());
        assert!(e.increase_bet());
        assert_eq!(e.bet(), 1);

        e.set_bet(i64::MAX);
        assert!(!e.increase_bet());
        assert_eq!(e.bet(), i64::MAX);
    }

    #[test]
    fn payout_saturates_at_the_ceiling() {
        let mut e = engine(&[0, 0, 0], i64::MAX, i64::MAX);
        let out = e.spin();
        assert_eq!(out.amount_won, i64::MAX);
        assert_eq!(out.credits_after, i64::MAX);

        // below the ceiling the ledger identity is exact
        let mut e = engine(&[0, 0, 0], i64::MAX / 11, i64::MAX / 11);
        let before = e.credits();
        let out = e.spin();
        assert_eq!(out.credits_after, before - e.bet() + out.amount_won);
    }

    #[test]
    fn zero_reels_rejected() {
        let err = SpinEngine::new(0, Paytable::classic(), 100, ScriptedRng::default()).unwrap_err();
        assert_eq!(err, CoreError::NoReels);
    }

    #[test]
    fn single_reel_always_wins() {
        let mut e = SpinEngine::new(1, Paytable::classic(), 10, ScriptedRng::new([2])).unwrap();
        e.set_bet(2);
        let out = e.spin();
        assert_eq!(out.amount_won, 6);
        assert_eq!(out.credits_after, 14);
    }

    #[test]
    fn verify_accepts_the_engine_draw() {
        let table = Paytable::classic();
        let rng = ProvablyFairRng::new("server", "client", 0);
        let mut e = SpinEngine::new(3, table.clone(), 100, rng).unwrap();
        e.set_bet(1);
        e.spin();
        let out = e.spin();
        let nonce = e.rng().current_nonce().unwrap();
        assert_eq!(nonce, 1);
        let tokens = out.tokens();
        assert!(verify_draw("server", "client", nonce, &table, &tokens));

        let mut forged = tokens.clone();
        forged[1] = if forged[1] == "🍒" { "🍋" } else { "🍒" };
        assert!(!verify_draw("server", "client", nonce, &table, &forged));
    }
}
