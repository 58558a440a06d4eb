use serde::{Deserialize, Serialize};

use crate::{
    error::{CoreError, CoreResult},
    rng::ReelRng,
    symbols::Symbol,
};

/// The ordered set of symbols every reel draws from, fixed once built.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "Vec<Symbol>", into = "Vec<Symbol>")]
pub struct Paytable(Vec<Symbol>);

impl Paytable {
    pub fn new<I, T>(entries: I) -> CoreResult<Self>
    where
        I: IntoIterator<Item = (T, u32)>,
        T: Into<String>,
    {
        let symbols = entries
            .into_iter()
            .map(|(token, multiplier)| Symbol::new(token, multiplier))
            .collect::<Vec<_>>();
        Self::from_symbols(symbols)
    }

    pub fn from_symbols(symbols: Vec<Symbol>) -> CoreResult<Self> {
        if symbols.is_empty() {
            return Err(CoreError::EmptyPaytable);
        }
        if let Some(s) = symbols.iter().find(|s| s.multiplier() == 0) {
            return Err(CoreError::ZeroMultiplier {
                token: s.token().to_string(),
            });
        }
        Ok(Self(symbols))
    }

    /// Cherry, lemon, orange and star, highest payout first.
    pub fn classic() -> Self {
        Self(vec![
            Symbol::new("🍒", 10),
            Symbol::new("🍋", 5),
            Symbol::new("🍊", 3),
            Symbol::new("⭐", 1),
        ])
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    // Construction guarantees at least one entry.
    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn symbols(&self) -> &[Symbol] {
        &self.0
    }

    /// One independent draw, each entry with probability `1 / len`.
    pub fn draw<R: ReelRng + ?Sized>(&self, rng: &mut R) -> &Symbol {
        let len = self.0.len();
        // Clamp in case a source hands back an out-of-range index.
        let idx = rng.pick(len).min(len - 1);
        &self.0[idx]
    }

    pub fn multiplier_of(&self, token: &str) -> Option<u32> {
        self.0
            .iter()
            .find(|s| s.token() == token)
            .map(Symbol::multiplier)
    }

    /// Expected amount returned per unit bet over `reel_count` uniform reels.
    pub fn theoretical_rtp(&self, reel_count: usize) -> f64 {
        let reels = i32::try_from(reel_count).unwrap_or(i32::MAX);
        let p_all = (1.0 / self.0.len() as f64).powi(reels);
        self.0
            .iter()
            .map(|s| s.multiplier() as f64 * p_all)
            .sum()
    }
}

impl TryFrom<Vec<Symbol>> for Paytable {
    type Error = CoreError;

    fn try_from(symbols: Vec<Symbol>) -> CoreResult<Self> {
        Self::from_symbols(symbols)
    }
}

impl From<Paytable> for Vec<Symbol> {
    fn from(table: Paytable) -> Self {
        table.0
    }
}
