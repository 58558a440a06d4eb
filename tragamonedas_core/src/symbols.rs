use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

/// A reel symbol: the token shown on screen and the multiplier paid when
/// every reel lands on it.
///
/// Two symbols are the same symbol when their tokens are equal; the
/// multiplier does not take part in equality.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Symbol {
    token: String,
    multiplier: u32,
}

impl Symbol {
    pub fn new(token: impl Into<String>, multiplier: u32) -> Self {
        Self {
            token: token.into(),
            multiplier,
        }
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn multiplier(&self) -> u32 {
        self.multiplier
    }
}

impl PartialEq for Symbol {
    fn eq(&self, other: &Self) -> bool {
        self.token == other.token
    }
}

impl Eq for Symbol {}

impl Hash for Symbol {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.token.hash(state);
    }
}

impl std::fmt::Display for Symbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.token)
    }
}

/// Returns the symbol every entry shares, or `None` if any token differs.
/// An empty slice has no matching symbol.
pub fn matched_symbol(symbols: &[Symbol]) -> Option<&Symbol> {
    let (first, rest) = symbols.split_first()?;
    rest.iter().all(|s| s == first).then_some(first)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn identity_is_by_token() {
        let a = Symbol::new("🍒", 10);
        let b = Symbol::new("🍒", 2);
        assert_eq!(a, b);
        let set: HashSet<Symbol> = [a, b].into_iter().collect();
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn matched_symbol_requires_every_reel() {
        let cherry = Symbol::new("🍒", 10);
        let lemon = Symbol::new("🍋", 5);
        let all = vec![cherry.clone(), cherry.clone(), cherry.clone()];
        assert_eq!(matched_symbol(&all).map(Symbol::token), Some("🍒"));

        // first and last agree, middle differs
        let split = vec![cherry.clone(), lemon, cherry];
        assert!(matched_symbol(&split).is_none());
        assert!(matched_symbol(&[]).is_none());
    }
}
