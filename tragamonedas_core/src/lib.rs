pub mod engine;
pub mod error;
pub mod paytable;
pub mod rng;
pub mod symbols;

pub use crate::engine::{
    replay_draw, verify_draw, SpinEngine, SpinOutcome, DEFAULT_CREDITS, DEFAULT_REELS,
};
pub use crate::error::{CoreError, CoreResult};
pub use crate::paytable::Paytable;
pub use crate::rng::{
    derive_floats, derive_hash_hex, EntropyRng, ProvablyFairRng, ReelRng, ScriptedRng,
};
pub use crate::symbols::{matched_symbol, Symbol};
