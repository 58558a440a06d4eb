#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error("paytable must contain at least one symbol")]
    EmptyPaytable,
    #[error("symbol {token:?} has a zero payout multiplier")]
    ZeroMultiplier { token: String },
    #[error("a slot machine needs at least one reel")]
    NoReels,
}

pub type CoreResult<T> = Result<T, CoreError>;
