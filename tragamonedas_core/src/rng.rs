use hmac::{Hmac, Mac};
use rand::{rngs::StdRng, Rng, RngCore, SeedableRng};
use sha2::{Digest, Sha256};
use tracing::trace;

pub type HmacSha256 = Hmac<Sha256>;

/// Source of reel positions.
///
/// `pick(len)` must return an index in `0..len`, uniformly distributed and
/// independent of previous calls. `len` is never zero. The engine calls
/// `begin_round` once before drawing the reels of an accepted spin.
pub trait ReelRng {
    fn pick(&mut self, len: usize) -> usize;

    fn begin_round(&mut self) {}

    /// Identifier of the current round for sources that can be replayed.
    fn round_nonce(&self) -> Option<u64> {
        None
    }
}

impl<R: ReelRng + ?Sized> ReelRng for Box<R> {
    fn pick(&mut self, len: usize) -> usize {
        (**self).pick(len)
    }

    fn begin_round(&mut self) {
        (**self).begin_round()
    }

    fn round_nonce(&self) -> Option<u64> {
        (**self).round_nonce()
    }
}

/// Any `rand` generator, sampled with `gen_range`.
#[derive(Debug, Clone)]
pub struct EntropyRng<R = StdRng> {
    inner: R,
}

impl EntropyRng<StdRng> {
    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy())
    }

    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }
}

impl<R: RngCore> EntropyRng<R> {
    pub fn new(inner: R) -> Self {
        Self { inner }
    }
}

impl<R: RngCore> ReelRng for EntropyRng<R> {
    fn pick(&mut self, len: usize) -> usize {
        if len <= 1 {
            return 0;
        }
        self.inner.gen_range(0..len)
    }
}

// Provably-fair stream:
// server_seed (secret) + client_seed + nonce -> HMAC-SHA256 -> bytes -> floats in [0,1)
// One nonce per round; the SHA-256 of the server seed is published up front.

pub fn derive_hash_hex(input: &[u8]) -> String {
    hex::encode(Sha256::digest(input))
}

pub fn derive_floats(hmac_bytes: &[u8], count: usize) -> Vec<f64> {
    // Successive 4-byte big-endian words mapped to [0,1)
    let mut out = Vec::with_capacity(count);
    let mut buffer = hmac_bytes.to_vec();
    let mut i = 0usize;
    while out.len() < count {
        if i + 4 > buffer.len() {
            // extend deterministically by hashing the previous buffer
            buffer = Sha256::digest(&buffer).to_vec();
            i = 0;
            continue;
        }
        let chunk = &buffer[i..i + 4];
        let v = u32::from_be_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
        out.push(f64::from(v) / (f64::from(u32::MAX) + 1.0));
        i += 4;
    }
    out
}

const FLOAT_BATCH: usize = 8;

#[derive(Debug, Clone)]
struct Round {
    nonce: u64,
    hmac: [u8; 32],
    floats: Vec<f64>,
    cursor: usize,
}

impl Round {
    fn next_float(&mut self) -> f64 {
        if self.cursor >= self.floats.len() {
            self.floats = derive_floats(&self.hmac, self.cursor + FLOAT_BATCH);
        }
        let f = self.floats[self.cursor];
        self.cursor += 1;
        f
    }
}

#[derive(Debug, Clone)]
pub struct ProvablyFairRng {
    server_seed: String, // secret until revealed
    client_seed: String,
    next_nonce: u64,
    round: Option<Round>,
}

impl ProvablyFairRng {
    /// `nonce` is the nonce the next round will use.
    pub fn new(server_seed: impl Into<String>, client_seed: impl Into<String>, nonce: u64) -> Self {
        Self {
            server_seed: server_seed.into(),
            client_seed: client_seed.into(),
            next_nonce: nonce,
            round: None,
        }
    }

    /// Fresh 32-byte server seed from the OS generator, hex encoded.
    pub fn random_server_seed() -> String {
        let mut bytes = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut bytes);
        hex::encode(bytes)
    }

    pub fn server_seed_hash_hex(&self) -> String {
        derive_hash_hex(self.server_seed.as_bytes())
    }

    /// Nonce of the round currently being drawn, if any round has started.
    pub fn current_nonce(&self) -> Option<u64> {
        self.round.as_ref().map(|r| r.nonce)
    }

    pub fn next_nonce(&self) -> u64 {
        self.next_nonce
    }

    pub fn hmac_bytes(&self, nonce: u64) -> [u8; 32] {
        let mut mac = HmacSha256::new_from_slice(self.server_seed.as_bytes())
            .expect("HMAC accepts keys of any length");
        let msg = format!("{}:{}", self.client_seed, nonce);
        mac.update(msg.as_bytes());
        let res = mac.finalize().into_bytes();
        let mut out = [0u8; 32];
        out.copy_from_slice(&res);
        out
    }

    pub fn floats_for(&self, nonce: u64, count: usize) -> Vec<f64> {
        derive_floats(&self.hmac_bytes(nonce), count)
    }
}

impl ReelRng for ProvablyFairRng {
    fn begin_round(&mut self) {
        let nonce = self.next_nonce;
        self.next_nonce = nonce.wrapping_add(1);
        trace!(nonce, "provably-fair round");
        self.round = Some(Round {
            nonce,
            hmac: self.hmac_bytes(nonce),
            floats: Vec::new(),
            cursor: 0,
        });
    }

    fn pick(&mut self, len: usize) -> usize {
        if self.round.is_none() {
            self.begin_round();
        }
        let f = self.round.as_mut().map_or(0.0, Round::next_float);
        ((f * len as f64).floor() as usize).min(len.saturating_sub(1))
    }

    fn round_nonce(&self) -> Option<u64> {
        self.current_nonce()
    }
}

/// Replays a fixed list of indices, wrapping around at the end.
#[derive(Debug, Clone, Default)]
pub struct ScriptedRng {
    script: Vec<usize>,
    pos: usize,
    rounds: u64,
}

impl ScriptedRng {
    pub fn new(script: impl IntoIterator<Item = usize>) -> Self {
        Self {
            script: script.into_iter().collect(),
            pos: 0,
            rounds: 0,
        }
    }

    pub fn rounds(&self) -> u64 {
        self.rounds
    }

    pub fn picks(&self) -> usize {
        self.pos
    }
}

impl ReelRng for ScriptedRng {
    fn pick(&mut self, len: usize) -> usize {
        if self.script.is_empty() || len == 0 {
            return 0;
        }
        let idx = self.script[self.pos % self.script.len()] % len;
        self.pos += 1;
        idx
    }

    fn begin_round(&mut self) {
        self.rounds += 1;
    }
}
