//! Seed producers. Every variant yields a draw in `[0, 1)`; the wheel maps
//! it onto the circle.

use std::time::Duration;

use hmac::{Hmac, Mac};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use sha2::Sha256;
use tracing::debug;

use crate::error::WheelError;
use roleta_shared::SeedResponse;

pub type HmacSha256 = Hmac<Sha256>;

/// Ceiling on a network seed round-trip before the caller falls back.
pub const SEED_TIMEOUT: Duration = Duration::from_secs(5);

pub fn derive_hash_hex(input: &[u8]) -> String {
    use sha2::Digest;
    let mut hasher = Sha256::new();
    hasher.update(input);
    hex::encode(hasher.finalize())
}

/// Map HMAC output bytes to floats in [0,1), 4 bytes per float. The buffer
/// is extended deterministically by re-hashing when exhausted.
pub fn derive_floats(hmac_bytes: &[u8], count: usize) -> Vec<f64> {
    let mut out = Vec::with_capacity(count);
    let mut buffer = hmac_bytes.to_vec();
    let mut i = 0usize;
    while out.len() < count {
        if i + 4 > buffer.len() {
            let hex = derive_hash_hex(&buffer);
            buffer = hex::decode(hex).expect("valid hex");
            i = 0;
            continue;
        }
        let chunk = &buffer[i..i + 4];
        let v = u32::from_be_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
        out.push((v as f64) / (u32::MAX as f64 + 1.0));
        i += 4;
    }
    out
}

/// Provably-fair seed stream: HMAC-SHA256(server_seed, "client_seed:nonce")
/// mapped to `[0, 1)`. The nonce advances per draw, so one configured stream
/// yields a whole verifiable sequence; publish `server_seed_hash_hex` up
/// front and reveal the server seed afterwards for audit.
#[derive(Debug, Clone)]
pub struct FairRng {
    server_seed: String,
    client_seed: String,
    nonce: u64,
}

impl FairRng {
    pub fn new(server_seed: impl Into<String>, client_seed: impl Into<String>, nonce: u64) -> Self {
        Self {
            server_seed: server_seed.into(),
            client_seed: client_seed.into(),
            nonce,
        }
    }

    pub fn server_seed_hash_hex(&self) -> String {
        derive_hash_hex(self.server_seed.as_bytes())
    }

    pub fn nonce(&self) -> u64 {
        self.nonce
    }

    fn hmac_bytes(&self) -> [u8; 32] {
        let mut mac = HmacSha256::new_from_slice(self.server_seed.as_bytes()).expect("HMAC key");
        let msg = format!("{}:{}", self.client_seed, self.nonce);
        mac.update(msg.as_bytes());
        let res = mac.finalize().into_bytes();
        let mut out = [0u8; 32];
        out.copy_from_slice(&res);
        out
    }

    /// The draw at the current nonce, without advancing.
    pub fn current_seed(&self) -> f64 {
        derive_floats(&self.hmac_bytes(), 1)[0]
    }

    /// Draw and advance the nonce.
    pub fn next_seed(&mut self) -> f64 {
        let seed = self.current_seed();
        self.nonce += 1;
        seed
    }
}

/// Local PRNG source, synchronous and always available.
#[derive(Debug)]
pub struct LocalRng(StdRng);

impl LocalRng {
    pub fn from_entropy() -> Self {
        Self(StdRng::from_entropy())
    }

    /// Reproducible stream for simulations and tests.
    pub fn seeded(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }

    pub fn next_seed(&mut self) -> f64 {
        self.0.gen::<f64>()
    }
}

/// Client for an external verifiable randomness endpoint returning a
/// `SeedResponse`. Every call is bounded by [`SEED_TIMEOUT`].
#[derive(Debug, Clone)]
pub struct ExternalSeedClient {
    http: reqwest::Client,
    url: String,
}

impl ExternalSeedClient {
    pub fn new(url: impl Into<String>) -> Self {
        let http = reqwest::Client::builder()
            .timeout(SEED_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self {
            http,
            url: url.into(),
        }
    }

    pub async fn fetch_seed(&self) -> Result<f64, WheelError> {
        let resp = self
            .http
            .get(&self.url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| WheelError::RandomnessUnavailable(e.to_string()))?;
        let body: SeedResponse = resp
            .json()
            .await
            .map_err(|e| WheelError::RandomnessUnavailable(e.to_string()))?;
        debug!(nonce = body.nonce, "external seed drawn");
        // The service owns the draw; we only map it into [0, 1).
        Ok(body.seed.rem_euclid(1.0))
    }
}

/// The closed set of seed producers the wheel can be wired to.
#[derive(Debug)]
pub enum SeedSource {
    Local(LocalRng),
    Fair(FairRng),
    External(ExternalSeedClient),
}

impl SeedSource {
    /// One seed in `[0, 1)`. Network-backed variants report
    /// `RandomnessUnavailable` on any failure or timeout; they never block
    /// past [`SEED_TIMEOUT`].
    pub async fn generate_seed(&mut self) -> Result<f64, WheelError> {
        match self {
            SeedSource::Local(rng) => Ok(rng.next_seed()),
            SeedSource::Fair(rng) => Ok(rng.next_seed()),
            SeedSource::External(client) => client.fetch_seed().await,
        }
    }
}
