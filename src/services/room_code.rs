//! Room code allocation. Codes are short, human-shareable, and unique among
//! active (waiting or playing) games; codes of finished or deleted games go
//! back into the pool.

use std::sync::Arc;

use rand::Rng;
use tracing::warn;

use crate::{dao::game_store::GameStore, error::GameError};

/// Fixed 32-symbol alphabet. Digits 0/1 and letters I/O are excluded because
/// they are too easy to confuse when a code is read out loud or typed back.
pub const CODE_ALPHABET: &[u8] = b"23456789ABCDEFGHJKLMNPQRSTUVWXYZ";
/// Length of every room code.
pub const CODE_LENGTH: usize = 6;
/// Collision retries before handing out an unchecked candidate.
const MAX_ATTEMPTS: usize = 5;

/// Whether a string is a well-formed room code.
pub fn is_valid_code(code: &str) -> bool {
    code.len() == CODE_LENGTH && code.bytes().all(|byte| CODE_ALPHABET.contains(&byte))
}

fn random_code() -> String {
    let mut rng = rand::rng();
    (0..CODE_LENGTH)
        .map(|_| CODE_ALPHABET[rng.random_range(0..CODE_ALPHABET.len())] as char)
        .collect()
}

/// Allocate a code not bound to any active game.
///
/// Generates and checks against the store up to [`MAX_ATTEMPTS`] times. If
/// every candidate collides the last one is returned anyway: with a 32^6 code
/// space the odds of that at realistic concurrency are negligible, and a
/// best-effort code beats blocking room creation.
pub async fn allocate(store: &Arc<dyn GameStore>) -> Result<String, GameError> {
    for _ in 0..MAX_ATTEMPTS {
        let candidate = random_code();
        if store.find_active_by_code(&candidate).await?.is_none() {
            return Ok(candidate);
        }
    }

    let fallback = random_code();
    warn!(code = %fallback, "room code allocator exhausted retries; returning unchecked code");
    Ok(fallback)
}
