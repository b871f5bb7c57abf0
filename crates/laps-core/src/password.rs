//! Random credential generation.

use crate::error::{LapsError, Result};
use rand::Rng;

const LETTERS_DIGITS: &[u8] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
const SYMBOLS: &[u8] = b"!@#$%^&*()-_=+[]{};:,.<>?";

/// Generate a random password of `length` characters drawn uniformly (with
/// replacement) from letters and digits, plus punctuation symbols when
/// `use_symbols` is set. Each call draws from the thread-local CSPRNG; no
/// state is carried between calls.
pub fn generate(length: u32, use_symbols: bool) -> Result<String> {
    if length == 0 {
        return Err(LapsError::InvalidLength(length));
    }

    let alphabet: Vec<u8> = if use_symbols {
        [LETTERS_DIGITS, SYMBOLS].concat()
    } else {
        LETTERS_DIGITS.to_vec()
    };

    let mut rng = rand::thread_rng();
    let password = (0..length)
        .map(|_| alphabet[rng.gen_range(0..alphabet.len())] as char)
        .collect();
    Ok(password)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
