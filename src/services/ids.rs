// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Document id generation.

use crate::error::{AppError, Result};
use ring::rand::{SecureRandom, SystemRandom};

/// Max characters kept from each name fragment of a player id.
const PLAYER_FRAGMENT_LEN: usize = 12;
/// Random bytes appended to player ids (hex-encoded).
const PLAYER_SUFFIX_BYTES: usize = 4;
/// Random bytes in generated ids (20 hex chars, like store auto-ids).
const RANDOM_ID_BYTES: usize = 10;

/// Lowercase and strip Spanish diacritics from one character.
fn fold_char(c: char) -> char {
    match c {
        'á' | 'à' | 'ä' | 'â' => 'a',
        'é' | 'è' | 'ë' | 'ê' => 'e',
        'í' | 'ì' | 'ï' | 'î' => 'i',
        'ó' | 'ò' | 'ö' | 'ô' => 'o',
        'ú' | 'ù' | 'ü' | 'û' => 'u',
        'ñ' => 'n',
        'ç' => 'c',
        other => other,
    }
}

/// Reduce a name fragment to `[a-z0-9]`, truncated to `max_len`.
pub fn sanitize_fragment(raw: &str, max_len: usize) -> String {
    raw.chars()
        .flat_map(char::to_lowercase)
        .map(fold_char)
        .filter(char::is_ascii_alphanumeric)
        .take(max_len)
        .collect()
}

/// Slug used as a team id: words of `[a-z0-9]` joined by `-`.
pub fn slug(name: &str) -> String {
    let folded: String = name
        .chars()
        .flat_map(char::to_lowercase)
        .map(fold_char)
        .map(|c| if c.is_ascii_alphanumeric() { c } else { ' ' })
        .collect();
    folded.split_whitespace().collect::<Vec<_>>().join("-")
}

fn random_hex(bytes: usize) -> Result<String> {
    let mut buf = vec![0u8; bytes];
    SystemRandom::new()
        .fill(&mut buf)
        .map_err(|_| AppError::Internal(anyhow::anyhow!("system random source failed")))?;
    Ok(hex::encode(buf))
}

/// Player id: sanitized name fragments plus a random suffix.
///
/// The suffix is short; uniqueness is likely, not guaranteed.
pub fn player_id(given_name: &str, surname: &str) -> Result<String> {
    let given = sanitize_fragment(given_name, PLAYER_FRAGMENT_LEN);
    let surname = sanitize_fragment(surname, PLAYER_FRAGMENT_LEN);
    Ok(format!(
        "{}-{}-{}",
        if given.is_empty() { "jugador" } else { &given },
        if surname.is_empty() { "x" } else { &surname },
        random_hex(PLAYER_SUFFIX_BYTES)?
    ))
}

/// Random id for documents without a natural key.
pub fn random_id() -> Result<String> {
    random_hex(RANDOM_ID_BYTES)
}
