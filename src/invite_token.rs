//! Opaque per-guest invite tokens.
//!
//! A token is four dash-separated alphanumeric segments (8-6-6-6). Tokens act
//! as bearer capabilities, so production callers draw them from the OS RNG.
//! Uniqueness is left to the `invited_token_key` constraint.

use rand::distributions::Alphanumeric;
use rand::rngs::OsRng;
use rand::Rng;

const SEGMENTS: [usize; 4] = [8, 6, 6, 6];

pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> String {
    let mut token = String::with_capacity(SEGMENTS.iter().sum::<usize>() + SEGMENTS.len() - 1);
    for (i, len) in SEGMENTS.iter().enumerate() {
        if i > 0 {
            token.push('-');
        }
        token.extend((0..*len).map(|_| char::from(rng.sample(Alphanumeric))));
    }
    token
}

pub fn new_invite_token() -> String {
    generate(&mut OsRng)
}

/// Cheap shape check so obviously bogus tokens never reach the database.
pub fn is_well_formed(token: &str) -> bool {
    let parts: Vec<&str> = token.split('-').collect();
    parts.len() == SEGMENTS.len()
        && parts
            .iter()
            .zip(SEGMENTS)
            .all(|(part, len)| part.len() == len && part.bytes().all(|b| b.is_ascii_alphanumeric()))
}
