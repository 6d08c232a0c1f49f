//! Flag generation and placeholder substitution.
//!
//! Recognized placeholders:
//! - `{FLAG}`: the generated flag, verbatim
//! - `{XOR_ENC}` / `{KEY}`: the flag XORed with a random single-byte key,
//!   rendered as C `\xNN` escapes, and that key in decimal
//! - `{RANDOM_INT}`: a decimal integer in `1..=10000`
//!
//! Anything else in braces is left untouched.

use rand::Rng;
use std::fmt::Write;

pub const FLAG_PLACEHOLDER: &str = "{FLAG}";
pub const XOR_PLACEHOLDER: &str = "{XOR_ENC}";
pub const KEY_PLACEHOLDER: &str = "{KEY}";
pub const RANDOM_INT_PLACEHOLDER: &str = "{RANDOM_INT}";

const FLAG_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";
const FLAG_BODY_LEN: usize = 12;
const RANDOM_INT_MAX: u32 = 10_000;

/// A template instantiated with concrete values.
#[derive(Debug, Clone)]
pub struct RenderedSource {
    pub source: String,
    pub flag: String,
    /// XOR key, when the template asked for an encoded flag.
    pub key: Option<u8>,
    pub random_int: Option<u32>,
}

/// `flag{` + 12 lowercase alphanumerics + `}`.
pub fn generate_flag<R: Rng + ?Sized>(rng: &mut R) -> String {
    let body: String = (0..FLAG_BODY_LEN)
        .map(|_| FLAG_ALPHABET[rng.gen_range(0..FLAG_ALPHABET.len())] as char)
        .collect();
    format!("flag{{{}}}", body)
}

/// XOR every byte with `key` and render as `\xNN` escapes.
pub fn xor_escape(data: &[u8], key: u8) -> String {
    let mut out = String::with_capacity(data.len() * 4);
    for b in data {
        // Writing to a String cannot fail.
        let _ = write!(out, "\\x{:02x}", b ^ key);
    }
    out
}

/// Substitute every recognized placeholder in `template`.
pub fn render<R: Rng + ?Sized>(template: &str, rng: &mut R) -> RenderedSource {
    let flag = generate_flag(rng);
    render_with_flag(template, flag, rng)
}

/// Same as [`render`] with a caller-chosen flag.
pub fn render_with_flag<R: Rng + ?Sized>(
    template: &str,
    flag: String,
    rng: &mut R,
) -> RenderedSource {
    let mut source = template.replace(FLAG_PLACEHOLDER, &flag);

    let mut key = None;
    if source.contains(XOR_PLACEHOLDER) {
        let k: u8 = rng.gen_range(1..=255);
        source = source
            .replace(XOR_PLACEHOLDER, &xor_escape(flag.as_bytes(), k))
            .replace(KEY_PLACEHOLDER, &k.to_string());
        key = Some(k);
    }

    let mut random_int = None;
    if source.contains(RANDOM_INT_PLACEHOLDER) {
        let n = rng.gen_range(1..=RANDOM_INT_MAX);
        source = source.replace(RANDOM_INT_PLACEHOLDER, &n.to_string());
        random_int = Some(n);
    }

    RenderedSource {
        source,
        flag,
        key,
        random_int,
    }
}
