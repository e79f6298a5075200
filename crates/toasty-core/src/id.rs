//! Toast identifier generation.

use std::fmt::Write;

use rand::Rng;

/// Prefix shared by every generated identifier.
pub const ID_PREFIX: &str = "toastyMostly";

const SEGMENTS: usize = 8;

/// Generate a fresh identifier from the thread-local RNG.
///
/// Not cryptographically secure; uniqueness is probabilistic.
pub fn generate() -> String {
    generate_with(&mut rand::thread_rng())
}

/// Generate an identifier from the given random source.
pub fn generate_with<R: Rng + ?Sized>(rng: &mut R) -> String {
    let mut id = String::with_capacity(ID_PREFIX.len() + SEGMENTS * 4);
    id.push_str(ID_PREFIX);
    for _ in 0..SEGMENTS {
        push_segment(&mut id, rng.gen_range(0.0..1.0));
    }
    id
}

/// Scale `r` in `[0, 1)` into `[0x10000, 0x20000)` and keep the low four hex
/// digits, so every segment is exactly four characters wide.
fn push_segment(out: &mut String, r: f64) {
    let scaled = ((1.0 + r) * f64::from(0x1_0000u32)) as u32;
    let _ = write!(out, "{:04x}", scaled & 0xffff);
}
