//! Sample data for stream tests

use rand::{rngs::StdRng, Rng, SeedableRng};

/// Deterministic pseudo-random bytes
pub fn random_bytes(len: usize, seed: u64) -> Vec<u8> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..len).map(|_| rng.gen()).collect()
}

/// Text whose lines end with a rotating mix of `\n`, `\r\n` and `\r`
pub fn mixed_line_endings(lines: usize) -> String {
    let endings = ["\n", "\r\n", "\r"];
    let mut text = String::new();
    for i in 0..lines {
        text.push_str(&format!("line {} ünïcødé", i));
        text.push_str(endings[i % endings.len()]);
    }
    text
}
