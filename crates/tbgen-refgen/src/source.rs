use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Pseudo-random test data for one `(data_width, length)` artifact.
///
/// The run seed picks the key and the artifact identity picks the ChaCha stream, so every
/// artifact gets its own reproducible sequence.
pub fn random_bytes(seed: i32, data_width: u32, length: usize) -> Vec<u8> {
    let mut rng = ChaCha8Rng::seed_from_u64(u64::from(seed as u32));
    rng.set_stream((u64::from(data_width) << 32) | length as u64);
    (0..length).map(|_| rng.gen::<u8>()).collect()
}
