//! Score & vector utilities (spec §4.A).
//!
//! Small, pure numeric building blocks shared by the inference model, the
//! aligner's similarity matrix, and the orchestrator's score fusion.

/// Cosine similarity over the shorter of the two vectors' dimensions.
/// Returns `0.0` for empty input or either zero-norm vector.
pub fn cosine(a: &[f64], b: &[f64]) -> f64 {
    let n = a.len().min(b.len());
    if n == 0 {
        return 0.0;
    }
    let mut dot = 0.0;
    let mut norm_a = 0.0;
    let mut norm_b = 0.0;
    for i in 0..n {
        dot += a[i] * b[i];
        norm_a += a[i] * a[i];
        norm_b += b[i] * b[i];
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a.sqrt() * norm_b.sqrt())
}

/// Clamp to `[0, 1]`; `NaN` and `+-inf` map to `0`.
pub fn clamp01(v: f64) -> f64 {
    if !v.is_finite() {
        return 0.0;
    }
    v.clamp(0.0, 1.0)
}

/// `((modified - original) / |original|) * 100`, with the `original == 0`
/// edge case resolved to `0` when `modified` is also `0`, else `100`.
pub fn delta_percent(original: f64, modified: f64) -> f64 {
    if original == 0.0 {
        return if modified == 0.0 { 0.0 } else { 100.0 };
    }
    ((modified - original) / original.abs()) * 100.0
}

/// A minimal, dependency-free xorshift64 PRNG used only to expand a BLAKE3
/// digest into more lanes than the digest itself provides — not used for
/// anything security-sensitive.
struct XorShift64(u64);

impl XorShift64 {
    fn next_u64(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        x
    }
}

/// Reproducible pseudo-embedding: hash `smiles` with BLAKE3 (same technique
/// the teacher's `transcript.rs` uses for its Fiat-Shamir challenges), seed a
/// xorshift64 generator from the digest, expand into `dim` lanes in
/// `[-1, 1]`, then L2-normalize. Identical input always yields a
/// byte-identical vector; distinct inputs yield distinct vectors with
/// overwhelming probability; the output norm is always `1` (or the zero
/// vector only if `dim == 0`).
pub fn deterministic_embed(smiles: &str, dim: usize) -> Vec<f64> {
    if dim == 0 {
        return Vec::new();
    }
    let digest = blake3::hash(smiles.as_bytes());
    let bytes = digest.as_bytes();
    let seed = u64::from_le_bytes(bytes[0..8].try_into().unwrap()) ^ (smiles.len() as u64 + 1);
    let mut rng = XorShift64(seed | 1); // must be non-zero for xorshift to not get stuck at 0

    let mut v = Vec::with_capacity(dim);
    for _ in 0..dim {
        let bits = rng.next_u64();
        // Map the top 53 bits to a uniform double in [0, 1), then to [-1, 1].
        let unit = (bits >> 11) as f64 / (1u64 << 53) as f64;
        v.push(unit * 2.0 - 1.0);
    }

    let norm = v.iter().map(|x| x * x).sum::<f64>().sqrt();
    if norm > 0.0 {
        for x in v.iter_mut() {
            *x /= norm;
        }
    }
    v
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cosine_identities() {
        let v = [1.0, 2.0, 3.0];
        let neg: Vec<f64> = v.iter().map(|x| -x).collect();
        assert!((cosine(&v, &v) - 1.0).abs() < 1e-9);
        assert!((cosine(&v, &neg) - (-1.0)).abs() < 1e-9);

        let e1 = [1.0, 0.0];
        let e2 = [0.0, 1.0];
        assert!(cosine(&e1, &e2).abs() < 1e-9);
    }

    #[test]
    fn cosine_handles_empty_and_zero_norm() {
        assert_eq!(cosine(&[], &[]), 0.0);
        assert_eq!(cosine(&[0.0, 0.0], &[1.0, 2.0]), 0.0);
    }

    #[test]
    fn cosine_operates_over_shorter_dimension() {
        let a = [1.0, 0.0, 0.0, 99.0];
        let b = [1.0, 0.0];
        assert!((cosine(&a, &b) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn clamp01_handles_nan_and_infinities() {
        assert_eq!(clamp01(f64::NAN), 0.0);
        assert_eq!(clamp01(f64::INFINITY), 0.0);
        assert_eq!(clamp01(f64::NEG_INFINITY), 0.0);
        assert_eq!(clamp01(-0.5), 0.0);
        assert_eq!(clamp01(1.5), 1.0);
        assert_eq!(clamp01(0.3), 0.3);
    }

    #[test]
    fn delta_percent_zero_original_edge_case() {
        assert_eq!(delta_percent(0.0, 0.0), 0.0);
        assert_eq!(delta_percent(0.0, 5.0), 100.0);
        assert_eq!(delta_percent(0.0, -5.0), 100.0);
    }

    #[test]
    fn delta_percent_general_case() {
        assert!((delta_percent(10.0, 12.0) - 20.0).abs() < 1e-9);
        assert!((delta_percent(-10.0, -12.0) - (-20.0)).abs() < 1e-9);
    }

    #[test]
    fn embedding_is_deterministic() {
        let a = deterministic_embed("c1ccccc1", 32);
        let b = deterministic_embed("c1ccccc1", 32);
        assert_eq!(a, b);
    }

    #[test]
    fn embedding_differs_across_inputs() {
        let a = deterministic_embed("c1ccccc1", 32);
        let b = deterministic_embed("CCO", 32);
        assert_ne!(a, b);
    }

    #[test]
    fn embedding_is_unit_norm() {
        let v = deterministic_embed("CC(=O)Oc1ccccc1C(=O)O", 64);
        let norm = v.iter().map(|x| x * x).sum::<f64>().sqrt();
        assert!((norm - 1.0).abs() < 1e-4);
    }
}
