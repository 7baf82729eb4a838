//! Hashed character-trigram embeddings for the local reference backend
//!
//! Deterministic, dependency-light text vectors: lowercase the text, slide a
//! 3-character window, hash each trigram into one of [`EMBEDDING_DIM`]
//! buckets with a sign bit, then L2-normalize. Identical texts embed
//! identically (distance 0), texts sharing wording land close, unrelated
//! texts land near distance 1.0. Not a semantic model; production
//! deployments plug a real embedding backend behind the `VectorStore` trait.

use sha2::{Digest, Sha256};

use crate::constants::EMBEDDING_DIM;

/// Embed text into a normalized [`EMBEDDING_DIM`]-dimensional vector.
pub fn embed(text: &str) -> Vec<f32> {
    let mut vector = vec![0.0f32; EMBEDDING_DIM];

    let normalized = text.to_lowercase();
    let chars: Vec<char> = normalized.chars().collect();

    if chars.len() < 3 {
        // Degenerate input: hash the whole string as a single token
        bump(&mut vector, normalized.as_bytes());
    } else {
        for window in chars.windows(3) {
            let trigram: String = window.iter().collect();
            bump(&mut vector, trigram.as_bytes());
        }
    }

    l2_normalize(&mut vector);
    vector
}

/// Cosine distance between two normalized vectors: 0 identical, ~1 unrelated,
/// 2 opposite. Mismatched dimensions count as maximally distant.
pub fn cosine_distance(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 2.0;
    }

    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    (1.0 - dot).clamp(0.0, 2.0)
}

fn bump(vector: &mut [f32], token: &[u8]) {
    let digest = Sha256::digest(token);
    let bucket = u64::from_le_bytes(digest[0..8].try_into().unwrap()) as usize % vector.len();
    let sign = if digest[8] & 1 == 0 { 1.0 } else { -1.0 };
    vector[bucket] += sign;
}

fn l2_normalize(vector: &mut [f32]) {
    let norm: f32 = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
    if norm > 0.0 {
        for v in vector.iter_mut() {
            *v /= norm;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_texts_embed_identically() {
        let a = embed("dùng PostgreSQL cho database chính");
        let b = embed("dùng PostgreSQL cho database chính");
        assert!(cosine_distance(&a, &b) < 1e-6);
    }

    #[test]
    fn test_case_insensitive() {
        let a = embed("Use PostgreSQL");
        let b = embed("use postgresql");
        assert!(cosine_distance(&a, &b) < 1e-6);
    }

    #[test]
    fn test_similar_texts_are_closer_than_unrelated() {
        let base = embed("token mới: xyz123");
        let similar = embed("token mới: abc999");
        let unrelated = embed("deploy pipeline finished without warnings today");

        let d_similar = cosine_distance(&base, &similar);
        let d_unrelated = cosine_distance(&base, &unrelated);
        assert!(d_similar < d_unrelated);
        // Shared wording keeps near-duplicates inside the conflict window
        assert!(d_similar < 0.8, "got {d_similar}");
        assert!(d_unrelated > 0.8, "got {d_unrelated}");
    }

    #[test]
    fn test_vectors_are_normalized() {
        let v = embed("some arbitrary content with enough characters");
        let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_short_input_does_not_panic() {
        let v = embed("ok");
        assert_eq!(v.len(), EMBEDDING_DIM);
        assert!(cosine_distance(&v, &embed("ok")) < 1e-6);
    }
}
