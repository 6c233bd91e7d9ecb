use docqa_core::config::Similarity;

pub fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

/// Cosine similarity; zero vectors score 0 rather than NaN.
pub fn cosine(a: &[f32], b: &[f32]) -> f32 {
    let denom = dot(a, a).sqrt() * dot(b, b).sqrt();
    if denom <= f32::EPSILON { 0.0 } else { dot(a, b) / denom }
}

pub fn score(similarity: Similarity, query: &[f32], stored: &[f32]) -> f32 {
    match similarity {
        Similarity::Cosine => cosine(query, stored),
        Similarity::InnerProduct => dot(query, stored),
    }
}
