//! Keyword sentiment estimate for free-text tweets.
//!
//! Used when a model-written tweet arrives without a usable sentiment score.
//! The estimate averages a keyword balance with the author's built-in bias
//! (`fomo_susceptibility - fud_generation`).

use ctsim_types::Persona;

const POSITIVE: &[&str] = &[
    "moon", "lfg", "wagmi", "bullish", "gem", "early", "based", "100x", "alpha",
];

const NEGATIVE: &[&str] = &["rug", "scam", "honeypot", "ngmi", "dead", "dump", "sell", "exit"];

/// Estimate the sentiment of `content` written by `author`, in `[-1, 1]`.
#[allow(clippy::cast_precision_loss)]
pub fn estimate(content: &str, author: &Persona) -> f64 {
    let lower = content.to_lowercase();
    let positive = POSITIVE.iter().filter(|word| lower.contains(*word)).count();
    let negative = NEGATIVE.iter().filter(|word| lower.contains(*word)).count();

    let total = positive.saturating_add(negative).max(1) as f64;
    let base = (positive as f64 - negative as f64) / total;
    let bias = author.fomo_susceptibility - author.fud_generation;
    ((base + bias) / 2.0).clamp(-1.0, 1.0)
}
