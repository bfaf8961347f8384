//! Trust score heuristic used to rank candidates

/// Reviews a rating needs before it outweighs the prior
pub const PRIOR_WEIGHT: f64 = 20.0;

/// Rating assumed for a place with no reviews
pub const PRIOR_MEAN: f64 = 3.0;

const MENTION_BONUS: f64 = 0.1;
const MAX_MENTION_BONUS: f64 = 0.5;

/// Bayesian-weighted rating plus a small bonus for web mentions
///
/// Clamped to `[0, 5]` and rounded to two decimals. Places without a
/// rating start from zero.
pub fn trust_score(rating: Option<f64>, review_count: Option<u32>, web_mentions: u32) -> f64 {
    let base = match rating {
        Some(r) if r.is_finite() => {
            let v = f64::from(review_count.unwrap_or(0));
            v / (v + PRIOR_WEIGHT) * r + PRIOR_WEIGHT / (v + PRIOR_WEIGHT) * PRIOR_MEAN
        }
        _ => 0.0,
    };
    let bonus = (f64::from(web_mentions) * MENTION_BONUS).min(MAX_MENTION_BONUS);
    let score = (base + bonus).clamp(0.0, 5.0);
    (score * 100.0).round() / 100.0
}
