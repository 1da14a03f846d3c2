//! Guest rating buckets used by the listing filters and rating badges.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RatingBucket {
    pub min: f64,
    /// Exclusive upper bound.
    pub max: f64,
    pub label: &'static str,
}

pub const RATING_BUCKETS: &[RatingBucket] = &[
    RatingBucket { min: 6.0, max: 7.0, label: "Nice" },
    RatingBucket { min: 7.0, max: 8.0, label: "Very Good" },
    RatingBucket { min: 8.0, max: 9.0, label: "Excellent" },
    RatingBucket { min: 9.0, max: f64::INFINITY, label: "Exceptional" },
];

/// Bucket whose lower bound equals `min`.
pub fn bucket_starting_at(min: f64) -> Option<&'static RatingBucket> {
    RATING_BUCKETS.iter().find(|b| b.min == min)
}

/// Badge label for a rating, `None` below the lowest bucket.
pub fn label_for(rating: f64) -> Option<&'static str> {
    RATING_BUCKETS
        .iter()
        .find(|b| b.contains(rating))
        .map(|b| b.label)
}

impl RatingBucket {
    pub fn contains(&self, rating: f64) -> bool {
        rating >= self.min && rating < self.max
    }
}
