use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const MAX_RATING: f64 = 5.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub id: Uuid,
    pub rating: f64,
    pub comment: String,
    pub author_name: String,
    pub created_at: DateTime<Utc>,
    #[serde(default = "default_visible")]
    pub is_visible: bool,
}

fn default_visible() -> bool {
    true
}

impl Review {
    pub fn new(rating: f64, comment: String, author_name: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            rating,
            comment,
            author_name,
            created_at: Utc::now(),
            is_visible: true,
        }
    }
}

/// Ratings are any finite number from 0 to [`MAX_RATING`], fractions included.
pub fn is_valid_rating(rating: f64) -> bool {
    rating.is_finite() && (0.0..=MAX_RATING).contains(&rating)
}

/// Mean of every stored rating, hidden reviews included, rounded to one decimal.
pub fn average_rating(reviews: &[Review]) -> f64 {
    if reviews.is_empty() {
        return 0.0;
    }
    let total: f64 = reviews.iter().map(|r| r.rating).sum();
    let mean = total / reviews.len() as f64;
    (mean * 10.0).round() / 10.0
}
