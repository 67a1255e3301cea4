use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::review::{average_rating, Review};

pub const MAX_LIST_NAME_LEN: usize = 50;

#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct TravelList {
    pub name: String,
    pub description: String,
    pub creator_email: String,
    pub creator_nickname: String,
    pub is_visible: bool,
    #[sqlx(json)]
    pub destinations: Vec<u32>,
    #[sqlx(json)]
    pub reviews: Vec<Review>,
    pub average_rating: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TravelList {
    pub fn new(
        name: String,
        description: String,
        creator_email: String,
        creator_nickname: String,
        is_visible: bool,
    ) -> Self {
        let now = Utc::now();
        Self {
            name,
            description,
            creator_email,
            creator_nickname,
            is_visible,
            destinations: Vec::new(),
            reviews: Vec::new(),
            average_rating: 0.0,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_owned_by(&self, email: &str) -> bool {
        self.creator_email == email
    }

    /// Applies a partial update. The modification time moves on every call,
    /// whether or not a field actually changed.
    pub fn update(&mut self, description: Option<String>, is_visible: Option<bool>) {
        if let Some(d) = description {
            self.description = d;
        }
        if let Some(v) = is_visible {
            self.is_visible = v;
        }
        self.updated_at = Utc::now();
    }

    pub fn add_review(&mut self, review: Review) -> f64 {
        self.reviews.push(review);
        self.average_rating = average_rating(&self.reviews);
        self.average_rating
    }

    pub fn visible_reviews(&self) -> Vec<&Review> {
        self.reviews.iter().filter(|r| r.is_visible).collect()
    }

    /// Returns false when `index` is out of range.
    pub fn set_review_visibility(&mut self, index: usize, visible: bool) -> bool {
        match self.reviews.get_mut(index) {
            Some(review) => {
                review.is_visible = visible;
                true
            }
            None => false,
        }
    }

    pub fn has_destination(&self, id: u32) -> bool {
        self.destinations.contains(&id)
    }

    /// Returns false when the destination is already a member.
    pub fn add_destination(&mut self, id: u32) -> bool {
        if self.has_destination(id) {
            return false;
        }
        self.destinations.push(id);
        true
    }

    /// Removing an id that is not a member leaves the set unchanged.
    pub fn remove_destination(&mut self, id: u32) {
        self.destinations.retain(|&d| d != id);
    }

    /// Appends every id not already present, deduplicating within the batch too.
    pub fn merge_destinations(&mut self, ids: &[u32]) -> usize {
        let before = self.destinations.len();
        for &id in ids {
            self.add_destination(id);
        }
        self.destinations.len() - before
    }
}
