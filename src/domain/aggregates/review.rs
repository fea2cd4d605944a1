//! Review Aggregate

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::domain::events::{DomainEvent, ReviewEvent};
use crate::domain::value_objects::Language;

const ANONYMOUS: &str = "Anonymous";

/// Review submitted alongside an add-to-cart.
#[derive(Clone, Debug, Default, Deserialize, Validate)]
pub struct NewReview {
    #[validate(range(min = 1, max = 5))]
    pub rating: u8,
    #[serde(default)]
    pub comment: String,
    #[serde(default)]
    pub reviewer_name: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    id: Uuid,
    product_id: Uuid,
    rating: u8,
    comment: String,
    reviewer_name: String,
    language: Language,
    created_at: DateTime<Utc>,
    #[serde(skip)]
    events: Vec<DomainEvent>,
}

impl Review {
    pub fn create(product_id: Uuid, input: NewReview, language: Language) -> Result<Self, ReviewError> {
        input.validate().map_err(|_| ReviewError::InvalidRating(input.rating))?;
        let reviewer_name = match input.reviewer_name.trim() {
            "" => ANONYMOUS.to_string(),
            name => name.to_string(),
        };
        let id = Uuid::now_v7();
        let mut review = Self {
            id, product_id, reviewer_name, language,
            rating: input.rating,
            comment: input.comment.trim().to_string(),
            created_at: Utc::now(),
            events: vec![],
        };
        review.events.push(DomainEvent::Review(ReviewEvent::Submitted { review_id: id, product_id, rating: review.rating }));
        Ok(review)
    }

    pub fn restore(
        id: Uuid, product_id: Uuid, rating: u8, comment: String, reviewer_name: String,
        language: Language, created_at: DateTime<Utc>,
    ) -> Self {
        Self { id, product_id, rating, comment, reviewer_name, language, created_at, events: vec![] }
    }

    pub fn id(&self) -> Uuid { self.id }
    pub fn product_id(&self) -> Uuid { self.product_id }
    pub fn rating(&self) -> u8 { self.rating }
    pub fn comment(&self) -> &str { &self.comment }
    pub fn reviewer_name(&self) -> &str { &self.reviewer_name }
    pub fn language(&self) -> Language { self.language }
    pub fn created_at(&self) -> DateTime<Utc> { self.created_at }

    pub fn take_events(&mut self) -> Vec<DomainEvent> { std::mem::take(&mut self.events) }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReviewError {
    #[error("rating must be between 1 and 5, got {0}")]
    InvalidRating(u8),
}
