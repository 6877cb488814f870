use serde::Serialize;

use super::domain::{ListingId, Review, UserId};
use super::repository::{RepositoryError, ReviewRepository};

/// True when `user_id` has not reviewed `listing_id` yet.
pub fn can_review<R>(
    reviews: &R,
    listing_id: ListingId,
    user_id: UserId,
) -> Result<bool, RepositoryError>
where
    R: ReviewRepository + ?Sized,
{
    reviews
        .review_exists(listing_id, user_id)
        .map(|exists| !exists)
}

/// Aggregate shown next to a listing. Recomputed from the review rows on every
/// read rather than kept as a running total.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RatingSummary {
    pub average_rating: f64,
    pub total_reviews: u32,
}

impl RatingSummary {
    pub fn from_reviews(reviews: &[Review]) -> Self {
        if reviews.is_empty() {
            return Self::default();
        }

        let total: u32 = reviews
            .iter()
            .map(|review| u32::from(review.rating.value()))
            .sum();
        let count = u32::try_from(reviews.len()).unwrap_or(u32::MAX);

        Self {
            average_rating: f64::from(total) / f64::from(count),
            total_reviews: count,
        }
    }
}

impl Default for RatingSummary {
    fn default() -> Self {
        Self {
            average_rating: 0.0,
            total_reviews: 0,
        }
    }
}
