//! Listings, bookings and reviews.
//!
//! The booking path runs validation, the availability checker and pricing in
//! that order before handing the write to storage. Storage enforces the
//! no-overlap and one-review-per-user constraints atomically, so the checker is
//! advisory for callers and the store has the final word.

pub mod availability;
pub mod domain;
pub mod memory;
pub mod pricing;
pub mod repository;
pub mod reviews;
pub mod router;
pub mod seed;
pub mod service;
pub mod validation;
pub mod views;

#[cfg(test)]
mod tests;

pub use availability::{check_availability, is_available, Availability, AvailabilityConflict};
pub use domain::{
    Booking, BookingId, BookingRequest, BookingStatus, Listing, ListingId, NewBooking,
    NewListing, NewReview, NewUser, PropertyType, Rating, Review, ReviewId, ReviewRequest,
    StayRange, User, UserId,
};
pub use memory::InMemoryStore;
pub use pricing::{price_for, quote_stay, to_persisted, MONEY_SCALE};
pub use repository::{
    BookingQuery, BookingRepository, ListingQuery, ListingRepository, RepositoryError,
    ReviewQuery, ReviewRepository, TravelStore, UserRepository,
};
pub use reviews::{can_review, RatingSummary};
pub use router::{listing_router, ListingState};
pub use seed::{seed, SeedError, SeedPlan, SeedReport};
pub use service::{ListingService, ListingServiceError, Missing};
pub use validation::ValidationError;
pub use views::{AvailabilityView, BookingView, ListingView, ReviewView, UserView};
