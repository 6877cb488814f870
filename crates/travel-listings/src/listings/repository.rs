use serde::Deserialize;

use super::domain::{
    Booking, BookingId, BookingStatus, Listing, ListingId, NewBooking, NewListing, NewReview,
    NewUser, PropertyType, Review, StayRange, User, UserId,
};

/// Error enumeration for repository failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RepositoryError {
    /// The write would break a storage constraint (overlapping active booking,
    /// duplicate review, duplicate username).
    #[error("record conflicts with an existing record")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Admin-style filters over listings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ListingQuery {
    pub property_type: Option<PropertyType>,
    pub is_available: Option<bool>,
    /// Case-insensitive match against title, description and location.
    pub search: Option<String>,
}

impl ListingQuery {
    pub fn matches(&self, listing: &Listing) -> bool {
        if let Some(property_type) = self.property_type {
            if listing.property_type != property_type {
                return false;
            }
        }
        if let Some(is_available) = self.is_available {
            if listing.is_available != is_available {
                return false;
            }
        }
        search_hits(
            self.search.as_deref(),
            &[
                listing.title.as_str(),
                listing.description.as_str(),
                listing.location.as_str(),
            ],
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct BookingQuery {
    pub status: Option<BookingStatus>,
    pub listing_id: Option<ListingId>,
    pub guest_id: Option<UserId>,
    /// Case-insensitive match against the listing title and guest username.
    pub search: Option<String>,
}

impl BookingQuery {
    /// Filters on the booking row itself; `search` needs the joined records,
    /// see [`BookingQuery::matches_search`].
    pub fn matches(&self, booking: &Booking) -> bool {
        self.status.map_or(true, |status| booking.status == status)
            && self.listing_id.map_or(true, |id| booking.listing_id == id)
            && self.guest_id.map_or(true, |id| booking.guest_id == id)
    }

    pub fn matches_search(&self, listing_title: &str, guest_username: &str) -> bool {
        search_hits(self.search.as_deref(), &[listing_title, guest_username])
    }
}

/// Admin-style filters over reviews.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ReviewQuery {
    pub listing_id: Option<ListingId>,
    pub user_id: Option<UserId>,
    pub rating: Option<u8>,
    /// Case-insensitive match against the listing title, reviewer username
    /// and comment.
    pub search: Option<String>,
}

impl ReviewQuery {
    pub fn matches(&self, review: &Review) -> bool {
        self.listing_id.map_or(true, |id| review.listing_id == id)
            && self.user_id.map_or(true, |id| review.user_id == id)
            && self.rating.map_or(true, |rating| review.rating.value() == rating)
    }

    pub fn matches_search(&self, review: &Review, listing_title: &str, username: &str) -> bool {
        search_hits(
            self.search.as_deref(),
            &[listing_title, username, review.comment.as_str()],
        )
    }
}

/// True when `term` is blank or appears, ignoring case, in any of `fields`.
fn search_hits(term: Option<&str>, fields: &[&str]) -> bool {
    match term.map(str::trim) {
        Some(term) if !term.is_empty() => {
            let term = term.to_lowercase();
            fields
                .iter()
                .any(|field| field.to_lowercase().contains(&term))
        }
        _ => true,
    }
}

pub trait UserRepository: Send + Sync {
    /// Fails with [`RepositoryError::Conflict`] when the username is taken.
    fn insert_user(&self, user: NewUser) -> Result<User, RepositoryError>;
    fn fetch_user(&self, id: UserId) -> Result<Option<User>, RepositoryError>;
    fn find_user_by_username(&self, username: &str) -> Result<Option<User>, RepositoryError>;
    fn list_users(&self) -> Result<Vec<User>, RepositoryError>;
}

pub trait ListingRepository: Send + Sync {
    fn insert_listing(&self, listing: NewListing) -> Result<Listing, RepositoryError>;
    fn fetch_listing(&self, id: ListingId) -> Result<Option<Listing>, RepositoryError>;
    fn set_listing_availability(
        &self,
        id: ListingId,
        is_available: bool,
    ) -> Result<Listing, RepositoryError>;
    /// Newest first.
    fn list_listings(&self, query: &ListingQuery) -> Result<Vec<Listing>, RepositoryError>;
}

/// Booking storage. The store, not the caller, is the authority on the
/// no-overlap invariant: `insert_booking` and `update_booking` must reject a
/// write that leaves two overlapping active bookings on one listing with
/// [`RepositoryError::Conflict`], checked atomically with the write itself.
/// The listing's availability flag is enforced the same way for new active
/// bookings and for date changes.
pub trait BookingRepository: Send + Sync {
    /// Pending or confirmed bookings on `listing_id` whose dates intersect
    /// `stay`, leaving out `exclude` when given.
    fn overlapping_bookings(
        &self,
        listing_id: ListingId,
        stay: &StayRange,
        exclude: Option<BookingId>,
    ) -> Result<Vec<Booking>, RepositoryError>;
    fn insert_booking(&self, booking: NewBooking) -> Result<Booking, RepositoryError>;
    fn update_booking(&self, booking: Booking) -> Result<Booking, RepositoryError>;
    fn fetch_booking(&self, id: BookingId) -> Result<Option<Booking>, RepositoryError>;
    /// Newest first.
    fn list_bookings(&self, query: &BookingQuery) -> Result<Vec<Booking>, RepositoryError>;
}

/// Review storage. `insert_review` must reject a second review for the same
/// (listing, user) pair with [`RepositoryError::Conflict`].
pub trait ReviewRepository: Send + Sync {
    fn review_exists(&self, listing_id: ListingId, user_id: UserId)
        -> Result<bool, RepositoryError>;
    fn insert_review(&self, review: NewReview) -> Result<Review, RepositoryError>;
    /// Newest first.
    fn reviews_for_listing(&self, listing_id: ListingId) -> Result<Vec<Review>, RepositoryError>;
    /// Newest first.
    fn list_reviews(&self, query: &ReviewQuery) -> Result<Vec<Review>, RepositoryError>;
}

/// Everything the listing service needs from storage.
pub trait TravelStore: UserRepository + ListingRepository + BookingRepository + ReviewRepository {}

impl<T> TravelStore for T where
    T: UserRepository + ListingRepository + BookingRepository + ReviewRepository
{
}
