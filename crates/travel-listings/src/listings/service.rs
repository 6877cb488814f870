use std::fmt;
use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{debug, info, warn};

use super::availability::{check_availability, Availability, AvailabilityConflict};
use super::domain::{
    Booking, BookingId, BookingRequest, BookingStatus, Listing, ListingId, NewBooking,
    NewListing, NewReview, NewUser, Rating, Review, ReviewRequest, StayRange, User, UserId,
};
use super::pricing::quote_stay;
use super::repository::{
    BookingQuery, ListingQuery, RepositoryError, ReviewQuery, TravelStore,
};
use super::reviews::{can_review, RatingSummary};
use super::validation::{validate_new_listing, validate_new_user, ValidationError};
use super::views::{AvailabilityView, BookingView, ListingView, ReviewView};

/// Record kinds that a lookup can fail to find.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Missing {
    Listing(ListingId),
    Booking(BookingId),
    User(UserId),
}

impl fmt::Display for Missing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Missing::Listing(id) => write!(f, "listing {id}"),
            Missing::Booking(id) => write!(f, "booking {id}"),
            Missing::User(id) => write!(f, "user {id}"),
        }
    }
}

/// Error raised by the listing service.
#[derive(Debug, thiserror::Error)]
pub enum ListingServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Availability(#[from] AvailabilityConflict),
    #[error("user {user_id} has already reviewed listing {listing_id}")]
    DuplicateReview {
        listing_id: ListingId,
        user_id: UserId,
    },
    #[error("username '{0}' is already taken")]
    DuplicateUsername(String),
    #[error("{0} not found")]
    NotFound(Missing),
    #[error("booking cannot move from {from} to {to}")]
    InvalidTransition {
        from: BookingStatus,
        to: BookingStatus,
    },
    #[error("booking {booking_id} is {status} and can no longer be rescheduled")]
    BookingClosed {
        booking_id: BookingId,
        status: BookingStatus,
    },
    #[error(transparent)]
    Storage(#[from] RepositoryError),
}

/// Service composing validation, the availability checker, pricing and the
/// review guard over an injected store.
pub struct ListingService<S> {
    store: Arc<S>,
}

impl<S> ListingService<S>
where
    S: TravelStore + 'static,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub fn create_user(&self, user: NewUser) -> Result<User, ListingServiceError> {
        validate_new_user(&user)?;
        let username = user.username.clone();
        match self.store.insert_user(user) {
            Ok(user) => {
                info!(user_id = %user.id, username = %user.username, "user created");
                Ok(user)
            }
            Err(RepositoryError::Conflict) => {
                Err(ListingServiceError::DuplicateUsername(username))
            }
            Err(err) => Err(err.into()),
        }
    }

    pub fn user(&self, user_id: UserId) -> Result<User, ListingServiceError> {
        self.store
            .fetch_user(user_id)?
            .ok_or(ListingServiceError::NotFound(Missing::User(user_id)))
    }

    pub fn create_listing(&self, listing: NewListing) -> Result<Listing, ListingServiceError> {
        validate_new_listing(&listing)?;
        self.user(listing.owner_id)?;
        let listing = self.store.insert_listing(listing)?;
        info!(
            listing_id = %listing.id,
            owner_id = %listing.owner_id,
            price_per_night = %listing.price_per_night,
            "listing created"
        );
        Ok(listing)
    }

    pub fn listing(&self, listing_id: ListingId) -> Result<Listing, ListingServiceError> {
        self.store
            .fetch_listing(listing_id)?
            .ok_or(ListingServiceError::NotFound(Missing::Listing(listing_id)))
    }

    pub fn listings(&self, query: &ListingQuery) -> Result<Vec<Listing>, ListingServiceError> {
        Ok(self.store.list_listings(query)?)
    }

    pub fn set_listing_availability(
        &self,
        listing_id: ListingId,
        is_available: bool,
    ) -> Result<Listing, ListingServiceError> {
        match self.store.set_listing_availability(listing_id, is_available) {
            Ok(listing) => {
                info!(%listing_id, is_available, "listing availability changed");
                Ok(listing)
            }
            Err(RepositoryError::NotFound) => {
                Err(ListingServiceError::NotFound(Missing::Listing(listing_id)))
            }
            Err(err) => Err(err.into()),
        }
    }

    pub fn rating_summary(
        &self,
        listing_id: ListingId,
    ) -> Result<RatingSummary, ListingServiceError> {
        let reviews = self.store.reviews_for_listing(listing_id)?;
        Ok(RatingSummary::from_reviews(&reviews))
    }

    /// Detailed availability for a stay; see [`check_availability`].
    pub fn availability(
        &self,
        listing_id: ListingId,
        stay: &StayRange,
        exclude: Option<BookingId>,
    ) -> Result<(Listing, Availability), ListingServiceError> {
        let listing = self.listing(listing_id)?;
        let outcome = check_availability(self.store.as_ref(), &listing, stay, exclude)?;
        Ok((listing, outcome))
    }

    pub fn is_available(
        &self,
        listing_id: ListingId,
        check_in: NaiveDate,
        check_out: NaiveDate,
        exclude: Option<BookingId>,
    ) -> Result<bool, ListingServiceError> {
        let stay = StayRange::new(check_in, check_out)?;
        let (_, outcome) = self.availability(listing_id, &stay, exclude)?;
        Ok(outcome.is_available())
    }

    /// Create path: validate, check availability, price, persist as pending.
    pub fn create_booking(&self, request: BookingRequest) -> Result<Booking, ListingServiceError> {
        let stay = StayRange::new(request.check_in_date, request.check_out_date)?;
        let listing = self.listing(request.listing_id)?;
        self.user(request.guest_id)?;

        let outcome = check_availability(self.store.as_ref(), &listing, &stay, None)?;
        if let Err(conflict) = outcome.ensure(listing.id, stay) {
            warn!(listing_id = %listing.id, %stay, %conflict, "booking rejected");
            return Err(conflict.into());
        }

        let total_price = quote_stay(&listing, &stay);
        let booking = NewBooking {
            listing_id: listing.id,
            guest_id: request.guest_id,
            stay,
            total_price,
            status: BookingStatus::Pending,
        };

        match self.store.insert_booking(booking) {
            Ok(booking) => {
                info!(
                    booking_id = %booking.id,
                    listing_id = %booking.listing_id,
                    nights = stay.nights(),
                    total_price = %booking.total_price,
                    "booking created"
                );
                Ok(booking)
            }
            Err(RepositoryError::Conflict) => {
                warn!(listing_id = %listing.id, %stay, "store rejected booking");
                Err(self.storage_conflict(listing.id, stay, None))
            }
            Err(err) => Err(err.into()),
        }
    }

    pub fn booking(&self, booking_id: BookingId) -> Result<Booking, ListingServiceError> {
        self.store
            .fetch_booking(booking_id)?
            .ok_or(ListingServiceError::NotFound(Missing::Booking(booking_id)))
    }

    pub fn bookings(&self, query: &BookingQuery) -> Result<Vec<Booking>, ListingServiceError> {
        Ok(self.store.list_bookings(query)?)
    }

    pub fn update_booking_status(
        &self,
        booking_id: BookingId,
        status: BookingStatus,
    ) -> Result<Booking, ListingServiceError> {
        let mut booking = self.booking(booking_id)?;
        if !booking.status.can_transition_to(status) {
            return Err(ListingServiceError::InvalidTransition {
                from: booking.status,
                to: status,
            });
        }

        let from = booking.status;
        booking.status = status;
        let booking = self.store.update_booking(booking)?;
        info!(%booking_id, %from, to = %status, "booking status changed");
        Ok(booking)
    }

    /// Move an active booking to new dates, re-running the availability check
    /// without counting the booking against itself. The total is re-priced.
    pub fn reschedule_booking(
        &self,
        booking_id: BookingId,
        check_in: NaiveDate,
        check_out: NaiveDate,
    ) -> Result<Booking, ListingServiceError> {
        let stay = StayRange::new(check_in, check_out)?;
        let mut booking = self.booking(booking_id)?;
        if !booking.is_active() {
            return Err(ListingServiceError::BookingClosed {
                booking_id,
                status: booking.status,
            });
        }

        let listing = self.listing(booking.listing_id)?;
        let outcome =
            check_availability(self.store.as_ref(), &listing, &stay, Some(booking_id))?;
        if let Err(conflict) = outcome.ensure(listing.id, stay) {
            warn!(%booking_id, %stay, %conflict, "reschedule rejected");
            return Err(conflict.into());
        }

        booking.check_in_date = stay.check_in();
        booking.check_out_date = stay.check_out();
        booking.total_price = quote_stay(&listing, &stay);

        match self.store.update_booking(booking) {
            Ok(booking) => {
                info!(%booking_id, %stay, total_price = %booking.total_price, "booking rescheduled");
                Ok(booking)
            }
            Err(RepositoryError::Conflict) => {
                warn!(%booking_id, %stay, "store rejected reschedule");
                Err(self.storage_conflict(listing.id, stay, Some(booking_id)))
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Explain a write the store refused after the pre-check passed. The
    /// listing is re-read so a flag switched off mid-request reports as
    /// unavailable; anything else is the overlap constraint.
    fn storage_conflict(
        &self,
        listing_id: ListingId,
        stay: StayRange,
        exclude: Option<BookingId>,
    ) -> ListingServiceError {
        let overlapping = AvailabilityConflict::OverlappingBooking { listing_id, stay };
        let outcome = self
            .listing(listing_id)
            .and_then(|listing| {
                Ok(check_availability(
                    self.store.as_ref(),
                    &listing,
                    &stay,
                    exclude,
                )?)
            });
        match outcome {
            Ok(outcome) => outcome
                .ensure(listing_id, stay)
                .err()
                .unwrap_or(overlapping)
                .into(),
            Err(err) => err,
        }
    }

    pub fn can_review(
        &self,
        listing_id: ListingId,
        user_id: UserId,
    ) -> Result<bool, ListingServiceError> {
        Ok(can_review(self.store.as_ref(), listing_id, user_id)?)
    }

    /// Create path for reviews: rating range, referenced records, then the
    /// one-review-per-user guard.
    pub fn create_review(&self, request: ReviewRequest) -> Result<Review, ListingServiceError> {
        let rating = Rating::new(request.rating)?;
        self.listing(request.listing_id)?;
        self.user(request.user_id)?;

        let duplicate = ListingServiceError::DuplicateReview {
            listing_id: request.listing_id,
            user_id: request.user_id,
        };
        if !self.can_review(request.listing_id, request.user_id)? {
            warn!(
                listing_id = %request.listing_id,
                user_id = %request.user_id,
                "duplicate review rejected"
            );
            return Err(duplicate);
        }

        let review = NewReview {
            listing_id: request.listing_id,
            user_id: request.user_id,
            rating,
            comment: request.comment,
        };
        match self.store.insert_review(review) {
            Ok(review) => {
                info!(
                    review_id = %review.id,
                    listing_id = %review.listing_id,
                    rating = review.rating.value(),
                    "review created"
                );
                Ok(review)
            }
            Err(RepositoryError::Conflict) => {
                warn!("store rejected duplicate review");
                Err(duplicate)
            }
            Err(err) => Err(err.into()),
        }
    }

    pub fn reviews_for_listing(
        &self,
        listing_id: ListingId,
    ) -> Result<Vec<Review>, ListingServiceError> {
        self.listing(listing_id)?;
        Ok(self.store.reviews_for_listing(listing_id)?)
    }

    /// Review browsing across listings, newest first.
    pub fn reviews(&self, query: &ReviewQuery) -> Result<Vec<Review>, ListingServiceError> {
        Ok(self.store.list_reviews(query)?)
    }

    pub fn listing_view(
        &self,
        listing: &Listing,
        quote_nights: u32,
    ) -> Result<ListingView, ListingServiceError> {
        let owner = self.user(listing.owner_id)?;
        let ratings = self.rating_summary(listing.id)?;
        debug!(listing_id = %listing.id, quote_nights, "rendering listing");
        Ok(ListingView::new(listing, &owner, ratings, quote_nights))
    }

    pub fn booking_view(
        &self,
        booking: &Booking,
        quote_nights: u32,
    ) -> Result<BookingView, ListingServiceError> {
        let listing = self.listing(booking.listing_id)?;
        let listing = self.listing_view(&listing, quote_nights)?;
        let guest = self.user(booking.guest_id)?;
        Ok(BookingView::new(booking, listing, &guest))
    }

    pub fn review_view(
        &self,
        review: &Review,
        quote_nights: u32,
    ) -> Result<ReviewView, ListingServiceError> {
        let listing = self.listing(review.listing_id)?;
        let listing = self.listing_view(&listing, quote_nights)?;
        let user = self.user(review.user_id)?;
        Ok(ReviewView::new(review, listing, &user))
    }

    pub fn availability_view(
        &self,
        listing_id: ListingId,
        stay: &StayRange,
        exclude: Option<BookingId>,
    ) -> Result<AvailabilityView, ListingServiceError> {
        let (listing, outcome) = self.availability(listing_id, stay, exclude)?;
        Ok(AvailabilityView::new(&listing, stay, &outcome))
    }
}
