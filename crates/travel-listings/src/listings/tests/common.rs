use std::sync::Arc;

use axum::http::StatusCode;
use axum::response::Response;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::Value;

use crate::config::ListingsConfig;
use crate::listings::domain::{
    Booking, BookingId, BookingRequest, Listing, ListingId, NewBooking, NewListing, NewReview,
    NewUser, PropertyType, Review, StayRange, User, UserId,
};
use crate::listings::memory::InMemoryStore;
use crate::listings::repository::{
    BookingQuery, BookingRepository, ListingQuery, ListingRepository, RepositoryError,
    ReviewQuery, ReviewRepository, UserRepository,
};
use crate::listings::{listing_router, ListingService};

pub(super) fn date(month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, month, day).expect("valid date")
}

pub(super) fn stay(check_in: (u32, u32), check_out: (u32, u32)) -> StayRange {
    StayRange::new(date(check_in.0, check_in.1), date(check_out.0, check_out.1))
        .expect("check-out after check-in")
}

pub(super) fn new_user(username: &str) -> NewUser {
    NewUser {
        username: username.to_string(),
        email: format!("{username}@example.com"),
        first_name: "Test".to_string(),
        last_name: "Traveller".to_string(),
    }
}

pub(super) fn new_listing(owner_id: UserId, price_per_night: Decimal) -> NewListing {
    NewListing {
        title: "Loft near the harbour".to_string(),
        description: "Two minutes from the ferry".to_string(),
        property_type: PropertyType::Apartment,
        price_per_night,
        bedrooms: 1,
        bathrooms: 1,
        max_guests: 2,
        location: "Portland, OR".to_string(),
        is_available: true,
        owner_id,
    }
}

pub(super) fn booking_request(
    listing: &Listing,
    guest: &User,
    check_in: (u32, u32),
    check_out: (u32, u32),
) -> BookingRequest {
    BookingRequest {
        listing_id: listing.id,
        guest_id: guest.id,
        check_in_date: date(check_in.0, check_in.1),
        check_out_date: date(check_out.0, check_out.1),
    }
}

/// A service over `store` with one owner, one guest and one listing at 100.00
/// a night.
pub(super) struct Fixture<S> {
    pub(super) service: Arc<ListingService<S>>,
    pub(super) owner: User,
    pub(super) guest: User,
    pub(super) listing: Listing,
}

pub(super) fn fixture_with<S>(store: S) -> Fixture<S>
where
    S: crate::listings::TravelStore + 'static,
{
    let service = Arc::new(ListingService::new(Arc::new(store)));
    let owner = service.create_user(new_user("owner")).expect("owner created");
    let guest = service.create_user(new_user("guest")).expect("guest created");
    let listing = service
        .create_listing(new_listing(owner.id, dec!(100.00)))
        .expect("listing created");

    Fixture {
        service,
        owner,
        guest,
        listing,
    }
}

pub(super) fn fixture() -> Fixture<InMemoryStore> {
    fixture_with(InMemoryStore::new())
}

pub(super) fn router_for<S>(fixture: &Fixture<S>) -> axum::Router
where
    S: crate::listings::TravelStore + 'static,
{
    listing_router(Arc::clone(&fixture.service), ListingsConfig::default())
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

pub(super) fn assert_conflict_response(response: &Response) {
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

/// Decimal fields serialise as strings; compare their text form.
pub(super) fn money(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// Store whose pre-checks never see existing rows, as if a competing request
/// wrote between the check and the insert. Writes go to a real store, which
/// still enforces its constraints. With `closes_listing` set, the overlap
/// pre-check also switches the listing off, as an admin toggle landing
/// mid-request would.
#[derive(Debug, Default, Clone)]
pub(super) struct RacingStore {
    pub(super) inner: InMemoryStore,
    pub(super) closes_listing: bool,
}

impl UserRepository for RacingStore {
    fn insert_user(&self, user: NewUser) -> Result<User, RepositoryError> {
        self.inner.insert_user(user)
    }

    fn fetch_user(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        self.inner.fetch_user(id)
    }

    fn find_user_by_username(&self, username: &str) -> Result<Option<User>, RepositoryError> {
        self.inner.find_user_by_username(username)
    }

    fn list_users(&self) -> Result<Vec<User>, RepositoryError> {
        self.inner.list_users()
    }
}

impl ListingRepository for RacingStore {
    fn insert_listing(&self, listing: NewListing) -> Result<Listing, RepositoryError> {
        self.inner.insert_listing(listing)
    }

    fn fetch_listing(&self, id: ListingId) -> Result<Option<Listing>, RepositoryError> {
        self.inner.fetch_listing(id)
    }

    fn set_listing_availability(
        &self,
        id: ListingId,
        is_available: bool,
    ) -> Result<Listing, RepositoryError> {
        self.inner.set_listing_availability(id, is_available)
    }

    fn list_listings(&self, query: &ListingQuery) -> Result<Vec<Listing>, RepositoryError> {
        self.inner.list_listings(query)
    }
}

impl BookingRepository for RacingStore {
    fn overlapping_bookings(
        &self,
        listing_id: ListingId,
        _stay: &StayRange,
        _exclude: Option<BookingId>,
    ) -> Result<Vec<Booking>, RepositoryError> {
        if self.closes_listing {
            self.inner.set_listing_availability(listing_id, false)?;
        }
        Ok(Vec::new())
    }

    fn insert_booking(&self, booking: NewBooking) -> Result<Booking, RepositoryError> {
        self.inner.insert_booking(booking)
    }

    fn update_booking(&self, booking: Booking) -> Result<Booking, RepositoryError> {
        self.inner.update_booking(booking)
    }

    fn fetch_booking(&self, id: BookingId) -> Result<Option<Booking>, RepositoryError> {
        self.inner.fetch_booking(id)
    }

    fn list_bookings(&self, query: &BookingQuery) -> Result<Vec<Booking>, RepositoryError> {
        self.inner.list_bookings(query)
    }
}

impl ReviewRepository for RacingStore {
    fn review_exists(
        &self,
        _listing_id: ListingId,
        _user_id: UserId,
    ) -> Result<bool, RepositoryError> {
        Ok(false)
    }

    fn insert_review(&self, review: NewReview) -> Result<Review, RepositoryError> {
        self.inner.insert_review(review)
    }

    fn reviews_for_listing(&self, listing_id: ListingId) -> Result<Vec<Review>, RepositoryError> {
        self.inner.reviews_for_listing(listing_id)
    }

    fn list_reviews(&self, query: &ReviewQuery) -> Result<Vec<Review>, RepositoryError> {
        self.inner.list_reviews(query)
    }
}

/// Store that fails every call, standing in for a lost database connection.
pub(super) struct UnavailableStore;

fn offline<T>() -> Result<T, RepositoryError> {
    Err(RepositoryError::Unavailable("database offline".to_string()))
}

impl UserRepository for UnavailableStore {
    fn insert_user(&self, _user: NewUser) -> Result<User, RepositoryError> {
        offline()
    }

    fn fetch_user(&self, _id: UserId) -> Result<Option<User>, RepositoryError> {
        offline()
    }

    fn find_user_by_username(&self, _username: &str) -> Result<Option<User>, RepositoryError> {
        offline()
    }

    fn list_users(&self) -> Result<Vec<User>, RepositoryError> {
        offline()
    }
}

impl ListingRepository for UnavailableStore {
    fn insert_listing(&self, _listing: NewListing) -> Result<Listing, RepositoryError> {
        offline()
    }

    fn fetch_listing(&self, _id: ListingId) -> Result<Option<Listing>, RepositoryError> {
        offline()
    }

    fn set_listing_availability(
        &self,
        _id: ListingId,
        _is_available: bool,
    ) -> Result<Listing, RepositoryError> {
        offline()
    }

    fn list_listings(&self, _query: &ListingQuery) -> Result<Vec<Listing>, RepositoryError> {
        offline()
    }
}

impl BookingRepository for UnavailableStore {
    fn overlapping_bookings(
        &self,
        _listing_id: ListingId,
        _stay: &StayRange,
        _exclude: Option<BookingId>,
    ) -> Result<Vec<Booking>, RepositoryError> {
        offline()
    }

    fn insert_booking(&self, _booking: NewBooking) -> Result<Booking, RepositoryError> {
        offline()
    }

    fn update_booking(&self, _booking: Booking) -> Result<Booking, RepositoryError> {
        offline()
    }

    fn fetch_booking(&self, _id: BookingId) -> Result<Option<Booking>, RepositoryError> {
        offline()
    }

    fn list_bookings(&self, _query: &BookingQuery) -> Result<Vec<Booking>, RepositoryError> {
        offline()
    }
}

impl ReviewRepository for UnavailableStore {
    fn review_exists(
        &self,
        _listing_id: ListingId,
        _user_id: UserId,
    ) -> Result<bool, RepositoryError> {
        offline()
    }

    fn insert_review(&self, _review: NewReview) -> Result<Review, RepositoryError> {
        offline()
    }

    fn reviews_for_listing(&self, _listing_id: ListingId) -> Result<Vec<Review>, RepositoryError> {
        offline()
    }

    fn list_reviews(&self, _query: &ReviewQuery) -> Result<Vec<Review>, RepositoryError> {
        offline()
    }
}
