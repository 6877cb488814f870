//! Response payloads for the HTTP layer.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use super::availability::Availability;
use super::domain::{
    Booking, BookingId, BookingStatus, Listing, ListingId, PropertyType, Rating, Review, ReviewId,
    StayRange, User, UserId,
};
use super::pricing::to_persisted;
use super::reviews::RatingSummary;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserView {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

impl From<&User> for UserView {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListingView {
    pub id: ListingId,
    pub title: String,
    pub description: String,
    pub property_type: PropertyType,
    pub price_per_night: Decimal,
    pub bedrooms: u32,
    pub bathrooms: u32,
    pub max_guests: u32,
    pub location: String,
    pub is_available: bool,
    pub owner: UserView,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub average_rating: f64,
    pub total_reviews: u32,
    /// Price of a stay of the requested (or default) number of nights.
    pub total_price_for_nights: Decimal,
}

impl ListingView {
    pub fn new(listing: &Listing, owner: &User, ratings: RatingSummary, quote_nights: u32) -> Self {
        Self {
            id: listing.id,
            title: listing.title.clone(),
            description: listing.description.clone(),
            property_type: listing.property_type,
            price_per_night: listing.price_per_night,
            bedrooms: listing.bedrooms,
            bathrooms: listing.bathrooms,
            max_guests: listing.max_guests,
            location: listing.location.clone(),
            is_available: listing.is_available,
            owner: UserView::from(owner),
            created_at: listing.created_at,
            updated_at: listing.updated_at,
            average_rating: ratings.average_rating,
            total_reviews: ratings.total_reviews,
            total_price_for_nights: to_persisted(listing.total_price_for_nights(quote_nights)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BookingView {
    pub id: BookingId,
    pub listing: ListingView,
    pub guest: UserView,
    pub check_in_date: NaiveDate,
    pub check_out_date: NaiveDate,
    pub total_price: Decimal,
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,
    pub nights_booked: i64,
}

impl BookingView {
    pub fn new(booking: &Booking, listing: ListingView, guest: &User) -> Self {
        Self {
            id: booking.id,
            listing,
            guest: UserView::from(guest),
            check_in_date: booking.check_in_date,
            check_out_date: booking.check_out_date,
            total_price: booking.total_price,
            status: booking.status,
            created_at: booking.created_at,
            nights_booked: booking.nights_booked(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReviewView {
    pub id: ReviewId,
    pub listing: ListingView,
    pub user: UserView,
    pub rating: Rating,
    pub comment: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ReviewView {
    pub fn new(review: &Review, listing: ListingView, user: &User) -> Self {
        Self {
            id: review.id,
            listing,
            user: UserView::from(user),
            rating: review.rating,
            comment: review.comment.clone(),
            created_at: review.created_at,
            updated_at: review.updated_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AvailabilityView {
    pub listing_id: ListingId,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub nights: u32,
    pub available: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<&'static str>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub conflicting_booking_ids: Vec<BookingId>,
    /// Quoted total when the stay can be booked.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_price: Option<Decimal>,
}

impl AvailabilityView {
    pub fn new(listing: &Listing, stay: &StayRange, outcome: &Availability) -> Self {
        let conflicting_booking_ids = match outcome {
            Availability::Overlapping { booking_ids } => booking_ids.clone(),
            _ => Vec::new(),
        };
        let total_price = outcome
            .is_available()
            .then(|| super::pricing::quote_stay(listing, stay));

        Self {
            listing_id: listing.id,
            check_in: stay.check_in(),
            check_out: stay.check_out(),
            nights: stay.nights(),
            available: outcome.is_available(),
            reason: outcome.reason(),
            conflicting_booking_ids,
            total_price,
        }
    }
}
