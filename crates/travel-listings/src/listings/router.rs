use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, patch, post, put},
    Json, Router,
};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;
use tracing::error;

use super::domain::{
    BookingId, BookingRequest, BookingStatus, ListingId, NewListing, NewUser, PropertyType,
    ReviewRequest, StayRange, UserId,
};
use super::repository::{BookingQuery, ListingQuery, ReviewQuery, TravelStore};
use super::service::{ListingService, ListingServiceError};
use super::views::{AvailabilityView, BookingView, ListingView, ReviewView, UserView};
use crate::config::ListingsConfig;

/// Shared handler state: the service plus presentation defaults.
pub struct ListingState<S> {
    pub service: Arc<ListingService<S>>,
    pub config: ListingsConfig,
}

impl<S> Clone for ListingState<S> {
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
            config: self.config,
        }
    }
}

impl<S> ListingState<S> {
    fn quote_nights(&self, raw: Option<&str>) -> u32 {
        quote_nights(raw, self.config.default_quote_nights)
    }
}

/// Night count for listing price quotes. Anything that is not a non-negative
/// integer falls back to the configured default.
pub fn quote_nights(raw: Option<&str>, fallback: u32) -> u32 {
    raw.and_then(|value| value.trim().parse::<u32>().ok()).unwrap_or(fallback)
}

/// Router builder exposing users, listings, bookings and reviews.
pub fn listing_router<S>(service: Arc<ListingService<S>>, config: ListingsConfig) -> Router
where
    S: TravelStore + 'static,
{
    Router::new()
        .route("/api/v1/users", post(create_user_handler::<S>))
        .route("/api/v1/users/:user_id", get(user_handler::<S>))
        .route(
            "/api/v1/listings",
            post(create_listing_handler::<S>).get(list_listings_handler::<S>),
        )
        .route("/api/v1/listings/:listing_id", get(listing_handler::<S>))
        .route(
            "/api/v1/listings/:listing_id/availability",
            get(availability_handler::<S>).patch(set_availability_handler::<S>),
        )
        .route(
            "/api/v1/listings/:listing_id/reviews",
            get(listing_reviews_handler::<S>),
        )
        .route(
            "/api/v1/bookings",
            post(create_booking_handler::<S>).get(list_bookings_handler::<S>),
        )
        .route("/api/v1/bookings/:booking_id", get(booking_handler::<S>))
        .route(
            "/api/v1/bookings/:booking_id/status",
            patch(booking_status_handler::<S>),
        )
        .route(
            "/api/v1/bookings/:booking_id/dates",
            put(reschedule_handler::<S>),
        )
        .route(
            "/api/v1/reviews",
            post(create_review_handler::<S>).get(list_reviews_handler::<S>),
        )
        .with_state(ListingState { service, config })
}

impl IntoResponse for ListingServiceError {
    fn into_response(self) -> Response {
        let status = match &self {
            ListingServiceError::Validation(_) => StatusCode::BAD_REQUEST,
            ListingServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            ListingServiceError::Availability(_)
            | ListingServiceError::DuplicateReview { .. }
            | ListingServiceError::DuplicateUsername(_)
            | ListingServiceError::InvalidTransition { .. }
            | ListingServiceError::BookingClosed { .. } => StatusCode::CONFLICT,
            ListingServiceError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            error!(error = %self, "request failed");
        }

        let payload = json!({ "error": self.to_string() });
        (status, Json(payload)).into_response()
    }
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct QuoteParams {
    pub(crate) nights: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ListingParams {
    pub(crate) property_type: Option<PropertyType>,
    pub(crate) is_available: Option<bool>,
    pub(crate) search: Option<String>,
    pub(crate) nights: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct BookingParams {
    pub(crate) status: Option<BookingStatus>,
    pub(crate) listing_id: Option<ListingId>,
    pub(crate) guest_id: Option<UserId>,
    pub(crate) search: Option<String>,
    pub(crate) nights: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ReviewParams {
    pub(crate) listing_id: Option<ListingId>,
    pub(crate) user_id: Option<UserId>,
    pub(crate) rating: Option<u8>,
    pub(crate) search: Option<String>,
    pub(crate) nights: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AvailabilityParams {
    pub(crate) check_in: NaiveDate,
    pub(crate) check_out: NaiveDate,
    pub(crate) exclude_booking_id: Option<BookingId>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AvailabilityToggle {
    pub(crate) is_available: bool,
}

#[derive(Debug, Deserialize)]
pub(crate) struct StatusChange {
    pub(crate) status: BookingStatus,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Reschedule {
    pub(crate) check_in_date: NaiveDate,
    pub(crate) check_out_date: NaiveDate,
}

pub(crate) async fn create_user_handler<S>(
    State(state): State<ListingState<S>>,
    Json(user): Json<NewUser>,
) -> Result<(StatusCode, Json<UserView>), ListingServiceError>
where
    S: TravelStore + 'static,
{
    let user = state.service.create_user(user)?;
    Ok((StatusCode::CREATED, Json(UserView::from(&user))))
}

pub(crate) async fn user_handler<S>(
    State(state): State<ListingState<S>>,
    Path(user_id): Path<UserId>,
) -> Result<Json<UserView>, ListingServiceError>
where
    S: TravelStore + 'static,
{
    let user = state.service.user(user_id)?;
    Ok(Json(UserView::from(&user)))
}

pub(crate) async fn create_listing_handler<S>(
    State(state): State<ListingState<S>>,
    Json(listing): Json<NewListing>,
) -> Result<(StatusCode, Json<ListingView>), ListingServiceError>
where
    S: TravelStore + 'static,
{
    let listing = state.service.create_listing(listing)?;
    let view = state
        .service
        .listing_view(&listing, state.config.default_quote_nights)?;
    Ok((StatusCode::CREATED, Json(view)))
}

pub(crate) async fn list_listings_handler<S>(
    State(state): State<ListingState<S>>,
    Query(params): Query<ListingParams>,
) -> Result<Json<Vec<ListingView>>, ListingServiceError>
where
    S: TravelStore + 'static,
{
    let nights = state.quote_nights(params.nights.as_deref());
    let query = ListingQuery {
        property_type: params.property_type,
        is_available: params.is_available,
        search: params.search,
    };

    let views = state
        .service
        .listings(&query)?
        .iter()
        .map(|listing| state.service.listing_view(listing, nights))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Json(views))
}

pub(crate) async fn listing_handler<S>(
    State(state): State<ListingState<S>>,
    Path(listing_id): Path<ListingId>,
    Query(params): Query<QuoteParams>,
) -> Result<Json<ListingView>, ListingServiceError>
where
    S: TravelStore + 'static,
{
    let nights = state.quote_nights(params.nights.as_deref());
    let listing = state.service.listing(listing_id)?;
    Ok(Json(state.service.listing_view(&listing, nights)?))
}

pub(crate) async fn availability_handler<S>(
    State(state): State<ListingState<S>>,
    Path(listing_id): Path<ListingId>,
    Query(params): Query<AvailabilityParams>,
) -> Result<Json<AvailabilityView>, ListingServiceError>
where
    S: TravelStore + 'static,
{
    let stay = StayRange::new(params.check_in, params.check_out)?;
    let view = state
        .service
        .availability_view(listing_id, &stay, params.exclude_booking_id)?;
    Ok(Json(view))
}

pub(crate) async fn set_availability_handler<S>(
    State(state): State<ListingState<S>>,
    Path(listing_id): Path<ListingId>,
    Json(toggle): Json<AvailabilityToggle>,
) -> Result<Json<ListingView>, ListingServiceError>
where
    S: TravelStore + 'static,
{
    let listing = state
        .service
        .set_listing_availability(listing_id, toggle.is_available)?;
    let view = state
        .service
        .listing_view(&listing, state.config.default_quote_nights)?;
    Ok(Json(view))
}

pub(crate) async fn listing_reviews_handler<S>(
    State(state): State<ListingState<S>>,
    Path(listing_id): Path<ListingId>,
    Query(params): Query<QuoteParams>,
) -> Result<Json<Vec<ReviewView>>, ListingServiceError>
where
    S: TravelStore + 'static,
{
    let nights = state.quote_nights(params.nights.as_deref());
    let views = state
        .service
        .reviews_for_listing(listing_id)?
        .iter()
        .map(|review| state.service.review_view(review, nights))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Json(views))
}

pub(crate) async fn create_booking_handler<S>(
    State(state): State<ListingState<S>>,
    Json(request): Json<BookingRequest>,
) -> Result<(StatusCode, Json<BookingView>), ListingServiceError>
where
    S: TravelStore + 'static,
{
    let booking = state.service.create_booking(request)?;
    let view = state
        .service
        .booking_view(&booking, state.config.default_quote_nights)?;
    Ok((StatusCode::CREATED, Json(view)))
}

pub(crate) async fn list_bookings_handler<S>(
    State(state): State<ListingState<S>>,
    Query(params): Query<BookingParams>,
) -> Result<Json<Vec<BookingView>>, ListingServiceError>
where
    S: TravelStore + 'static,
{
    let nights = state.quote_nights(params.nights.as_deref());
    let query = BookingQuery {
        status: params.status,
        listing_id: params.listing_id,
        guest_id: params.guest_id,
        search: params.search,
    };

    let views = state
        .service
        .bookings(&query)?
        .iter()
        .map(|booking| state.service.booking_view(booking, nights))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Json(views))
}

pub(crate) async fn booking_handler<S>(
    State(state): State<ListingState<S>>,
    Path(booking_id): Path<BookingId>,
    Query(params): Query<QuoteParams>,
) -> Result<Json<BookingView>, ListingServiceError>
where
    S: TravelStore + 'static,
{
    let nights = state.quote_nights(params.nights.as_deref());
    let booking = state.service.booking(booking_id)?;
    Ok(Json(state.service.booking_view(&booking, nights)?))
}

pub(crate) async fn booking_status_handler<S>(
    State(state): State<ListingState<S>>,
    Path(booking_id): Path<BookingId>,
    Json(change): Json<StatusChange>,
) -> Result<Json<BookingView>, ListingServiceError>
where
    S: TravelStore + 'static,
{
    let booking = state
        .service
        .update_booking_status(booking_id, change.status)?;
    let view = state
        .service
        .booking_view(&booking, state.config.default_quote_nights)?;
    Ok(Json(view))
}

pub(crate) async fn reschedule_handler<S>(
    State(state): State<ListingState<S>>,
    Path(booking_id): Path<BookingId>,
    Json(dates): Json<Reschedule>,
) -> Result<Json<BookingView>, ListingServiceError>
where
    S: TravelStore + 'static,
{
    let booking = state.service.reschedule_booking(
        booking_id,
        dates.check_in_date,
        dates.check_out_date,
    )?;
    let view = state
        .service
        .booking_view(&booking, state.config.default_quote_nights)?;
    Ok(Json(view))
}

pub(crate) async fn create_review_handler<S>(
    State(state): State<ListingState<S>>,
    Json(request): Json<ReviewRequest>,
) -> Result<(StatusCode, Json<ReviewView>), ListingServiceError>
where
    S: TravelStore + 'static,
{
    let review = state.service.create_review(request)?;
    let view = state
        .service
        .review_view(&review, state.config.default_quote_nights)?;
    Ok((StatusCode::CREATED, Json(view)))
}

pub(crate) async fn list_reviews_handler<S>(
    State(state): State<ListingState<S>>,
    Query(params): Query<ReviewParams>,
) -> Result<Json<Vec<ReviewView>>, ListingServiceError>
where
    S: TravelStore + 'static,
{
    let nights = state.quote_nights(params.nights.as_deref());
    let query = ReviewQuery {
        listing_id: params.listing_id,
        user_id: params.user_id,
        rating: params.rating,
        search: params.search,
    };

    let views = state
        .service
        .reviews(&query)?
        .iter()
        .map(|review| state.service.review_view(review, nights))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Json(views))
}
