//! Sample data for local development and demos.
//!
//! The generator is deterministic: the same plan against the same store and
//! date produces the same records, which keeps demo output and tests stable.

use std::collections::HashMap;

use chrono::{Duration, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{info, warn};

use super::domain::{
    BookingStatus, ListingId, NewBooking, NewListing, NewReview, NewUser, PropertyType, Rating,
    StayRange, User,
};
use super::pricing::quote_stay;
use super::repository::{ListingQuery, RepositoryError, TravelStore};
use super::validation::ValidationError;

const LOCATIONS: [&str; 12] = [
    "Miami Beach, FL",
    "Downtown LA, CA",
    "Times Square, NY",
    "Fisherman's Wharf, CA",
    "French Quarter, LA",
    "Banff, AB",
    "Cancun Beach, Mexico",
    "Lake Tahoe, CA",
    "Key West, FL",
    "Asheville, NC",
    "Santa Fe, NM",
    "Portland, OR",
];

const FIRST_NAMES: [&str; 8] = [
    "Amara", "Bruno", "Chen", "Dalia", "Emeka", "Freya", "Gustavo", "Hana",
];

const LAST_NAMES: [&str; 8] = [
    "Okafor", "Lindqvist", "Moreau", "Tanaka", "Alvarez", "Nkemelu", "Kowalski", "Reyes",
];

const LISTING_STYLES: [&str; 6] = ["Cozy", "Modern", "Rustic", "Sunlit", "Spacious", "Charming"];

const DESCRIPTIONS: [&str; 5] = [
    "Walking distance to cafes and the waterfront. Fast wifi and a fully stocked kitchen.",
    "Quiet street, private patio and free parking. Check-in is self-service.",
    "Recently renovated with a workspace and blackout curtains. Great for longer stays.",
    "Family friendly with a fenced yard. Linens and towels provided.",
    "Steps from public transit. Rooftop views of the skyline at sunset.",
];

const REVIEW_COMMENTS: [&str; 6] = [
    "Spotless and exactly as pictured.",
    "Great location, a little noisy at night.",
    "Host was responsive and check-in was easy.",
    "Comfortable beds, would stay again.",
    "Kitchen was missing a few basics.",
    "Perfect base for exploring the area.",
];

const SEEDED_STATUSES: [BookingStatus; 3] = [
    BookingStatus::Pending,
    BookingStatus::Confirmed,
    BookingStatus::Completed,
];

/// Lowest and highest nightly rate handed out, in cents.
const PRICE_FLOOR_CENTS: i64 = 4_500;
const PRICE_SPAN_CENTS: i64 = 30_501;

/// How many records of each kind to generate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedPlan {
    pub users: usize,
    pub listings: usize,
    pub bookings: usize,
    pub reviews: usize,
}

impl Default for SeedPlan {
    fn default() -> Self {
        Self {
            users: 5,
            listings: 20,
            bookings: 30,
            reviews: 25,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SeedReport {
    pub users_created: usize,
    pub users_existing: usize,
    pub listings_created: usize,
    pub bookings_created: usize,
    pub bookings_skipped: usize,
    pub reviews_created: usize,
    pub reviews_skipped: usize,
}

#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error(transparent)]
    Storage(#[from] RepositoryError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Populate `store` following `plan`. Booking dates fall within the year
/// before `today`, ending at least a month ago.
pub fn seed<S>(store: &S, plan: &SeedPlan, today: NaiveDate) -> Result<SeedReport, SeedError>
where
    S: TravelStore + ?Sized,
{
    info!(?plan, %today, "seeding store");
    let mut report = SeedReport::default();

    seed_users(store, plan.users, &mut report)?;
    seed_listings(store, plan.listings, &mut report)?;
    seed_bookings(store, plan.bookings, today, &mut report)?;
    seed_reviews(store, plan.reviews, &mut report)?;

    info!(?report, "seeding completed");
    Ok(report)
}

fn seed_users<S>(store: &S, count: usize, report: &mut SeedReport) -> Result<(), SeedError>
where
    S: TravelStore + ?Sized,
{
    for index in 0..count {
        let username = format!("travel_user_{}", index + 1);
        if store.find_user_by_username(&username)?.is_some() {
            report.users_existing += 1;
            continue;
        }

        let user = NewUser {
            email: format!("{username}@example.com"),
            first_name: FIRST_NAMES[index % FIRST_NAMES.len()].to_string(),
            last_name: LAST_NAMES[(index * 3) % LAST_NAMES.len()].to_string(),
            username,
        };
        store.insert_user(user)?;
        report.users_created += 1;
    }

    info!(
        created = report.users_created,
        existing = report.users_existing,
        "users ready"
    );
    Ok(())
}

fn seed_listings<S>(store: &S, count: usize, report: &mut SeedReport) -> Result<(), SeedError>
where
    S: TravelStore + ?Sized,
{
    let owners = store.list_users()?;
    if owners.is_empty() {
        warn!("no users found, skipping listings");
        return Ok(());
    }

    for index in 0..count {
        let property_type = PropertyType::ALL[index % PropertyType::ALL.len()];
        let location = LOCATIONS[(index * 7) % LOCATIONS.len()];
        let city = location.split(',').next().unwrap_or(location);
        let style = LISTING_STYLES[index % LISTING_STYLES.len()];
        let cents = PRICE_FLOOR_CENTS + (index as i64 * 3_701) % PRICE_SPAN_CENTS;

        let listing = NewListing {
            title: format!("{style} {} in {city}", property_type.label()),
            description: DESCRIPTIONS[index % DESCRIPTIONS.len()].to_string(),
            property_type,
            price_per_night: Decimal::new(cents, 2),
            bedrooms: 1 + (index % 4) as u32,
            bathrooms: 1 + (index % 3) as u32,
            max_guests: 2 + (index % 7) as u32,
            location: location.to_string(),
            is_available: index % 4 != 3,
            owner_id: owners[index % owners.len()].id,
        };
        super::validation::validate_new_listing(&listing)?;
        store.insert_listing(listing)?;
        report.listings_created += 1;

        if report.listings_created % 5 == 0 {
            info!(created = report.listings_created, total = count, "listings progress");
        }
    }

    Ok(())
}

fn seed_bookings<S>(
    store: &S,
    count: usize,
    today: NaiveDate,
    report: &mut SeedReport,
) -> Result<(), SeedError>
where
    S: TravelStore + ?Sized,
{
    let available = store.list_listings(&ListingQuery {
        is_available: Some(true),
        ..ListingQuery::default()
    })?;
    let guests = store.list_users()?;
    if available.is_empty() || guests.is_empty() {
        warn!("no available listings or guests found, skipping bookings");
        return Ok(());
    }

    let latest_check_out = today - Duration::days(30);
    let earliest_check_in = today - Duration::days(365);
    // Each listing's bookings are laid out back to back, walking backwards in time.
    let mut cursors: HashMap<ListingId, NaiveDate> = HashMap::new();

    for index in 0..count {
        let listing = &available[index % available.len()];
        let guest: &User = &guests[(index * 2 + 1) % guests.len()];
        let nights = 2 + (index * 5) % 13;
        let gap = (index % 3) as i64;

        let cursor = cursors.entry(listing.id).or_insert(latest_check_out);
        let check_out = *cursor - Duration::days(gap);
        let check_in = check_out - Duration::days(nights as i64);
        if check_in < earliest_check_in {
            report.bookings_skipped += 1;
            continue;
        }
        *cursor = check_in;

        let stay = StayRange::new(check_in, check_out)?;
        let booking = NewBooking {
            listing_id: listing.id,
            guest_id: guest.id,
            stay,
            total_price: quote_stay(listing, &stay),
            status: SEEDED_STATUSES[index % SEEDED_STATUSES.len()],
        };

        match store.insert_booking(booking) {
            Ok(_) => report.bookings_created += 1,
            Err(RepositoryError::Conflict) => report.bookings_skipped += 1,
            Err(err) => return Err(err.into()),
        }

        if report.bookings_created > 0 && report.bookings_created % 10 == 0 {
            info!(created = report.bookings_created, total = count, "bookings progress");
        }
    }

    Ok(())
}

fn seed_reviews<S>(store: &S, count: usize, report: &mut SeedReport) -> Result<(), SeedError>
where
    S: TravelStore + ?Sized,
{
    let listings = store.list_listings(&ListingQuery::default())?;
    let users = store.list_users()?;
    if listings.is_empty() || users.is_empty() {
        warn!("no listings or users found, skipping reviews");
        return Ok(());
    }

    for index in 0..count {
        let listing = &listings[index % listings.len()];
        let user = &users[(index / listings.len() + index) % users.len()];

        if store.review_exists(listing.id, user.id)? {
            report.reviews_skipped += 1;
            continue;
        }

        let review = NewReview {
            listing_id: listing.id,
            user_id: user.id,
            rating: Rating::new(1 + ((index * 3 + 2) % 5) as u8)?,
            comment: REVIEW_COMMENTS[index % REVIEW_COMMENTS.len()].to_string(),
        };
        match store.insert_review(review) {
            Ok(_) => report.reviews_created += 1,
            Err(RepositoryError::Conflict) => report.reviews_skipped += 1,
            Err(err) => return Err(err.into()),
        }
    }

    info!(
        created = report.reviews_created,
        skipped = report.reviews_skipped,
        "reviews ready"
    );
    Ok(())
}
