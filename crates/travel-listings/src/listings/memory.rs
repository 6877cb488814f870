use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::Utc;

use super::domain::{
    Booking, BookingId, Listing, ListingId, NewBooking, NewListing, NewReview, NewUser, Review,
    ReviewId, StayRange, User, UserId,
};
use super::repository::{
    BookingQuery, BookingRepository, ListingQuery, ListingRepository, RepositoryError,
    ReviewQuery, ReviewRepository, UserRepository,
};

#[derive(Debug, Default)]
struct Tables {
    users: BTreeMap<UserId, User>,
    listings: BTreeMap<ListingId, Listing>,
    bookings: BTreeMap<BookingId, Booking>,
    reviews: BTreeMap<ReviewId, Review>,
    next_user: u64,
    next_listing: u64,
    next_booking: u64,
    next_review: u64,
}

impl Tables {
    fn next_id(counter: &mut u64) -> u64 {
        *counter += 1;
        *counter
    }

    fn listing_open(&self, listing_id: ListingId) -> Result<bool, RepositoryError> {
        self.listings
            .get(&listing_id)
            .map(|listing| listing.is_available)
            .ok_or(RepositoryError::NotFound)
    }

    fn listing_title(&self, listing_id: ListingId) -> &str {
        self.listings
            .get(&listing_id)
            .map_or("", |listing| listing.title.as_str())
    }

    fn username(&self, user_id: UserId) -> &str {
        self.users
            .get(&user_id)
            .map_or("", |user| user.username.as_str())
    }

    /// Active bookings on the listing clashing with `stay`, ignoring `exclude`.
    fn clashes<'a>(
        &'a self,
        listing_id: ListingId,
        stay: &'a StayRange,
        exclude: Option<BookingId>,
    ) -> impl Iterator<Item = &'a Booking> + 'a {
        self.bookings.values().filter(move |booking| {
            booking.listing_id == listing_id
                && booking.is_active()
                && Some(booking.id) != exclude
                && booking.overlaps(stay)
        })
    }
}

/// Process-local store backing the API service, the seeder and tests.
///
/// All tables sit behind one mutex, so the overlap, availability-flag and
/// uniqueness checks in `insert_booking`, `update_booking` and `insert_review`
/// run in the same critical section as the write they guard.
#[derive(Debug, Default, Clone)]
pub struct InMemoryStore {
    tables: Arc<Mutex<Tables>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Tables>, RepositoryError> {
        self.tables
            .lock()
            .map_err(|_| RepositoryError::Unavailable("store mutex poisoned".to_string()))
    }
}

impl UserRepository for InMemoryStore {
    fn insert_user(&self, user: NewUser) -> Result<User, RepositoryError> {
        let mut tables = self.lock()?;
        if tables
            .users
            .values()
            .any(|existing| existing.username == user.username)
        {
            return Err(RepositoryError::Conflict);
        }

        let id = UserId(Tables::next_id(&mut tables.next_user));
        let record = User {
            id,
            username: user.username,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
        };
        tables.users.insert(id, record.clone());
        Ok(record)
    }

    fn fetch_user(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        Ok(self.lock()?.users.get(&id).cloned())
    }

    fn find_user_by_username(&self, username: &str) -> Result<Option<User>, RepositoryError> {
        Ok(self
            .lock()?
            .users
            .values()
            .find(|user| user.username == username)
            .cloned())
    }

    fn list_users(&self) -> Result<Vec<User>, RepositoryError> {
        Ok(self.lock()?.users.values().cloned().collect())
    }
}

impl ListingRepository for InMemoryStore {
    fn insert_listing(&self, listing: NewListing) -> Result<Listing, RepositoryError> {
        let mut tables = self.lock()?;
        let id = ListingId(Tables::next_id(&mut tables.next_listing));
        let now = Utc::now();
        let record = Listing {
            id,
            title: listing.title,
            description: listing.description,
            property_type: listing.property_type,
            price_per_night: listing.price_per_night,
            bedrooms: listing.bedrooms,
            bathrooms: listing.bathrooms,
            max_guests: listing.max_guests,
            location: listing.location,
            is_available: listing.is_available,
            owner_id: listing.owner_id,
            created_at: now,
            updated_at: now,
        };
        tables.listings.insert(id, record.clone());
        Ok(record)
    }

    fn fetch_listing(&self, id: ListingId) -> Result<Option<Listing>, RepositoryError> {
        Ok(self.lock()?.listings.get(&id).cloned())
    }

    fn set_listing_availability(
        &self,
        id: ListingId,
        is_available: bool,
    ) -> Result<Listing, RepositoryError> {
        let mut tables = self.lock()?;
        let listing = tables
            .listings
            .get_mut(&id)
            .ok_or(RepositoryError::NotFound)?;
        listing.is_available = is_available;
        listing.updated_at = Utc::now();
        Ok(listing.clone())
    }

    fn list_listings(&self, query: &ListingQuery) -> Result<Vec<Listing>, RepositoryError> {
        Ok(self
            .lock()?
            .listings
            .values()
            .rev()
            .filter(|listing| query.matches(listing))
            .cloned()
            .collect())
    }
}

impl BookingRepository for InMemoryStore {
    fn overlapping_bookings(
        &self,
        listing_id: ListingId,
        stay: &StayRange,
        exclude: Option<BookingId>,
    ) -> Result<Vec<Booking>, RepositoryError> {
        let tables = self.lock()?;
        let clashes = tables.clashes(listing_id, stay, exclude).cloned().collect();
        Ok(clashes)
    }

    fn insert_booking(&self, booking: NewBooking) -> Result<Booking, RepositoryError> {
        let mut tables = self.lock()?;
        if booking.status.is_active()
            && (!tables.listing_open(booking.listing_id)?
                || tables
                    .clashes(booking.listing_id, &booking.stay, None)
                    .next()
                    .is_some())
        {
            return Err(RepositoryError::Conflict);
        }

        let id = BookingId(Tables::next_id(&mut tables.next_booking));
        let record = Booking {
            id,
            listing_id: booking.listing_id,
            guest_id: booking.guest_id,
            check_in_date: booking.stay.check_in(),
            check_out_date: booking.stay.check_out(),
            total_price: booking.total_price,
            status: booking.status,
            created_at: Utc::now(),
        };
        tables.bookings.insert(id, record.clone());
        Ok(record)
    }

    fn update_booking(&self, booking: Booking) -> Result<Booking, RepositoryError> {
        let mut tables = self.lock()?;
        let stored = tables
            .bookings
            .get(&booking.id)
            .ok_or(RepositoryError::NotFound)?;
        let moved = stored.check_in_date != booking.check_in_date
            || stored.check_out_date != booking.check_out_date;

        // Status changes on a closed listing are fine; new dates are not.
        if booking.is_active() && moved && !tables.listing_open(booking.listing_id)? {
            return Err(RepositoryError::Conflict);
        }

        if booking.is_active() {
            let stay = StayRange::new(booking.check_in_date, booking.check_out_date)
                .map_err(|err| RepositoryError::Unavailable(err.to_string()))?;
            if tables
                .clashes(booking.listing_id, &stay, Some(booking.id))
                .next()
                .is_some()
            {
                return Err(RepositoryError::Conflict);
            }
        }

        tables.bookings.insert(booking.id, booking.clone());
        Ok(booking)
    }

    fn fetch_booking(&self, id: BookingId) -> Result<Option<Booking>, RepositoryError> {
        Ok(self.lock()?.bookings.get(&id).cloned())
    }

    fn list_bookings(&self, query: &BookingQuery) -> Result<Vec<Booking>, RepositoryError> {
        let tables = self.lock()?;
        Ok(tables
            .bookings
            .values()
            .rev()
            .filter(|booking| {
                query.matches(booking)
                    && query.matches_search(
                        tables.listing_title(booking.listing_id),
                        tables.username(booking.guest_id),
                    )
            })
            .cloned()
            .collect())
    }
}

impl ReviewRepository for InMemoryStore {
    fn review_exists(
        &self,
        listing_id: ListingId,
        user_id: UserId,
    ) -> Result<bool, RepositoryError> {
        Ok(self
            .lock()?
            .reviews
            .values()
            .any(|review| review.listing_id == listing_id && review.user_id == user_id))
    }

    fn insert_review(&self, review: NewReview) -> Result<Review, RepositoryError> {
        let mut tables = self.lock()?;
        if tables.reviews.values().any(|existing| {
            existing.listing_id == review.listing_id && existing.user_id == review.user_id
        }) {
            return Err(RepositoryError::Conflict);
        }

        let id = ReviewId(Tables::next_id(&mut tables.next_review));
        let now = Utc::now();
        let record = Review {
            id,
            listing_id: review.listing_id,
            user_id: review.user_id,
            rating: review.rating,
            comment: review.comment,
            created_at: now,
            updated_at: now,
        };
        tables.reviews.insert(id, record.clone());
        Ok(record)
    }

    fn reviews_for_listing(&self, listing_id: ListingId) -> Result<Vec<Review>, RepositoryError> {
        Ok(self
            .lock()?
            .reviews
            .values()
            .rev()
            .filter(|review| review.listing_id == listing_id)
            .cloned()
            .collect())
    }

    fn list_reviews(&self, query: &ReviewQuery) -> Result<Vec<Review>, RepositoryError> {
        let tables = self.lock()?;
        Ok(tables
            .reviews
            .values()
            .rev()
            .filter(|review| {
                query.matches(review)
                    && query.matches_search(
                        review,
                        tables.listing_title(review.listing_id),
                        tables.username(review.user_id),
                    )
            })
            .cloned()
            .collect())
    }
}
