use serde::Serialize;

use super::domain::{BookingId, Listing, ListingId, StayRange};
use super::repository::{BookingRepository, RepositoryError};

/// Outcome of checking a stay against a listing's calendar and availability flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum Availability {
    Available,
    Overlapping { booking_ids: Vec<BookingId> },
    ListingDisabled,
}

impl Availability {
    pub fn is_available(&self) -> bool {
        matches!(self, Availability::Available)
    }

    pub fn reason(&self) -> Option<&'static str> {
        match self {
            Availability::Available => None,
            Availability::Overlapping { .. } => Some("overlapping_booking"),
            Availability::ListingDisabled => Some("listing_unavailable"),
        }
    }

    /// Turn a negative outcome into the conflict reported to callers.
    pub fn ensure(
        self,
        listing_id: ListingId,
        stay: StayRange,
    ) -> Result<(), AvailabilityConflict> {
        match self {
            Availability::Available => Ok(()),
            Availability::Overlapping { .. } => {
                Err(AvailabilityConflict::OverlappingBooking { listing_id, stay })
            }
            Availability::ListingDisabled => {
                Err(AvailabilityConflict::ListingUnavailable { listing_id })
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AvailabilityConflict {
    #[error("listing {listing_id} is unavailable for these dates {stay}")]
    OverlappingBooking {
        listing_id: ListingId,
        stay: StayRange,
    },
    #[error("listing {listing_id} is not available")]
    ListingUnavailable { listing_id: ListingId },
}

/// Evaluate whether `stay` can be booked on `listing`.
///
/// Overlap with a pending or confirmed booking (other than `exclude`) is
/// checked first, then the listing's availability flag. Read-only.
pub fn check_availability<B>(
    bookings: &B,
    listing: &Listing,
    stay: &StayRange,
    exclude: Option<BookingId>,
) -> Result<Availability, RepositoryError>
where
    B: BookingRepository + ?Sized,
{
    let booking_ids: Vec<BookingId> = bookings
        .overlapping_bookings(listing.id, stay, exclude)?
        .into_iter()
        .filter(|booking| {
            booking.listing_id == listing.id
                && booking.is_active()
                && Some(booking.id) != exclude
                && booking.overlaps(stay)
        })
        .map(|booking| booking.id)
        .collect();

    if !booking_ids.is_empty() {
        return Ok(Availability::Overlapping { booking_ids });
    }

    if !listing.is_available {
        return Ok(Availability::ListingDisabled);
    }

    Ok(Availability::Available)
}

/// Boolean form of [`check_availability`].
pub fn is_available<B>(
    bookings: &B,
    listing: &Listing,
    stay: &StayRange,
    exclude: Option<BookingId>,
) -> Result<bool, RepositoryError>
where
    B: BookingRepository + ?Sized,
{
    check_availability(bookings, listing, stay, exclude).map(|outcome| outcome.is_available())
}
