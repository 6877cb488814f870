use super::common::*;
use rust_decimal_macros::dec;

use crate::listings::domain::{BookingId, BookingStatus, ListingId, UserId};
use crate::listings::repository::{BookingQuery, BookingRepository, RepositoryError};
use crate::listings::{AvailabilityConflict, ListingServiceError, Missing, ValidationError};

#[test]
fn create_booking_prices_nights_and_starts_pending() {
    let fixture = fixture();

    let booking = fixture
        .service
        .create_booking(booking_request(&fixture.listing, &fixture.guest, (3, 1), (3, 4)))
        .expect("booking created");

    assert_eq!(booking.total_price, dec!(300.00));
    assert_eq!(booking.total_price.to_string(), "300.00");
    assert_eq!(booking.status, BookingStatus::Pending);
    assert_eq!(booking.nights_booked(), 3);
    assert_eq!(booking.guest_id, fixture.guest.id);
}

#[test]
fn fractional_rates_stay_exact() {
    let fixture = fixture();
    let listing = fixture
        .service
        .create_listing(new_listing(fixture.owner.id, dec!(33.33)))
        .expect("listing created");

    let booking = fixture
        .service
        .create_booking(booking_request(&listing, &fixture.guest, (5, 10), (5, 13)))
        .expect("booking created");
    assert_eq!(booking.total_price, dec!(99.99));
}

#[test]
fn rejects_check_out_on_or_before_check_in_without_writing() {
    let fixture = fixture();

    for (check_in, check_out) in [((3, 5), (3, 5)), ((3, 5), (3, 1))] {
        let err = fixture
            .service
            .create_booking(booking_request(&fixture.listing, &fixture.guest, check_in, check_out))
            .expect_err("inverted range rejected");
        assert!(matches!(
            err,
            ListingServiceError::Validation(ValidationError::CheckOutNotAfterCheckIn { .. })
        ));
    }

    let stored = fixture
        .service
        .bookings(&BookingQuery::default())
        .expect("list bookings");
    assert!(stored.is_empty());
}

#[test]
fn overlapping_request_is_rejected_and_back_to_back_accepted() {
    let fixture = fixture();
    let service = &fixture.service;
    service
        .create_booking(booking_request(&fixture.listing, &fixture.guest, (3, 1), (3, 5)))
        .expect("first booking");

    let err = service
        .create_booking(booking_request(&fixture.listing, &fixture.guest, (3, 4), (3, 8)))
        .expect_err("overlap rejected");
    match err {
        ListingServiceError::Availability(AvailabilityConflict::OverlappingBooking {
            listing_id,
            ..
        }) => assert_eq!(listing_id, fixture.listing.id),
        other => panic!("expected overlap conflict, got {other:?}"),
    }

    let next = service
        .create_booking(booking_request(&fixture.listing, &fixture.guest, (3, 5), (3, 8)))
        .expect("back-to-back stay accepted");
    assert_eq!(next.total_price, dec!(300.00));
}

#[test]
fn unavailable_listing_rejects_bookings() {
    let fixture = fixture();
    fixture
        .service
        .set_listing_availability(fixture.listing.id, false)
        .expect("toggle");

    let err = fixture
        .service
        .create_booking(booking_request(&fixture.listing, &fixture.guest, (7, 1), (7, 3)))
        .expect_err("disabled listing");
    assert!(matches!(
        err,
        ListingServiceError::Availability(AvailabilityConflict::ListingUnavailable { .. })
    ));
}

#[test]
fn missing_records_are_not_found() {
    let fixture = fixture();
    let mut request = booking_request(&fixture.listing, &fixture.guest, (3, 1), (3, 2));
    request.listing_id = ListingId(404);
    assert!(matches!(
        fixture.service.create_booking(request),
        Err(ListingServiceError::NotFound(Missing::Listing(ListingId(404))))
    ));

    let mut request = booking_request(&fixture.listing, &fixture.guest, (3, 1), (3, 2));
    request.guest_id = UserId(404);
    assert!(matches!(
        fixture.service.create_booking(request),
        Err(ListingServiceError::NotFound(Missing::User(UserId(404))))
    ));

    assert!(matches!(
        fixture.service.booking(BookingId(1)),
        Err(ListingServiceError::NotFound(Missing::Booking(_)))
    ));
}

#[test]
fn storage_conflict_after_clean_check_is_reported_as_overlap() {
    let fixture = fixture_with(RacingStore::default());
    let service = &fixture.service;
    service
        .create_booking(booking_request(&fixture.listing, &fixture.guest, (3, 1), (3, 5)))
        .expect("first booking");

    let err = service
        .create_booking(booking_request(&fixture.listing, &fixture.guest, (3, 3), (3, 6)))
        .expect_err("store rejects the second write");
    assert!(matches!(
        err,
        ListingServiceError::Availability(AvailabilityConflict::OverlappingBooking { .. })
    ));

    let stored = service
        .bookings(&BookingQuery::default())
        .expect("list bookings");
    assert_eq!(stored.len(), 1);
}

#[test]
fn listing_closed_mid_request_blocks_the_insert() {
    let fixture = fixture_with(RacingStore {
        closes_listing: true,
        ..RacingStore::default()
    });

    let err = fixture
        .service
        .create_booking(booking_request(&fixture.listing, &fixture.guest, (3, 1), (3, 4)))
        .expect_err("store sees the listing switched off");
    assert!(matches!(
        err,
        ListingServiceError::Availability(AvailabilityConflict::ListingUnavailable { listing_id })
            if listing_id == fixture.listing.id
    ));
    assert!(fixture
        .service
        .bookings(&BookingQuery::default())
        .expect("list bookings")
        .is_empty());
}

#[test]
fn listing_closed_mid_reschedule_keeps_the_old_dates() {
    let open = fixture_with(RacingStore::default());
    let booking = open
        .service
        .create_booking(booking_request(&open.listing, &open.guest, (3, 1), (3, 4)))
        .expect("booking while open");

    let closing = crate::listings::ListingService::new(std::sync::Arc::new(RacingStore {
        inner: open.service.store().inner.clone(),
        closes_listing: true,
    }));
    let err = closing
        .reschedule_booking(booking.id, date(3, 10), date(3, 12))
        .expect_err("store sees the listing switched off");
    assert!(matches!(
        err,
        ListingServiceError::Availability(AvailabilityConflict::ListingUnavailable { .. })
    ));

    let stored = closing.booking(booking.id).expect("booking kept");
    assert_eq!(stored.check_in_date, date(3, 1));
    assert_eq!(stored.check_out_date, date(3, 4));
}

#[test]
fn storage_outage_surfaces_as_storage_error() {
    let service = crate::listings::ListingService::new(std::sync::Arc::new(UnavailableStore));
    let request = crate::listings::BookingRequest {
        listing_id: ListingId(1),
        guest_id: UserId(1),
        check_in_date: date(3, 1),
        check_out_date: date(3, 2),
    };

    assert!(matches!(
        service.create_booking(request),
        Err(ListingServiceError::Storage(RepositoryError::Unavailable(_)))
    ));
}

#[test]
fn status_transitions_follow_the_lifecycle() {
    let fixture = fixture();
    let service = &fixture.service;
    let booking = service
        .create_booking(booking_request(&fixture.listing, &fixture.guest, (4, 1), (4, 3)))
        .expect("booking created");

    let confirmed = service
        .update_booking_status(booking.id, BookingStatus::Confirmed)
        .expect("pending -> confirmed");
    assert_eq!(confirmed.status, BookingStatus::Confirmed);

    let completed = service
        .update_booking_status(booking.id, BookingStatus::Completed)
        .expect("confirmed -> completed");
    assert_eq!(completed.status, BookingStatus::Completed);

    let err = service
        .update_booking_status(booking.id, BookingStatus::Pending)
        .expect_err("completed is terminal");
    assert!(matches!(
        err,
        ListingServiceError::InvalidTransition {
            from: BookingStatus::Completed,
            to: BookingStatus::Pending,
        }
    ));
}

#[test]
fn cancelling_frees_the_dates() {
    let fixture = fixture();
    let service = &fixture.service;
    let booking = service
        .create_booking(booking_request(&fixture.listing, &fixture.guest, (4, 1), (4, 5)))
        .expect("booking created");

    service
        .update_booking_status(booking.id, BookingStatus::Cancelled)
        .expect("cancel");

    service
        .create_booking(booking_request(&fixture.listing, &fixture.guest, (4, 2), (4, 4)))
        .expect("dates free after cancellation");
}

#[test]
fn reschedule_reprices_and_ignores_its_own_dates() {
    let fixture = fixture();
    let service = &fixture.service;
    let booking = service
        .create_booking(booking_request(&fixture.listing, &fixture.guest, (3, 1), (3, 4)))
        .expect("booking created");

    let moved = service
        .reschedule_booking(booking.id, date(3, 2), date(3, 7))
        .expect("overlapping with itself only");
    assert_eq!(moved.check_in_date, date(3, 2));
    assert_eq!(moved.check_out_date, date(3, 7));
    assert_eq!(moved.total_price, dec!(500.00));

    let stored = service
        .store()
        .fetch_booking(booking.id)
        .expect("fetch")
        .expect("present");
    assert_eq!(stored, moved);
}

#[test]
fn reschedule_onto_another_booking_is_rejected() {
    let fixture = fixture();
    let service = &fixture.service;
    let first = service
        .create_booking(booking_request(&fixture.listing, &fixture.guest, (3, 1), (3, 4)))
        .expect("first");
    service
        .create_booking(booking_request(&fixture.listing, &fixture.guest, (3, 10), (3, 12)))
        .expect("second");

    let err = service
        .reschedule_booking(first.id, date(3, 9), date(3, 11))
        .expect_err("clashes with the second booking");
    assert!(matches!(err, ListingServiceError::Availability(_)));

    let unchanged = service.booking(first.id).expect("still there");
    assert_eq!(unchanged.check_in_date, date(3, 1));
}

#[test]
fn closed_bookings_cannot_be_rescheduled() {
    let fixture = fixture();
    let service = &fixture.service;
    let booking = service
        .create_booking(booking_request(&fixture.listing, &fixture.guest, (3, 1), (3, 4)))
        .expect("booking created");
    service
        .update_booking_status(booking.id, BookingStatus::Cancelled)
        .expect("cancel");

    let err = service
        .reschedule_booking(booking.id, date(3, 5), date(3, 6))
        .expect_err("cancelled booking is closed");
    assert!(matches!(
        err,
        ListingServiceError::BookingClosed {
            status: BookingStatus::Cancelled,
            ..
        }
    ));
}

#[test]
fn booking_view_carries_listing_and_nights() {
    let fixture = fixture();
    let booking = fixture
        .service
        .create_booking(booking_request(&fixture.listing, &fixture.guest, (3, 1), (3, 4)))
        .expect("booking created");

    let view = fixture.service.booking_view(&booking, 2).expect("view");
    assert_eq!(view.nights_booked, 3);
    assert_eq!(view.listing.total_price_for_nights, dec!(200.00));
    assert_eq!(view.listing.owner.username, fixture.owner.username);
    assert_eq!(view.guest.username, "guest");
}
