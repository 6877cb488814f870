use super::common::*;

use crate::listings::domain::{ListingId, ReviewRequest, User};
use crate::listings::{ListingServiceError, Missing, ValidationError};

fn review<S>(fixture: &Fixture<S>, user: &User, rating: u8) -> ReviewRequest {
    ReviewRequest {
        listing_id: fixture.listing.id,
        user_id: user.id,
        rating,
        comment: "Lovely stay".to_string(),
    }
}

#[test]
fn second_review_from_same_user_is_rejected() {
    let fixture = fixture();
    let service = &fixture.service;

    assert!(service
        .can_review(fixture.listing.id, fixture.guest.id)
        .expect("guard runs"));
    service
        .create_review(review(&fixture, &fixture.guest, 5))
        .expect("first review");
    assert!(!service
        .can_review(fixture.listing.id, fixture.guest.id)
        .expect("guard runs"));

    let err = service
        .create_review(review(&fixture, &fixture.guest, 3))
        .expect_err("duplicate rejected");
    match err {
        ListingServiceError::DuplicateReview {
            listing_id,
            user_id,
        } => {
            assert_eq!(listing_id, fixture.listing.id);
            assert_eq!(user_id, fixture.guest.id);
        }
        other => panic!("expected duplicate review, got {other:?}"),
    }

    let reviews = service
        .reviews_for_listing(fixture.listing.id)
        .expect("list reviews");
    assert_eq!(reviews.len(), 1);
}

#[test]
fn other_users_and_listings_are_independent() {
    let fixture = fixture();
    let service = &fixture.service;
    service
        .create_review(review(&fixture, &fixture.guest, 4))
        .expect("guest review");
    service
        .create_review(review(&fixture, &fixture.owner, 2))
        .expect("owner review on same listing");

    assert!(service
        .can_review(ListingId(fixture.listing.id.0 + 1), fixture.guest.id)
        .expect("guard runs"));
}

#[test]
fn ratings_outside_one_to_five_are_invalid() {
    let fixture = fixture();

    for rating in [0, 6] {
        let err = fixture
            .service
            .create_review(review(&fixture, &fixture.guest, rating))
            .expect_err("rating out of range");
        assert!(matches!(
            err,
            ListingServiceError::Validation(ValidationError::RatingOutOfRange(value)) if value == rating
        ));
    }
}

#[test]
fn storage_uniqueness_backs_up_the_guard() {
    let fixture = fixture_with(RacingStore::default());
    let service = &fixture.service;
    service
        .create_review(review(&fixture, &fixture.guest, 5))
        .expect("first review");

    let err = service
        .create_review(review(&fixture, &fixture.guest, 1))
        .expect_err("store rejects the duplicate");
    assert!(matches!(err, ListingServiceError::DuplicateReview { .. }));
}

#[test]
fn rating_summary_tracks_reviews() {
    let fixture = fixture();
    let service = &fixture.service;
    assert_eq!(
        service
            .rating_summary(fixture.listing.id)
            .expect("summary")
            .total_reviews,
        0
    );

    service
        .create_review(review(&fixture, &fixture.guest, 5))
        .expect("guest review");
    service
        .create_review(review(&fixture, &fixture.owner, 4))
        .expect("owner review");

    let summary = service.rating_summary(fixture.listing.id).expect("summary");
    assert_eq!(summary.total_reviews, 2);
    assert!((summary.average_rating - 4.5).abs() < f64::EPSILON);

    let view = service.listing_view(&fixture.listing, 7).expect("view");
    assert_eq!(view.total_reviews, 2);
}

#[test]
fn reviews_for_unknown_listing_are_not_found() {
    let fixture = fixture();
    assert!(matches!(
        fixture.service.reviews_for_listing(ListingId(77)),
        Err(ListingServiceError::NotFound(Missing::Listing(_)))
    ));
}
