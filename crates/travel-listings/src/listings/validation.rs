use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::domain::{NewListing, NewUser};

pub const MIN_PRICE_PER_NIGHT: Decimal = dec!(1.00);
/// Ten significant digits with two after the point.
pub const MAX_PRICE_PER_NIGHT: Decimal = dec!(99999999.99);
pub const MAX_TITLE_LEN: usize = 200;
pub const MAX_LOCATION_LEN: usize = 200;
pub const MAX_USERNAME_LEN: usize = 150;

/// Input errors caught before anything reaches storage.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("check-out date must be after check-in date (check-in {check_in}, check-out {check_out})")]
    CheckOutNotAfterCheckIn {
        check_in: NaiveDate,
        check_out: NaiveDate,
    },
    #[error("rating must be between 1 and 5, got {0}")]
    RatingOutOfRange(u8),
    #[error("price per night must be at least {min}, got {0}", min = MIN_PRICE_PER_NIGHT)]
    PriceBelowMinimum(Decimal),
    #[error("price per night exceeds {max}, got {0}", max = MAX_PRICE_PER_NIGHT)]
    PriceTooLarge(Decimal),
    #[error("price per night allows at most two decimal places, got {0}")]
    PriceTooPrecise(Decimal),
    #[error("{field} must not be blank")]
    Blank { field: &'static str },
    #[error("{field} must be at most {max} characters")]
    TooLong { field: &'static str, max: usize },
    #[error("{field} must be at least 1")]
    ZeroCapacity { field: &'static str },
}

/// Field-level checks for a listing before it is stored.
pub fn validate_new_listing(listing: &NewListing) -> Result<(), ValidationError> {
    require_text("title", &listing.title, MAX_TITLE_LEN)?;
    require_text("location", &listing.location, MAX_LOCATION_LEN)?;
    validate_price(listing.price_per_night)?;

    for (field, value) in [
        ("bedrooms", listing.bedrooms),
        ("bathrooms", listing.bathrooms),
        ("max_guests", listing.max_guests),
    ] {
        if value == 0 {
            return Err(ValidationError::ZeroCapacity { field });
        }
    }

    Ok(())
}

pub fn validate_price(price: Decimal) -> Result<(), ValidationError> {
    if price < MIN_PRICE_PER_NIGHT {
        return Err(ValidationError::PriceBelowMinimum(price));
    }
    if price > MAX_PRICE_PER_NIGHT {
        return Err(ValidationError::PriceTooLarge(price));
    }
    if price.normalize().scale() > 2 {
        return Err(ValidationError::PriceTooPrecise(price));
    }
    Ok(())
}

pub fn validate_new_user(user: &NewUser) -> Result<(), ValidationError> {
    require_text("username", &user.username, MAX_USERNAME_LEN)
}

fn require_text(field: &'static str, value: &str, max: usize) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::Blank { field });
    }
    if value.chars().count() > max {
        return Err(ValidationError::TooLong { field, max });
    }
    Ok(())
}
