use rust_decimal::{Decimal, RoundingStrategy};

use super::domain::{Listing, StayRange};

/// Decimal places kept on persisted monetary amounts.
pub const MONEY_SCALE: u32 = 2;

/// Exact `price_per_night * nights`; no rounding is applied here.
pub fn price_for(listing: &Listing, nights: u32) -> Decimal {
    listing.price_per_night * Decimal::from(nights)
}

/// Total for a stay, rounded the way a `decimal(10, 2)` column stores it.
pub fn quote_stay(listing: &Listing, stay: &StayRange) -> Decimal {
    to_persisted(price_for(listing, stay.nights()))
}

/// Round half to even at two places, matching the database quantisation.
pub fn to_persisted(amount: Decimal) -> Decimal {
    let mut rounded =
        amount.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointNearestEven);
    rounded.rescale(MONEY_SCALE);
    rounded
}

impl Listing {
    pub fn total_price_for_nights(&self, nights: u32) -> Decimal {
        price_for(self, nights)
    }
}
