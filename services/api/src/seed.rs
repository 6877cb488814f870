use chrono::{Local, NaiveDate};
use clap::Args;
use std::sync::Arc;
use travel_listings::error::AppError;
use travel_listings::listings::{
    seed, InMemoryStore, ListingQuery, ListingService, SeedPlan, SeedReport,
};

/// Listings shown in the human-readable summary.
const SAMPLE_SIZE: usize = 5;

#[derive(Args, Debug)]
pub(crate) struct SeedArgs {
    /// Number of users to create
    #[arg(long, default_value_t = 5)]
    pub(crate) users: usize,
    /// Number of listings to create
    #[arg(long, default_value_t = 20)]
    pub(crate) listings: usize,
    /// Number of bookings to attempt
    #[arg(long, default_value_t = 30)]
    pub(crate) bookings: usize,
    /// Number of reviews to attempt
    #[arg(long, default_value_t = 25)]
    pub(crate) reviews: usize,
    /// Anchor date for booking history (defaults to today)
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) today: Option<NaiveDate>,
    /// Print the seed report as JSON instead of a summary
    #[arg(long)]
    pub(crate) json: bool,
}

impl SeedArgs {
    fn plan(&self) -> SeedPlan {
        SeedPlan {
            users: self.users,
            listings: self.listings,
            bookings: self.bookings,
            reviews: self.reviews,
        }
    }
}

/// Seeds a fresh store that is dropped on return, so the output previews the
/// data `serve --seed` would load.
pub(crate) fn run_seed(args: SeedArgs) -> Result<(), AppError> {
    let today = args.today.unwrap_or_else(|| Local::now().date_naive());
    let store = Arc::new(InMemoryStore::new());
    let report = seed(store.as_ref(), &args.plan(), today)?;

    if args.json {
        match serde_json::to_string_pretty(&report) {
            Ok(json) => println!("{json}"),
            Err(err) => println!("Seed report unavailable: {err}"),
        }
        return Ok(());
    }

    let service = ListingService::new(store);
    render_summary(&report, today);

    let listings = service.listings(&ListingQuery::default())?;
    println!("\nSample listings");
    for listing in listings.iter().take(SAMPLE_SIZE) {
        let view = service.listing_view(listing, 7)?;
        println!(
            "  - #{} {} | {} | {} | 7 nights: ${} | rating {:.1} ({} reviews)",
            view.id,
            listing,
            view.location,
            if view.is_available { "open" } else { "closed" },
            view.total_price_for_nights,
            view.average_rating,
            view.total_reviews
        );
    }

    Ok(())
}

fn render_summary(report: &SeedReport, today: NaiveDate) {
    println!("Dry run: sample data generated in a throwaway store (history anchored on {today})");
    println!(
        "  Users: {} created, {} already present",
        report.users_created, report.users_existing
    );
    println!("  Listings: {} created", report.listings_created);
    println!(
        "  Bookings: {} created, {} skipped",
        report.bookings_created, report.bookings_skipped
    );
    println!(
        "  Reviews: {} created, {} skipped",
        report.reviews_created, report.reviews_skipped
    );
    println!("  Nothing was kept; run `serve --seed` to serve this data set.");
}
