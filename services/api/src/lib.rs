mod cli;
mod infra;
mod routes;
mod seed;
mod server;

use travel_listings::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
