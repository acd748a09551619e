mod cli;
mod demo;
mod infra;
mod lifestyle;
mod routes;
mod server;

use roommate_ai::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
