mod appointments;
mod filter;
mod hospitals;
mod users;
mod vac_centers;

pub use appointments::{AppointmentRepository, AppointmentScope};
pub use hospitals::HospitalRepository;
pub use users::UserRepository;
pub use vac_centers::VacCenterRepository;

use deadpool_postgres::{Config, Pool, Runtime};
use tokio_postgres::NoTls;

use crate::error::AppError;

/// Create a connection pool from a database URL
pub async fn create_pool(database_url: &str) -> Result<Pool, deadpool_postgres::CreatePoolError> {
    let mut cfg = Config::new();
    cfg.url = Some(database_url.to_string());
    cfg.create_pool(Some(Runtime::Tokio1), NoTls)
}

/// Create tables, indexes and views if they do not exist yet
pub async fn migrate(pool: &Pool) -> Result<(), AppError> {
    let client = pool.get().await?;
    client.batch_execute(include_str!("schema.sql")).await?;
    Ok(())
}
