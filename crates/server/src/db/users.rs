use deadpool_postgres::Pool;
use hospital_core::{NewUser, RegisterPayload, Role, User};
use tokio_postgres::Row;
use uuid::Uuid;

use crate::auth::hash_password;
use crate::error::AppError;

const COLUMNS: &str = "id, name, email, password_hash, role, created_at";

/// Repository for user accounts
#[derive(Clone)]
pub struct UserRepository {
    pool: Pool,
}

impl UserRepository {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    /// Validate a registration, hash its password and store the account.
    /// An already registered email surfaces as a duplicate key error.
    pub async fn create(&self, payload: RegisterPayload) -> Result<User, AppError> {
        let user = NewUser::try_from(payload)?;
        let password_hash = hash_password(user.password).await?;

        let client = self.pool.get().await?;
        let row = client
            .query_one(
                &format!(
                    "INSERT INTO users (id, name, email, password_hash, role) \
                     VALUES ($1, $2, $3, $4, $5) RETURNING {}",
                    COLUMNS
                ),
                &[
                    &Uuid::new_v4(),
                    &user.name,
                    &user.email,
                    &password_hash,
                    &user.role.as_str(),
                ],
            )
            .await
            .map_err(|err| match AppError::from(err) {
                AppError::DuplicateKey(_) => {
                    AppError::DuplicateKey(format!("Email {} is already registered", user.email))
                }
                other => other,
            })?;
        from_row(&row)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let client = self.pool.get().await?;
        let row = client
            .query_opt(&format!("SELECT {} FROM users WHERE id = $1", COLUMNS), &[&id])
            .await?;
        row.as_ref().map(from_row).transpose()
    }

    /// Look up an account by email, case-insensitively
    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let client = self.pool.get().await?;
        let row = client
            .query_opt(
                &format!("SELECT {} FROM users WHERE email = $1", COLUMNS),
                &[&email.trim().to_lowercase()],
            )
            .await?;
        row.as_ref().map(from_row).transpose()
    }
}

fn from_row(row: &Row) -> Result<User, AppError> {
    let role: String = row.get("role");
    Ok(User {
        id: row.get("id"),
        name: row.get("name"),
        email: row.get("email"),
        password_hash: row.get("password_hash"),
        role: role.parse::<Role>().map_err(AppError::Internal)?,
        created_at: row.get("created_at"),
    })
}
