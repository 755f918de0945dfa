use deadpool_postgres::Pool;
use hospital_core::{Hospital, HospitalFields, HospitalPayload, ListQuery};
use tokio_postgres::{IsolationLevel, Row};
use uuid::Uuid;

use super::filter::{Params, order_clause, where_clause};
use crate::error::AppError;

const COLUMNS: &str =
    "id, ordinal, name, address, district, province, region, postalcode, tel, created_at";

/// Repository for Hospital CRUD operations
#[derive(Clone)]
pub struct HospitalRepository {
    pool: Pool,
}

impl HospitalRepository {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    /// Validate and insert a new hospital
    pub async fn create(&self, payload: HospitalPayload) -> Result<Hospital, AppError> {
        let fields = HospitalFields::try_from(payload)?;
        let client = self.pool.get().await?;
        let row = client
            .query_one(
                &format!(
                    "INSERT INTO hospitals \
                     (id, ordinal, name, address, district, province, region, postalcode, tel) \
                     VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) RETURNING {}",
                    COLUMNS
                ),
                &[
                    &Uuid::new_v4(),
                    &fields.ordinal,
                    &fields.name,
                    &fields.address,
                    &fields.district,
                    &fields.province,
                    &fields.region,
                    &fields.postalcode,
                    &fields.tel,
                ],
            )
            .await?;
        Ok(from_row(&row))
    }

    /// One page of hospitals matching the query, plus the total match count
    pub async fn find_many(&self, query: &ListQuery) -> Result<(Vec<Hospital>, u64), AppError> {
        let mut params = Params::default();
        let filter = where_clause(&query.conditions, &mut params);
        let mut client = self.pool.get().await?;

        // Count and page read the same snapshot
        let tx = client
            .build_transaction()
            .isolation_level(IsolationLevel::RepeatableRead)
            .read_only(true)
            .start()
            .await?;

        let total: i64 = tx
            .query_one(
                &format!("SELECT COUNT(*) FROM hospitals{}", filter),
                &params.as_refs(),
            )
            .await?
            .get(0);

        let limit = params.push(i64::from(query.page.limit));
        let offset = params.push(query.page.offset());
        let sql = format!(
            "SELECT {} FROM hospitals{}{} LIMIT {} OFFSET {}",
            COLUMNS,
            filter,
            order_clause(&query.sort),
            limit,
            offset
        );
        let rows = tx.query(&sql, &params.as_refs()).await?;
        tx.commit().await?;

        let hospitals = rows.iter().map(from_row).collect();
        Ok((hospitals, u64::try_from(total).unwrap_or_default()))
    }

    /// Get a hospital by ID
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Hospital>, AppError> {
        let client = self.pool.get().await?;
        let row = client
            .query_opt(
                &format!("SELECT {} FROM hospitals WHERE id = $1", COLUMNS),
                &[&id],
            )
            .await?;
        Ok(row.as_ref().map(from_row))
    }

    pub async fn exists(&self, id: Uuid) -> Result<bool, AppError> {
        let client = self.pool.get().await?;
        let row = client
            .query_opt("SELECT 1 FROM hospitals WHERE id = $1", &[&id])
            .await?;
        Ok(row.is_some())
    }

    /// Apply a partial update; the merged record is validated as a whole
    pub async fn update_by_id(
        &self,
        id: Uuid,
        payload: HospitalPayload,
    ) -> Result<Option<Hospital>, AppError> {
        let mut client = self.pool.get().await?;
        let tx = client.transaction().await?;

        let Some(current) = tx
            .query_opt(
                &format!("SELECT {} FROM hospitals WHERE id = $1 FOR UPDATE", COLUMNS),
                &[&id],
            )
            .await?
        else {
            return Ok(None);
        };
        let fields = HospitalFields::try_from(payload.merged_over(&from_row(&current)))?;

        let row = tx
            .query_one(
                &format!(
                    "UPDATE hospitals SET ordinal = $2, name = $3, address = $4, district = $5, \
                     province = $6, region = $7, postalcode = $8, tel = $9 \
                     WHERE id = $1 RETURNING {}",
                    COLUMNS
                ),
                &[
                    &id,
                    &fields.ordinal,
                    &fields.name,
                    &fields.address,
                    &fields.district,
                    &fields.province,
                    &fields.region,
                    &fields.postalcode,
                    &fields.tel,
                ],
            )
            .await?;
        tx.commit().await?;

        Ok(Some(from_row(&row)))
    }

    /// Delete a hospital together with its appointments.
    /// Returns false when no such hospital exists.
    pub async fn delete_by_id(&self, id: Uuid) -> Result<bool, AppError> {
        let mut client = self.pool.get().await?;
        let tx = client.transaction().await?;

        // Bookings hold FOR SHARE on the hospital row, so none can slip in
        // between the two deletes
        if tx
            .query_opt("SELECT 1 FROM hospitals WHERE id = $1 FOR UPDATE", &[&id])
            .await?
            .is_none()
        {
            return Ok(false);
        }

        let removed = tx
            .execute("DELETE FROM appointments WHERE hospital_id = $1", &[&id])
            .await?;
        let deleted = tx
            .execute("DELETE FROM hospitals WHERE id = $1", &[&id])
            .await?;
        tx.commit().await?;

        tracing::info!(hospital_id = %id, appointments = removed, "Hospital deleted");
        Ok(deleted > 0)
    }
}

fn from_row(row: &Row) -> Hospital {
    Hospital {
        id: row.get("id"),
        ordinal: row.get("ordinal"),
        name: row.get("name"),
        address: row.get("address"),
        district: row.get("district"),
        province: row.get("province"),
        region: row.get("region"),
        postalcode: row.get("postalcode"),
        tel: row.get("tel"),
        created_at: row.get("created_at"),
    }
}
