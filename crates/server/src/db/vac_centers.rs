use deadpool_postgres::Pool;
use hospital_core::VacCenter;

use crate::error::AppError;

/// Read-only access to the `vac_centers` view
#[derive(Clone)]
pub struct VacCenterRepository {
    pool: Pool,
}

impl VacCenterRepository {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    pub async fn list(&self) -> Result<Vec<VacCenter>, AppError> {
        let client = self.pool.get().await?;
        let rows = client
            .query(
                "SELECT id, name, tel, province, region FROM vac_centers ORDER BY name ASC",
                &[],
            )
            .await?;

        Ok(rows
            .iter()
            .map(|row| VacCenter {
                id: row.get("id"),
                name: row.get("name"),
                tel: row.get("tel"),
                province: row.get("province"),
                region: row.get("region"),
            })
            .collect())
    }
}
