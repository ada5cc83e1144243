use crud_lab_api::DashboardResponse;

use crate::db::DbPool;
use crate::db::connection::get_connection;
use crate::db::repositories::table1_repository::Table1Repository;
use crate::db::repositories::table2_repository::Table2Repository;
use crate::db::repositories::table3_repository::Table3Repository;
use crate::error::AppError;

#[derive(Clone)]
pub struct DashboardService {
    pool: DbPool,
}

impl DashboardService {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn counts(&self) -> Result<DashboardResponse, AppError> {
        let mut conn = get_connection(&self.pool)?;
        Ok(DashboardResponse {
            table1_count: Table1Repository::count(&mut conn)?,
            table2_count: Table2Repository::count(&mut conn)?,
            table3_count: Table3Repository::count(&mut conn)?,
        })
    }
}
