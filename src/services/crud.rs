use crud_lab_api::{ListResponse, RelationOptions};
use diesel::SqliteConnection;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::db::DbPool;
use crate::db::connection::get_connection;
use crate::error::AppError;
use crate::pagination::{self, PageQuery, Window};

/// Lecture et suppression communes aux trois tables
pub trait CrudService: Clone + Send + Sync + 'static {
    type Record: Serialize + Send + 'static;

    fn pool(&self) -> &DbPool;

    fn count(&self, conn: &mut SqliteConnection) -> Result<i64, AppError>;

    fn page(
        &self,
        conn: &mut SqliteConnection,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<Self::Record>, AppError>;

    fn all(&self, conn: &mut SqliteConnection) -> Result<Vec<Self::Record>, AppError>;

    /// Options de formulaire jointes à la liste
    fn options(&self, _conn: &mut SqliteConnection) -> Result<Option<RelationOptions>, AppError> {
        Ok(None)
    }

    /// Supprime la ligne `id`, `NotFound` si elle n'existe pas
    fn delete(&self, id: i32) -> Result<(), AppError>;

    fn list(&self, query: &PageQuery) -> Result<ListResponse<Self::Record>, AppError> {
        let mut conn = get_connection(self.pool())?;

        let total = self.count(&mut conn)?;
        let plan = pagination::plan(query, total);
        let data = match plan.window {
            Window::All => self.all(&mut conn)?,
            Window::Slice { offset, limit } => self.page(&mut conn, offset, limit)?,
        };

        Ok(ListResponse {
            data,
            pagination: plan.pagination,
            options: self.options(&mut conn)?,
        })
    }
}

/// Création / mise à jour à partir d'un corps JSON typé
pub trait JsonWriteService: CrudService {
    type Input: DeserializeOwned + Send + 'static;

    fn input_id(input: &Self::Input) -> Option<i32>;

    fn create(&self, input: Self::Input) -> Result<Self::Record, AppError>;

    fn update(&self, id: i32, input: Self::Input) -> Result<Self::Record, AppError>;
}
