use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder};
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;

use crate::db::DbPool;
use crate::entities::vendors;
use crate::errors::ServiceError;

/// Read side for the persisted vendor roster.
#[derive(Clone)]
pub struct VendorService {
    db: Arc<DbPool>,
}

impl VendorService {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self { db }
    }

    #[instrument(skip(self))]
    pub async fn list_active(&self) -> Result<Vec<vendors::Model>, ServiceError> {
        vendors::Entity::find()
            .filter(vendors::Column::Active.eq(true))
            .order_by_asc(vendors::Column::Name)
            .all(&*self.db)
            .await
            .map_err(ServiceError::DatabaseError)
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: Uuid) -> Result<vendors::Model, ServiceError> {
        vendors::Entity::find_by_id(id)
            .one(&*self.db)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| ServiceError::NotFound(format!("vendor {} not found", id)))
    }
}
