//! # Supplier Repository
//!
//! Plain catalogue of suppliers. Not involved in checkout.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::DbResult;
use tienda_core::{CoreError, Supplier, SupplierInput};

/// Repository for supplier database operations.
#[derive(Debug, Clone)]
pub struct SupplierRepository {
    pool: SqlitePool,
}

impl SupplierRepository {
    pub fn new(pool: SqlitePool) -> Self {
        SupplierRepository { pool }
    }

    /// Registers a supplier.
    pub async fn create(&self, input: SupplierInput) -> DbResult<Supplier> {
        let input = input.validate().map_err(CoreError::from)?;

        let supplier = Supplier {
            id: Uuid::new_v4().to_string(),
            name: input.name,
            nit: input.nit,
            address: input.address,
            phone: input.phone,
            email: input.email,
            supply_category: input.supply_category,
            status: input.status,
            created_at: Utc::now(),
        };

        debug!(id = %supplier.id, "Inserting supplier");

        sqlx::query(
            r#"
            INSERT INTO suppliers (
                id, name, nit, address, phone, email, supply_category, status, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(&supplier.id)
        .bind(&supplier.name)
        .bind(&supplier.nit)
        .bind(&supplier.address)
        .bind(&supplier.phone)
        .bind(&supplier.email)
        .bind(&supplier.supply_category)
        .bind(supplier.status)
        .bind(supplier.created_at)
        .execute(&self.pool)
        .await?;

        Ok(supplier)
    }

    /// Lists all suppliers ordered by name.
    pub async fn list(&self) -> DbResult<Vec<Supplier>> {
        let suppliers = sqlx::query_as::<_, Supplier>(
            r#"
            SELECT id, name, nit, address, phone, email, supply_category, status, created_at
            FROM suppliers
            ORDER BY name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(suppliers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};
    use tienda_core::SupplierStatus;

    fn input(name: &str, status: SupplierStatus) -> SupplierInput {
        SupplierInput {
            name: name.to_string(),
            nit: Some("900123456-7".to_string()),
            address: None,
            phone: None,
            email: Some("ventas@example.com".to_string()),
            supply_category: Some("Lacteos".to_string()),
            status,
        }
    }

    #[tokio::test]
    async fn test_create_and_list() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.suppliers();

        repo.create(input("Lacteos del Valle", SupplierStatus::Active)).await.unwrap();
        repo.create(input("Distribuidora Andina", SupplierStatus::Inactive))
            .await
            .unwrap();

        let all = repo.list().await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].name, "Distribuidora Andina");
        assert_eq!(all[0].status, SupplierStatus::Inactive);
        assert_eq!(all[1].status, SupplierStatus::Active);
        assert_eq!(all[1].nit.as_deref(), Some("900123456-7"));
    }
}
