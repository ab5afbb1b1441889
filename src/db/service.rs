// Schema lifecycle operations
//
// Each operation opens its own session, runs inside one transaction, and
// releases the session on every exit path.

use super::queries::{
    SqlBuilder, CREATE_CUSTOMER_TABLE, CREATE_ORDER_TABLE, CUSTOMER_TABLE, INSERT_CUSTOMER,
    INSERT_ORDER, ORDER_CUSTOMER_INDEX, ORDER_TABLE, SELECT_ORDER_LINES,
};
use super::Store;
use crate::error::AppResult;
use crate::models::{sample_orders, Customer, Order, OrderLine, SAMPLE_CUSTOMERS};
use futures_util::{pin_mut, TryStreamExt};
use tokio_postgres::Row;
use tracing::{debug, info};

/// The four operations the menu drives
#[allow(async_fn_in_trait)]
pub trait SchemaLifecycle {
    /// Create both tables and the join index if they are absent
    async fn create_tables(&self) -> AppResult<()>;

    /// Insert the sample customers and one order for each
    async fn populate_tables(&self) -> AppResult<()>;

    /// Stream the Customer/Order join into `on_row`, returning the row count
    async fn query_tables<F>(&self, on_row: F) -> AppResult<u64>
    where
        F: FnMut(OrderLine) -> AppResult<()>;

    /// Drop `Order`, then `Customer`, skipping whichever is absent
    async fn drop_tables(&self) -> AppResult<()>;
}

impl SchemaLifecycle for Store {
    async fn create_tables(&self) -> AppResult<()> {
        let mut session = self.session().await?;
        let tx = session.transaction().await?;

        tx.execute(CREATE_CUSTOMER_TABLE, &[]).await?;
        tx.execute(CREATE_ORDER_TABLE, &[]).await?;
        tx.execute(
            &SqlBuilder::create_index(ORDER_CUSTOMER_INDEX, ORDER_TABLE, "CustomerID"),
            &[],
        )
        .await?;

        tx.commit().await?;
        info!("Tables '{}' and '{}' ensured", CUSTOMER_TABLE, ORDER_TABLE);
        Ok(())
    }

    async fn populate_tables(&self) -> AppResult<()> {
        let mut session = self.session().await?;
        let tx = session.transaction().await?;

        let mut customer_ids = Vec::with_capacity(SAMPLE_CUSTOMERS.len());
        for name in SAMPLE_CUSTOMERS {
            let row = tx.query_one(INSERT_CUSTOMER, &[name]).await?;
            customer_ids.push(row.get::<_, i32>(0));
        }

        for (customer_id, total) in sample_orders(&customer_ids)? {
            tx.query_one(INSERT_ORDER, &[&customer_id, &total.to_string()])
                .await?;
        }

        tx.commit().await?;
        info!("Inserted {} customers with one order each", customer_ids.len());
        Ok(())
    }

    async fn query_tables<F>(&self, mut on_row: F) -> AppResult<u64>
    where
        F: FnMut(OrderLine) -> AppResult<()>,
    {
        let session = self.session().await?;
        let rows = session
            .query_raw(SELECT_ORDER_LINES, std::iter::empty::<i32>())
            .await?;
        pin_mut!(rows);

        let mut count = 0;
        while let Some(row) = rows.try_next().await? {
            on_row(order_line(&row)?)?;
            count += 1;
        }

        debug!("Join produced {} rows", count);
        Ok(count)
    }

    async fn drop_tables(&self) -> AppResult<()> {
        let mut session = self.session().await?;
        let tx = session.transaction().await?;

        for table in SqlBuilder::drop_order() {
            tx.execute(&SqlBuilder::drop_table(table), &[]).await?;
            debug!("Dropped table '{}' if present", table);
        }

        tx.commit().await?;
        info!("Tables '{}' and '{}' dropped", ORDER_TABLE, CUSTOMER_TABLE);
        Ok(())
    }
}

impl Store {
    /// Insert a single order, returning its generated id
    ///
    /// An unknown `customer_id` is rejected by the store's foreign key.
    #[cfg(test)]
    pub async fn insert_order(
        &self,
        customer_id: i32,
        total: crate::models::Amount,
    ) -> AppResult<i32> {
        let session = self.session().await?;
        let row = session
            .query_one(INSERT_ORDER, &[&customer_id, &total.to_string()])
            .await?;
        Ok(row.get(0))
    }

    /// Names of the lifecycle tables currently present
    #[cfg(test)]
    pub async fn existing_tables(&self) -> AppResult<Vec<String>> {
        let session = self.session().await?;
        let rows = session
            .query(super::queries::LIST_LIFECYCLE_TABLES, &[])
            .await?;
        Ok(rows.iter().map(|row| row.get("name")).collect())
    }
}

fn order_line(row: &Row) -> AppResult<OrderLine> {
    let total: String = row.try_get("total_amount")?;

    Ok(OrderLine {
        customer: Customer {
            customer_id: row.try_get("customer_id")?,
            name: row.try_get("name")?,
        },
        order: Order {
            order_id: row.try_get("order_id")?,
            customer_id: row.try_get("order_customer_id")?,
            total_amount: total.parse()?,
        },
    })
}

#[cfg(test)]
mod tests {
    //! Store conformance suite: idempotent create, FK rejection, the seeded
    //! join, and drop order. These run against a live PostgreSQL named by
    //! `SHOPDB_TEST_DATABASE_URL`: `cargo test -- --ignored --test-threads=1`

    use super::*;
    use crate::config::Settings;
    use crate::models::Amount;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    fn test_store() -> Store {
        let url = std::env::var("SHOPDB_TEST_DATABASE_URL")
            .expect("SHOPDB_TEST_DATABASE_URL must point at a scratch database");
        let vars = HashMap::from([("DATABASE_URL".to_string(), url)]);
        let settings = Settings::from_sources(
            config::File::from_str("", config::FileFormat::Toml),
            &vars,
        )
        .unwrap();
        Store::new(&settings.database).unwrap()
    }

    async fn collect_lines(store: &Store) -> Vec<OrderLine> {
        let mut lines = Vec::new();
        store
            .query_tables(|line| {
                lines.push(line);
                Ok(())
            })
            .await
            .unwrap();
        lines
    }

    #[tokio::test]
    #[ignore = "requires a running PostgreSQL instance"]
    async fn create_is_idempotent() {
        let store = test_store();
        store.drop_tables().await.unwrap();

        store.create_tables().await.unwrap();
        store.create_tables().await.unwrap();

        assert_eq!(store.existing_tables().await.unwrap(), vec!["Customer", "Order"]);
        store.drop_tables().await.unwrap();
    }

    #[tokio::test]
    #[ignore = "requires a running PostgreSQL instance"]
    async fn populate_then_query_joins_each_customer_to_its_order() {
        let store = test_store();
        store.drop_tables().await.unwrap();
        store.create_tables().await.unwrap();
        store.populate_tables().await.unwrap();

        let pairs: Vec<(String, String)> = collect_lines(&store)
            .await
            .into_iter()
            .map(|l| {
                assert_eq!(l.customer.customer_id, l.order.customer_id);
                (l.customer.name, l.order.total_amount.to_string())
            })
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("Alice".to_string(), "100.50".to_string()),
                ("Bob".to_string(), "250.75".to_string()),
            ]
        );

        store.drop_tables().await.unwrap();
    }

    #[tokio::test]
    #[ignore = "requires a running PostgreSQL instance"]
    async fn populate_twice_duplicates_rows() {
        let store = test_store();
        store.drop_tables().await.unwrap();
        store.create_tables().await.unwrap();
        store.populate_tables().await.unwrap();
        store.populate_tables().await.unwrap();

        assert_eq!(collect_lines(&store).await.len(), 4);
        store.drop_tables().await.unwrap();
    }

    #[tokio::test]
    #[ignore = "requires a running PostgreSQL instance"]
    async fn order_for_missing_customer_is_rejected() {
        let store = test_store();
        store.drop_tables().await.unwrap();
        store.create_tables().await.unwrap();

        let err = store
            .insert_order(4242, Amount::from_cents(100))
            .await
            .unwrap_err();
        assert!(err.is_foreign_key_violation(), "unexpected error: {err}");
        assert!(collect_lines(&store).await.is_empty());

        store.drop_tables().await.unwrap();
    }

    #[tokio::test]
    #[ignore = "requires a running PostgreSQL instance"]
    async fn drop_succeeds_with_referencing_rows() {
        let store = test_store();
        store.drop_tables().await.unwrap();
        store.create_tables().await.unwrap();
        store.populate_tables().await.unwrap();

        store.drop_tables().await.unwrap();
        assert!(store.existing_tables().await.unwrap().is_empty());

        // Dropping again is a no-op
        store.drop_tables().await.unwrap();
    }

    #[tokio::test]
    #[ignore = "requires a running PostgreSQL instance"]
    async fn sessions_are_released_after_failures() {
        let store = test_store();
        store.drop_tables().await.unwrap();

        // Querying missing tables fails, but the single slot must come back.
        assert!(store.query_tables(|_| Ok(())).await.is_err());
        store.ping().await.unwrap();
    }
}
