//! SQL query constants and builders
//!
//! Contains all SQL used by the schema lifecycle operations. `Order` is a
//! reserved word, so every identifier is emitted quoted.

pub const CUSTOMER_TABLE: &str = "Customer";
pub const ORDER_TABLE: &str = "Order";

/// Index backing the Customer/Order join
pub const ORDER_CUSTOMER_INDEX: &str = "idx_order_customer_id";

/// Create the parent table
pub const CREATE_CUSTOMER_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS "Customer" (
        "CustomerID" SERIAL PRIMARY KEY,
        "Name" VARCHAR(100) NOT NULL
    )
"#;

/// Create the child table; the foreign key keeps every order tied to a customer
pub const CREATE_ORDER_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS "Order" (
        "OrderID" SERIAL PRIMARY KEY,
        "CustomerID" INTEGER NOT NULL REFERENCES "Customer"("CustomerID"),
        "TotalAmount" NUMERIC(10, 2) NOT NULL
    )
"#;

pub const INSERT_CUSTOMER: &str = r#"
    INSERT INTO "Customer" ("Name") VALUES ($1) RETURNING "CustomerID"
"#;

/// Amounts travel as text so the store does the decimal conversion
pub const INSERT_ORDER: &str = r#"
    INSERT INTO "Order" ("CustomerID", "TotalAmount")
    VALUES ($1, $2::TEXT::NUMERIC(10, 2))
    RETURNING "OrderID"
"#;

/// Inner join of customers with their orders
pub const SELECT_ORDER_LINES: &str = r#"
    SELECT
        c."CustomerID" AS customer_id,
        c."Name" AS name,
        o."OrderID" AS order_id,
        o."CustomerID" AS order_customer_id,
        o."TotalAmount"::TEXT AS total_amount
    FROM "Customer" c
    JOIN "Order" o ON c."CustomerID" = o."CustomerID"
    ORDER BY o."OrderID"
"#;

/// Which of the two lifecycle tables exist in the current schema
#[cfg(test)]
pub const LIST_LIFECYCLE_TABLES: &str = r#"
    SELECT table_name::TEXT AS name
    FROM information_schema.tables
    WHERE table_schema = current_schema()
        AND table_name IN ('Customer', 'Order')
    ORDER BY table_name
"#;

pub const PING: &str = "SELECT 1";

/// SQL builder for safe identifier quoting
pub struct SqlBuilder;

impl SqlBuilder {
    /// Quote an identifier (table/column name) safely
    pub fn quote_ident(ident: &str) -> String {
        // PostgreSQL identifier quoting
        format!("\"{}\"", ident.replace('"', "\"\""))
    }

    /// Build CREATE INDEX IF NOT EXISTS query
    pub fn create_index(name: &str, table: &str, column: &str) -> String {
        format!(
            "CREATE INDEX IF NOT EXISTS {} ON {} ({})",
            Self::quote_ident(name),
            Self::quote_ident(table),
            Self::quote_ident(column)
        )
    }

    /// Build DROP TABLE IF EXISTS query
    pub fn drop_table(name: &str) -> String {
        format!("DROP TABLE IF EXISTS {}", Self::quote_ident(name))
    }

    /// Tables in drop order: children before the parents they reference
    pub fn drop_order() -> [&'static str; 2] {
        [ORDER_TABLE, CUSTOMER_TABLE]
    }
}
