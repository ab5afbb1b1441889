//! Row models for the Customer/Order schema
//!
//! Contains the typed rows read back from the store and the fixed sample data
//! written by the populate operation.

pub mod amount;
pub mod customer;
pub mod order;

// Re-export commonly used types
pub use amount::*;
pub use customer::*;
pub use order::*;

/// Names inserted into `Customer` by the populate operation, in insert order
pub const SAMPLE_CUSTOMERS: &[&str] = &["Alice", "Bob"];

/// Order totals inserted by the populate operation; the n-th total belongs to
/// the n-th sample customer
pub const SAMPLE_ORDER_TOTALS: &[&str] = &["100.50", "250.75"];

/// Pair every sample total with the customer id returned for its position
pub fn sample_orders(customer_ids: &[i32]) -> Result<Vec<(i32, Amount)>, crate::error::AppError> {
    if customer_ids.len() != SAMPLE_ORDER_TOTALS.len() {
        return Err(crate::error::parse_error(format!(
            "expected {} seeded customers, got {}",
            SAMPLE_ORDER_TOTALS.len(),
            customer_ids.len()
        )));
    }

    customer_ids
        .iter()
        .zip(SAMPLE_ORDER_TOTALS)
        .map(|(id, total)| Ok((*id, total.parse::<Amount>()?)))
        .collect()
}
