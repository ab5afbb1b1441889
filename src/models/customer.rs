//! Customer rows

/// A row of the `Customer` table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Customer {
    pub customer_id: i32,
    pub name: String,
}
