//! Order rows and the joined Customer/Order view

use super::{Amount, Customer};
use std::fmt;

/// A row of the `Order` table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub order_id: i32,
    pub customer_id: i32,
    pub total_amount: Amount,
}

/// One result of joining `Customer` with `Order` on `CustomerID`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderLine {
    pub customer: Customer,
    pub order: Order,
}

/// Printed in column order of the join:
/// `(CustomerID, 'Name', OrderID, CustomerID, TotalAmount)`
impl fmt::Display for OrderLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({}, '{}', {}, {}, {})",
            self.customer.customer_id,
            self.customer.name.replace('\'', "\\'"),
            self.order.order_id,
            self.order.customer_id,
            self.order.total_amount
        )
    }
}
