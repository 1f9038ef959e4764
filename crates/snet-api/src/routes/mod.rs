//! Route modules, one per resource.

pub mod health;
pub mod invoices;
pub mod pay;
pub mod receipts;
pub mod verify;
