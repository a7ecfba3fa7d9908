//! Parties domain module (billing clients).
//!
//! Business rules for the clients invoices are issued to, implemented purely as
//! deterministic domain logic (no IO, no HTTP, no storage).

pub mod client;

pub use client::{Client, ClientDetails, ContactInfo};
