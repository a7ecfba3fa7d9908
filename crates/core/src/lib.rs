//! `billbook-core` — domain foundation building blocks.
//!
//! Identifiers, the domain error model, and the fixed-point `Money` type shared by
//! every billing crate. No IO lives here.

pub mod entity;
pub mod error;
pub mod id;
pub mod money;
pub mod value_object;

pub use entity::Entity;
pub use error::{DomainError, DomainResult};
pub use id::{ClientId, InvoiceId, InvoiceLineId, ProductId, UserId};
pub use money::Money;
pub use value_object::ValueObject;
