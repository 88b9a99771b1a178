//! Core business logic - framework-agnostic catalog operations.
//!
//! Every operation takes a database connection and returns [`crate::errors::Result`].
//! Anything time-dependent takes `now` explicitly so that discount expiry is evaluated
//! against one instant per request.

pub mod assets;
pub mod category;
pub mod company;
pub mod discount;
pub mod filter;
pub(crate) mod links;
pub mod product;
pub mod projection;
pub mod search;
pub mod subcategory;
