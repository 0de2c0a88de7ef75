//! Contact normalization for scraped listings.
//!
//! Every stage is a pure function over one record's data; run-scoped inputs
//! (postal pattern, phone region) are passed in explicitly from [`crate::config::RunConfig`].

pub mod contact;
pub mod phone;
pub mod postal;
pub mod text;
