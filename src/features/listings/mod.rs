//! Listing and variant attribute submission.
//!
//! Ties schema resolution, validation and variant keys together and commits
//! the result under the category version as an optimistic token.

pub mod dtos;
pub mod models;
pub mod services;

pub use services::ListingAttributeService;
