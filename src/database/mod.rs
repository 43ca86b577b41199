//! # Database Module
//!
//! Treats a sheet as a row store. Range addresses are resolved by [`builder`],
//! one entity's data span is owned by [`range_service`], column declarations
//! become a field map in [`map_builder`], and [`source`] wires schemas,
//! mappers and services into repositories.
pub mod builder;
pub mod column;
pub mod data_service;
pub(crate) mod expression;
pub mod map_builder;
pub mod range;
pub mod range_service;
pub mod schema;
pub mod source;
