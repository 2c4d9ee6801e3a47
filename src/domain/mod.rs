//! Core domain types for the blood request client.
//!
//! This module contains pure domain types with no I/O dependencies:
//! - Area reference data and the cascading location selector
//! - Blood request records and their identities

pub mod area;
pub mod request;

pub use area::{AreaRecord, LocationSelector};
pub use request::{BloodGroup, BloodRequest, RequestId, StoredBloodRequest};
