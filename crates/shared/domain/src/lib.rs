//! # Domain Models
//!
//! Pure loader types with minimal dependencies (`serde`, `bitflags`).
//! Keep it lean: no I/O, networking, or heavy logic, just data and simple helpers.

pub mod config;
pub mod constants;
pub mod manifest;
pub mod phase;
pub mod progress;
pub mod surface;
