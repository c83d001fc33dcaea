//! # Transport Layer
//!
//! Listeners that accept game clients and hand each stream to the
//! connection loop.

pub mod tcp;
