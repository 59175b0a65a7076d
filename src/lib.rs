//! Client follow-up desk.
//!
//! The [`data`] layer loads processed client records from public object
//! storage and filters them by priority and follow-up date. [`remote`] wraps
//! the analysis and recommendation functions; [`state`] is the session
//! context the screen passes between its sections.

pub mod color;
pub mod config;
pub mod data;
pub mod remote;
pub mod state;

#[cfg(test)]
mod testing;
