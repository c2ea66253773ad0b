//! Core library components.
//!
//! Identity codec, backend abstraction and resource controllers, plus the
//! manifest, state and planning layers that drive them.

pub mod address;
pub mod backend;
pub mod config;
pub mod constants;
pub mod id;
pub mod lookup;
pub mod manifest;
pub mod plan;
pub mod reconcile;
pub mod relation;
pub mod resource;
pub mod state;
pub mod types;
