//! netsim Environment Abstraction Layer
//!
//! This crate isolates the one source of non-determinism in the simulator:
//! randomness. Every random draw the simulation makes (failure rolls, router
//! picks, endpoint picks) goes through a [`SimulationContext`], so the same
//! controller code runs with OS entropy in production and with a seeded or
//! scripted generator under test.
//!
//! It also hosts the identity types shared by every other crate.
//!
//! # Example
//!
//! ```ignore
//! use netsim_env::{OsContext, SimulationContext};
//!
//! let mut ctx = OsContext::new();
//! let roll = ctx.roll(5); // uniform in 1..=5
//! ```

mod context;
mod os_impl;
mod types;

pub use context::SimulationContext;
pub use os_impl::OsContext;
pub use types::{NodeId, NodeKind};
