//! `aurelia-rs` is an attempt to revive an old 2D tile-based MMORPG client
//! and bring it to modern platforms using Rust.
//!
//! The actual engine lives in `crates/aurelia_engine`; this crate is the thin
//! public facade over it.

pub use aurelia_internal::*;
