//! Prelude module for `aurelia_internal`.
//!
//! This module provides a convenient way to import commonly used types and
//! traits.
//!
//! # Examples
//!
//! ```rust
//! use aurelia_internal::prelude::*;
//!
//! // Now you can use all common types directly
//! let mut map = Map::new(20, 20);
//! let mut actors = ActorIndex::new();
//!
//! // Block a tile and path around it
//! map.block_tile(10, 10, BlockType::Wall);
//! let route = map.find_path(0, 0, 19, 19, BlockMask::WALK_GROUND, 0);
//! assert!(!route.is_empty());
//!
//! let hero = actors.create(ActorKind::Player, "Hero", 0, 0);
//! assert!(actors.get(hero).is_some());
//! ```

// Re-export everything from aurelia_engine::prelude
#[doc(inline)]
pub use aurelia_engine::prelude::*;

// Re-export the entire aurelia_engine module for advanced usage
#[doc(inline)]
pub use aurelia_engine;
