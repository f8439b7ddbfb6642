//! Client-side rendering and animation core for a 2D tile-based MMORPG.
//!
//! # Subsystems
//!
//! - **animation**: frame sequences and the state machine advancing them
//!   (pauses, labels, probabilistic gotos/jumps, terminators)
//! - **sprite**: multi-layer composite sprites with a bounded bitmap cache
//!   keyed by per-layer content identity
//! - **particle**: the particle tree simulation, emitters with randomized and
//!   time-modulated properties, declarative effect definitions
//! - **map**: the tile grid with occupancy-counted blockmasks and A*
//!   pathfinding
//! - **actor**: the registry correlating live actors to the subsystems above
//!
//! Everything runs on one logic thread; updates are driven by a monotonic
//! millisecond tick supplied by the surrounding engine. Rasterization is
//! behind the [`render::DrawTarget`] seam, so the core stays headless.
//!
//! # Examples
//!
//! Using the prelude (recommended):
//!
//! ```rust
//! use aurelia_engine::prelude::*;
//!
//! let mut map = Map::new(10, 10);
//! map.block_tile(5, 5, BlockType::Wall);
//!
//! let path = map.find_path(0, 0, 9, 9, BlockMask::WALK_GROUND, 0);
//! assert!(!path.is_empty());
//! ```

pub mod actor;
pub mod animation;
pub mod context;
pub mod error;
pub mod map;
pub mod math;
pub mod particle;
pub mod render;
pub mod resource;
pub mod sprite;

/// `use aurelia_engine::prelude::*;` to import commonly used items.
pub mod prelude;
