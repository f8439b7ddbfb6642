//! Tiles, blockmasks, and occupancy bookkeeping types.

use bitflags::bitflags;

bitflags! {
	/// Traversal-blocking categories of one tile.
	///
	/// A pathfinding query passes the mask of categories that block the
	/// moving entity; a tile is walkable when its blockmask does not
	/// intersect that mask.
	#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
	pub struct BlockMask: u8 {
		/// Occupied by a player character.
		const CHARACTER = 0x01;
		/// Occupied by a monster.
		const MONSTER = 0x02;
		/// Air tile (blocks ground walkers).
		const AIR = 0x04;
		/// Water tile.
		const WATER = 0x08;
		/// Ground tile (blocks fliers that may not land).
		const GROUND = 0x10;
		/// Elevated ground tile.
		const GROUND_TOP = 0x20;
		/// Solid wall. Also refuses diagonal corner cutting.
		const WALL = 0x80;
	}
}

impl BlockMask {
	/// Mask used by ordinary ground walkers.
	pub const WALK_GROUND: Self = Self::WALL.union(Self::AIR).union(Self::WATER);
	/// Mask used by fliers.
	pub const WALK_AIR: Self = Self::WALL;
	/// Mask used by water-bound movers.
	pub const WALK_WATER: Self = Self::WALL.union(Self::AIR).union(Self::GROUND);
}

/// Occupancy category counted by [`Map::block_tile`](super::Map::block_tile).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockType {
	/// No blocking (ignored by block/free calls).
	None,
	/// Wall occupancy.
	Wall,
	/// Player character occupancy.
	Character,
	/// Monster occupancy.
	Monster,
	/// Air occupancy.
	Air,
	/// Water occupancy.
	Water,
	/// Ground occupancy.
	Ground,
	/// Elevated ground occupancy.
	GroundTop,
}

/// Number of countable block types.
pub const BLOCKTYPE_COUNT: usize = 7;

impl BlockType {
	/// Index into the per-type occupancy tables; `None` has no slot.
	pub(super) fn index(self) -> Option<usize> {
		match self {
			Self::None => None,
			Self::Wall => Some(0),
			Self::Character => Some(1),
			Self::Monster => Some(2),
			Self::Air => Some(3),
			Self::Water => Some(4),
			Self::Ground => Some(5),
			Self::GroundTop => Some(6),
		}
	}

	/// The blockmask bit this occupancy type raises.
	pub(super) fn mask(self) -> BlockMask {
		match self {
			Self::None => BlockMask::empty(),
			Self::Wall => BlockMask::WALL,
			Self::Character => BlockMask::CHARACTER,
			Self::Monster => BlockMask::MONSTER,
			Self::Air => BlockMask::AIR,
			Self::Water => BlockMask::WATER,
			Self::Ground => BlockMask::GROUND,
			Self::GroundTop => BlockMask::GROUND_TOP,
		}
	}
}

/// One grid tile: its blockmask plus transient pathfinding scratch fields.
///
/// The scratch fields are only meaningful during/after a search; open and
/// closed membership is encoded by comparing `which_list` against the map's
/// generation counters, so searches never clear the whole grid.
#[derive(Debug, Clone, Default)]
pub struct MetaTile {
	/// Traversal-blocking categories currently raised on this tile.
	pub blockmask: BlockMask,
	/// Total estimated cost (G + H) of the best route through this tile.
	pub fcost: i32,
	/// Cost from the start to this tile along the best known route.
	pub gcost: i32,
	/// Heuristic cost from this tile to the destination.
	pub hcost: i32,
	/// X of the tile this one was reached from.
	pub parent_x: i32,
	/// Y of the tile this one was reached from.
	pub parent_y: i32,
	/// Open/closed generation marker.
	pub which_list: u32,
}

/// One step of a returned path, in tile coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
	/// Tile x.
	pub x: i32,
	/// Tile y.
	pub y: i32,
}

impl Position {
	/// Creates a position.
	pub fn new(x: i32, y: i32) -> Self {
		Self {
			x,
			y,
		}
	}
}

/// Ordered tile path, start-exclusive and destination-inclusive.
pub type Path = Vec<Position>;
