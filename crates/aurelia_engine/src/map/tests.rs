//! Unit tests for the grid and the pathfinder.

use super::*;

const DIAG: i32 = 141;
const ORTH: i32 = 101;

fn path_cost(start: (i32, i32), path: &[Position]) -> i32 {
	let mut cost = 0;
	let mut prev = start;
	for step in path {
		let dx = (step.x - prev.0).abs();
		let dy = (step.y - prev.1).abs();
		assert!(dx <= 1 && dy <= 1 && (dx, dy) != (0, 0), "non-adjacent step");
		cost += if dx == 1 && dy == 1 { DIAG } else { ORTH };
		prev = (step.x, step.y);
	}
	cost
}

#[test]
fn open_grid_path_is_optimal() {
	let mut map = Map::new(10, 10);
	let path = map.find_path(0, 0, 9, 9, BlockMask::WALK_GROUND, 0);

	assert_eq!(path.len(), 9, "nine diagonal steps expected");
	assert_eq!(path.last(), Some(&Position::new(9, 9)));
	assert_eq!(path_cost((0, 0), &path), 9 * DIAG);
}

#[test]
fn straight_line_keeps_direction() {
	let mut map = Map::new(10, 3);
	let path = map.find_path(0, 1, 9, 1, BlockMask::WALK_GROUND, 0);
	assert_eq!(path.len(), 9);
	assert!(path.iter().all(|p| p.y == 1));
}

#[test]
fn wall_corner_is_not_cut() {
	let mut map = Map::new(3, 3);
	map.block_tile(1, 0, BlockType::Wall);

	let path = map.find_path(0, 0, 1, 1, BlockMask::WALK_GROUND, 0);
	// The diagonal through the blocked corner is refused; the route bends
	// through (0,1) instead
	assert_eq!(path, vec![Position::new(0, 1), Position::new(1, 1)]);
}

#[test]
fn wall_gap_is_routed_through() {
	let mut map = Map::new(10, 10);
	for y in 0..9 {
		map.block_tile(5, y, BlockType::Wall);
	}

	let path = map.find_path(0, 5, 9, 5, BlockMask::WALK_GROUND, 0);
	assert!(!path.is_empty(), "gap at (5,9) should be found");
	assert!(path.iter().any(|p| p.x == 5 && p.y == 9));
	assert!(path.iter().all(|p| !(p.x == 5 && p.y < 9)));
}

#[test]
fn unwalkable_destination_short_circuits() {
	let mut map = Map::new(8, 8);
	map.block_tile(7, 7, BlockType::Wall);

	let path = map.find_path(0, 0, 7, 7, BlockMask::WALK_GROUND, 0);
	assert!(path.is_empty());

	// No search work happened: no tile carries an open/closed marker
	for y in 0..8 {
		for x in 0..8 {
			let tile = map.meta_tile(x, y).expect("tile in bounds");
			assert_eq!(tile.which_list, 0, "tile ({x},{y}) was touched");
		}
	}
}

#[test]
fn out_of_bounds_start_returns_empty() {
	let mut map = Map::new(4, 4);
	assert!(map.find_path(4, 0, 1, 1, BlockMask::WALK_GROUND, 0).is_empty());
	assert!(map.find_path(0, 4, 1, 1, BlockMask::WALK_GROUND, 0).is_empty());
	assert!(map.find_path(-1, 0, 1, 1, BlockMask::WALK_GROUND, 0).is_empty());
}

#[test]
fn start_equals_destination_returns_empty() {
	let mut map = Map::new(4, 4);
	assert!(map.find_path(2, 2, 2, 2, BlockMask::WALK_GROUND, 0).is_empty());
}

#[test]
fn max_cost_prunes_long_routes() {
	let mut map = Map::new(12, 3);
	let bounded = map.find_path(0, 1, 9, 1, BlockMask::WALK_GROUND, 5);
	assert!(bounded.is_empty(), "nine orthogonal steps exceed a 5-tile budget");

	let allowed = map.find_path(0, 1, 9, 1, BlockMask::WALK_GROUND, 10);
	assert_eq!(allowed.len(), 9);
}

#[test]
fn consecutive_searches_stay_correct() {
	let mut map = Map::new(10, 10);
	for _ in 0..5 {
		let path = map.find_path(0, 0, 9, 9, BlockMask::WALK_GROUND, 0);
		assert_eq!(path.len(), 9);
	}
}

#[test]
fn occupancy_counts_overlapping_blockers() {
	let mut map = Map::new(4, 4);
	map.block_tile(2, 2, BlockType::Character);
	map.block_tile(2, 2, BlockType::Character);

	let mask = BlockMask::CHARACTER;
	assert!(!map.is_walkable(2, 2, mask));
	map.free_tile(2, 2, BlockType::Character);
	assert!(!map.is_walkable(2, 2, mask), "one occupant remains");
	map.free_tile(2, 2, BlockType::Character);
	assert!(map.is_walkable(2, 2, mask));
}

#[test]
fn walkmask_selects_blockers() {
	let mut map = Map::new(4, 4);
	map.block_tile(1, 1, BlockType::Monster);

	assert!(map.is_walkable(1, 1, BlockMask::WALK_GROUND));
	assert!(!map.is_walkable(1, 1, BlockMask::WALK_GROUND | BlockMask::MONSTER));
	assert!(!map.is_walkable(-1, 0, BlockMask::empty()), "outside is never walkable");
}

#[test]
fn character_blockers_stop_paths_but_not_walls_exemption() {
	let mut map = Map::new(5, 1);
	map.block_tile(2, 0, BlockType::Character);

	let blocked = map.find_path(0, 0, 4, 0, BlockMask::WALK_GROUND | BlockMask::CHARACTER, 0);
	assert!(blocked.is_empty(), "single-row corridor is blocked by the character");

	let ignoring = map.find_path(0, 0, 4, 0, BlockMask::WALK_GROUND, 0);
	assert_eq!(ignoring.len(), 4);
}

#[test]
fn diagonal_is_preferred_over_dog_legs() {
	let mut map = Map::new(6, 6);
	let path = map.find_path(0, 0, 3, 3, BlockMask::WALK_GROUND, 0);
	// 3 diagonals (423) beat any mixed route (e.g. 2 orth + 2 diag = 484)
	assert_eq!(path.len(), 3);
	assert_eq!(path_cost((0, 0), &path), 3 * DIAG);
}
