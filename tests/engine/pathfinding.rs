//! Pathfinding across text-style grids.

use aurelia_rs::prelude::*;

fn grid(rows: &[&str]) -> Map {
	let height = rows.len() as i32;
	let width = rows.iter().map(|row| row.len()).max().unwrap_or(0) as i32;
	let mut map = Map::new(width, height);
	for (y, row) in rows.iter().enumerate() {
		for (x, ch) in row.chars().enumerate() {
			if ch == '#' {
				map.block_tile(x as i32, y as i32, BlockType::Wall);
			}
		}
	}
	map
}

#[test]
fn routes_around_a_wall() {
	let mut map = grid(&[
		".....", //
		".###.", //
		".....",
	]);

	let route = map.find_path(0, 1, 4, 1, BlockMask::WALK_GROUND, 0);
	assert!(!route.is_empty());
	assert_eq!(route.last(), Some(&Position::new(4, 1)));
	assert!(
		route.iter().all(|p| !(p.y == 1 && (1..=3).contains(&p.x))),
		"route must not pass through the wall"
	);
}

#[test]
fn blocked_destination_yields_no_route() {
	let mut map = grid(&[
		"..#", //
		"...", //
		"...",
	]);
	assert!(map.find_path(0, 0, 2, 0, BlockMask::WALK_GROUND, 0).is_empty());
}

#[test]
fn bounded_search_gives_up_on_long_routes() {
	let mut map = grid(&["........."]);
	assert!(map.find_path(0, 0, 8, 0, BlockMask::WALK_GROUND, 4).is_empty());
	assert_eq!(map.find_path(0, 0, 8, 0, BlockMask::WALK_GROUND, 9).len(), 8);
}

#[test]
fn repeated_queries_share_the_grid() {
	let mut map = grid(&[
		"....", //
		".##.", //
		"....",
	]);
	for _ in 0..3 {
		let route = map.find_path(0, 0, 3, 2, BlockMask::WALK_GROUND, 0);
		assert!(!route.is_empty());
		assert_eq!(route.last(), Some(&Position::new(3, 2)));
	}
}
