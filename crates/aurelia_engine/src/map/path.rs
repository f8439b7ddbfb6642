//! A* search over the tile grid.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use super::tile::{BlockMask, Path, Position};
use super::Map;

/// Cost of one orthogonal step.
const BASIC_COST: i32 = 100;
/// Cost of one diagonal step, a fixed-point approximation of 100·√2.
const DIAGONAL_COST: i32 = BASIC_COST * 362 / 256;
/// Floating-point diagonal cost used by the heuristic.
const BASIC_COST_F: f32 = BASIC_COST as f32 * 362.0 / 256.0;

/// One open-list entry: a tile plus the F cost it was pushed with.
///
/// Re-pushing a tile with a better cost simply adds a second entry; the pop
/// loop discards entries whose tile already closed, so stale duplicates are
/// harmless.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Location {
	x: i32,
	y: i32,
	fcost: i32,
}

impl Ord for Location {
	fn cmp(&self, other: &Self) -> Ordering {
		// Reversed on F cost so the BinaryHeap pops the cheapest tile;
		// coordinates only break ties to keep the order total
		other
			.fcost
			.cmp(&self.fcost)
			.then_with(|| (other.x, other.y).cmp(&(self.x, self.y)))
	}
}

impl PartialOrd for Location {
	fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
		Some(self.cmp(other))
	}
}

impl Map {
	/// Finds a path from start to destination for an entity blocked by
	/// `walkmask`, returning start-exclusive, destination-inclusive tile
	/// coordinates. An empty path means no route (or invalid input); that is
	/// not an error, and the caller decides how to react.
	///
	/// `max_cost` (in multiples of the basic step cost) bounds the search
	/// when positive; use it for "reachable within N tiles" queries.
	pub fn find_path(
		&mut self,
		start_x: i32,
		start_y: i32,
		dest_x: i32,
		dest_y: i32,
		walkmask: BlockMask,
		max_cost: i32,
	) -> Path {
		let mut path = Path::new();

		if start_x >= self.width() || start_y >= self.height() || start_x < 0 || start_y < 0 {
			return path;
		}

		// No partial paths to unreachable destinations
		if !self.is_walkable(dest_x, dest_y, walkmask) {
			return path;
		}

		let on_open_list = self.on_open_list;
		let on_closed_list = self.on_closed_list;

		let start_index = self.tile_index(start_x, start_y);
		self.tile_at_mut(start_index).gcost = 0;

		let mut open_list = BinaryHeap::new();
		open_list.push(Location {
			x: start_x,
			y: start_y,
			fcost: 0,
		});

		let mut found_path = false;

		while !found_path {
			let Some(curr) = open_list.pop() else {
				break;
			};

			let curr_index = self.tile_index(curr.x, curr.y);

			// A tile already closed was reached again through a stale entry
			if self.tile_at(curr_index).which_list == on_closed_list {
				continue;
			}
			self.tile_at_mut(curr_index).which_list = on_closed_list;
			let curr_gcost = self.tile_at(curr_index).gcost;

			for dy in -1..=1 {
				let y = curr.y + dy;
				if y < 0 || y >= self.height() {
					continue;
				}
				let dy1 = (y - dest_y).abs();

				for dx in -1..=1 {
					let x = curr.x + dx;
					if (dx == 0 && dy == 0) || x < 0 || x >= self.width() {
						continue;
					}

					let index = self.tile_index(x, y);
					let mask = self.tile_at(index).blockmask;

					// Skip closed or blocked tiles; the destination itself is
					// exempt from the walkmask, never from walls
					if self.tile_at(index).which_list == on_closed_list
						|| (mask.intersects(walkmask) && !(x == dest_x && y == dest_y))
						|| mask.contains(BlockMask::WALL)
					{
						continue;
					}

					// A diagonal step must not cut a wall corner
					if dx != 0 && dy != 0 {
						let corner1 = self.tile_at(self.tile_index(curr.x, curr.y + dy)).blockmask;
						let corner2 = self.tile_at(self.tile_index(curr.x + dx, curr.y)).blockmask;
						if (corner1 | corner2).contains(BlockMask::WALL) {
							continue;
						}
					}

					let mut gcost = curr_gcost
						+ if dx == 0 || dy == 0 {
							BASIC_COST
						} else {
							DIAGONAL_COST
						};

					/* Demote an arbitrary direction to speed pathfinding by
					   adding a defect. As long as the total defect along any
					   path stays below the basic cost, the pathfinder still
					   finds one of the shortest paths while consecutive
					   equal-cost alternatives stop tying. */
					if dx == 0 || dy == 0 {
						gcost += 1;
					}

					if max_cost > 0 && gcost > max_cost * BASIC_COST {
						continue;
					}

					if self.tile_at(index).which_list != on_open_list {
						/* New tile. The heuristic must never overestimate the
						   real cost or the search stops being optimal; octile
						   distance with the exact diagonal cost satisfies
						   that, Manhattan distance would not. */
						let dx1 = (x - dest_x).abs();
						let hcost = (dx1 - dy1).abs() * BASIC_COST
							+ (dx1.min(dy1) as f32 * BASIC_COST_F) as i32;

						let tile = self.tile_at_mut(index);
						tile.hcost = hcost;
						tile.parent_x = curr.x;
						tile.parent_y = curr.y;
						tile.gcost = gcost;
						tile.fcost = gcost + hcost;

						if x != dest_x || y != dest_y {
							tile.which_list = on_open_list;
							let fcost = tile.fcost;
							open_list.push(Location {
								x,
								y,
								fcost,
							});
						} else {
							found_path = true;
						}
					} else if gcost < self.tile_at(index).gcost {
						// Cheaper route to an open tile: update and re-push
						let tile = self.tile_at_mut(index);
						tile.gcost = gcost;
						tile.fcost = gcost + tile.hcost;
						tile.parent_x = curr.x;
						tile.parent_y = curr.y;
						let fcost = tile.fcost;
						open_list.push(Location {
							x,
							y,
							fcost,
						});
					}
				}
			}
		}

		// Advance the generation counters instead of clearing the grid; a
		// full reset only happens when the counters approach overflow
		if self.on_open_list > u32::MAX - 2 {
			self.on_closed_list = 1;
			self.on_open_list = 2;
			for tile in self.tiles_mut() {
				tile.which_list = 0;
			}
		} else {
			self.on_closed_list += 2;
			self.on_open_list += 2;
		}

		if found_path {
			let mut path_x = dest_x;
			let mut path_y = dest_y;
			while path_x != start_x || path_y != start_y {
				path.push(Position::new(path_x, path_y));
				let tile = self.tile_at(self.tile_index(path_x, path_y));
				path_x = tile.parent_x;
				path_y = tile.parent_y;
			}
			path.reverse();
		}

		path
	}
}
