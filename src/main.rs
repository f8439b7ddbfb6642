//! Headless driver for the aurelia engine.
//!
//! Provides two subcommands:
//! - `simulate`: load a particle effect definition, run it for a number of
//!   ticks without a renderer, and print admission statistics.
//! - `pathfind`: load a text grid (`#` wall, anything else floor), run the
//!   A* pathfinder across it, and print the route overlaid on the map.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use log::info;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use serde::Serialize;

use aurelia_rs::prelude::*;

fn main() -> Result<()> {
	env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

	let cli = Cli::parse();
	match cli.command {
		Command::Simulate(opts) => run_simulate(opts),
		Command::Pathfind(opts) => run_pathfind(opts),
	}
}

#[derive(Parser)]
#[command(name = "aurelia-rs")]
#[command(author = "aurelia-rs project")]
#[command(version)]
#[command(about = "Headless driver for the aurelia engine", long_about = None)]
struct Cli {
	#[command(subcommand)]
	command: Command,
}

#[derive(Subcommand)]
enum Command {
	/// Run a particle effect for a number of ticks and print statistics
	Simulate(SimulateArgs),
	/// Run the A* pathfinder over a text map and print the route
	Pathfind(PathfindArgs),
}

#[derive(Args)]
struct SimulateArgs {
	/// Path to a JSON effect definition
	#[arg(value_name = "FILE")]
	effect: PathBuf,

	/// Name to register the effect under (defaults to the file stem)
	#[arg(short, long)]
	name: Option<String>,

	/// Number of ticks to simulate
	#[arg(short, long, default_value_t = 100)]
	ticks: u32,

	/// Spawn x position in pixels
	#[arg(short = 'x', long, default_value_t = 0.0)]
	pos_x: f32,

	/// Spawn y position in pixels
	#[arg(short = 'y', long, default_value_t = 0.0)]
	pos_y: f32,

	/// Seed for the random stream
	#[arg(short, long, default_value_t = 1)]
	seed: u64,

	/// Optional TOML file with engine settings
	#[arg(short, long, value_name = "FILE")]
	config: Option<PathBuf>,

	/// Print per-tick live counts
	#[arg(short, long, default_value_t = false)]
	verbose: bool,

	/// Emit the final statistics as JSON
	#[arg(long, default_value_t = false)]
	json: bool,
}

#[derive(Args)]
struct PathfindArgs {
	/// Path to a text map (`#` wall, anything else floor)
	#[arg(value_name = "FILE")]
	map: PathBuf,

	/// Start tile as x,y
	#[arg(short, long, value_parser = parse_point)]
	start: (i32, i32),

	/// Destination tile as x,y
	#[arg(short, long, value_parser = parse_point)]
	dest: (i32, i32),

	/// Abort routes longer than this many basic-cost tiles (0 = unbounded)
	#[arg(short, long, default_value_t = 0)]
	max_cost: i32,
}

#[derive(Serialize)]
struct SimulateStats {
	ticks: u32,
	spawned_roots: usize,
	peak_live: usize,
	final_live: usize,
	drained_after: Option<u32>,
}

fn run_simulate(args: SimulateArgs) -> Result<()> {
	let settings = load_settings(args.config.as_ref())?;
	let document = fs::read_to_string(&args.effect)
		.with_context(|| format!("reading effect {}", args.effect.display()))?;
	let name = match &args.name {
		Some(name) => name.clone(),
		None => args
			.effect
			.file_stem()
			.map(|stem| stem.to_string_lossy().into_owned())
			.unwrap_or_else(|| "effect".to_string()),
	};

	let mut effects = EffectRegistry::new();
	effects
		.load_str(&name, &document)
		.with_context(|| format!("parsing effect {}", args.effect.display()))?;

	let mut images = ImageRegistry::new();
	let mut rng = SmallRng::seed_from_u64(args.seed);
	let mut engine = ParticleEngine::new(settings);

	let spawned_roots = engine
		.add_effect(&effects, &mut images, &mut rng, &name, args.pos_x, args.pos_y, 0)
		.with_context(|| format!("spawning effect {name}"))?;
	info!("spawned {spawned_roots} root trees for {name}");

	let mut peak_live = engine.live_count();
	let mut drained_after = None;
	for tick in 1..=args.ticks {
		engine.update(&effects, &mut images, &mut rng);
		let live = engine.live_count();
		peak_live = peak_live.max(live);
		if args.verbose {
			println!("tick {tick:>5}: {live} live");
		}
		if live == 0 && drained_after.is_none() {
			drained_after = Some(tick);
		}
	}

	let stats = SimulateStats {
		ticks: args.ticks,
		spawned_roots,
		peak_live,
		final_live: engine.live_count(),
		drained_after,
	};

	if args.json {
		println!("{}", serde_json::to_string_pretty(&stats)?);
	} else {
		println!("effect:        {name}");
		println!("ticks:         {}", stats.ticks);
		println!("root trees:    {}", stats.spawned_roots);
		println!("peak live:     {}", stats.peak_live);
		println!("final live:    {}", stats.final_live);
		match stats.drained_after {
			Some(tick) => println!("drained after: {tick} ticks"),
			None => println!("drained after: still running"),
		}
	}
	Ok(())
}

fn run_pathfind(args: PathfindArgs) -> Result<()> {
	let text = fs::read_to_string(&args.map)
		.with_context(|| format!("reading map {}", args.map.display()))?;
	let rows: Vec<&str> = text.lines().filter(|line| !line.is_empty()).collect();
	if rows.is_empty() {
		bail!("map {} is empty", args.map.display());
	}
	let height = rows.len() as i32;
	let width = rows.iter().map(|row| row.chars().count()).max().unwrap_or(0) as i32;

	let mut map = Map::new(width, height);
	for (y, row) in rows.iter().enumerate() {
		for (x, ch) in row.chars().enumerate() {
			if ch == '#' {
				map.block_tile(x as i32, y as i32, BlockType::Wall);
			}
		}
	}

	let (sx, sy) = args.start;
	let (dx, dy) = args.dest;
	if !map.contains(sx, sy) {
		bail!("start {sx},{sy} is outside the {width}x{height} map");
	}
	if !map.contains(dx, dy) {
		bail!("destination {dx},{dy} is outside the {width}x{height} map");
	}

	let route = map.find_path(sx, sy, dx, dy, BlockMask::WALK_GROUND, args.max_cost);
	if route.is_empty() {
		println!("no path from {sx},{sy} to {dx},{dy}");
		return Ok(());
	}

	let mut overlay: Vec<Vec<char>> = rows
		.iter()
		.map(|row| {
			let mut chars: Vec<char> = row.chars().collect();
			chars.resize(width as usize, ' ');
			chars
		})
		.collect();
	for step in &route {
		overlay[step.y as usize][step.x as usize] = '*';
	}
	overlay[sy as usize][sx as usize] = 'S';
	overlay[dy as usize][dx as usize] = 'D';

	for row in &overlay {
		println!("{}", row.iter().collect::<String>());
	}
	println!("{} steps", route.len());
	Ok(())
}

fn load_settings(path: Option<&PathBuf>) -> Result<EngineSettings> {
	let mut builder = config::Config::builder();
	if let Some(path) = path {
		builder = builder.add_source(config::File::from(path.as_path()));
	}
	builder
		.build()
		.context("reading engine settings")?
		.try_deserialize::<EngineSettings>()
		.context("parsing engine settings")
}

fn parse_point(raw: &str) -> Result<(i32, i32), String> {
	let (x, y) = raw
		.split_once(',')
		.ok_or_else(|| format!("expected x,y but got {raw}"))?;
	let x = x.trim().parse().map_err(|_| format!("bad x coordinate in {raw}"))?;
	let y = y.trim().parse().map_err(|_| format!("bad y coordinate in {raw}"))?;
	Ok((x, y))
}
