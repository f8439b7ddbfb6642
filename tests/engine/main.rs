//! Integration tests driving the public `aurelia-rs` surface.

mod actors;
mod effects;
mod pathfinding;
