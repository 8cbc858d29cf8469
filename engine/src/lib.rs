//! Procedural track meshes: path editing, cross-section extrusion and
//! noise-driven island layouts.

pub mod api;
pub mod bezier;
pub mod builder;
pub mod config;
pub mod extrude;
pub mod geometry;
pub mod island;
pub mod path;
pub mod sampling;
pub mod smoothing;

pub use api::{NoiseSource, Result, Seed, TrackError};
pub use builder::{BuiltTrack, TrackBuilder};
pub use config::{CrossingCheck, ExtrudeConfig, GeneratorConfig, TrackConfig};
pub use extrude::{extrude, profile_preview, TrackMesh, UvMode};
pub use island::IslandGenerator;
pub use path::{Path, Profile, Span, WaypointStore};
pub use sampling::NoiseKind;
pub use smoothing::{divide, smooth_intersections, smooth_intersections_with_profile, smooth_uniform, SmoothReport};
