pub mod animator;
pub mod color;
pub mod config;
pub mod dataset;
pub mod lod;
pub mod mesh_data;
pub mod playback;
pub mod projection;
pub mod size;

pub use config::{get_config, reload_config};
