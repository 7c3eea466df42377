mod browser;
mod color;
mod component;
mod error;
mod ids;
mod interaction;
mod persistence;
mod render;
mod shortcuts;
mod state;
mod store;
mod toast;
mod types;

pub use component::MindmapCanvas;
