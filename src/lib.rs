#![warn(clippy::all, rust_2018_idioms)]

pub mod camera;
pub mod config;
pub mod error;
pub mod input;
pub mod minimap;
pub mod ownership;
pub mod render;
pub mod report;
pub mod scan;
pub mod torus;
pub mod ui;

mod app;
pub use app::{CellHook, StarmapApp};
pub use error::{Error, Result};
