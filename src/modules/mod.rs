pub mod app;
pub mod geometry;
pub mod overlay;
pub mod state;
pub mod transform;
pub mod view;
pub mod watch;
