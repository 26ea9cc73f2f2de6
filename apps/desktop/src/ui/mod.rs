pub mod app;
pub mod player;
pub mod render;
