pub mod app;
pub mod config;
pub mod mesh;
pub mod scene;
