pub mod aggregate;
pub mod render;
pub mod window;
