pub mod cli;
pub mod console;
pub mod render;
pub mod session;
