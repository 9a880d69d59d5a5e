pub mod geometry;
pub mod model;
pub mod win_ansi;
