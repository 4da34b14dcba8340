pub mod overlay;
pub mod vector;
