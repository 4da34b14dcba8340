pub mod mask;
pub mod rng;
pub mod time;
