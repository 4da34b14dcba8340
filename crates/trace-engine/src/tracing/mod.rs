pub mod controller;
pub mod coverage;
pub mod session;
