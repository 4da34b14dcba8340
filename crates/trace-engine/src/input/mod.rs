pub mod capture;
pub mod queue;
