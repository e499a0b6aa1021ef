pub mod accumulate;
pub mod driver;
pub mod ease;
pub mod state;
