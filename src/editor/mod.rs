pub mod history;
pub mod session;
