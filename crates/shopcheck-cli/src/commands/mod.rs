pub mod completion;
pub mod config;
pub mod doctor;
pub mod session;
