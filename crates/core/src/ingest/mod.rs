pub mod error;
pub mod provider;
pub mod ticker;
pub mod types;
pub mod yahoo;
