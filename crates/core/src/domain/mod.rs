pub mod fundamentals;
pub mod history;
