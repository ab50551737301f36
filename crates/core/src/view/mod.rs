pub mod chart;
pub mod format;
pub mod profile;
pub mod screener;
