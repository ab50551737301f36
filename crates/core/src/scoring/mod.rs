pub mod axis;
pub mod health;
