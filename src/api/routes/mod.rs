pub mod health;
pub mod multitool;
