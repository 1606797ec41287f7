pub mod balance;
pub mod health;
pub mod ranking;
pub mod stages;
pub mod users;
