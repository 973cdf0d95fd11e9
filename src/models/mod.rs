pub mod amount;
pub mod balance;
pub mod currency;
pub mod funding;
pub mod notification;
pub mod transfer;
pub mod user;
