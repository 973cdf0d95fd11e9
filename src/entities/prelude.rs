pub use super::balances::Entity as Balances;
pub use super::currencies::Entity as Currencies;
pub use super::deposits::Entity as Deposits;
pub use super::notifications::Entity as Notifications;
pub use super::transfers::Entity as Transfers;
pub use super::users::Entity as Users;
pub use super::withdrawals::Entity as Withdrawals;
