pub mod credentials;
pub mod episodes;
pub mod search;
pub mod subscriptions;
pub mod users;
