pub mod prelude;

pub mod episodes;
pub mod shows;
pub mod site_news;
pub mod subscriptions;
pub mod users;
