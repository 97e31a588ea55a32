pub use super::episodes::Entity as Episodes;
pub use super::shows::Entity as Shows;
pub use super::site_news::Entity as SiteNews;
pub use super::subscriptions::Entity as Subscriptions;
pub use super::users::Entity as Users;
