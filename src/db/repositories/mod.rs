pub mod episode;
pub mod news;
pub mod show;
pub mod subscription;
pub mod user;
