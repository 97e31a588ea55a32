use anyhow::Result;
use chrono::NaiveDate;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::entities::{episodes, shows, site_news, users};
use crate::models::episode::Episode;

pub mod migrator;
pub mod repositories;

pub use repositories::episode::EpisodeInput;

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        if !db_url.contains(":memory:") {
            let path_str = db_url.trim_start_matches("sqlite:");
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    fn user_repo(&self) -> repositories::user::UserRepository {
        repositories::user::UserRepository::new(self.conn.clone())
    }

    fn show_repo(&self) -> repositories::show::ShowRepository {
        repositories::show::ShowRepository::new(self.conn.clone())
    }

    fn episode_repo(&self) -> repositories::episode::EpisodeRepository {
        repositories::episode::EpisodeRepository::new(self.conn.clone())
    }

    fn subscription_repo(&self) -> repositories::subscription::SubscriptionRepository {
        repositories::subscription::SubscriptionRepository::new(self.conn.clone())
    }

    fn news_repo(&self) -> repositories::news::NewsRepository {
        repositories::news::NewsRepository::new(self.conn.clone())
    }

    // ========== Users ==========

    pub async fn get_user(&self, name: &str) -> Result<Option<users::Model>> {
        self.user_repo().get(name).await
    }

    pub async fn get_user_by_mail(&self, mail: &str) -> Result<Option<users::Model>> {
        self.user_repo().get_by_mail(mail).await
    }

    pub async fn user_name_taken(&self, name: &str) -> Result<bool> {
        self.user_repo().name_taken(name).await
    }

    pub async fn user_mail_taken(&self, mail: &str) -> Result<bool> {
        self.user_repo().mail_taken(mail).await
    }

    pub async fn insert_user(&self, user: users::ActiveModel) -> Result<users::Model> {
        self.user_repo().insert(user).await
    }

    pub async fn set_user_password(&self, name: &str, passwd: &str) -> Result<()> {
        self.user_repo().set_password(name, passwd).await
    }

    pub async fn clear_user_recover_key(&self, name: &str) -> Result<()> {
        self.user_repo().clear_recover_key(name).await
    }

    pub async fn set_user_recover_key(&self, name: &str, key: &str) -> Result<()> {
        self.user_repo().set_recover_key(name, key).await
    }

    pub async fn set_user_token(&self, name: &str, token: &str) -> Result<()> {
        self.user_repo().set_token(name, token).await
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn update_user_profile(
        &self,
        name: &str,
        mail: Option<&str>,
        days_back: Option<i32>,
        date_offset: Option<i32>,
        link_format: Option<&str>,
        site_news: Option<bool>,
        latest_news_read: Option<i32>,
    ) -> Result<users::Model> {
        self.user_repo()
            .update_profile(
                name,
                mail,
                days_back,
                date_offset,
                link_format,
                site_news,
                latest_news_read,
            )
            .await
    }

    pub async fn delete_user(&self, name: &str) -> Result<bool> {
        self.user_repo().delete(name).await
    }

    // ========== Shows ==========

    pub async fn get_show(&self, id: i32) -> Result<Option<shows::Model>> {
        self.show_repo().get(id).await
    }

    pub async fn get_show_by_url(&self, url: &str) -> Result<Option<shows::Model>> {
        self.show_repo().get_by_url(url).await
    }

    pub async fn upsert_show(
        &self,
        id: i32,
        name: &str,
        url: &str,
        banner: Option<&str>,
    ) -> Result<shows::Model> {
        self.show_repo().upsert(id, name, url, banner).await
    }

    pub async fn list_shows(&self) -> Result<Vec<shows::Model>> {
        self.show_repo().list_all().await
    }

    pub async fn delete_show(&self, id: i32) -> Result<bool> {
        self.show_repo().delete(id).await
    }

    // ========== Episodes ==========

    pub async fn upsert_episodes(&self, show_id: i32, episodes: &[EpisodeInput]) -> Result<()> {
        self.episode_repo().upsert_many(show_id, episodes).await
    }

    pub async fn get_episodes_for_show(&self, show_id: i32) -> Result<Vec<episodes::Model>> {
        self.episode_repo().get_for_show(show_id).await
    }

    pub async fn relevant_episodes(
        &self,
        user_name: &str,
        cutoff: NaiveDate,
    ) -> Result<Vec<Episode>> {
        self.episode_repo().relevant_for_user(user_name, cutoff).await
    }

    pub async fn next_episode(
        &self,
        show_id: i32,
        after: NaiveDate,
    ) -> Result<Option<episodes::Model>> {
        self.episode_repo().next_for_show(show_id, after).await
    }

    pub async fn clear_episodes(&self, show_id: i32) -> Result<u64> {
        self.episode_repo().clear_for_show(show_id).await
    }

    // ========== Subscriptions ==========

    pub async fn add_subscription(&self, user_name: &str, show_id: i32) -> Result<()> {
        self.subscription_repo().add(user_name, show_id).await
    }

    pub async fn remove_subscription(&self, user_name: &str, show_id: i32) -> Result<bool> {
        self.subscription_repo().remove(user_name, show_id).await
    }

    pub async fn subscription_exists(&self, user_name: &str, show_id: i32) -> Result<bool> {
        self.subscription_repo().exists(user_name, show_id).await
    }

    pub async fn subscribed_shows(&self, user: &users::Model) -> Result<Vec<shows::Model>> {
        self.subscription_repo().shows_for_user(user).await
    }

    pub async fn subscriber_count(&self, show_id: i32) -> Result<u64> {
        self.subscription_repo().subscriber_count(show_id).await
    }

    // ========== Site news ==========

    pub async fn add_news(
        &self,
        title: &str,
        text: &str,
        date: Option<NaiveDate>,
    ) -> Result<site_news::Model> {
        self.news_repo().add(title, text, date).await
    }

    pub async fn list_news(&self) -> Result<Vec<site_news::Model>> {
        self.news_repo().list().await
    }

    pub async fn latest_news(&self) -> Result<Option<site_news::Model>> {
        self.news_repo().latest().await
    }

    pub async fn delete_news(&self, id: i32) -> Result<bool> {
        self.news_repo().delete(id).await
    }
}
