use chrono::{Days, NaiveDate, Utc};
use sea_orm::Set;

use followarr::db::{EpisodeInput, Store};
use followarr::entities::users;

async fn test_store() -> Store {
    let path = std::env::temp_dir().join(format!("followarr-test-{}.db", uuid::Uuid::new_v4()));
    Store::new(&format!("sqlite:{}", path.display()))
        .await
        .expect("Failed to create test store")
}

async fn seed_user(store: &Store, name: &str) {
    store
        .insert_user(users::ActiveModel {
            name: Set(name.to_string()),
            mail: Set(format!("{name}@example.org")),
            passwd: Set("$argon2id$irrelevant".to_string()),
            recover_key: Set(None),
            token: Set(format!("token-{name}")),
            days_back: Set(1),
            date_offset: Set(0),
            link_format: Set("##SHOW##".to_string()),
            site_news: Set(true),
            latest_news_read: Set(None),
        })
        .await
        .expect("Failed to seed user");
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn ep(season: i32, num: i32, airdate: Option<NaiveDate>) -> EpisodeInput {
    EpisodeInput {
        season,
        num,
        title: Some(format!("S{season}E{num}")),
        airdate,
    }
}

#[tokio::test]
async fn relevant_episodes_apply_cutoff_and_ordering() {
    let store = test_store().await;
    seed_user(&store, "alice").await;

    store.upsert_show(1, "show1", "1", None).await.unwrap();
    store.upsert_show(2, "show2", "2", None).await.unwrap();
    store.add_subscription("alice", 1).await.unwrap();
    store.add_subscription("alice", 2).await.unwrap();

    store
        .upsert_episodes(
            1,
            &[
                ep(1, 1, Some(date(2026, 8, 18))), // before cutoff
                ep(1, 2, Some(date(2026, 8, 20))),
                ep(1, 3, Some(date(2026, 8, 25))), // future, still relevant
                ep(1, 4, None),                    // undated, never relevant
            ],
        )
        .await
        .unwrap();
    store
        .upsert_episodes(2, &[ep(3, 7, Some(date(2026, 8, 20)))])
        .await
        .unwrap();

    let relevant = store
        .relevant_episodes("alice", date(2026, 8, 20))
        .await
        .unwrap();

    let keys: Vec<(i32, i32, i32)> = relevant
        .iter()
        .map(|e| (e.show_id, e.season, e.num))
        .collect();

    // Airdate ascending; same-day episodes ordered by show, season, number.
    assert_eq!(keys, vec![(1, 1, 2), (2, 3, 7), (1, 1, 3)]);

    assert_eq!(relevant[0].show_name, "show1");
    assert_eq!(relevant[1].show_name, "show2");
}

#[tokio::test]
async fn relevant_episodes_are_scoped_to_subscriptions() {
    let store = test_store().await;
    seed_user(&store, "alice").await;
    seed_user(&store, "bob").await;

    store.upsert_show(1, "show1", "1", None).await.unwrap();
    store.upsert_show(2, "show2", "2", None).await.unwrap();
    store.add_subscription("alice", 1).await.unwrap();
    store.add_subscription("bob", 2).await.unwrap();

    store
        .upsert_episodes(1, &[ep(1, 1, Some(date(2026, 8, 20)))])
        .await
        .unwrap();
    store
        .upsert_episodes(2, &[ep(1, 1, Some(date(2026, 8, 20)))])
        .await
        .unwrap();

    let relevant = store
        .relevant_episodes("alice", date(2026, 8, 1))
        .await
        .unwrap();

    assert_eq!(relevant.len(), 1);
    assert_eq!(relevant[0].show_id, 1);
}

#[tokio::test]
async fn next_episode_is_strictly_after_the_given_date() {
    let store = test_store().await;

    store.upsert_show(1, "show1", "1", None).await.unwrap();
    store
        .upsert_episodes(
            1,
            &[
                ep(1, 1, Some(date(2026, 8, 20))),
                ep(1, 2, Some(date(2026, 8, 23))),
                ep(1, 3, Some(date(2026, 8, 30))),
            ],
        )
        .await
        .unwrap();

    // An episode airing exactly on the given day does not count as next.
    let next = store.next_episode(1, date(2026, 8, 23)).await.unwrap();
    assert_eq!(next.map(|e| e.num), Some(3));

    let none = store.next_episode(1, date(2026, 8, 30)).await.unwrap();
    assert!(none.is_none());
}

#[tokio::test]
async fn episode_upsert_overwrites_existing_rows() {
    let store = test_store().await;

    store.upsert_show(1, "show1", "1", None).await.unwrap();
    store
        .upsert_episodes(1, &[ep(2, 5, None)])
        .await
        .unwrap();

    // Catalog later learns the airdate and a proper title.
    store
        .upsert_episodes(
            1,
            &[EpisodeInput {
                season: 2,
                num: 5,
                title: Some("The Opposite".to_string()),
                airdate: Some(date(2026, 9, 1)),
            }],
        )
        .await
        .unwrap();

    let episodes = store.get_episodes_for_show(1).await.unwrap();
    assert_eq!(episodes.len(), 1);
    assert_eq!(episodes[0].title.as_deref(), Some("The Opposite"));
    assert_eq!(episodes[0].airdate, Some(date(2026, 9, 1)));
}

#[tokio::test]
async fn show_upsert_updates_in_place() {
    let store = test_store().await;

    store.upsert_show(1, "working title", "1", None).await.unwrap();
    store
        .upsert_show(1, "Seinfeld", "1", Some("banner.jpg"))
        .await
        .unwrap();

    let shows = store.list_shows().await.unwrap();
    assert_eq!(shows.len(), 1);
    assert_eq!(shows[0].name, "Seinfeld");
    assert_eq!(shows[0].banner.as_deref(), Some("banner.jpg"));
}

#[tokio::test]
async fn duplicate_subscriptions_are_ignored() {
    let store = test_store().await;
    seed_user(&store, "alice").await;
    store.upsert_show(1, "show1", "1", None).await.unwrap();

    store.add_subscription("alice", 1).await.unwrap();
    store.add_subscription("alice", 1).await.unwrap();

    assert!(store.subscription_exists("alice", 1).await.unwrap());
    assert_eq!(store.subscriber_count(1).await.unwrap(), 1);
}

#[tokio::test]
async fn remove_subscription_reports_whether_it_existed() {
    let store = test_store().await;
    seed_user(&store, "alice").await;
    store.upsert_show(1, "show1", "1", None).await.unwrap();

    assert!(!store.remove_subscription("alice", 1).await.unwrap());

    store.add_subscription("alice", 1).await.unwrap();
    assert!(store.remove_subscription("alice", 1).await.unwrap());
    assert!(!store.subscription_exists("alice", 1).await.unwrap());
}

#[tokio::test]
async fn deleting_a_user_drops_their_subscriptions() {
    let store = test_store().await;
    seed_user(&store, "alice").await;
    store.upsert_show(1, "show1", "1", None).await.unwrap();
    store.add_subscription("alice", 1).await.unwrap();

    assert!(store.delete_user("alice").await.unwrap());

    assert!(!store.subscription_exists("alice", 1).await.unwrap());
    // The show itself survives.
    assert!(store.get_show(1).await.unwrap().is_some());
}

#[tokio::test]
async fn deleting_a_show_drops_episodes_and_subscriptions() {
    let store = test_store().await;
    seed_user(&store, "alice").await;
    store.upsert_show(1, "show1", "1", None).await.unwrap();
    store.add_subscription("alice", 1).await.unwrap();
    store
        .upsert_episodes(1, &[ep(1, 1, Some(date(2026, 8, 20)))])
        .await
        .unwrap();

    assert!(store.delete_show(1).await.unwrap());

    assert!(store.get_episodes_for_show(1).await.unwrap().is_empty());
    assert!(!store.subscription_exists("alice", 1).await.unwrap());
    assert!(store.get_user("alice").await.unwrap().is_some());
}

#[tokio::test]
async fn news_defaults_to_today_and_lists_newest_first() {
    let store = test_store().await;

    let first = store
        .add_news("Older", "text", Some(date(2026, 8, 1)))
        .await
        .unwrap();
    let second = store.add_news("Newer", "text", None).await.unwrap();

    assert_eq!(second.date, Utc::now().date_naive());

    let all = store.list_news().await.unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].id, second.id);
    assert_eq!(all[1].id, first.id);

    let latest = store.latest_news().await.unwrap().unwrap();
    assert_eq!(latest.id, second.id);

    assert!(store.delete_news(first.id).await.unwrap());
    assert_eq!(store.list_news().await.unwrap().len(), 1);
}

#[tokio::test]
async fn clearing_episodes_reports_deleted_count() {
    let store = test_store().await;

    store.upsert_show(1, "show1", "1", None).await.unwrap();
    let today = Utc::now().date_naive();
    store
        .upsert_episodes(
            1,
            &[
                ep(1, 1, Some(today)),
                ep(1, 2, today.checked_add_days(Days::new(7))),
            ],
        )
        .await
        .unwrap();

    assert_eq!(store.clear_episodes(1).await.unwrap(), 2);
    assert!(store.get_episodes_for_show(1).await.unwrap().is_empty());
}
