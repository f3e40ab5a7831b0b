//! PostgreSQL integration tests for the run engine.
//!
//! These run the same lifecycle as the in-memory tests against real row
//! locks. They need a PostgreSQL database reachable through DATABASE_URL and
//! are skipped when it is unset.
//!
//! Run with: `DATABASE_URL=postgres://... cargo nextest run -p runs postgres`
//!
//! Every test creates its own users and items with unique names and removes
//! them afterwards.

use runs::{
    challenges_service::evaluate_challenges,
    database::Database,
    geo_math::Coordinate,
    models::{CollectibleItem, PositionSample, Run, RunStatus, User},
    position_ingest::ingest_position,
    run_lifecycle::{start_run, stop_run},
};
use sqlx::{PgPool, postgres::PgPoolOptions};
use std::env;
use time::{Duration, OffsetDateTime};
use uuid::Uuid;

async fn get_test_pool() -> Option<PgPool> {
    let database_url = match env::var("DATABASE_URL") {
        Ok(url) => url,
        Err(_) => {
            eprintln!("Skipping test: DATABASE_URL not set");
            return None;
        }
    };

    let pool = match PgPoolOptions::new()
        .max_connections(8)
        .connect(&database_url)
        .await
    {
        Ok(pool) => pool,
        Err(e) => {
            eprintln!("Skipping test: Failed to connect to database: {e}");
            return None;
        }
    };

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to apply migrations");
    Some(pool)
}

async fn create_test_user(db: &Database, is_coach: bool) -> Uuid {
    let user = User::new(
        format!("test-{}", Uuid::new_v4()),
        "Test".to_string(),
        "User".to_string(),
        is_coach,
    );
    db.create_user(&user).await.expect("Failed to create user");
    user.id
}

async fn cleanup_users(pool: &PgPool, ids: &[Uuid]) {
    let _ = sqlx::query("DELETE FROM users WHERE id = ANY($1)")
        .bind(ids)
        .execute(pool)
        .await;
}

async fn cleanup_items(pool: &PgPool, uids: &[String]) {
    let _ = sqlx::query("DELETE FROM collectible_items WHERE uid = ANY($1)")
        .bind(uids)
        .execute(pool)
        .await;
}

fn sample(lat: f64, lon: f64, at: OffsetDateTime) -> PositionSample {
    PositionSample {
        coordinate: Coordinate::new(lat, lon).unwrap(),
        recorded_at: at,
    }
}

#[tokio::test]
async fn test_run_lifecycle_with_awards() {
    let Some(pool) = get_test_pool().await else {
        return;
    };
    let db = Database::new(pool.clone());
    let athlete_id = create_test_user(&db, false).await;

    let uid = format!("coin-{}", Uuid::new_v4());
    let coin = CollectibleItem {
        id: Uuid::new_v4(),
        name: "Coin".to_string(),
        uid: uid.clone(),
        value: 5,
        latitude: 55.7512,
        longitude: 37.6184,
        picture: "https://example.com/coin.png".to_string(),
    };
    db.upsert_collectibles(std::slice::from_ref(&coin)).await.unwrap();

    let run = Run::new(athlete_id, Some("Morning run".to_string()));
    db.create_run(&run).await.unwrap();
    start_run(&db, run.id).await.unwrap();

    let t0 = OffsetDateTime::now_utc();
    ingest_position(&db, run.id, sample(55.7512, 37.6184, t0)).await.unwrap();
    ingest_position(&db, run.id, sample(55.7700, 37.6184, t0 + Duration::seconds(400)))
        .await
        .unwrap();

    let finished = stop_run(&db, run.id).await.unwrap();
    assert_eq!(finished.status, RunStatus::Finished);
    assert_eq!(finished.duration_seconds, 400.0);
    assert!(finished.distance > 2.0);

    let challenges = db.list_challenges(Some(athlete_id)).await.unwrap();
    let names: Vec<_> = challenges.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, ["2km in 10 Minutes"]);
    assert!(evaluate_challenges(&db, athlete_id).await.unwrap().is_empty());

    let collected = db.collected_items(athlete_id).await.unwrap();
    assert_eq!(collected.len(), 1);
    assert_eq!(collected[0].uid, uid);

    cleanup_users(&pool, &[athlete_id]).await;
    cleanup_items(&pool, &[uid]).await;
}

#[tokio::test]
async fn test_concurrent_positions() {
    let Some(pool) = get_test_pool().await else {
        return;
    };
    let db = Database::new(pool.clone());
    let athlete_id = create_test_user(&db, false).await;
    let run = Run::new(athlete_id, None);
    db.create_run(&run).await.unwrap();
    start_run(&db, run.id).await.unwrap();

    let t0 = OffsetDateTime::now_utc();
    let mut handles = Vec::new();
    for i in 0..12i64 {
        let db = db.clone();
        let run_id = run.id;
        handles.push(tokio::spawn(async move {
            let at = t0 + Duration::seconds(15 * i);
            ingest_position(&db, run_id, sample(55.75 + 0.0004 * i as f64, 37.61, at)).await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let positions = db.list_positions(run.id).await.unwrap();
    assert_eq!(positions.len(), 12);
    assert_eq!(positions[0].distance, 0.0);
    assert!(positions.windows(2).all(|w| w[0].distance <= w[1].distance));

    cleanup_users(&pool, &[athlete_id]).await;
}

#[tokio::test]
async fn test_subscription_and_rating() {
    let Some(pool) = get_test_pool().await else {
        return;
    };
    let db = Database::new(pool.clone());
    let coach_id = create_test_user(&db, true).await;
    let athlete_id = create_test_user(&db, false).await;

    assert!(db.rate_coach(coach_id, athlete_id, 4).await.unwrap().is_none());
    assert!(db.subscribe(coach_id, athlete_id).await.unwrap());
    assert!(!db.subscribe(coach_id, athlete_id).await.unwrap());

    let subscription = db.rate_coach(coach_id, athlete_id, 4).await.unwrap().unwrap();
    assert_eq!(subscription.rate, Some(4));

    let coach = db.get_user_with_stats(coach_id).await.unwrap().unwrap();
    assert_eq!(coach.rating, Some(4.0));
    let athletes = db.athletes_of(coach_id).await.unwrap();
    assert_eq!(athletes.len(), 1);
    assert_eq!(athletes[0].id, athlete_id);

    cleanup_users(&pool, &[coach_id, athlete_id]).await;
}

#[tokio::test]
async fn test_collectible_upsert_by_uid() {
    let Some(pool) = get_test_pool().await else {
        return;
    };
    let db = Database::new(pool.clone());
    let uid = format!("gem-{}", Uuid::new_v4());

    let mut gem = CollectibleItem {
        id: Uuid::new_v4(),
        name: "Gem".to_string(),
        uid: uid.clone(),
        value: 1,
        latitude: 10.0,
        longitude: 10.0,
        picture: "https://example.com/gem.png".to_string(),
    };
    db.upsert_collectibles(std::slice::from_ref(&gem)).await.unwrap();

    gem.id = Uuid::new_v4();
    gem.value = 7;
    db.upsert_collectibles(std::slice::from_ref(&gem)).await.unwrap();

    let items: Vec<_> = db
        .list_collectibles()
        .await
        .unwrap()
        .into_iter()
        .filter(|i| i.uid == uid)
        .collect();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].value, 7);

    cleanup_items(&pool, &[uid]).await;
}
