//! Run lifecycle scenarios against the in-memory store.
//!
//! These exercise the same code paths the HTTP handlers use, without a
//! database: start, ingest, stop, challenge awards and collectible grants.

use runs::{
    challenges_service::evaluate_challenges,
    errors::AppError,
    geo_math::{self, Coordinate},
    models::{CollectibleItem, PositionSample, Run, RunStatus, User},
    position_ingest::ingest_position,
    run_lifecycle::{start_run, stop_run},
    store::MemoryStore,
};
use time::{Duration, OffsetDateTime, macros::datetime};
use uuid::Uuid;

const T0: OffsetDateTime = datetime!(2025-07-07 10:00 UTC);

fn sample(lat: f64, lon: f64, at: OffsetDateTime) -> PositionSample {
    PositionSample {
        coordinate: Coordinate::new(lat, lon).unwrap(),
        recorded_at: at,
    }
}

async fn athlete(store: &MemoryStore) -> Uuid {
    let user = User::new(
        format!("runner-{}", Uuid::new_v4()),
        "Anna".to_string(),
        "Petrova".to_string(),
        false,
    );
    let id = user.id;
    store.insert_user(user).await;
    id
}

async fn new_run(store: &MemoryStore, athlete_id: Uuid) -> Uuid {
    let run = Run::new(athlete_id, None);
    let id = run.id;
    store.insert_run(run).await;
    id
}

async fn started_run(store: &MemoryStore, athlete_id: Uuid) -> Uuid {
    let id = new_run(store, athlete_id).await;
    start_run(store, id).await.unwrap();
    id
}

/// Inserts `count` finished runs of `distance_km` each.
async fn finished_history(store: &MemoryStore, athlete_id: Uuid, count: usize, distance_km: f64) {
    for _ in 0..count {
        let mut run = Run::new(athlete_id, None);
        run.status = RunStatus::Finished;
        run.distance = distance_km;
        run.duration_seconds = 3600.0;
        run.created_at = T0 - Duration::days(30);
        store.insert_run(run).await;
    }
}

fn item(uid: &str, lat: f64, lon: f64) -> CollectibleItem {
    CollectibleItem {
        id: Uuid::new_v4(),
        name: format!("Item {uid}"),
        uid: uid.to_string(),
        value: 10,
        latitude: lat,
        longitude: lon,
        picture: format!("https://example.com/{uid}.png"),
    }
}

#[tokio::test]
async fn test_two_sample_run() {
    let store = MemoryStore::new();
    let athlete_id = athlete(&store).await;
    let run_id = started_run(&store, athlete_id).await;

    let a = ingest_position(&store, run_id, sample(55.7512, 37.6184, T0))
        .await
        .unwrap();
    let b = ingest_position(
        &store,
        run_id,
        sample(55.7522, 37.6194, T0 + Duration::seconds(60)),
    )
    .await
    .unwrap();

    assert_eq!(a.distance, 0.0);
    assert_eq!(a.speed, 0.0);
    let delta_m = geo_math::distance_m(a.coordinate(), b.coordinate());
    assert_eq!(b.distance, geo_math::round2(delta_m / 1000.0));
    assert_eq!(b.speed, geo_math::round2(delta_m / 60.0));

    let run = stop_run(&store, run_id).await.unwrap();

    assert_eq!(run.status, RunStatus::Finished);
    assert_eq!(run.duration_seconds, 60.0);
    assert!((run.distance - delta_m / 1000.0).abs() < 1e-9);
    assert!((run.average_speed - b.speed / 2.0).abs() < 1e-9);
    assert_eq!(store.run(run_id).await.unwrap().status, RunStatus::Finished);
}

#[tokio::test]
async fn test_stop_without_positions() {
    let store = MemoryStore::new();
    let athlete_id = athlete(&store).await;
    let run_id = started_run(&store, athlete_id).await;

    let run = stop_run(&store, run_id).await.unwrap();

    assert_eq!(run.distance, 0.0);
    assert_eq!(run.duration_seconds, 0.0);
    assert_eq!(run.average_speed, 0.0);
}

#[tokio::test]
async fn test_invalid_transitions() {
    let store = MemoryStore::new();
    let athlete_id = athlete(&store).await;
    let run_id = new_run(&store, athlete_id).await;

    let err = stop_run(&store, run_id).await.unwrap_err();
    assert_eq!(err.to_string(), "Run already finished or not started");

    start_run(&store, run_id).await.unwrap();
    let err = start_run(&store, run_id).await.unwrap_err();
    assert_eq!(err.to_string(), "Run already started");

    stop_run(&store, run_id).await.unwrap();
    assert!(matches!(
        stop_run(&store, run_id).await,
        Err(AppError::InvalidState(_))
    ));
    assert!(matches!(
        start_run(&store, run_id).await,
        Err(AppError::InvalidState(_))
    ));
}

#[tokio::test]
async fn test_unknown_run() {
    let store = MemoryStore::new();
    let missing = Uuid::new_v4();

    assert!(matches!(
        start_run(&store, missing).await,
        Err(AppError::NotFound("Run"))
    ));
    assert!(matches!(
        ingest_position(&store, missing, sample(55.0, 37.0, T0)).await,
        Err(AppError::NotFound("Run"))
    ));
}

#[tokio::test]
async fn test_positions_rejected_outside_progress() {
    let store = MemoryStore::new();
    let athlete_id = athlete(&store).await;
    let run_id = new_run(&store, athlete_id).await;

    let err = ingest_position(&store, run_id, sample(55.75, 37.61, T0))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Run is not in progress");

    start_run(&store, run_id).await.unwrap();
    stop_run(&store, run_id).await.unwrap();
    assert!(matches!(
        ingest_position(&store, run_id, sample(55.75, 37.61, T0)).await,
        Err(AppError::InvalidState(_))
    ));

    assert!(store.positions(run_id).await.is_empty());
}

#[tokio::test]
async fn test_out_of_order_samples() {
    let store = MemoryStore::new();
    let athlete_id = athlete(&store).await;
    let run_id = started_run(&store, athlete_id).await;

    // Received as first, third, second.
    ingest_position(&store, run_id, sample(55.7500, 37.6200, T0)).await.unwrap();
    ingest_position(
        &store,
        run_id,
        sample(55.7520, 37.6200, T0 + Duration::seconds(120)),
    )
    .await
    .unwrap();
    let middle = ingest_position(
        &store,
        run_id,
        sample(55.7510, 37.6200, T0 + Duration::seconds(60)),
    )
    .await
    .unwrap();

    let positions = store.positions(run_id).await;
    assert_eq!(positions.len(), 3);
    assert_eq!(positions[1].id, middle.id);

    let first_leg = geo_math::distance_m(positions[0].coordinate(), positions[1].coordinate());
    assert_eq!(middle.distance, geo_math::round2(first_leg / 1000.0));
    assert_eq!(middle.speed, geo_math::round2(first_leg / 60.0));

    let second_leg = geo_math::distance_m(positions[1].coordinate(), positions[2].coordinate());
    assert_eq!(
        positions[2].distance,
        geo_math::round2(middle.distance + second_leg / 1000.0)
    );
    assert_eq!(positions[2].speed, geo_math::round2(second_leg / 60.0));
    assert!(positions.windows(2).all(|w| w[0].distance <= w[1].distance));
}

#[tokio::test]
async fn test_tenth_run_awards_ten_runs_only() {
    let store = MemoryStore::new();
    let athlete_id = athlete(&store).await;
    finished_history(&store, athlete_id, 9, 0.1).await;

    let run_id = started_run(&store, athlete_id).await;
    ingest_position(&store, run_id, sample(0.0, 0.0, T0)).await.unwrap();
    ingest_position(&store, run_id, sample(0.0, 0.001, T0 + Duration::seconds(60)))
        .await
        .unwrap();
    stop_run(&store, run_id).await.unwrap();

    assert_eq!(store.challenge_names(athlete_id).await, vec!["Ten Runs"]);
}

#[tokio::test]
async fn test_distance_and_fast_run_awards() {
    let store = MemoryStore::new();
    let athlete_id = athlete(&store).await;
    finished_history(&store, athlete_id, 5, 10.0).await;

    let run_id = started_run(&store, athlete_id).await;
    ingest_position(&store, run_id, sample(55.75, 37.61, T0)).await.unwrap();
    ingest_position(&store, run_id, sample(55.76, 37.61, T0 + Duration::seconds(300)))
        .await
        .unwrap();
    stop_run(&store, run_id).await.unwrap();

    let mut names = store.challenge_names(athlete_id).await;
    names.sort();
    assert_eq!(names, vec!["2km in 10 Minutes", "Fifty Kilometers"]);
}

#[tokio::test]
async fn test_evaluation_is_idempotent() {
    let store = MemoryStore::new();
    let athlete_id = athlete(&store).await;
    finished_history(&store, athlete_id, 10, 6.0).await;

    let mut first = evaluate_challenges(&store, athlete_id).await.unwrap();
    first.sort();
    assert_eq!(first, vec!["Fifty Kilometers", "Ten Runs"]);

    let second = evaluate_challenges(&store, athlete_id).await.unwrap();
    assert!(second.is_empty());
    assert_eq!(store.challenge_names(athlete_id).await.len(), 2);
}

#[tokio::test]
async fn test_evaluate_unknown_athlete() {
    let store = MemoryStore::new();
    assert!(matches!(
        evaluate_challenges(&store, Uuid::new_v4()).await,
        Err(AppError::NotFound("Athlete"))
    ));
}

#[tokio::test]
async fn test_collectible_granted_once() {
    let store = MemoryStore::new();
    let athlete_id = athlete(&store).await;
    let coin = item("coin-1", 55.7512, 37.6184);
    let far = item("coin-2", 55.7612, 37.6184);
    store.insert_collectible(coin.clone()).await;
    store.insert_collectible(far.clone()).await;

    let run_id = started_run(&store, athlete_id).await;
    ingest_position(&store, run_id, sample(55.7512, 37.6184, T0)).await.unwrap();
    ingest_position(&store, run_id, sample(55.7513, 37.6184, T0 + Duration::seconds(5)))
        .await
        .unwrap();

    assert_eq!(store.collected_items(athlete_id).await, vec![coin.id]);
}

#[tokio::test]
async fn test_concurrent_submissions_stay_consistent() {
    let store = MemoryStore::new();
    let athlete_id = athlete(&store).await;
    let run_id = started_run(&store, athlete_id).await;

    let mut handles = Vec::new();
    for i in (0..20).rev() {
        let store = store.clone();
        handles.push(tokio::spawn(async move {
            let at = T0 + Duration::seconds(10 * i);
            ingest_position(&store, run_id, sample(55.75 + 0.0005 * i as f64, 37.61, at)).await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let positions = store.positions(run_id).await;
    assert_eq!(positions.len(), 20);
    assert_eq!(positions[0].distance, 0.0);
    for pair in positions.windows(2) {
        let delta_m = geo_math::distance_m(pair[0].coordinate(), pair[1].coordinate());
        assert_eq!(
            pair[1].distance,
            geo_math::round2(pair[0].distance + delta_m / 1000.0)
        );
        assert!(pair[0].distance <= pair[1].distance);
    }
}
