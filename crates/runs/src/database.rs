use async_trait::async_trait;
use geo::Rect;
use sqlx::{PgPool, Postgres, Transaction};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{
    errors::AppError,
    models::{
        AthleteInfo, Challenge, CollectibleItem, Position, Run, RunStatus, RunTotals,
        Subscription, User, UserRole, UserSummary, UserWithStats,
    },
    store::{RunStore, RunTransaction},
};

const RUN_COLUMNS: &str = "id, athlete_id, status, comment, distance, duration_seconds, \
                           average_speed, created_at";
const POSITION_COLUMNS: &str =
    "id, run_id, latitude, longitude, recorded_at, distance, speed, created_at";

#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    // Users

    pub async fn create_user(&self, user: &User) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO users (id, username, first_name, last_name, is_coach, date_joined)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(user.id)
        .bind(&user.username)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(user.is_coach)
        .bind(user.date_joined)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn get_user(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as(
            r#"
            SELECT id, username, first_name, last_name, is_coach, date_joined
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Users annotated with finished-run counts and mean coach rating.
    pub async fn list_users(
        &self,
        role: Option<UserRole>,
        search: Option<&str>,
    ) -> Result<Vec<UserWithStats>, AppError> {
        let users = sqlx::query_as(
            r#"
            SELECT u.id, u.username, u.first_name, u.last_name, u.is_coach, u.date_joined,
                   (SELECT COUNT(*) FROM runs r
                     WHERE r.athlete_id = u.id AND r.status = 'finished') AS runs_finished,
                   (SELECT AVG(s.rate)::DOUBLE PRECISION FROM subscriptions s
                     WHERE s.coach_id = u.id) AS rating
            FROM users u
            WHERE ($1::BOOLEAN IS NULL OR u.is_coach = $1)
              AND ($2::TEXT IS NULL
                   OR u.first_name ILIKE '%' || $2 || '%'
                   OR u.last_name ILIKE '%' || $2 || '%')
            ORDER BY u.date_joined
            "#,
        )
        .bind(role.map(UserRole::is_coach))
        .bind(search)
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }

    pub async fn get_user_with_stats(&self, id: Uuid) -> Result<Option<UserWithStats>, AppError> {
        let user = sqlx::query_as(
            r#"
            SELECT u.id, u.username, u.first_name, u.last_name, u.is_coach, u.date_joined,
                   (SELECT COUNT(*) FROM runs r
                     WHERE r.athlete_id = u.id AND r.status = 'finished') AS runs_finished,
                   (SELECT AVG(s.rate)::DOUBLE PRECISION FROM subscriptions s
                     WHERE s.coach_id = u.id) AS rating
            FROM users u
            WHERE u.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// The athlete's most recent coach.
    pub async fn coach_of(&self, athlete_id: Uuid) -> Result<Option<UserSummary>, AppError> {
        let coach = sqlx::query_as(
            r#"
            SELECT u.id, u.username, u.first_name, u.last_name
            FROM subscriptions s
            JOIN users u ON u.id = s.coach_id
            WHERE s.athlete_id = $1
            ORDER BY s.created_at DESC
            LIMIT 1
            "#,
        )
        .bind(athlete_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(coach)
    }

    pub async fn athletes_of(&self, coach_id: Uuid) -> Result<Vec<UserSummary>, AppError> {
        let athletes = sqlx::query_as(
            r#"
            SELECT u.id, u.username, u.first_name, u.last_name
            FROM subscriptions s
            JOIN users u ON u.id = s.athlete_id
            WHERE s.coach_id = $1
            ORDER BY s.created_at
            "#,
        )
        .bind(coach_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(athletes)
    }

    // Runs

    pub async fn create_run(&self, run: &Run) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO runs (id, athlete_id, status, comment, distance, duration_seconds,
                              average_speed, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(run.id)
        .bind(run.athlete_id)
        .bind(run.status)
        .bind(&run.comment)
        .bind(run.distance)
        .bind(run.duration_seconds)
        .bind(run.average_speed)
        .bind(run.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn get_run(&self, id: Uuid) -> Result<Option<Run>, AppError> {
        let run = sqlx::query_as(&format!("SELECT {RUN_COLUMNS} FROM runs WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(run)
    }

    pub async fn list_runs(
        &self,
        status: Option<RunStatus>,
        athlete_id: Option<Uuid>,
    ) -> Result<Vec<Run>, AppError> {
        let runs = sqlx::query_as(&format!(
            r#"
            SELECT {RUN_COLUMNS}
            FROM runs
            WHERE ($1::run_status IS NULL OR status = $1)
              AND ($2::UUID IS NULL OR athlete_id = $2)
            ORDER BY created_at
            "#
        ))
        .bind(status)
        .bind(athlete_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(runs)
    }

    pub async fn update_run_comment(
        &self,
        id: Uuid,
        comment: Option<&str>,
    ) -> Result<Option<Run>, AppError> {
        let run = sqlx::query_as(&format!(
            "UPDATE runs SET comment = $2 WHERE id = $1 RETURNING {RUN_COLUMNS}"
        ))
        .bind(id)
        .bind(comment)
        .fetch_optional(&self.pool)
        .await?;

        Ok(run)
    }

    pub async fn delete_run(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM runs WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn list_positions(&self, run_id: Uuid) -> Result<Vec<Position>, AppError> {
        let positions = sqlx::query_as(&format!(
            r#"
            SELECT {POSITION_COLUMNS}
            FROM positions
            WHERE run_id = $1
            ORDER BY recorded_at, created_at
            "#
        ))
        .bind(run_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(positions)
    }

    // Challenges

    pub async fn list_challenges(
        &self,
        athlete_id: Option<Uuid>,
    ) -> Result<Vec<Challenge>, AppError> {
        let challenges = sqlx::query_as(
            r#"
            SELECT id, athlete_id, name, created_at
            FROM challenges
            WHERE ($1::UUID IS NULL OR athlete_id = $1)
            ORDER BY created_at
            "#,
        )
        .bind(athlete_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(challenges)
    }

    /// Every award as (challenge name, athlete), ordered by name.
    pub async fn challenge_holders(&self) -> Result<Vec<(String, UserSummary)>, AppError> {
        let rows: Vec<(String, Uuid, String, String, String)> = sqlx::query_as(
            r#"
            SELECT c.name, u.id, u.username, u.first_name, u.last_name
            FROM challenges c
            JOIN users u ON u.id = c.athlete_id
            ORDER BY c.name, c.created_at
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(name, id, username, first_name, last_name)| {
                (
                    name,
                    UserSummary {
                        id,
                        username,
                        first_name,
                        last_name,
                    },
                )
            })
            .collect())
    }

    // Collectible items

    pub async fn list_collectibles(&self) -> Result<Vec<CollectibleItem>, AppError> {
        let items = sqlx::query_as(
            r#"
            SELECT id, name, uid, value, latitude, longitude, picture
            FROM collectible_items
            ORDER BY name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    pub async fn collected_items(&self, athlete_id: Uuid) -> Result<Vec<CollectibleItem>, AppError> {
        let items = sqlx::query_as(
            r#"
            SELECT i.id, i.name, i.uid, i.value, i.latitude, i.longitude, i.picture
            FROM collected_items c
            JOIN collectible_items i ON i.id = c.item_id
            WHERE c.athlete_id = $1
            ORDER BY c.collected_at
            "#,
        )
        .bind(athlete_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Inserts items or refreshes existing ones matched by `uid`, in one transaction.
    pub async fn upsert_collectibles(&self, items: &[CollectibleItem]) -> Result<u64, AppError> {
        let mut tx = self.pool.begin().await?;
        let mut written = 0;

        for item in items {
            let result = sqlx::query(
                r#"
                INSERT INTO collectible_items (id, name, uid, value, latitude, longitude, picture)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                ON CONFLICT (uid) DO UPDATE
                SET name = EXCLUDED.name,
                    value = EXCLUDED.value,
                    latitude = EXCLUDED.latitude,
                    longitude = EXCLUDED.longitude,
                    picture = EXCLUDED.picture
                "#,
            )
            .bind(item.id)
            .bind(&item.name)
            .bind(&item.uid)
            .bind(item.value)
            .bind(item.latitude)
            .bind(item.longitude)
            .bind(&item.picture)
            .execute(&mut *tx)
            .await?;
            written += result.rows_affected();
        }

        tx.commit().await?;
        Ok(written)
    }

    // Athlete info

    pub async fn get_or_create_athlete_info(&self, user_id: Uuid) -> Result<AthleteInfo, AppError> {
        sqlx::query(
            r#"
            INSERT INTO athlete_info (user_id)
            VALUES ($1)
            ON CONFLICT (user_id) DO NOTHING
            "#,
        )
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        let info = sqlx::query_as(
            "SELECT user_id, goals, weight FROM athlete_info WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(info)
    }

    pub async fn update_athlete_info(
        &self,
        user_id: Uuid,
        goals: Option<&str>,
        weight: Option<i32>,
    ) -> Result<AthleteInfo, AppError> {
        self.get_or_create_athlete_info(user_id).await?;

        let info = sqlx::query_as(
            r#"
            UPDATE athlete_info
            SET goals = COALESCE($2, goals),
                weight = COALESCE($3, weight)
            WHERE user_id = $1
            RETURNING user_id, goals, weight
            "#,
        )
        .bind(user_id)
        .bind(goals)
        .bind(weight)
        .fetch_one(&self.pool)
        .await?;

        Ok(info)
    }

    // Subscriptions

    /// Returns true if the subscription was newly created.
    pub async fn subscribe(&self, coach_id: Uuid, athlete_id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            INSERT INTO subscriptions (coach_id, athlete_id, created_at)
            VALUES ($1, $2, NOW())
            ON CONFLICT (coach_id, athlete_id) DO NOTHING
            "#,
        )
        .bind(coach_id)
        .bind(athlete_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    pub async fn rate_coach(
        &self,
        coach_id: Uuid,
        athlete_id: Uuid,
        rate: i32,
    ) -> Result<Option<Subscription>, AppError> {
        let subscription = sqlx::query_as(
            r#"
            UPDATE subscriptions
            SET rate = $3
            WHERE coach_id = $1 AND athlete_id = $2
            RETURNING coach_id, athlete_id, rate, created_at
            "#,
        )
        .bind(coach_id)
        .bind(athlete_id)
        .bind(rate)
        .fetch_optional(&self.pool)
        .await?;

        Ok(subscription)
    }
}

/// A PostgreSQL transaction. Rolls back when dropped uncommitted.
pub struct PgRunTransaction {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl RunStore for Database {
    type Tx = PgRunTransaction;

    async fn begin(&self) -> Result<PgRunTransaction, AppError> {
        Ok(PgRunTransaction {
            tx: self.pool.begin().await?,
        })
    }
}

#[async_trait]
impl RunTransaction for PgRunTransaction {
    async fn lock_run(&mut self, run_id: Uuid) -> Result<Option<Run>, AppError> {
        let run = sqlx::query_as(&format!(
            "SELECT {RUN_COLUMNS} FROM runs WHERE id = $1 FOR UPDATE"
        ))
        .bind(run_id)
        .fetch_optional(&mut *self.tx)
        .await?;

        Ok(run)
    }

    async fn lock_athlete(&mut self, athlete_id: Uuid) -> Result<(), AppError> {
        sqlx::query("SELECT id FROM users WHERE id = $1 FOR UPDATE")
            .bind(athlete_id)
            .fetch_optional(&mut *self.tx)
            .await?
            .map(|_| ())
            .ok_or(AppError::NotFound("Athlete"))
    }

    async fn update_run(&mut self, run: &Run) -> Result<(), AppError> {
        sqlx::query(
            r#"
            UPDATE runs
            SET status = $2, comment = $3, distance = $4, duration_seconds = $5,
                average_speed = $6
            WHERE id = $1
            "#,
        )
        .bind(run.id)
        .bind(run.status)
        .bind(&run.comment)
        .bind(run.distance)
        .bind(run.duration_seconds)
        .bind(run.average_speed)
        .execute(&mut *self.tx)
        .await?;

        Ok(())
    }

    async fn positions(&mut self, run_id: Uuid) -> Result<Vec<Position>, AppError> {
        let positions = sqlx::query_as(&format!(
            r#"
            SELECT {POSITION_COLUMNS}
            FROM positions
            WHERE run_id = $1
            ORDER BY recorded_at, created_at
            "#
        ))
        .bind(run_id)
        .fetch_all(&mut *self.tx)
        .await?;

        Ok(positions)
    }

    async fn position_at_or_before(
        &mut self,
        run_id: Uuid,
        at: OffsetDateTime,
    ) -> Result<Option<Position>, AppError> {
        let position = sqlx::query_as(&format!(
            r#"
            SELECT {POSITION_COLUMNS}
            FROM positions
            WHERE run_id = $1 AND recorded_at <= $2
            ORDER BY recorded_at DESC, created_at DESC
            LIMIT 1
            "#
        ))
        .bind(run_id)
        .bind(at)
        .fetch_optional(&mut *self.tx)
        .await?;

        Ok(position)
    }

    async fn positions_after(
        &mut self,
        run_id: Uuid,
        at: OffsetDateTime,
    ) -> Result<Vec<Position>, AppError> {
        let positions = sqlx::query_as(&format!(
            r#"
            SELECT {POSITION_COLUMNS}
            FROM positions
            WHERE run_id = $1 AND recorded_at > $2
            ORDER BY recorded_at, created_at
            "#
        ))
        .bind(run_id)
        .bind(at)
        .fetch_all(&mut *self.tx)
        .await?;

        Ok(positions)
    }

    async fn insert_position(&mut self, position: &Position) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO positions (id, run_id, latitude, longitude, recorded_at, distance,
                                   speed, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(position.id)
        .bind(position.run_id)
        .bind(position.latitude)
        .bind(position.longitude)
        .bind(position.recorded_at)
        .bind(position.distance)
        .bind(position.speed)
        .bind(position.created_at)
        .execute(&mut *self.tx)
        .await?;

        Ok(())
    }

    async fn update_position_metrics(&mut self, position: &Position) -> Result<(), AppError> {
        sqlx::query("UPDATE positions SET distance = $2, speed = $3 WHERE id = $1")
            .bind(position.id)
            .bind(position.distance)
            .bind(position.speed)
            .execute(&mut *self.tx)
            .await?;

        Ok(())
    }

    async fn finished_totals(&mut self, athlete_id: Uuid) -> Result<RunTotals, AppError> {
        let totals = sqlx::query_as(
            r#"
            SELECT COUNT(*) AS count, COALESCE(SUM(distance), 0)::DOUBLE PRECISION AS distance
            FROM runs
            WHERE athlete_id = $1 AND status = 'finished'
            "#,
        )
        .bind(athlete_id)
        .fetch_one(&mut *self.tx)
        .await?;

        Ok(totals)
    }

    async fn latest_finished_run(&mut self, athlete_id: Uuid) -> Result<Option<Run>, AppError> {
        let run = sqlx::query_as(&format!(
            r#"
            SELECT {RUN_COLUMNS}
            FROM runs
            WHERE athlete_id = $1 AND status = 'finished'
            ORDER BY created_at DESC
            LIMIT 1
            "#
        ))
        .bind(athlete_id)
        .fetch_optional(&mut *self.tx)
        .await?;

        Ok(run)
    }

    async fn get_or_create_challenge(
        &mut self,
        athlete_id: Uuid,
        name: &str,
    ) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            INSERT INTO challenges (id, athlete_id, name, created_at)
            VALUES ($1, $2, $3, NOW())
            ON CONFLICT (athlete_id, name) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(athlete_id)
        .bind(name)
        .execute(&mut *self.tx)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn collectibles_within(
        &mut self,
        bounds: Rect<f64>,
    ) -> Result<Vec<CollectibleItem>, AppError> {
        let items = sqlx::query_as(
            r#"
            SELECT id, name, uid, value, latitude, longitude, picture
            FROM collectible_items
            WHERE latitude BETWEEN $1 AND $2
              AND longitude BETWEEN $3 AND $4
            "#,
        )
        .bind(bounds.min().y)
        .bind(bounds.max().y)
        .bind(bounds.min().x)
        .bind(bounds.max().x)
        .fetch_all(&mut *self.tx)
        .await?;

        Ok(items)
    }

    async fn grant_collectibles(
        &mut self,
        athlete_id: Uuid,
        item_ids: &[Uuid],
    ) -> Result<Vec<Uuid>, AppError> {
        if item_ids.is_empty() {
            return Ok(Vec::new());
        }

        let granted = sqlx::query_scalar(
            r#"
            INSERT INTO collected_items (athlete_id, item_id, collected_at)
            SELECT $1, item_id, NOW() FROM UNNEST($2::UUID[]) AS t(item_id)
            ON CONFLICT (athlete_id, item_id) DO NOTHING
            RETURNING item_id
            "#,
        )
        .bind(athlete_id)
        .bind(item_ids)
        .fetch_all(&mut *self.tx)
        .await?;

        Ok(granted)
    }

    async fn commit(self) -> Result<(), AppError> {
        self.tx.commit().await?;
        Ok(())
    }
}
