//! Badge award coordinator
//!
//! Every badge trigger in the backend goes through [`BadgeCoordinator`]. At
//! most one award row exists per (user, badge): the existence check skips the
//! common repeat case and the `user_badges` primary key settles races.

use std::sync::Arc;

use shared::{Badge, Milestone, UserBadge};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::AppResult;

/// Storage operations the coordinator needs
#[axum::async_trait]
pub trait BadgeStore: Send + Sync {
    async fn find_badge_by_name(&self, name: &str) -> AppResult<Option<Badge>>;

    async fn award_exists(&self, user_id: Uuid, badge_id: Uuid) -> AppResult<bool>;

    /// Insert an award row. Returns `None` when the pair already exists.
    async fn insert_award(&self, user_id: Uuid, badge_id: Uuid) -> AppResult<Option<UserBadge>>;
}

/// Result of one award attempt
#[derive(Debug, Clone, PartialEq)]
pub enum AwardOutcome {
    NewlyAwarded(UserBadge),
    AlreadyAwarded,
    NotQualified,
    BadgeNotConfigured,
}

/// Receives award events for logging
pub trait AwardReporter: Send + Sync {
    fn outcome(&self, user_id: Uuid, badge_name: &str, outcome: &AwardOutcome);

    fn failure(&self, user_id: Uuid, badge_name: &str, error: &crate::error::AppError);
}

/// Reports award events as tracing events
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReporter;

impl AwardReporter for TracingReporter {
    fn outcome(&self, user_id: Uuid, badge_name: &str, outcome: &AwardOutcome) {
        match outcome {
            AwardOutcome::NewlyAwarded(_) => {
                tracing::info!(user_id = %user_id, badge = badge_name, "Badge awarded")
            }
            AwardOutcome::AlreadyAwarded => {
                tracing::debug!(user_id = %user_id, badge = badge_name, "Badge already awarded")
            }
            AwardOutcome::NotQualified => {
                tracing::debug!(user_id = %user_id, badge = badge_name, "Badge not qualified")
            }
            AwardOutcome::BadgeNotConfigured => {
                tracing::warn!(badge = badge_name, "Badge is not configured")
            }
        }
    }

    fn failure(&self, user_id: Uuid, badge_name: &str, error: &crate::error::AppError) {
        tracing::error!(user_id = %user_id, badge = badge_name, "Badge award failed: {}", error);
    }
}

/// Postgres-backed badge store
#[derive(Clone)]
pub struct PgBadgeStore {
    db: PgPool,
}

impl PgBadgeStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[axum::async_trait]
impl BadgeStore for PgBadgeStore {
    async fn find_badge_by_name(&self, name: &str) -> AppResult<Option<Badge>> {
        let row = sqlx::query_as::<_, (Uuid, String, String, Option<String>)>(
            "SELECT id, name, description, icon FROM badges WHERE name = $1",
        )
        .bind(name)
        .fetch_optional(&self.db)
        .await?;

        Ok(row.map(|(id, name, description, icon)| Badge {
            id,
            name,
            description,
            icon,
        }))
    }

    async fn award_exists(&self, user_id: Uuid, badge_id: Uuid) -> AppResult<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM user_badges WHERE user_id = $1 AND badge_id = $2)",
        )
        .bind(user_id)
        .bind(badge_id)
        .fetch_one(&self.db)
        .await?;

        Ok(exists)
    }

    async fn insert_award(&self, user_id: Uuid, badge_id: Uuid) -> AppResult<Option<UserBadge>> {
        let inserted = sqlx::query_as::<_, AwardRow>(
            r#"
            INSERT INTO user_badges (user_id, badge_id)
            VALUES ($1, $2)
            ON CONFLICT (user_id, badge_id) DO NOTHING
            RETURNING user_id, badge_id, earned_at
            "#,
        )
        .bind(user_id)
        .bind(badge_id)
        .fetch_optional(&self.db)
        .await;

        award_from_insert(inserted)
    }
}

type AwardRow = (Uuid, Uuid, chrono::DateTime<chrono::Utc>);

/// Map an award insert result. No returned row and a unique violation both
/// mean another writer already holds the award.
fn award_from_insert(inserted: Result<Option<AwardRow>, sqlx::Error>) -> AppResult<Option<UserBadge>> {
    match inserted {
        Ok(row) => Ok(row.map(|(user_id, badge_id, earned_at)| UserBadge {
            user_id,
            badge_id,
            earned_at,
        })),
        Err(sqlx::Error::Database(e)) if e.is_unique_violation() => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Idempotent badge award policy
#[derive(Clone)]
pub struct BadgeCoordinator {
    store: Arc<dyn BadgeStore>,
    reporter: Arc<dyn AwardReporter>,
}

impl BadgeCoordinator {
    /// Coordinator over the Postgres store with tracing reports
    pub fn new(db: PgPool) -> Self {
        Self::with_parts(Arc::new(PgBadgeStore::new(db)), Arc::new(TracingReporter))
    }

    pub fn with_parts(store: Arc<dyn BadgeStore>, reporter: Arc<dyn AwardReporter>) -> Self {
        Self { store, reporter }
    }

    /// Award `badge_name` to the user if they qualify and do not hold it yet
    pub async fn award_if_qualified(
        &self,
        user_id: Uuid,
        badge_name: &str,
        qualifies: bool,
    ) -> AppResult<AwardOutcome> {
        let outcome = self.decide(user_id, badge_name, qualifies).await?;
        self.reporter.outcome(user_id, badge_name, &outcome);
        Ok(outcome)
    }

    async fn decide(
        &self,
        user_id: Uuid,
        badge_name: &str,
        qualifies: bool,
    ) -> AppResult<AwardOutcome> {
        let Some(badge) = self.store.find_badge_by_name(badge_name).await? else {
            return Ok(AwardOutcome::BadgeNotConfigured);
        };

        if self.store.award_exists(user_id, badge.id).await? {
            return Ok(AwardOutcome::AlreadyAwarded);
        }

        if !qualifies {
            return Ok(AwardOutcome::NotQualified);
        }

        match self.store.insert_award(user_id, badge.id).await? {
            Some(award) => Ok(AwardOutcome::NewlyAwarded(award)),
            // Lost a race with a concurrent request for the same pair
            None => Ok(AwardOutcome::AlreadyAwarded),
        }
    }

    /// Feed a milestone to every badge it can qualify for.
    ///
    /// Failures are reported and swallowed so the triggering request never
    /// fails because of a badge.
    pub async fn record_milestone(&self, user_id: Uuid, milestone: Milestone) -> Vec<AwardOutcome> {
        let mut outcomes = Vec::new();

        for (kind, qualifies) in milestone.candidates() {
            match self.award_if_qualified(user_id, kind.name(), qualifies).await {
                Ok(outcome) => outcomes.push(outcome),
                Err(e) => self.reporter.failure(user_id, kind.name(), &e),
            }
        }

        outcomes
    }
}
