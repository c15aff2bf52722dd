//! Badge catalogue and user award queries

use chrono::{DateTime, Utc};
use serde::Serialize;
use shared::Badge;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::services::badge_award::{AwardOutcome, BadgeCoordinator};

/// Badge service
#[derive(Clone)]
pub struct BadgeService {
    db: PgPool,
}

/// A badge together with when the user earned it
#[derive(Debug, Serialize)]
pub struct EarnedBadge {
    pub earned_at: DateTime<Utc>,
    pub badge: Badge,
}

#[derive(Debug, Serialize)]
pub struct BadgeCount {
    pub count: i64,
}

type BadgeTuple = (Uuid, String, String, Option<String>);
type EarnedTuple = (DateTime<Utc>, Uuid, String, String, Option<String>);

fn badge_from_row((id, name, description, icon): BadgeTuple) -> Badge {
    Badge {
        id,
        name,
        description,
        icon,
    }
}

fn earned_from_row((earned_at, id, name, description, icon): EarnedTuple) -> EarnedBadge {
    EarnedBadge {
        earned_at,
        badge: badge_from_row((id, name, description, icon)),
    }
}

impl BadgeService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// All configured badges
    pub async fn list_badges(&self) -> AppResult<Vec<Badge>> {
        let rows = sqlx::query_as::<_, BadgeTuple>(
            "SELECT id, name, description, icon FROM badges ORDER BY name",
        )
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(badge_from_row).collect())
    }

    /// Badges earned by a user, most recent first
    pub async fn user_badges(&self, user_id: Uuid) -> AppResult<Vec<EarnedBadge>> {
        let rows = sqlx::query_as::<_, EarnedTuple>(
            r#"
            SELECT ub.earned_at, b.id, b.name, b.description, b.icon
            FROM user_badges ub
            JOIN badges b ON b.id = ub.badge_id
            WHERE ub.user_id = $1
            ORDER BY ub.earned_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(earned_from_row).collect())
    }

    pub async fn count_user_badges(&self, user_id: Uuid) -> AppResult<BadgeCount> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM user_badges WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(&self.db)
            .await?;

        Ok(BadgeCount { count })
    }

    /// Award a badge unconditionally, returning the existing award if held
    pub async fn award_test(&self, user_id: Uuid, badge_name: &str) -> AppResult<EarnedBadge> {
        let coordinator = BadgeCoordinator::new(self.db.clone());

        match coordinator.award_if_qualified(user_id, badge_name, true).await? {
            AwardOutcome::BadgeNotConfigured => {
                return Err(AppError::NotFound(format!("Badge '{}'", badge_name)))
            }
            AwardOutcome::NewlyAwarded(_) | AwardOutcome::AlreadyAwarded | AwardOutcome::NotQualified => {}
        }

        let row = sqlx::query_as::<_, EarnedTuple>(
            r#"
            SELECT ub.earned_at, b.id, b.name, b.description, b.icon
            FROM user_badges ub
            JOIN badges b ON b.id = ub.badge_id
            WHERE ub.user_id = $1 AND b.name = $2
            "#,
        )
        .bind(user_id)
        .bind(badge_name)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::Internal("award row missing after award".to_string()))?;

        Ok(earned_from_row(row))
    }
}
