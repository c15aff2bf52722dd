//! Gamification badges and the milestones that qualify for them

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Badge definition, seeded by migration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Badge {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub icon: Option<String>,
}

/// A badge earned by a user
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserBadge {
    pub user_id: Uuid,
    pub badge_id: Uuid,
    pub earned_at: DateTime<Utc>,
}

/// Badges the platform knows how to award
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BadgeKind {
    FirstFarm,
    FarmTycoon,
    SoilAnalyst,
    CommunityMember,
    ClimateWatcher,
}

impl BadgeKind {
    pub const ALL: [BadgeKind; 5] = [
        BadgeKind::FirstFarm,
        BadgeKind::FarmTycoon,
        BadgeKind::SoilAnalyst,
        BadgeKind::CommunityMember,
        BadgeKind::ClimateWatcher,
    ];

    /// Name of the badge row this kind maps to
    pub fn name(&self) -> &'static str {
        match self {
            BadgeKind::FirstFarm => "First Farm",
            BadgeKind::FarmTycoon => "Farm Tycoon",
            BadgeKind::SoilAnalyst => "Soil Analyst",
            BadgeKind::CommunityMember => "Community Member",
            BadgeKind::ClimateWatcher => "Climate Watcher",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }
}

impl std::fmt::Display for BadgeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Number of farms that earns Farm Tycoon
pub const FARM_TYCOON_MIN_FARMS: i64 = 5;

/// A domain event that may qualify a user for one or more badges.
///
/// Counts are taken right after the triggering write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Milestone {
    FarmCreated { farm_count: i64 },
    SoilReportCreated { report_count: i64 },
    ForumThreadCreated { thread_count: i64 },
    PestAlertViewed,
}

impl Milestone {
    /// Badges this milestone feeds, each with its qualification flag
    pub fn candidates(&self) -> Vec<(BadgeKind, bool)> {
        match *self {
            Milestone::FarmCreated { farm_count } => vec![
                (BadgeKind::FirstFarm, farm_count == 1),
                (BadgeKind::FarmTycoon, farm_count >= FARM_TYCOON_MIN_FARMS),
            ],
            Milestone::SoilReportCreated { report_count } => {
                vec![(BadgeKind::SoilAnalyst, report_count == 1)]
            }
            Milestone::ForumThreadCreated { thread_count } => {
                vec![(BadgeKind::CommunityMember, thread_count == 1)]
            }
            Milestone::PestAlertViewed => vec![(BadgeKind::ClimateWatcher, true)],
        }
    }
}
