//! Badge rule integration tests
//!
//! Which milestones qualify a user for which badge, and the badge names the
//! seeded catalogue must carry.

use proptest::prelude::*;
use shared::{BadgeKind, Milestone, FARM_TYCOON_MIN_FARMS};

/// Names seeded by the badges migration
const SEEDED_BADGES: [&str; 5] = [
    "First Farm",
    "Farm Tycoon",
    "Soil Analyst",
    "Community Member",
    "Climate Watcher",
];

fn qualifies(milestone: Milestone, kind: BadgeKind) -> Option<bool> {
    milestone
        .candidates()
        .into_iter()
        .find(|(candidate, _)| *candidate == kind)
        .map(|(_, qualified)| qualified)
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn test_every_kind_maps_to_a_seeded_badge() {
        for kind in BadgeKind::ALL {
            assert!(SEEDED_BADGES.contains(&kind.name()), "{} is not seeded", kind);
        }
        for name in SEEDED_BADGES {
            assert!(BadgeKind::from_name(name).is_some());
        }
    }

    #[test]
    fn test_first_soil_report_earns_soil_analyst() {
        let milestone = Milestone::SoilReportCreated { report_count: 1 };
        assert_eq!(qualifies(milestone, BadgeKind::SoilAnalyst), Some(true));

        let later = Milestone::SoilReportCreated { report_count: 2 };
        assert_eq!(qualifies(later, BadgeKind::SoilAnalyst), Some(false));
    }

    #[test]
    fn test_first_thread_earns_community_member() {
        let milestone = Milestone::ForumThreadCreated { thread_count: 1 };
        assert_eq!(qualifies(milestone, BadgeKind::CommunityMember), Some(true));
        assert_eq!(qualifies(milestone, BadgeKind::FirstFarm), None);
    }

    #[test]
    fn test_fifth_farm_earns_tycoon_not_first_farm() {
        let milestone = Milestone::FarmCreated { farm_count: FARM_TYCOON_MIN_FARMS };
        assert_eq!(qualifies(milestone, BadgeKind::FarmTycoon), Some(true));
        assert_eq!(qualifies(milestone, BadgeKind::FirstFarm), Some(false));
    }

    #[test]
    fn test_badge_names_are_case_sensitive() {
        assert_eq!(BadgeKind::from_name("first farm"), None);
        assert_eq!(BadgeKind::from_name("First Farm"), Some(BadgeKind::FirstFarm));
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// First Farm is only ever earned by the first farm
        #[test]
        fn prop_first_farm_only_at_count_one(farm_count in 1i64..50) {
            let milestone = Milestone::FarmCreated { farm_count };
            prop_assert_eq!(qualifies(milestone, BadgeKind::FirstFarm), Some(farm_count == 1));
        }

        /// Farm Tycoon qualifies from the threshold onwards
        #[test]
        fn prop_farm_tycoon_threshold(farm_count in 1i64..50) {
            let milestone = Milestone::FarmCreated { farm_count };
            prop_assert_eq!(
                qualifies(milestone, BadgeKind::FarmTycoon),
                Some(farm_count >= FARM_TYCOON_MIN_FARMS)
            );
        }

        /// A farm milestone never qualifies for both farm badges at once
        #[test]
        fn prop_farm_badges_exclusive(farm_count in 1i64..50) {
            let qualified = Milestone::FarmCreated { farm_count }
                .candidates()
                .into_iter()
                .filter(|(_, q)| *q)
                .count();
            prop_assert!(qualified <= 1);
        }

        /// Milestones only ever name known badges
        #[test]
        fn prop_candidates_are_known_badges(count in 1i64..20, which in 0usize..4) {
            let milestone = match which {
                0 => Milestone::FarmCreated { farm_count: count },
                1 => Milestone::SoilReportCreated { report_count: count },
                2 => Milestone::ForumThreadCreated { thread_count: count },
                _ => Milestone::PestAlertViewed,
            };
            for (kind, _) in milestone.candidates() {
                prop_assert_eq!(BadgeKind::from_name(kind.name()), Some(kind));
            }
        }
    }
}
