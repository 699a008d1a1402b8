use crate::errors::{TowerError, TowerResult};
use crate::pools::PoolKind;
use crate::teams::{generate_team, grow_team, Team};
use rand::Rng;
use schema::RosterEntity;

// Defaults for team growth
pub const MAX_TEAM_SIZE: usize = 6;
pub const GROWTH_INTERVAL: u32 = 5;

/// How a player's team was obtained for the next battle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TeamOrigin {
    /// Fresh single-member team (new run or streak back at zero)
    Generated,
    /// Existing team plus one new member
    Grown,
    /// Existing team, already the required size
    Reused,
    /// Existing team that was due to grow but had no new species to draw
    Exhausted,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TeamResolution {
    pub team: Team,
    pub origin: TeamOrigin,
}

/// Derives team sizes from a win streak.
///
/// Sizes start at one and gain a member every `growth_interval` wins, up to
/// `max_team_size`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GrowthPolicy {
    pub max_team_size: usize,
    pub growth_interval: u32,
}

impl Default for GrowthPolicy {
    fn default() -> Self {
        Self {
            max_team_size: MAX_TEAM_SIZE,
            growth_interval: GROWTH_INTERVAL,
        }
    }
}

impl GrowthPolicy {
    pub fn new(max_team_size: usize, growth_interval: u32) -> Self {
        Self {
            max_team_size: max_team_size.max(1),
            growth_interval: growth_interval.max(1),
        }
    }

    /// Team size required at `streak`: `min(max, floor(streak / interval) + 1)`.
    pub fn required_size(&self, streak: u32) -> usize {
        let brackets = (streak / self.growth_interval.max(1)) as usize;
        brackets.saturating_add(1).min(self.max_team_size.max(1))
    }

    /// Decide the player's team for their next battle.
    ///
    /// No team or a zero streak starts over with one member. Otherwise the team
    /// grows by at most one member per call, even if several brackets were
    /// skipped.
    pub fn resolve_team<R: Rng + ?Sized>(
        &self,
        existing: Option<&[RosterEntity]>,
        streak: u32,
        pool: &[RosterEntity],
        rng: &mut R,
    ) -> TowerResult<TeamResolution> {
        let existing = match existing {
            Some(team) if streak > 0 && !team.is_empty() => team,
            _ => {
                let team = generate_team(1, pool, rng)
                    .ok_or(TowerError::PoolUnavailable(PoolKind::Rental))?;
                return Ok(TeamResolution {
                    team,
                    origin: TeamOrigin::Generated,
                });
            }
        };

        if self.required_size(streak) <= existing.len() {
            return Ok(TeamResolution {
                team: existing.to_vec(),
                origin: TeamOrigin::Reused,
            });
        }

        match self.grow(existing, pool, rng) {
            Ok(team) => Ok(TeamResolution {
                team,
                origin: TeamOrigin::Grown,
            }),
            Err(TowerError::GrowthExhausted) => Ok(TeamResolution {
                team: existing.to_vec(),
                origin: TeamOrigin::Exhausted,
            }),
            Err(err) => Err(err),
        }
    }

    /// Add one new species to `existing`.
    pub fn grow<R: Rng + ?Sized>(
        &self,
        existing: &[RosterEntity],
        pool: &[RosterEntity],
        rng: &mut R,
    ) -> TowerResult<Team> {
        grow_team(existing, pool, rng).ok_or(TowerError::GrowthExhausted)
    }

    /// A fresh opponent roster sized to the player's streak.
    pub fn opponent_team<R: Rng + ?Sized>(
        &self,
        streak: u32,
        pool: &[RosterEntity],
        rng: &mut R,
    ) -> TowerResult<Team> {
        generate_team(self.required_size(streak), pool, rng)
            .ok_or(TowerError::PoolUnavailable(PoolKind::Opponent))
    }
}

/// Team size at `streak` under the default policy.
pub fn required_team_size(streak: u32) -> usize {
    GrowthPolicy::default().required_size(streak)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::common::{entity, species_pool};
    use pretty_assertions::assert_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use rstest::rstest;

    fn big_pool() -> Vec<RosterEntity> {
        species_pool(&[
            "Pikachu", "Eevee", "Snorlax", "Lapras", "Gengar", "Dragonite", "Alakazam", "Machamp",
        ])
    }

    #[rstest]
    #[case(0, 1)]
    #[case(4, 1)]
    #[case(5, 2)]
    #[case(9, 2)]
    #[case(10, 3)]
    #[case(25, 6)]
    #[case(1000, 6)]
    #[case(u32::MAX, 6)]
    fn test_required_size_thresholds(#[case] streak: u32, #[case] expected: usize) {
        assert_eq!(required_team_size(streak), expected);
    }

    #[test]
    fn test_required_size_is_monotonic_and_bounded() {
        let mut previous = required_team_size(0);
        for streak in 0..200 {
            let size = required_team_size(streak);
            assert!((1..=6).contains(&size));
            assert!(size >= previous);
            assert_eq!(size, std::cmp::min(6, (streak / 5) as usize + 1));
            previous = size;
        }
    }

    #[rstest]
    #[case(1, 1)]
    #[case(2, 2)]
    #[case(5, 3)]
    #[case(100, 3)]
    fn test_custom_policy_sizes(#[case] streak: u32, #[case] expected: usize) {
        assert_eq!(GrowthPolicy::new(3, 2).required_size(streak), expected);
    }

    #[test]
    fn test_zero_interval_is_clamped() {
        let policy = GrowthPolicy::new(6, 0);
        assert_eq!(policy.growth_interval, 1);
        assert_eq!(policy.required_size(3), 4);
    }

    #[test]
    fn test_new_run_generates_single_member() {
        let mut rng = StdRng::seed_from_u64(1);
        let policy = GrowthPolicy::default();
        let resolution = policy.resolve_team(None, 12, &big_pool(), &mut rng).unwrap();
        assert_eq!(resolution.origin, TeamOrigin::Generated);
        assert_eq!(resolution.team.len(), 1);
    }

    #[test]
    fn test_zero_streak_discards_stale_team() {
        let mut rng = StdRng::seed_from_u64(1);
        let stale = species_pool(&["Pikachu", "Eevee", "Snorlax"]);
        let resolution = GrowthPolicy::default()
            .resolve_team(Some(&stale), 0, &big_pool(), &mut rng)
            .unwrap();
        assert_eq!(resolution.origin, TeamOrigin::Generated);
        assert_eq!(resolution.team.len(), 1);
    }

    #[test]
    fn test_team_at_required_size_is_reused() {
        let mut rng = StdRng::seed_from_u64(1);
        let team = vec![entity("Pikachu")];
        let resolution = GrowthPolicy::default()
            .resolve_team(Some(&team), 4, &big_pool(), &mut rng)
            .unwrap();
        assert_eq!(resolution.origin, TeamOrigin::Reused);
        assert_eq!(resolution.team, team);
    }

    #[test]
    fn test_crossing_threshold_grows_by_one() {
        let mut rng = StdRng::seed_from_u64(1);
        let team = vec![entity("Pikachu")];
        let resolution = GrowthPolicy::default()
            .resolve_team(Some(&team), 5, &big_pool(), &mut rng)
            .unwrap();
        assert_eq!(resolution.origin, TeamOrigin::Grown);
        assert_eq!(resolution.team.len(), 2);
        assert_eq!(resolution.team[0], team[0]);
    }

    #[test]
    fn test_skipped_brackets_still_grow_by_one() {
        let mut rng = StdRng::seed_from_u64(1);
        let team = vec![entity("Pikachu")];
        let resolution = GrowthPolicy::default()
            .resolve_team(Some(&team), 20, &big_pool(), &mut rng)
            .unwrap();
        assert_eq!(resolution.team.len(), 2);
    }

    #[test]
    fn test_exhausted_growth_keeps_team() {
        let mut rng = StdRng::seed_from_u64(1);
        let team = species_pool(&["Pikachu", "Eevee"]);
        let resolution = GrowthPolicy::default()
            .resolve_team(Some(&team), 10, &team, &mut rng)
            .unwrap();
        assert_eq!(resolution.origin, TeamOrigin::Exhausted);
        assert_eq!(resolution.team, team);
    }

    #[test]
    fn test_empty_rental_pool_is_unavailable() {
        let mut rng = StdRng::seed_from_u64(1);
        let result = GrowthPolicy::default().resolve_team(None, 0, &[], &mut rng);
        assert!(matches!(
            result,
            Err(TowerError::PoolUnavailable(PoolKind::Rental))
        ));
    }

    #[test]
    fn test_grow_reports_exhaustion() {
        let mut rng = StdRng::seed_from_u64(1);
        let team = vec![entity("Mew")];
        assert!(matches!(
            GrowthPolicy::default().grow(&team, &team, &mut rng),
            Err(TowerError::GrowthExhausted)
        ));
    }

    #[rstest]
    #[case(0, 1)]
    #[case(5, 2)]
    #[case(14, 3)]
    #[case(29, 6)]
    #[case(60, 6)]
    fn test_opponent_team_scales_with_streak(#[case] streak: u32, #[case] expected: usize) {
        let mut rng = StdRng::seed_from_u64(streak as u64);
        let team = GrowthPolicy::default()
            .opponent_team(streak, &big_pool(), &mut rng)
            .unwrap();
        assert_eq!(team.len(), expected);
    }

    #[test]
    fn test_opponent_team_from_empty_pool_is_unavailable() {
        let mut rng = StdRng::seed_from_u64(1);
        assert!(matches!(
            GrowthPolicy::default().opponent_team(3, &[], &mut rng),
            Err(TowerError::PoolUnavailable(PoolKind::Opponent))
        ));
    }
}
