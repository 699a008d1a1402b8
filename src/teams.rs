use rand::seq::{IndexedRandom, SliceRandom};
use rand::Rng;
use schema::RosterEntity;
use std::collections::HashSet;

/// An ordered roster handed to the battle host.
pub type Team = Vec<RosterEntity>;

/// Draw up to `size` members from `pool` uniformly at random without replacement.
///
/// Pool indices are shuffled and the team is read off the front of the
/// permutation. An entity whose species is already on the team is passed
/// over, so a pool that repeats a species across teams never yields
/// duplicates. A pool smaller than `size` gives a smaller team.
///
/// Returns `None` only when the pool is empty.
pub fn generate_team<R: Rng + ?Sized>(
    size: usize,
    pool: &[RosterEntity],
    rng: &mut R,
) -> Option<Team> {
    if pool.is_empty() {
        return None;
    }

    let mut indices: Vec<usize> = (0..pool.len()).collect();
    indices.shuffle(rng);

    let mut seen = HashSet::new();
    let mut team = Team::with_capacity(size.min(pool.len()));
    for index in indices {
        if team.len() >= size {
            break;
        }
        let entity = &pool[index];
        if seen.insert(entity.species_id()) {
            team.push(entity.clone());
        }
    }
    Some(team)
}

/// Extend `existing` by one member whose species is not already present.
///
/// Returns the grown team, or `None` when every species in the pool is
/// already on the team. `existing` is never modified.
pub fn grow_team<R: Rng + ?Sized>(
    existing: &[RosterEntity],
    pool: &[RosterEntity],
    rng: &mut R,
) -> Option<Team> {
    let owned: HashSet<String> = existing.iter().map(RosterEntity::species_id).collect();
    let available: Vec<&RosterEntity> = pool
        .iter()
        .filter(|entity| !owned.contains(&entity.species_id()))
        .collect();

    let addition = available.choose(rng)?;
    let mut team = existing.to_vec();
    team.push((*addition).clone());
    Some(team)
}
