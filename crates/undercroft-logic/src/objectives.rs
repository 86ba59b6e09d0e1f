//! Key and exit placement.
//!
//! The key goes into the most remote kind of room available, and the exit
//! goes into whichever "better" room lies farthest from it. This is a
//! greedy choice, not a global optimum: the exit is farthest from the key,
//! not the pair farthest from each other.

use crate::constants::{chances, objectives};
use crate::space::{Classification, Point3, Space};
use rand::seq::SliceRandom;
use rand::Rng;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlacementError {
    #[error("need at least two rooms besides the spawn room for key and exit, found {found}")]
    NotEnoughRooms { found: usize },
}

/// Where the key and exit ended up.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Objectives {
    pub key_room: usize,
    pub exit_room: usize,
    pub key_position: Point3,
    pub exit_position: Point3,
}

impl Objectives {
    fn in_rooms(rooms: &[Space], key_room: usize, exit_room: usize) -> Self {
        let key_center = rooms[key_room].center();
        Self {
            key_room,
            exit_room,
            key_position: Point3::new(
                key_center.x,
                key_center.y + objectives::KEY_HEIGHT,
                key_center.z,
            ),
            exit_position: rooms[exit_room].center(),
        }
    }
}

fn indices_of(rooms: &[Space], classification: Classification) -> Vec<usize> {
    rooms
        .iter()
        .enumerate()
        .filter(|(_, r)| r.classification() == classification)
        .map(|(i, _)| i)
        .collect()
}

/// The room farthest from `rooms[key_room]`.
///
/// Only cardinal-plus, cardinal and radial rooms are considered unless none
/// of them remain, in which case every other room is. Distance ties go to
/// the higher [`exit_preference`](Classification::exit_preference), then to
/// the lower index.
pub fn find_farthest_room(rooms: &[Space], key_room: usize) -> Option<usize> {
    let key = rooms.get(key_room)?;
    let farthest = |preferred_only: bool| {
        let mut best: Option<(usize, f32)> = None;
        for (i, room) in rooms.iter().enumerate() {
            if i == key_room {
                continue;
            }
            if preferred_only && room.classification().exit_preference() == 0 {
                continue;
            }
            let dist = key.distance_to(room);
            let better = match best {
                None => true,
                Some((j, best_dist)) => {
                    dist > best_dist
                        || (dist == best_dist
                            && room.classification().exit_preference()
                                > rooms[j].classification().exit_preference())
                }
            };
            if better {
                best = Some((i, dist));
            }
        }
        best.map(|(i, _)| i)
    };
    farthest(true).or_else(|| farthest(false))
}

/// The two non-spawn rooms farthest apart, lower index first.
pub fn farthest_pair(rooms: &[Space]) -> Option<(usize, usize)> {
    let candidates: Vec<usize> = (0..rooms.len())
        .filter(|&i| rooms[i].classification() != Classification::Spawn)
        .collect();
    let mut best: Option<((usize, usize), f32)> = None;
    for (n, &i) in candidates.iter().enumerate() {
        for &j in &candidates[n + 1..] {
            let dist = rooms[i].distance_to(&rooms[j]);
            if best.map_or(true, |(_, d)| dist > d) {
                best = Some(((i, j), dist));
            }
        }
    }
    best.map(|(pair, _)| pair)
}

/// Choose key and exit rooms.
///
/// First applicable rule wins:
/// 1. 30% of the time, if there are alcoves, a random alcove.
/// 2. A random cardinal-plus room.
/// 3. A random cardinal room.
/// 4. A random radial room, if there are at least two.
///
/// The exit then comes from [`find_farthest_room`]. When no rule applies,
/// the farthest pair of non-spawn rooms becomes key and exit.
pub fn place_objectives<R: Rng>(
    rng: &mut R,
    rooms: &[Space],
) -> Result<Objectives, PlacementError> {
    let alcoves = indices_of(rooms, Classification::Alcove);
    let cardinal_plus = indices_of(rooms, Classification::CardinalPlus);
    let cardinal = indices_of(rooms, Classification::Cardinal);
    let radial = indices_of(rooms, Classification::Radial);

    let key_room = if !alcoves.is_empty() && rng.gen_bool(chances::KEY_IN_ALCOVE) {
        alcoves.choose(rng).copied()
    } else if !cardinal_plus.is_empty() {
        cardinal_plus.choose(rng).copied()
    } else if !cardinal.is_empty() {
        cardinal.choose(rng).copied()
    } else if radial.len() >= 2 {
        radial.choose(rng).copied()
    } else {
        None
    };

    if let Some(key_room) = key_room {
        if let Some(exit_room) = find_farthest_room(rooms, key_room) {
            log::debug!(
                "key in {:?} room {}, exit in {:?} room {}",
                rooms[key_room].classification(),
                key_room,
                rooms[exit_room].classification(),
                exit_room
            );
            return Ok(Objectives::in_rooms(rooms, key_room, exit_room));
        }
    }

    let (key_room, exit_room) = farthest_pair(rooms).ok_or_else(|| PlacementError::NotEnoughRooms {
        found: rooms
            .iter()
            .filter(|r| r.classification() != Classification::Spawn)
            .count(),
    })?;
    log::debug!("key/exit by farthest pair: rooms {} and {}", key_room, exit_room);
    Ok(Objectives::in_rooms(rooms, key_room, exit_room))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn at(cx: f32, cz: f32, class: Classification) -> Space {
        Space::centered(cx, cz, 10.0, 10.0, class).unwrap()
    }

    #[test]
    fn test_cardinal_plus_preferred_for_key() {
        let rooms = vec![
            at(100.0, 100.0, Classification::Spawn),
            at(100.0, 70.0, Classification::Radial),
            at(130.0, 100.0, Classification::Radial),
            at(100.0, 30.0, Classification::CardinalPlus),
        ];
        // No alcoves, so the roll for rule 1 never happens.
        for seed in 0..16 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let o = place_objectives(&mut rng, &rooms).unwrap();
            assert_eq!(o.key_room, 3);
            assert_eq!(o.exit_room, 2);
        }
    }

    #[test]
    fn test_key_floats_exit_on_floor() {
        let rooms = vec![
            at(100.0, 100.0, Classification::Spawn),
            at(100.0, 70.0, Classification::Radial),
            at(140.0, 60.0, Classification::Cardinal),
        ];
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let o = place_objectives(&mut rng, &rooms).unwrap();
        assert_eq!(o.key_room, 2);
        assert_eq!(o.key_position, Point3::new(140.0, 1.0, 60.0));
        assert_eq!(o.exit_room, 1);
        assert_eq!(o.exit_position, Point3::new(100.0, 0.0, 70.0));
    }

    #[test]
    fn test_alcove_key_sometimes() {
        let rooms = vec![
            at(100.0, 100.0, Classification::Spawn),
            at(100.0, 70.0, Classification::Radial),
            at(100.0, 40.0, Classification::CardinalPlus),
            at(100.0, 130.0, Classification::Alcove),
        ];
        let mut alcove_keys = 0;
        for seed in 0..200 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let o = place_objectives(&mut rng, &rooms).unwrap();
            assert_ne!(o.key_room, o.exit_room);
            if o.key_room == 3 {
                alcove_keys += 1;
                // Farthest better room from the alcove.
                assert_eq!(o.exit_room, 2);
            }
        }
        assert!(alcove_keys > 20 && alcove_keys < 120, "{}", alcove_keys);
    }

    #[test]
    fn test_single_radial_falls_back_to_farthest_pair() {
        let rooms = vec![
            at(100.0, 100.0, Classification::Spawn),
            at(100.0, 70.0, Classification::Radial),
            at(80.0, 70.0, Classification::Normal),
            at(160.0, 100.0, Classification::Normal),
        ];
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let o = place_objectives(&mut rng, &rooms).unwrap();
        assert_eq!((o.key_room, o.exit_room), (2, 3));
    }

    #[test]
    fn test_too_few_rooms() {
        let rooms = vec![
            at(100.0, 100.0, Classification::Spawn),
            at(100.0, 70.0, Classification::Radial),
        ];
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        assert_eq!(
            place_objectives(&mut rng, &rooms),
            Err(PlacementError::NotEnoughRooms { found: 1 })
        );
    }

    #[test]
    fn test_farthest_room_tie_prefers_cardinal_plus() {
        let rooms = vec![
            at(100.0, 100.0, Classification::Spawn),
            at(100.0, 60.0, Classification::Radial),
            at(100.0, 140.0, Classification::CardinalPlus),
        ];
        assert_eq!(find_farthest_room(&rooms, 0), Some(2));
    }

    #[test]
    fn test_farthest_room_pool_falls_back() {
        let rooms = vec![
            at(100.0, 100.0, Classification::Spawn),
            at(100.0, 60.0, Classification::Alcove),
            at(100.0, 10.0, Classification::Alcove),
        ];
        assert_eq!(find_farthest_room(&rooms, 1), Some(2));
        assert_eq!(find_farthest_room(&rooms, 9), None);
    }

    #[test]
    fn test_farthest_room_ignores_worse_classes_when_pool_nonempty() {
        let rooms = vec![
            at(100.0, 100.0, Classification::Spawn),
            at(100.0, 90.0, Classification::Radial),
            at(100.0, 10.0, Classification::Alcove),
            at(100.0, 120.0, Classification::Radial),
        ];
        assert_eq!(find_farthest_room(&rooms, 1), Some(3));
    }
}
