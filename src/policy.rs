// Pursuer movement during real play
//
// Inside the search pursuers are modelled as minimizers; on the live board they
// follow a `PursuerPolicy`. The default policy is a uniform random walk driven
// by an explicitly passed, seedable generator so games can be replayed.

use log::debug;
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};

use crate::board::Board;
use crate::types::{Direction, Mover, TurnRecord};

/// Chooses a move for one pursuer on the live board
pub trait PursuerPolicy {
    /// Returns `None` when the pursuer should stay where it is
    fn choose(&mut self, board: &Board, index: usize) -> Option<Direction>;
}

/// Uniformly random legal move for every pursuer
#[derive(Debug, Clone)]
pub struct RandomWalk<R: Rng> {
    rng: R,
}

impl<R: Rng> RandomWalk<R> {
    pub fn new(rng: R) -> Self {
        RandomWalk { rng }
    }
}

impl RandomWalk<StdRng> {
    /// Reproducible random walk
    pub fn seeded(seed: u64) -> Self {
        RandomWalk::new(StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> PursuerPolicy for RandomWalk<R> {
    fn choose(&mut self, board: &Board, index: usize) -> Option<Direction> {
        board
            .moves_for(Mover::Pursuer(index))
            .choose(&mut self.rng)
            .copied()
    }
}

/// Moves every pursuer once, in stored order.
///
/// Each pursuer sees the board as left by the pursuers before it. A pursuer
/// with no legal move stays put and is recorded with no direction.
pub fn advance_pursuers<P: PursuerPolicy + ?Sized>(
    board: &Board,
    policy: &mut P,
) -> (Board, Vec<TurnRecord>) {
    let mut current = board.clone();
    let mut records = Vec::with_capacity(board.pursuers().len());

    for index in 0..board.pursuers().len() {
        let mover = Mover::Pursuer(index);
        let choice = policy.choose(&current, index);
        // Policies are not trusted to stay legal
        let direction = choice.filter(|dir| current.moves_for(mover).contains(dir));
        if choice.is_some() && direction.is_none() {
            debug!("Pursuer {} policy proposed an illegal move, staying put", index);
        }
        if let Some(dir) = direction {
            current = current.apply(mover, dir);
        }
        records.push(TurnRecord {
            mover,
            direction,
            resulting_score: current.score(),
        });
    }

    (current, records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Coord;

    /// Always proposes the same direction
    struct Stubborn(Direction);

    impl PursuerPolicy for Stubborn {
        fn choose(&mut self, _board: &Board, _index: usize) -> Option<Direction> {
            Some(self.0)
        }
    }

    #[test]
    fn test_boxed_in_pursuer_stays_put() {
        // Pursuer in a corner walled off by obstacles
        let board = Board::new(
            3,
            3,
            &[Coord::new(0, 1), Coord::new(1, 0)],
            Coord::new(2, 2),
            &[Coord::new(1, 1)],
            &[Coord::new(0, 0)],
        )
        .unwrap();
        let mut policy = RandomWalk::seeded(7);
        assert_eq!(policy.choose(&board, 0), None);

        let (next, records) = advance_pursuers(&board, &mut policy);
        assert_eq!(next.pursuers(), &[Coord::new(0, 0)]);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].direction, None);
    }

    #[test]
    fn test_random_walk_only_picks_legal_moves() {
        let board = Board::new(
            4,
            4,
            &[Coord::new(1, 2)],
            Coord::new(3, 3),
            &[Coord::new(2, 1)],
            &[Coord::new(1, 1), Coord::new(0, 0)],
        )
        .unwrap();
        let mut policy = RandomWalk::seeded(42);
        let mut current = board;
        for _ in 0..200 {
            let (next, _) = advance_pursuers(&current, &mut policy);
            for &pos in next.pursuers() {
                assert!(next.in_bounds(&pos));
                assert_ne!(pos, Coord::new(1, 2));
                assert_ne!(pos, Coord::new(2, 1));
            }
            current = next;
        }
    }

    #[test]
    fn test_same_seed_same_walk() {
        let board = Board::new(
            5,
            5,
            &[],
            Coord::new(4, 4),
            &[Coord::new(0, 4)],
            &[Coord::new(2, 2)],
        )
        .unwrap();
        let walk = |seed| {
            let mut policy = RandomWalk::seeded(seed);
            let mut current = board.clone();
            let mut trail = Vec::new();
            for _ in 0..20 {
                current = advance_pursuers(&current, &mut policy).0;
                trail.push(current.pursuers()[0]);
            }
            trail
        };
        assert_eq!(walk(9), walk(9));
    }

    #[test]
    fn test_illegal_policy_choice_is_ignored() {
        let board = Board::new(
            1,
            3,
            &[],
            Coord::new(0, 2),
            &[Coord::new(0, 1)],
            &[Coord::new(0, 0)],
        )
        .unwrap();
        let (next, records) = advance_pursuers(&board, &mut Stubborn(Direction::Up));
        assert_eq!(next.pursuers(), &[Coord::new(0, 0)]);
        assert_eq!(records[0].direction, None);
    }

    #[test]
    fn test_pursuers_move_in_order_and_see_each_other() {
        let board = Board::new(
            1,
            4,
            &[],
            Coord::new(0, 0),
            &[Coord::new(0, 3)],
            &[Coord::new(0, 1), Coord::new(0, 2)],
        )
        .unwrap();
        let (next, records) = advance_pursuers(&board, &mut Stubborn(Direction::Left));
        assert_eq!(next.pursuers(), &[Coord::new(0, 0), Coord::new(0, 1)]);
        assert_eq!(records[0].mover, Mover::Pursuer(0));
        assert_eq!(records[1].mover, Mover::Pursuer(1));
        assert!(next.is_lost());
    }
}
