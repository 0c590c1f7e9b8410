use crate::engine::{Dimensions, Goal, State, Tile};
use quickcheck::{Arbitrary, Gen};

pub fn state(tiles: &[Tile]) -> State {
    State::new(tiles.to_vec())
}

pub fn goal_3x3() -> Goal {
    Goal::canonical(Dimensions::new(3, 3).unwrap())
}

/// Walks `choices.len()` legal moves away from `goal`, picking the move at
/// `choice % fan_out` each time.
pub fn scramble(goal: &Goal, choices: &[u8]) -> State {
    let mut current = goal.state().clone();
    for &choice in choices {
        let moves: Vec<_> = current.legal_moves(goal.width()).collect();
        let mv = moves[choice as usize % moves.len()];
        current = current.apply(mv);
    }
    current
}

/// A reachable (and therefore solvable) state on a small random grid.
#[derive(Clone, Debug)]
pub struct Scramble {
    goal: Goal,
    choices: Vec<u8>,
}

impl Scramble {
    pub fn goal(&self) -> &Goal {
        &self.goal
    }

    pub fn width(&self) -> usize {
        self.goal.width()
    }

    pub fn height(&self) -> usize {
        self.goal.height()
    }

    pub fn choices(&self) -> &[u8] {
        &self.choices
    }

    pub fn state(&self) -> State {
        scramble(&self.goal, &self.choices)
    }
}

impl Arbitrary for Scramble {
    fn arbitrary(g: &mut Gen) -> Self {
        let width = *g.choose(&[2usize, 3, 4]).unwrap();
        let height = *g.choose(&[2usize, 3, 4]).unwrap();
        let goal = Goal::canonical(Dimensions::new(width, height).unwrap());
        let choices: Vec<u8> = Vec::arbitrary(g);
        Scramble { goal, choices }
    }

    fn shrink(&self) -> Box<dyn Iterator<Item = Self>> {
        let goal = self.goal.clone();
        Box::new(
            self.choices
                .shrink()
                .map(move |choices| Scramble {
                    goal: goal.clone(),
                    choices,
                }),
        )
    }
}
