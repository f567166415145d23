/*
 * Copyright (C) 2023 Asim Ihsan
 * SPDX-License-Identifier: AGPL-3.0-only
 *
 * This program is free software: you can redistribute it and/or modify it under
 * the terms of the GNU Affero General Public License as published by the Free
 * Software Foundation, version 3.
 *
 * This program is distributed in the hope that it will be useful, but WITHOUT ANY
 * WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A
 * PARTICULAR PURPOSE. See the GNU Affero General Public License for more details.
 *
 * You should have received a copy of the GNU Affero General Public License along
 * with this program. If not, see <https://www.gnu.org/licenses/>
 */

//! Static evaluation functions for Pacman states.
//!
//! Every distance used here comes from a possibly empty set of cells (food, ghosts). Empty sets
//! contribute nothing, and distances that end up in a denominator are clamped to at least one.

use pacman_logic::{manhattan_distance, Direction, PacmanState, Position};

use crate::Float;

/// Manhattan distance from `from` to the closest of `targets`, or None if there are none.
pub fn nearest_distance<I>(from: Position, targets: I) -> Option<usize>
where
    I: IntoIterator<Item = Position>,
{
    targets
        .into_iter()
        .map(|target| manhattan_distance(from, target))
        .min()
}

/// The game score, unchanged.
pub fn score_evaluation(state: &PacmanState) -> Float {
    state.score() as Float
}

/// Score Pacman taking `action` in `state`. Higher is better.
///
/// Costs the distance to the nearest pellet unless the move eats one, plus `2^(2 - d)` for every
/// ghost at distance `d` from Pacman's new cell.
pub fn reflex_evaluation(state: &PacmanState, action: Direction) -> Float {
    let successor = state.generate_pacman_successor(action);
    let position = successor.pacman_position();

    let mut cost: Float = 0.0;
    if successor.food_count() == state.food_count() {
        if let Some(distance) = nearest_distance(position, successor.food_positions()) {
            cost += distance as Float;
        }
    }
    for ghost in successor.ghost_positions() {
        let distance = manhattan_distance(*ghost, position);
        cost += (2.0 as Float).powf(2.0 - distance as Float);
    }
    -cost
}

const FOOD_DISTANCE_WEIGHT: Float = 2.0;
const FOOD_COUNT_WEIGHT: Float = 6.0;
const GHOST_THREAT_WEIGHT: Float = 20.0;

/// Evaluate a state on its own: the score, minus the walk to the nearest pellet, minus a penalty
/// per pellet left, minus a threat that grows as the nearest ghost closes in.
pub fn better_evaluation(state: &PacmanState) -> Float {
    let position = state.pacman_position();

    let food_distance =
        nearest_distance(position, state.food_positions()).map_or(0.0, |d| d as Float);
    let ghost_threat = nearest_distance(position, state.ghost_positions().iter().copied())
        .map_or(0.0, |d| 1.0 / d.max(1) as Float);

    state.score() as Float
        - FOOD_DISTANCE_WEIGHT * food_distance
        - FOOD_COUNT_WEIGHT * state.food_count() as Float
        - GHOST_THREAT_WEIGHT * ghost_threat
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use pacman_logic::Layout;

    use super::*;

    fn state(text: &str) -> PacmanState {
        PacmanState::new(Layout::parse(text).expect("valid layout"))
    }

    #[test]
    fn test_reflex_prefers_moving_towards_food() {
        let s = state("%%%%%%\n%P  .%\n%%%%%%");
        assert_abs_diff_eq!(reflex_evaluation(&s, Direction::East), -2.0);
        assert_abs_diff_eq!(reflex_evaluation(&s, Direction::Stop), -3.0);
    }

    #[test]
    fn test_reflex_eating_food_costs_nothing() {
        let s = state("%%%%%%\n%.P .%\n%%%%%%");
        assert_abs_diff_eq!(reflex_evaluation(&s, Direction::West), 0.0);
    }

    #[test]
    fn test_reflex_ghost_term() {
        // Ghost two cells east of where Pacman ends up: 2^0 on top of the food distance of 2.
        let s = state("%%%%%%%\n%.P  G%\n%%%%%%%");
        assert_abs_diff_eq!(reflex_evaluation(&s, Direction::East), -3.0);
        // Next to the ghost the term doubles.
        let s = state("%%%%%%\n%.P G%\n%%%%%%");
        assert_abs_diff_eq!(reflex_evaluation(&s, Direction::East), -(2.0 + 2.0));
    }

    #[test]
    fn test_evaluations_survive_empty_sets_and_zero_distance() {
        // No food anywhere and a ghost on top of Pacman after the move.
        let s = state("%%%%%\n%P G%\n%%%%%");
        let caught = s
            .generate_pacman_successor(Direction::East)
            .generate_successor(1, Direction::West);
        assert!(caught.is_loss());
        assert!(better_evaluation(&caught).is_finite());
        assert!(reflex_evaluation(&s, Direction::East).is_finite());

        let empty = state("%%%\n%P%\n%%%");
        assert_abs_diff_eq!(better_evaluation(&empty), 0.0);
        assert_abs_diff_eq!(reflex_evaluation(&empty, Direction::Stop), 0.0);
    }

    #[test]
    fn test_better_evaluation_terms() {
        // Score 0, nearest food 2 away, 1 pellet, ghost 4 away.
        let s = state("%%%%%%%%%\n%G   P .%\n%%%%%%%%%");
        assert_eq!(s.food_count(), 1);
        assert_abs_diff_eq!(better_evaluation(&s), 0.0 - 2.0 * 2.0 - 6.0 - 20.0 / 4.0);
    }

    #[test]
    fn test_better_evaluation_prefers_distance_from_ghosts() {
        let near = state("%%%%%%%\n%.GP  %\n%%%%%%%");
        let far = state("%%%%%%%\n%.G  P%\n%%%%%%%");
        assert!(better_evaluation(&far) > better_evaluation(&near));
        assert_eq!(score_evaluation(&near), 0.0);
    }
}
