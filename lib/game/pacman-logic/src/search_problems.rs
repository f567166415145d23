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

//! Maze navigation as graph search problems.

use std::rc::Rc;

use graph_search::{Float, SearchProblem, Successor};
use rustc_hash::FxHashSet;

use crate::{manhattan_distance, Direction, Layout, PacmanState, Position};

/// Cost of stepping onto a cell.
pub type CostFn = fn(Position) -> Float;

/// Every step costs one.
pub fn unit_cost(_pos: Position) -> Float {
    1.0
}

/// Walk through `actions` from `start`. None if any step runs into a wall.
fn walk(layout: &Layout, start: Position, actions: &[Direction]) -> Option<Vec<Position>> {
    let mut pos = start;
    let mut visited = Vec::with_capacity(actions.len());
    for action in actions {
        pos = action.apply(pos).filter(|next| !layout.is_wall(*next))?;
        visited.push(pos);
    }
    Some(visited)
}

/// Find a path from a start cell to one goal cell, ignoring food and ghosts.
#[derive(Debug, Clone)]
pub struct PositionSearchProblem {
    layout: Rc<Layout>,
    start: Position,
    goal: Position,
    cost_fn: CostFn,
}

impl PositionSearchProblem {
    /// A problem with unit step costs.
    pub fn new(layout: Rc<Layout>, start: Position, goal: Position) -> Self {
        Self {
            layout,
            start,
            goal,
            cost_fn: unit_cost,
        }
    }

    /// A problem from Pacman's current cell to `goal`.
    pub fn from_state(state: &PacmanState, goal: Position) -> Self {
        Self::new(state.shared_layout(), state.pacman_position(), goal)
    }

    /// Replace the step cost function.
    pub fn with_cost_fn(mut self, cost_fn: CostFn) -> Self {
        self.cost_fn = cost_fn;
        self
    }

    /// The goal cell.
    pub fn goal(&self) -> Position {
        self.goal
    }
}

impl SearchProblem for PositionSearchProblem {
    type State = Position;
    type Action = Direction;

    fn start_state(&self) -> Position {
        self.start
    }

    fn is_goal(&self, state: &Position) -> bool {
        *state == self.goal
    }

    fn successors(&self, state: &Position) -> Vec<Successor<Position, Direction>> {
        self.layout
            .neighbors(*state)
            .into_iter()
            .map(|(direction, next)| Successor::new(next, direction, (self.cost_fn)(next)))
            .collect()
    }

    /// Infinite for a path that walks into a wall.
    fn path_cost(&self, actions: &[Direction]) -> Float {
        match walk(&self.layout, self.start, actions) {
            Some(cells) => cells.into_iter().map(self.cost_fn).sum(),
            None => Float::INFINITY,
        }
    }
}

/// Manhattan distance to the goal. Admissible for unit step costs.
pub fn manhattan_heuristic(state: &Position, problem: &PositionSearchProblem) -> Float {
    manhattan_distance(*state, problem.goal) as Float
}

/// Find a path from Pacman to whichever pellet is closest.
#[derive(Debug, Clone)]
pub struct AnyFoodSearchProblem {
    layout: Rc<Layout>,
    start: Position,
    food: FxHashSet<Position>,
}

impl AnyFoodSearchProblem {
    /// Snapshot the food of `state`, starting from Pacman's cell.
    pub fn from_state(state: &PacmanState) -> Self {
        Self {
            layout: state.shared_layout(),
            start: state.pacman_position(),
            food: state.food_positions().into_iter().collect(),
        }
    }
}

impl SearchProblem for AnyFoodSearchProblem {
    type State = Position;
    type Action = Direction;

    fn start_state(&self) -> Position {
        self.start
    }

    fn is_goal(&self, state: &Position) -> bool {
        self.food.contains(state)
    }

    fn successors(&self, state: &Position) -> Vec<Successor<Position, Direction>> {
        self.layout
            .neighbors(*state)
            .into_iter()
            .map(|(direction, next)| Successor::new(next, direction, 1.0))
            .collect()
    }

    fn path_cost(&self, actions: &[Direction]) -> Float {
        match walk(&self.layout, self.start, actions) {
            Some(cells) => cells.len() as Float,
            None => Float::INFINITY,
        }
    }
}

/// Manhattan distance to the nearest remaining pellet, zero when none are left.
pub fn nearest_food_heuristic(state: &Position, problem: &AnyFoodSearchProblem) -> Float {
    problem
        .food
        .iter()
        .map(|food| manhattan_distance(*state, *food))
        .min()
        .unwrap_or(0) as Float
}

#[cfg(test)]
mod tests {
    use graph_search::{
        a_star_search, breadth_first_search, depth_first_search, null_heuristic,
        uniform_cost_search,
    };

    use super::*;
    use crate::layouts;

    fn tiny_maze() -> PacmanState {
        PacmanState::new(Layout::parse(layouts::TINY_MAZE).expect("valid layout"))
    }

    fn reaches(problem: &PositionSearchProblem, actions: &[Direction]) -> bool {
        walk(&problem.layout, problem.start, actions)
            .and_then(|cells| cells.last().copied())
            .map(|end| problem.is_goal(&end))
            .unwrap_or(actions.is_empty() && problem.is_goal(&problem.start))
    }

    #[test]
    fn test_tiny_maze_shortest_path_is_eight() {
        let state = tiny_maze();
        let problem = PositionSearchProblem::from_state(&state, Position::new(1, 5));

        let bfs = breadth_first_search(&problem).expect("reachable");
        assert_eq!(bfs.len(), 8);
        assert!(reaches(&problem, &bfs));

        let ucs = uniform_cost_search(&problem).expect("reachable");
        assert_eq!(problem.path_cost(&ucs), 8.0);

        let astar = a_star_search(&problem, manhattan_heuristic).expect("reachable");
        assert_eq!(problem.path_cost(&astar), 8.0);
        assert!(reaches(&problem, &astar));

        let dfs = depth_first_search(&problem).expect("reachable");
        assert!(reaches(&problem, &dfs));
        assert!(dfs.len() >= 8);
    }

    #[test]
    fn test_custom_cost_prefers_cheaper_cells() {
        // Stepping onto the top row is expensive, so the cheapest route goes down first even
        // though both routes from (1, 1) to (3, 3) have four steps.
        fn top_row_costly(pos: Position) -> Float {
            if pos.y == 1 {
                10.0
            } else {
                1.0
            }
        }
        let layout = Rc::new(
            Layout::parse(
                "%%%%%\n\
                 %P  %\n\
                 % % %\n\
                 %   %\n\
                 %%%%%",
            )
            .expect("valid layout"),
        );
        let problem = PositionSearchProblem::new(layout, Position::new(1, 1), Position::new(3, 3))
            .with_cost_fn(top_row_costly);
        let path = uniform_cost_search(&problem).expect("reachable");
        assert_eq!(path[0], Direction::South);
        assert_eq!(problem.path_cost(&path), 4.0);
    }

    #[test]
    fn test_walled_off_goal_has_no_path() {
        let layout = Rc::new(Layout::parse("%%%%%\n%P%.%\n%%%%%").expect("valid layout"));
        let problem = PositionSearchProblem::new(layout, Position::new(1, 1), Position::new(3, 1));
        assert_eq!(breadth_first_search(&problem), None);
        assert_eq!(a_star_search(&problem, manhattan_heuristic), None);
    }

    #[test]
    fn test_path_cost_of_invalid_path_is_infinite() {
        let problem = PositionSearchProblem::from_state(&tiny_maze(), Position::new(1, 5));
        assert_eq!(problem.path_cost(&[Direction::North]), Float::INFINITY);
        assert_eq!(problem.path_cost(&[]), 0.0);
    }

    #[test]
    fn test_any_food_finds_closest_pellet() {
        let state = PacmanState::new(
            Layout::parse("%%%%%%%%\n%. P  .%\n%%%%%%%%").expect("valid layout"),
        );
        let problem = AnyFoodSearchProblem::from_state(&state);
        let path = uniform_cost_search(&problem).expect("food left");
        assert_eq!(path, vec![Direction::West, Direction::West]);
        assert_eq!(problem.path_cost(&path), 2.0);

        let astar = a_star_search(&problem, nearest_food_heuristic).expect("food left");
        assert_eq!(astar.len(), 2);
        assert_eq!(nearest_food_heuristic(&state.pacman_position(), &problem), 2.0);
        assert_eq!(a_star_search(&problem, null_heuristic).map(|p| p.len()), Some(2));
    }
}
