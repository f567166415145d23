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

#![warn(missing_docs)]

//! Pacman maze game logic.
//!
//! A small, self-contained version of the Pacman rules: one Pacman, any number of ghosts, walls
//! and food. It implements [`adversarial_search::GameState`] so the multi-agent searches can
//! play it, and [`search_problems`] exposes maze navigation as [`graph_search::SearchProblem`]s.

use std::rc::Rc;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub mod layouts;
pub mod search_problems;

/// Points lost for every Pacman move.
pub const TIME_PENALTY: i32 = 1;
/// Points for eating one food pellet.
pub const FOOD_REWARD: i32 = 10;
/// Bonus for eating the last pellet.
pub const WIN_REWARD: i32 = 500;
/// Penalty for being caught by a ghost.
pub const LOSE_PENALTY: i32 = 500;

/// Layout parse error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LayoutError {
    /// No rows at all.
    #[error("layout is empty")]
    Empty,

    /// Rows must all have the same width.
    #[error("row {row} has width {got}, expected {expected}")]
    RaggedRow {
        /// Row index, starting at 0 from the top.
        row: usize,
        /// Width of the first row.
        expected: usize,
        /// Width of this row.
        got: usize,
    },

    /// A character that is not part of the layout alphabet.
    #[error("unknown character '{character}' at row {row}, column {col}")]
    UnknownCharacter {
        /// The offending character.
        character: char,
        /// Row index.
        row: usize,
        /// Column index.
        col: usize,
    },

    /// There is no `P` in the layout.
    #[error("layout has no Pacman")]
    MissingPacman,

    /// There is more than one `P` in the layout.
    #[error("layout has more than one Pacman")]
    MultiplePacman,
}

/// A cell in the maze. Column `x` grows to the right, row `y` grows downwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    /// Column.
    pub x: usize,
    /// Row.
    pub y: usize,
}

impl Position {
    /// Create a position.
    pub fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Manhattan distance between two cells.
pub fn manhattan_distance(a: Position, b: Position) -> usize {
    a.x.abs_diff(b.x) + a.y.abs_diff(b.y)
}

/// A move in the maze. `Stop` is the null action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Up one row.
    North,
    /// Down one row.
    South,
    /// Right one column.
    East,
    /// Left one column.
    West,
    /// Stay put.
    Stop,
}

impl Direction {
    /// The four moving directions, in the order legal moves are listed.
    pub const MOVES: [Direction; 4] = [
        Direction::North,
        Direction::South,
        Direction::East,
        Direction::West,
    ];

    /// The opposite direction. `Stop` reverses to itself.
    pub fn reverse(&self) -> Direction {
        match self {
            Direction::North => Direction::South,
            Direction::South => Direction::North,
            Direction::East => Direction::West,
            Direction::West => Direction::East,
            Direction::Stop => Direction::Stop,
        }
    }

    /// The cell reached by moving from `from`, ignoring walls. None when it would leave the grid.
    pub fn apply(&self, from: Position) -> Option<Position> {
        match self {
            Direction::North => from.y.checked_sub(1).map(|y| Position::new(from.x, y)),
            Direction::South => Some(Position::new(from.x, from.y + 1)),
            Direction::East => Some(Position::new(from.x + 1, from.y)),
            Direction::West => from.x.checked_sub(1).map(|x| Position::new(x, from.y)),
            Direction::Stop => Some(from),
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::North => write!(f, "North"),
            Direction::South => write!(f, "South"),
            Direction::East => write!(f, "East"),
            Direction::West => write!(f, "West"),
            Direction::Stop => write!(f, "Stop"),
        }
    }
}

impl adversarial_search::Action for Direction {
    fn is_wait(&self) -> bool {
        *self == Direction::Stop
    }
}

/// The static part of a maze plus the starting positions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    width: usize,
    height: usize,
    walls: Vec<bool>,
    food: Vec<bool>,
    pacman_start: Position,
    ghost_starts: Vec<Position>,
}

impl Layout {
    /// Parse a layout. `%` is a wall, `.` is food, `P` is Pacman, `G` is a ghost and a space is
    /// an empty cell. Blank lines are ignored.
    pub fn parse(text: &str) -> Result<Self, LayoutError> {
        let rows: Vec<&str> = text
            .lines()
            .map(|line| line.trim_end_matches('\r'))
            .filter(|line| !line.is_empty())
            .collect();
        if rows.is_empty() {
            return Err(LayoutError::Empty);
        }

        let width = rows[0].chars().count();
        let height = rows.len();
        let mut walls = vec![false; width * height];
        let mut food = vec![false; width * height];
        let mut pacman_start = None;
        let mut ghost_starts = Vec::new();

        for (row, line) in rows.iter().enumerate() {
            let got = line.chars().count();
            if got != width {
                return Err(LayoutError::RaggedRow {
                    row,
                    expected: width,
                    got,
                });
            }
            for (col, character) in line.chars().enumerate() {
                let index = row * width + col;
                match character {
                    '%' => walls[index] = true,
                    '.' => food[index] = true,
                    ' ' => {}
                    'P' => {
                        if pacman_start.is_some() {
                            return Err(LayoutError::MultiplePacman);
                        }
                        pacman_start = Some(Position::new(col, row));
                    }
                    'G' => ghost_starts.push(Position::new(col, row)),
                    _ => {
                        return Err(LayoutError::UnknownCharacter {
                            character,
                            row,
                            col,
                        })
                    }
                }
            }
        }

        Ok(Self {
            width,
            height,
            walls,
            food,
            pacman_start: pacman_start.ok_or(LayoutError::MissingPacman)?,
            ghost_starts,
        })
    }

    /// Width in cells.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Height in cells.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Whether a cell is a wall. Cells outside the grid count as walls.
    pub fn is_wall(&self, pos: Position) -> bool {
        if pos.x >= self.width || pos.y >= self.height {
            return true;
        }
        self.walls[pos.y * self.width + pos.x]
    }

    /// Where Pacman starts.
    pub fn pacman_start(&self) -> Position {
        self.pacman_start
    }

    /// Where each ghost starts, in agent order.
    pub fn ghost_starts(&self) -> &[Position] {
        &self.ghost_starts
    }

    /// Moving directions from `pos` that do not run into a wall, with the cell each reaches.
    pub fn neighbors(&self, pos: Position) -> Vec<(Direction, Position)> {
        Direction::MOVES
            .iter()
            .filter_map(|direction| {
                direction
                    .apply(pos)
                    .filter(|next| !self.is_wall(*next))
                    .map(|next| (*direction, next))
            })
            .collect()
    }

    fn index(&self, pos: Position) -> usize {
        pos.y * self.width + pos.x
    }
}

impl FromStr for Layout {
    type Err = LayoutError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Layout::parse(s)
    }
}

/// How a finished game ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    /// Pacman ate every pellet.
    Win,
    /// A ghost caught Pacman.
    Loss,
}

/// A snapshot of a game. Successor states share the layout and copy only the moving parts.
///
/// Agent 0 is Pacman; agent `i` for `i >= 1` is ghost `i - 1`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PacmanState {
    layout: Rc<Layout>,
    food: Vec<bool>,
    food_remaining: usize,
    pacman: Position,
    pacman_direction: Direction,
    ghosts: Vec<Position>,
    score: i32,
    outcome: Option<Outcome>,
}

impl PacmanState {
    /// The starting state for a layout.
    pub fn new(layout: Layout) -> Self {
        let food_remaining = layout.food.iter().filter(|f| **f).count();
        Self {
            food: layout.food.clone(),
            food_remaining,
            pacman: layout.pacman_start,
            pacman_direction: Direction::Stop,
            ghosts: layout.ghost_starts.clone(),
            score: 0,
            outcome: None,
            layout: Rc::new(layout),
        }
    }

    /// The maze.
    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Shared handle to the maze, for search problems built from this state.
    pub fn shared_layout(&self) -> Rc<Layout> {
        Rc::clone(&self.layout)
    }

    /// Pacman's cell.
    pub fn pacman_position(&self) -> Position {
        self.pacman
    }

    /// The direction of Pacman's last move, `Stop` before the first move.
    pub fn pacman_direction(&self) -> Direction {
        self.pacman_direction
    }

    /// Ghost cells, in agent order.
    pub fn ghost_positions(&self) -> &[Position] {
        &self.ghosts
    }

    /// Whether a cell still has a pellet.
    pub fn has_food(&self, pos: Position) -> bool {
        pos.x < self.layout.width
            && pos.y < self.layout.height
            && self.food[self.layout.index(pos)]
    }

    /// Cells that still have a pellet, row by row.
    pub fn food_positions(&self) -> Vec<Position> {
        let width = self.layout.width;
        self.food
            .iter()
            .enumerate()
            .filter(|(_, f)| **f)
            .map(|(index, _)| Position::new(index % width, index / width))
            .collect()
    }

    /// Number of pellets left.
    pub fn food_count(&self) -> usize {
        self.food_remaining
    }

    /// Current score.
    pub fn score(&self) -> i32 {
        self.score
    }

    /// How the game ended, if it has.
    pub fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    /// Whether Pacman has won.
    pub fn is_win(&self) -> bool {
        self.outcome == Some(Outcome::Win)
    }

    /// Whether Pacman has lost.
    pub fn is_loss(&self) -> bool {
        self.outcome == Some(Outcome::Loss)
    }

    /// Number of agents, Pacman included.
    pub fn num_agents(&self) -> usize {
        1 + self.ghosts.len()
    }

    /// Legal actions for an agent. Pacman may always stop; a ghost only stops when it is boxed
    /// in. A finished game has no legal actions.
    pub fn get_legal_actions(&self, agent: usize) -> Vec<Direction> {
        if self.outcome.is_some() {
            return Vec::new();
        }
        let from = match self.agent_position(agent) {
            Some(pos) => pos,
            None => return Vec::new(),
        };
        let mut actions: Vec<Direction> = self
            .layout
            .neighbors(from)
            .into_iter()
            .map(|(direction, _)| direction)
            .collect();
        if agent == 0 || actions.is_empty() {
            actions.push(Direction::Stop);
        }
        actions
    }

    /// The state after `agent` takes `action`. A move into a wall leaves the agent in place, and
    /// a finished game does not change.
    pub fn generate_successor(&self, agent: usize, action: Direction) -> Self {
        let mut next = self.clone();
        if next.outcome.is_some() {
            return next;
        }
        let target = match self.agent_position(agent) {
            Some(from) => action
                .apply(from)
                .filter(|to| !self.layout.is_wall(*to))
                .unwrap_or(from),
            None => return next,
        };

        if agent == 0 {
            next.pacman = target;
            next.pacman_direction = action;
            next.score -= TIME_PENALTY;
            let index = next.layout.index(target);
            if next.food[index] {
                next.food[index] = false;
                next.food_remaining -= 1;
                next.score += FOOD_REWARD;
                if next.food_remaining == 0 {
                    next.score += WIN_REWARD;
                    next.outcome = Some(Outcome::Win);
                    return next;
                }
            }
        } else {
            next.ghosts[agent - 1] = target;
        }

        if next.ghosts.contains(&next.pacman) {
            next.score -= LOSE_PENALTY;
            next.outcome = Some(Outcome::Loss);
        }
        next
    }

    /// The state after Pacman takes `action`.
    pub fn generate_pacman_successor(&self, action: Direction) -> Self {
        self.generate_successor(0, action)
    }

    fn agent_position(&self, agent: usize) -> Option<Position> {
        if agent == 0 {
            Some(self.pacman)
        } else {
            self.ghosts.get(agent - 1).copied()
        }
    }
}

impl adversarial_search::GameState<Direction> for PacmanState {
    fn legal_actions(&self, agent: usize) -> Vec<Direction> {
        self.get_legal_actions(agent)
    }

    fn successor(&self, agent: usize, action: &Direction) -> Self {
        self.generate_successor(agent, *action)
    }

    fn is_terminal(&self) -> bool {
        self.outcome.is_some()
    }

    fn agent_count(&self) -> usize {
        self.num_agents()
    }
}

// Draw the maze the way layouts are written, followed by the score.
impl std::fmt::Display for PacmanState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let layout = &self.layout;
        let mut s = String::with_capacity((layout.width + 1) * (layout.height + 1));
        for y in 0..layout.height {
            for x in 0..layout.width {
                let pos = Position::new(x, y);
                let c = if self.ghosts.contains(&pos) {
                    'G'
                } else if pos == self.pacman {
                    'P'
                } else if layout.is_wall(pos) {
                    '%'
                } else if self.has_food(pos) {
                    '.'
                } else {
                    ' '
                };
                s.push(c);
            }
            s.push('\n');
        }
        write!(f, "{}score: {}", s, self.score)
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn state(text: &str) -> PacmanState {
        PacmanState::new(Layout::parse(text).expect("valid layout"))
    }

    #[test]
    fn test_parse_test_classic() {
        let layout = Layout::parse(layouts::TEST_CLASSIC).expect("valid layout");
        assert_eq!(layout.width(), 5);
        assert_eq!(layout.height(), 10);
        assert_eq!(layout.pacman_start(), Position::new(1, 8));
        assert_eq!(layout.ghost_starts(), &[Position::new(2, 2)]);
        assert!(layout.is_wall(Position::new(0, 0)));
        assert!(layout.is_wall(Position::new(99, 0)));
        assert!(!layout.is_wall(Position::new(1, 1)));
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(Layout::parse("\n\n"), Err(LayoutError::Empty));
        assert_eq!(
            Layout::parse("%%%\n%P\n"),
            Err(LayoutError::RaggedRow {
                row: 1,
                expected: 3,
                got: 2
            })
        );
        assert_eq!(
            Layout::parse("%P#"),
            Err(LayoutError::UnknownCharacter {
                character: '#',
                row: 0,
                col: 2
            })
        );
        assert_eq!(Layout::parse("%.%"), Err(LayoutError::MissingPacman));
        assert_eq!(Layout::parse("PP"), Err(LayoutError::MultiplePacman));
        assert!("%P.%".parse::<Layout>().is_ok());
    }

    #[test]
    fn test_legal_actions() {
        let s = state(
            "%%%%%\n\
             %P .%\n\
             % %G%\n\
             %%%%%",
        );
        let pacman = s.get_legal_actions(0);
        assert_eq!(pacman, vec![Direction::South, Direction::East, Direction::Stop]);

        // The ghost at (3, 2) can only go north.
        assert_eq!(s.get_legal_actions(1), vec![Direction::North]);
        assert!(s.get_legal_actions(2).is_empty());
    }

    #[test]
    fn test_boxed_in_ghost_can_stop() {
        let s = state("%%%%%\n%P.G%\n%%%%%");
        // The ghost can move west only.
        assert_eq!(s.get_legal_actions(1), vec![Direction::West]);
        let boxed = state("%%%%%\n%P.%G\n%%%%%");
        assert_eq!(boxed.get_legal_actions(1), vec![Direction::Stop]);
    }

    #[test]
    fn test_eating_food_and_winning() {
        let s = state("%%%%%\n%P..%\n%%%%%");
        assert_eq!(s.food_count(), 2);

        let s = s.generate_pacman_successor(Direction::East);
        assert_eq!(s.pacman_position(), Position::new(2, 1));
        assert_eq!(s.score(), FOOD_REWARD - TIME_PENALTY);
        assert_eq!(s.food_count(), 1);
        assert!(!s.has_food(Position::new(2, 1)));
        assert_eq!(s.pacman_direction(), Direction::East);

        let s = s.generate_pacman_successor(Direction::East);
        assert!(s.is_win());
        assert_eq!(s.score(), 2 * (FOOD_REWARD - TIME_PENALTY) + WIN_REWARD);
        assert!(s.get_legal_actions(0).is_empty());

        // Finished games do not change.
        let after = s.generate_pacman_successor(Direction::West);
        assert_eq!(after, s);
    }

    #[test]
    fn test_stopping_costs_time() {
        let s = state("%%%%\n%P.%\n%%%%");
        let s = s.generate_pacman_successor(Direction::Stop);
        assert_eq!(s.pacman_position(), Position::new(1, 1));
        assert_eq!(s.score(), -TIME_PENALTY);
    }

    #[test]
    fn test_walking_into_ghost_loses() {
        let s = state("%%%%%%\n%P G.%\n%%%%%%");
        let s = s.generate_pacman_successor(Direction::East);
        assert!(!s.is_loss());
        let s = s.generate_successor(1, Direction::West);
        assert!(s.is_loss());
        assert_eq!(s.score(), -TIME_PENALTY - LOSE_PENALTY);
    }

    #[test]
    fn test_moving_into_wall_stays_put() {
        let s = state("%%%%\n%P.%\n%%%%");
        let next = s.generate_pacman_successor(Direction::North);
        assert_eq!(next.pacman_position(), s.pacman_position());
    }

    #[test]
    fn test_display_round_trips_layout() {
        let s = state(layouts::TINY_MAZE);
        let drawn = format!("{}", s);
        let (maze, score) = drawn.rsplit_once('\n').expect("score line");
        assert_eq!(maze, layouts::TINY_MAZE.trim());
        assert_eq!(score, "score: 0");
    }

    fn direction() -> impl Strategy<Value = Direction> {
        prop_oneof![
            Just(Direction::North),
            Just(Direction::South),
            Just(Direction::East),
            Just(Direction::West),
            Just(Direction::Stop),
        ]
    }

    proptest! {
        #[test]
        fn test_random_play_keeps_invariants(
            moves in prop::collection::vec((0..2usize, direction()), 0..60),
        ) {
            let mut s = state(layouts::TEST_CLASSIC);
            let initial_food = s.food_count();
            for (agent, action) in moves {
                let before = s.clone();
                s = s.generate_successor(agent, action);

                prop_assert!(!s.layout().is_wall(s.pacman_position()));
                for ghost in s.ghost_positions() {
                    prop_assert!(!s.layout().is_wall(*ghost));
                }
                prop_assert!(s.food_count() <= before.food_count());
                prop_assert_eq!(s.food_count(), s.food_positions().len());
                if before.outcome().is_some() {
                    prop_assert_eq!(&s, &before);
                }
                if s.is_win() {
                    prop_assert_eq!(s.food_count(), 0);
                }
            }
            prop_assert!(s.food_count() <= initial_food);
        }
    }
}
