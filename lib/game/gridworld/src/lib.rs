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

//! Gridworld, a small Markov decision process.
//!
//! The agent walks a grid of cells. Moves are noisy: the intended direction is taken with
//! probability `1 - noise` and each of the two perpendicular directions with `noise / 2`. A move
//! into a wall or off the grid leaves the agent in place. Exit cells offer a single action, Exit,
//! which pays the cell's reward and ends the episode in the terminal state.

use std::fmt::Write as _;

use log::debug;
use serde::{Deserialize, Serialize};
use value_iteration::{Float, MarkovDecisionProcess, ValueIterationAgent};

/// Gridworld error.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GridWorldError {
    /// The grid has no rows or no columns.
    #[error("grid is empty")]
    Empty,

    /// A row is a different width from the first row.
    #[error("row {row} has {got} cells, expected {expected}")]
    RaggedRow {
        /// Index of the offending row.
        row: usize,
        /// Width of the first row.
        expected: usize,
        /// Width of the offending row.
        got: usize,
    },

    /// A cell is neither a wall, a start, an empty cell, nor a number.
    #[error("unknown cell {cell:?} at row {row}, column {col}")]
    UnknownCell {
        /// The cell text.
        cell: String,
        /// Row of the cell.
        row: usize,
        /// Column of the cell.
        col: usize,
    },

    /// No cell is marked `S`.
    #[error("grid has no start cell")]
    MissingStart,

    /// More than one cell is marked `S`.
    #[error("grid has more than one start cell")]
    MultipleStart,

    /// Noise must be a probability.
    #[error("noise must be within [0, 1], got {0}")]
    InvalidNoise(Float),
}

/// Cell coordinates. Row 0 is the top of the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Cell {
    /// Row, growing downward.
    pub row: usize,
    /// Column, growing rightward.
    pub col: usize,
}

impl Cell {
    /// Create a cell.
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

/// A gridworld state: the agent is on a cell, or the episode is over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GridState {
    /// The agent stands on this cell.
    Cell(Cell),
    /// Reached after exiting. Has no actions.
    Terminal,
}

/// Gridworld action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GridAction {
    /// Move up.
    North,
    /// Move down.
    South,
    /// Move right.
    East,
    /// Move left.
    West,
    /// Leave the grid from an exit cell.
    Exit,
}

impl GridAction {
    /// The four moving actions, in the order they are offered.
    pub const MOVES: [GridAction; 4] = [
        GridAction::North,
        GridAction::West,
        GridAction::South,
        GridAction::East,
    ];

    /// The two directions at right angles to this one. Exit has none.
    pub fn perpendicular(&self) -> Option<[GridAction; 2]> {
        match self {
            GridAction::North | GridAction::South => Some([GridAction::West, GridAction::East]),
            GridAction::East | GridAction::West => Some([GridAction::North, GridAction::South]),
            GridAction::Exit => None,
        }
    }

    /// Arrow used when drawing a policy.
    pub fn arrow(&self) -> char {
        match self {
            GridAction::North => '^',
            GridAction::South => 'v',
            GridAction::East => '>',
            GridAction::West => '<',
            GridAction::Exit => 'x',
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Square {
    Wall,
    Open,
    Exit(Float),
}

/// A parsed grid plus its noise and living reward.
#[derive(Debug, Clone, PartialEq)]
pub struct GridWorld {
    squares: Vec<Square>,
    width: usize,
    height: usize,
    start: Cell,
    noise: Float,
    living_reward: Float,
}

impl GridWorld {
    /// Parse a grid from rows of cell strings: `#` is a wall, `S` the start, an empty string,
    /// a space or `_` an empty cell, and a number an exit cell paying that reward.
    ///
    /// The grid starts with noise 0.2 and living reward 0.
    pub fn parse<R, C>(rows: &[R]) -> Result<Self, GridWorldError>
    where
        R: AsRef<[C]>,
        C: AsRef<str>,
    {
        let height = rows.len();
        let width = rows.first().map(|row| row.as_ref().len()).unwrap_or(0);
        if height == 0 || width == 0 {
            return Err(GridWorldError::Empty);
        }

        let mut squares = Vec::with_capacity(width * height);
        let mut start = None;
        for (row, cells) in rows.iter().enumerate() {
            let cells = cells.as_ref();
            if cells.len() != width {
                return Err(GridWorldError::RaggedRow {
                    row,
                    expected: width,
                    got: cells.len(),
                });
            }
            for (col, cell) in cells.iter().enumerate() {
                let text = cell.as_ref().trim();
                let square = match text {
                    "#" => Square::Wall,
                    "" | "_" => Square::Open,
                    "S" => {
                        if start.replace(Cell::new(row, col)).is_some() {
                            return Err(GridWorldError::MultipleStart);
                        }
                        Square::Open
                    }
                    _ => match text.parse::<Float>() {
                        Ok(reward) if reward.is_finite() => Square::Exit(reward),
                        _ => {
                            return Err(GridWorldError::UnknownCell {
                                cell: text.to_string(),
                                row,
                                col,
                            })
                        }
                    },
                };
                squares.push(square);
            }
        }

        Ok(Self {
            squares,
            width,
            height,
            start: start.ok_or(GridWorldError::MissingStart)?,
            noise: 0.2,
            living_reward: 0.0,
        })
    }

    /// Set the probability of slipping sideways.
    pub fn with_noise(mut self, noise: Float) -> Result<Self, GridWorldError> {
        if !(0.0..=1.0).contains(&noise) {
            return Err(GridWorldError::InvalidNoise(noise));
        }
        self.noise = noise;
        Ok(self)
    }

    /// Set the reward paid for every move.
    pub fn with_living_reward(mut self, living_reward: Float) -> Self {
        self.living_reward = living_reward;
        self
    }

    /// Number of columns.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Number of rows.
    pub fn height(&self) -> usize {
        self.height
    }

    /// The start state.
    pub fn start_state(&self) -> GridState {
        GridState::Cell(self.start)
    }

    /// Probability of slipping sideways.
    pub fn noise(&self) -> Float {
        self.noise
    }

    /// Reward paid for every move.
    pub fn living_reward(&self) -> Float {
        self.living_reward
    }

    /// Whether `cell` is a wall. Cells off the grid count as walls.
    pub fn is_wall(&self, cell: Cell) -> bool {
        self.square(cell).map_or(true, |square| square == Square::Wall)
    }

    /// The reward for exiting from `cell`, if it is an exit cell.
    pub fn exit_reward(&self, cell: Cell) -> Option<Float> {
        match self.square(cell) {
            Some(Square::Exit(reward)) => Some(reward),
            _ => None,
        }
    }

    fn square(&self, cell: Cell) -> Option<Square> {
        if cell.row < self.height && cell.col < self.width {
            Some(self.squares[cell.row * self.width + cell.col])
        } else {
            None
        }
    }

    /// Where a move from `cell` in `direction` ends up.
    fn destination(&self, cell: Cell, direction: GridAction) -> Cell {
        let next = match direction {
            GridAction::North => cell.row.checked_sub(1).map(|row| Cell::new(row, cell.col)),
            GridAction::South => Some(Cell::new(cell.row + 1, cell.col)),
            GridAction::West => cell.col.checked_sub(1).map(|col| Cell::new(cell.row, col)),
            GridAction::East => Some(Cell::new(cell.row, cell.col + 1)),
            GridAction::Exit => None,
        };
        next.filter(|next| !self.is_wall(*next)).unwrap_or(cell)
    }

    /// Draw the greedy policy of `agent`: an arrow per open cell, `x` on exits, `#` on walls.
    pub fn render_policy(&self, agent: &ValueIterationAgent<GridWorld>) -> String {
        let mut out = String::with_capacity((self.width + 1) * self.height);
        for row in 0..self.height {
            for col in 0..self.width {
                let cell = Cell::new(row, col);
                let c = if self.is_wall(cell) {
                    '#'
                } else {
                    agent
                        .policy(&GridState::Cell(cell))
                        .map_or('.', |action| action.arrow())
                };
                out.push(c);
            }
            if row + 1 < self.height {
                out.push('\n');
            }
        }
        out
    }

    /// Draw the value of every open cell, one row per line.
    pub fn render_values(&self, agent: &ValueIterationAgent<GridWorld>) -> String {
        let mut out = String::new();
        for row in 0..self.height {
            for col in 0..self.width {
                let cell = Cell::new(row, col);
                if col > 0 {
                    out.push(' ');
                }
                if self.is_wall(cell) {
                    out.push_str("   ####");
                } else {
                    // Writing to a String cannot fail.
                    let _ = write!(out, "{:7.2}", agent.value(&GridState::Cell(cell)));
                }
            }
            if row + 1 < self.height {
                out.push('\n');
            }
        }
        out
    }
}

impl MarkovDecisionProcess for GridWorld {
    type State = GridState;
    type Action = GridAction;

    fn states(&self) -> Vec<GridState> {
        let mut states = vec![GridState::Terminal];
        for row in 0..self.height {
            for col in 0..self.width {
                let cell = Cell::new(row, col);
                if !self.is_wall(cell) {
                    states.push(GridState::Cell(cell));
                }
            }
        }
        states
    }

    fn possible_actions(&self, state: &GridState) -> Vec<GridAction> {
        match state {
            GridState::Terminal => Vec::new(),
            GridState::Cell(cell) if self.exit_reward(*cell).is_some() => vec![GridAction::Exit],
            GridState::Cell(_) => GridAction::MOVES.to_vec(),
        }
    }

    fn transitions(&self, state: &GridState, action: &GridAction) -> Vec<(GridState, Float)> {
        let cell = match state {
            GridState::Terminal => return Vec::new(),
            GridState::Cell(cell) => *cell,
        };
        let sideways = match action.perpendicular() {
            None => return vec![(GridState::Terminal, 1.0)],
            Some(sideways) => sideways,
        };

        let mut outcomes: Vec<(GridState, Float)> = Vec::with_capacity(3);
        let candidates = [
            (*action, 1.0 - self.noise),
            (sideways[0], self.noise / 2.0),
            (sideways[1], self.noise / 2.0),
        ];
        for (direction, probability) in candidates {
            if probability <= 0.0 {
                continue;
            }
            let next = GridState::Cell(self.destination(cell, direction));
            match outcomes.iter_mut().find(|(state, _)| *state == next) {
                Some((_, total)) => *total += probability,
                None => outcomes.push((next, probability)),
            }
        }
        outcomes
    }

    fn reward(&self, state: &GridState, action: &GridAction, _next_state: &GridState) -> Float {
        match (state, action) {
            (GridState::Terminal, _) => 0.0,
            (GridState::Cell(cell), GridAction::Exit) => self.exit_reward(*cell).unwrap_or(0.0),
            (GridState::Cell(_), _) => self.living_reward,
        }
    }
}

/// Run value iteration on `grid` and log the resulting policy.
pub fn solve(
    grid: GridWorld,
    discount: Float,
    iterations: u32,
) -> Result<ValueIterationAgent<GridWorld>, value_iteration::ValueIterationError> {
    let agent = ValueIterationAgent::new(grid, discount, iterations)?;
    debug!(
        "value of start after {} sweeps: {:.4}",
        iterations,
        agent.value(&agent.mdp().start_state())
    );
    Ok(agent)
}

fn preset(rows: &[&[&str]]) -> GridWorld {
    match GridWorld::parse(rows) {
        Ok(grid) => grid,
        Err(err) => unreachable!("preset grid does not parse: {}", err),
    }
}

/// The 4x3 grid from the textbook. See Figure 17.1.
pub fn book_grid() -> GridWorld {
    preset(&[
        &["_", "_", "_", "1"],
        &["_", "#", "_", "-1"],
        &["S", "_", "_", "_"],
    ])
}

/// A narrow bridge between a small and a large exit, with a chasm on either side.
pub fn bridge_grid() -> GridWorld {
    preset(&[
        &["#", "-100", "-100", "-100", "-100", "-100", "#"],
        &["1", "S", "_", "_", "_", "_", "10"],
        &["#", "-100", "-100", "-100", "-100", "-100", "#"],
    ])
}

/// A close exit worth 1 and a distant exit worth 10, above a cliff.
pub fn discount_grid() -> GridWorld {
    preset(&[
        &["_", "_", "_", "_", "_"],
        &["_", "#", "_", "_", "_"],
        &["_", "#", "1", "#", "10"],
        &["S", "_", "_", "_", "_"],
        &["-10", "-10", "-10", "-10", "-10"],
    ])
}

/// Two exits on either side of the start, along a cliff edge.
pub fn cliff_grid() -> GridWorld {
    preset(&[
        &["_", "_", "_", "_", "_"],
        &["8", "S", "_", "_", "10"],
        &["-100", "-100", "-100", "-100", "-100"],
    ])
}

/// Look up a preset grid by name.
pub fn by_name(name: &str) -> Option<GridWorld> {
    match name {
        "book" | "book_grid" | "bookGrid" => Some(book_grid()),
        "bridge" | "bridge_grid" | "bridgeGrid" => Some(bridge_grid()),
        "discount" | "discount_grid" | "discountGrid" => Some(discount_grid()),
        "cliff" | "cliff_grid" | "cliffGrid" => Some(cliff_grid()),
        _ => None,
    }
}
