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

//! Pacman and ghost agents.

use std::collections::VecDeque;

use adversarial_search::{AdversarialSearch, SearchConfig};
use graph_search::SearchStrategy;
use log::debug;
use pacman_logic::search_problems::{nearest_food_heuristic, AnyFoodSearchProblem};
use pacman_logic::{Direction, PacmanState, Position};
use rand::seq::SliceRandom;

use crate::evaluation::reflex_evaluation;
use crate::features::best_of;
use crate::{Agent, AgentError, EvaluationKind, Float, Rng};

/// Pacman agent that looks one move ahead with [`reflex_evaluation`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ReflexAgent;

impl Agent for ReflexAgent {
    fn index(&self) -> usize {
        0
    }

    fn get_action(&mut self, state: &PacmanState, rng: &mut Rng) -> Result<Direction, AgentError> {
        let scored: Vec<(Direction, Float)> = state
            .get_legal_actions(0)
            .into_iter()
            .map(|action| (action, reflex_evaluation(state, action)))
            .collect();
        best_of(&scored, rng).ok_or(AgentError::NoLegalActions { agent: 0 })
    }
}

/// Pacman agent backed by minimax, alpha-beta or expectimax search.
#[derive(Debug, Clone)]
pub struct MultiAgentSearchAgent {
    search: AdversarialSearch<fn(&PacmanState) -> Float>,
}

impl MultiAgentSearchAgent {
    pub fn new(config: &SearchConfig, evaluation: EvaluationKind) -> Self {
        Self {
            search: AdversarialSearch::from_config(config, evaluation.function()),
        }
    }

    pub fn search(&self) -> &AdversarialSearch<fn(&PacmanState) -> Float> {
        &self.search
    }
}

impl Agent for MultiAgentSearchAgent {
    fn index(&self) -> usize {
        0
    }

    fn get_action(&mut self, state: &PacmanState, rng: &mut Rng) -> Result<Direction, AgentError> {
        Ok(self.search.choose_action(state, rng)?)
    }
}

/// Pacman agent that walks to the closest pellet along a planned path, then plans again. Ghosts
/// are ignored.
#[derive(Debug, Clone)]
pub struct ClosestDotAgent {
    strategy: SearchStrategy,
    plan: VecDeque<Direction>,
    /// Where the next planned step starts from.
    expected: Option<Position>,
}

impl ClosestDotAgent {
    pub fn new(strategy: SearchStrategy) -> Self {
        Self {
            strategy,
            plan: VecDeque::new(),
            expected: None,
        }
    }

    fn replan(&mut self, state: &PacmanState) {
        let problem = AnyFoodSearchProblem::from_state(state);
        let path = self
            .strategy
            .search(&problem, nearest_food_heuristic)
            .unwrap_or_default();
        debug!(
            "{:?} planned {} moves from {}",
            self.strategy,
            path.len(),
            state.pacman_position()
        );
        self.plan = path.into();
        self.expected = Some(state.pacman_position());
    }
}

impl Default for ClosestDotAgent {
    fn default() -> Self {
        Self::new(SearchStrategy::AStar)
    }
}

impl Agent for ClosestDotAgent {
    fn index(&self) -> usize {
        0
    }

    fn get_action(&mut self, state: &PacmanState, _rng: &mut Rng) -> Result<Direction, AgentError> {
        let legal = state.get_legal_actions(0);
        if legal.is_empty() {
            return Err(AgentError::NoLegalActions { agent: 0 });
        }
        // A plan made from another cell is stale even if its next step happens to be legal.
        let position = state.pacman_position();
        let on_track = self.expected == Some(position)
            && self.plan.front().map_or(false, |next| legal.contains(next));
        if !on_track {
            self.replan(state);
        }
        let action = self.plan.pop_front().unwrap_or(Direction::Stop);
        self.expected = action
            .apply(position)
            .filter(|next| !state.layout().is_wall(*next))
            .or(Some(position));
        Ok(action)
    }
}

/// Ghost that picks uniformly among its legal moves.
#[derive(Debug, Clone, Copy)]
pub struct RandomGhost {
    index: usize,
}

impl RandomGhost {
    /// A ghost playing agent `index`. Ghosts start at index 1.
    pub fn new(index: usize) -> Self {
        Self { index }
    }
}

impl Agent for RandomGhost {
    fn index(&self) -> usize {
        self.index
    }

    fn get_action(&mut self, state: &PacmanState, rng: &mut Rng) -> Result<Direction, AgentError> {
        state
            .get_legal_actions(self.index)
            .choose(rng)
            .copied()
            .ok_or(AgentError::NoLegalActions { agent: self.index })
    }
}
