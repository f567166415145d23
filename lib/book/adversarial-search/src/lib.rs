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

//! Depth-limited adversarial search for games with any number of agents.
//!
//! See Chapter 5, Adversarial Search. Agent 0 maximizes; every other agent either minimizes
//! (minimax, alpha-beta) or moves uniformly at random (expectimax). Agents move in the cyclic
//! order 0, 1, ..., n-1, and one ply is a full round of moves, so a depth of 2 with one ghost
//! looks four moves ahead.

use std::fmt::Debug;

use log::debug;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

pub type Float = f64;
pub type Rng = rand_pcg::Pcg64;

pub trait Action: Clone + Copy + PartialEq + Debug {
    /// Whether this is the null action ("stop", "pass"). Null actions are left out of the search
    /// unless they are the only thing an agent can do.
    fn is_wait(&self) -> bool {
        false
    }
}

/// An immutable snapshot of a turn-based game, supplied by the host environment.
pub trait GameState<_Action>: Clone + Debug
where
    _Action: Action,
{
    fn legal_actions(&self, agent: usize) -> Vec<_Action>;
    fn successor(&self, agent: usize, action: &_Action) -> Self;
    fn is_terminal(&self) -> bool;
    fn agent_count(&self) -> usize;
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SearchError {
    /// The host handed over a live state in which an agent cannot move at all.
    #[error("agent {agent} has no legal actions in a non-terminal state")]
    NoLegalActions { agent: usize },

    #[error("cannot choose an action from a terminal state")]
    TerminalState,

    #[error("search depth must be at least one ply")]
    ZeroDepth,

    #[error("game has no agents")]
    NoAgents,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Algorithm {
    Minimax,
    AlphaBeta,
    Expectimax,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub algorithm: Algorithm,
    /// Search depth in plies.
    pub depth: u32,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            algorithm: Algorithm::AlphaBeta,
            depth: 2,
        }
    }
}

/// AdversarialSearch pairs an algorithm and depth with a static evaluation function. The
/// evaluation function is only ever called on states where the search stops: terminal states
/// and states past the depth limit.
#[derive(Debug, Clone)]
pub struct AdversarialSearch<E> {
    algorithm: Algorithm,
    depth: u32,
    evaluation: E,
}

impl<E> AdversarialSearch<E> {
    pub fn new(algorithm: Algorithm, depth: u32, evaluation: E) -> Self {
        Self {
            algorithm,
            depth,
            evaluation,
        }
    }

    pub fn from_config(config: &SearchConfig, evaluation: E) -> Self {
        Self::new(config.algorithm, config.depth, evaluation)
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// Exact value of every root action for agent 0. Each root child is searched with a full
    /// window, so alpha-beta reports the same values as minimax.
    pub fn root_values<_State, _Action>(
        &self,
        state: &_State,
    ) -> Result<Vec<(_Action, Float)>, SearchError>
    where
        _State: GameState<_Action>,
        _Action: Action,
        E: Fn(&_State) -> Float,
    {
        if self.depth == 0 {
            return Err(SearchError::ZeroDepth);
        }
        if state.is_terminal() {
            return Err(SearchError::TerminalState);
        }
        let agent_count = state.agent_count();
        if agent_count == 0 {
            return Err(SearchError::NoAgents);
        }

        let (next_agent, next_ply) = next_turn(0, 1, agent_count);
        searchable_actions(state, 0)?
            .into_iter()
            .map(|action| {
                let child = state.successor(0, &action);
                let value = self.search_value(
                    &child,
                    next_ply,
                    next_agent,
                    Float::NEG_INFINITY,
                    Float::INFINITY,
                )?;
                Ok((action, value))
            })
            .collect()
    }

    /// Pick the best action for agent 0. Ties are broken uniformly at random with `rng`.
    pub fn choose_action<_State, _Action>(
        &self,
        state: &_State,
        rng: &mut Rng,
    ) -> Result<_Action, SearchError>
    where
        _State: GameState<_Action>,
        _Action: Action,
        E: Fn(&_State) -> Float,
    {
        let values = self.root_values(state)?;
        let best_value = values
            .iter()
            .map(|(_, value)| *value)
            .fold(Float::NEG_INFINITY, Float::max);
        let tied: Vec<_Action> = values
            .iter()
            .filter(|(_, value)| *value == best_value)
            .map(|(action, _)| *action)
            .collect();
        // Every root value is NaN only if the evaluation function produced NaN everywhere.
        let candidates: Vec<_Action> = if tied.is_empty() {
            values.iter().map(|(action, _)| *action).collect()
        } else {
            tied
        };
        let action = *candidates
            .choose(rng)
            .ok_or(SearchError::NoLegalActions { agent: 0 })?;
        debug!(
            "{:?} depth {} chose {:?} with value {} among {} tied actions",
            self.algorithm,
            self.depth,
            action,
            best_value,
            candidates.len()
        );
        Ok(action)
    }

    /// Value of `state` for agent 0 at the configured depth. Terminal states and a depth of zero
    /// fall straight through to the evaluation function.
    pub fn value<_State, _Action>(&self, state: &_State) -> Result<Float, SearchError>
    where
        _State: GameState<_Action>,
        _Action: Action,
        E: Fn(&_State) -> Float,
    {
        if !state.is_terminal() && self.depth > 0 && state.agent_count() == 0 {
            return Err(SearchError::NoAgents);
        }
        self.search_value(state, 1, 0, Float::NEG_INFINITY, Float::INFINITY)
    }

    fn search_value<_State, _Action>(
        &self,
        state: &_State,
        ply: u32,
        agent: usize,
        mut alpha: Float,
        mut beta: Float,
    ) -> Result<Float, SearchError>
    where
        _State: GameState<_Action>,
        _Action: Action,
        E: Fn(&_State) -> Float,
    {
        if ply > self.depth || state.is_terminal() {
            return Ok((self.evaluation)(state));
        }

        let actions = searchable_actions(state, agent)?;
        let (next_agent, next_ply) = next_turn(agent, ply, state.agent_count());
        let prune = self.algorithm == Algorithm::AlphaBeta;

        if agent == 0 {
            let mut best = Float::NEG_INFINITY;
            for action in actions {
                let child = state.successor(agent, &action);
                let value = self.search_value(&child, next_ply, next_agent, alpha, beta)?;
                best = best.max(value);
                if prune {
                    if best >= beta {
                        return Ok(best);
                    }
                    alpha = alpha.max(best);
                }
            }
            return Ok(best);
        }

        if self.algorithm == Algorithm::Expectimax {
            let mut total = 0.0;
            for action in &actions {
                let child = state.successor(agent, action);
                total += self.search_value(&child, next_ply, next_agent, alpha, beta)?;
            }
            return Ok(total / actions.len() as Float);
        }

        let mut best = Float::INFINITY;
        for action in actions {
            let child = state.successor(agent, &action);
            let value = self.search_value(&child, next_ply, next_agent, alpha, beta)?;
            best = best.min(value);
            if prune {
                if best <= alpha {
                    return Ok(best);
                }
                beta = beta.min(best);
            }
        }
        Ok(best)
    }
}

/// Agent and ply that move after `agent`. The ply advances when the turn wraps back to agent 0.
fn next_turn(agent: usize, ply: u32, agent_count: usize) -> (usize, u32) {
    let next_agent = (agent + 1) % agent_count;
    if next_agent == 0 {
        (next_agent, ply + 1)
    } else {
        (next_agent, ply)
    }
}

fn searchable_actions<_State, _Action>(
    state: &_State,
    agent: usize,
) -> Result<Vec<_Action>, SearchError>
where
    _State: GameState<_Action>,
    _Action: Action,
{
    let legal = state.legal_actions(agent);
    if legal.is_empty() {
        return Err(SearchError::NoLegalActions { agent });
    }
    let moves: Vec<_Action> = legal.iter().copied().filter(|a| !a.is_wait()).collect();
    if moves.is_empty() {
        Ok(legal)
    } else {
        Ok(moves)
    }
}
