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

//! Agents that play Pacman with the search and evaluation procedures, and a loop that runs a
//! game between them.

use std::path::Path;

use adversarial_search::SearchConfig;
use graph_search::SearchStrategy;
use log::{debug, info};
use pacman_logic::{Direction, Outcome, PacmanState};
use serde::{Deserialize, Serialize};

pub mod agents;
pub mod evaluation;
pub mod features;

pub use adversarial_search::{Float, Rng};
pub use agents::{ClosestDotAgent, MultiAgentSearchAgent, RandomGhost, ReflexAgent};
pub use features::FeatureReflexAgent;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AgentError {
    #[error(transparent)]
    Search(#[from] adversarial_search::SearchError),

    #[error("agent {agent} has no legal actions")]
    NoLegalActions { agent: usize },

    /// Used by interactive agents when their input runs out.
    #[error("agent {agent} gave up")]
    Quit { agent: usize },
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("could not parse config: {0}")]
    Json(#[from] serde_json::Error),

    #[error("search depth must be at least one ply")]
    ZeroDepth,
}

/// An agent picks a move for its own index given the current state. Randomized agents draw from
/// `rng` so a whole game is reproducible from one seed.
pub trait Agent {
    /// The agent index this agent plays: 0 for Pacman, 1 and up for ghosts.
    fn index(&self) -> usize;

    fn get_action(&mut self, state: &PacmanState, rng: &mut Rng) -> Result<Direction, AgentError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentKind {
    Reflex,
    FeatureReflex,
    MultiAgentSearch,
    ClosestDot,
}

/// Which state evaluation function a search agent uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvaluationKind {
    Score,
    Better,
}

impl EvaluationKind {
    pub fn function(&self) -> fn(&PacmanState) -> Float {
        match self {
            EvaluationKind::Score => evaluation::score_evaluation,
            EvaluationKind::Better => evaluation::better_evaluation,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    pub kind: AgentKind,
    /// Used by [`AgentKind::MultiAgentSearch`].
    pub search: SearchConfig,
    /// Used by [`AgentKind::MultiAgentSearch`].
    pub evaluation: EvaluationKind,
    /// Used by [`AgentKind::ClosestDot`].
    pub strategy: SearchStrategy,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            kind: AgentKind::MultiAgentSearch,
            search: SearchConfig::default(),
            evaluation: EvaluationKind::Better,
            strategy: SearchStrategy::AStar,
        }
    }
}

impl AgentConfig {
    /// Parse a config from JSON. Missing fields take their defaults.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: AgentConfig = serde_json::from_str(text)?;
        if config.kind == AgentKind::MultiAgentSearch && config.search.depth == 0 {
            return Err(ConfigError::ZeroDepth);
        }
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Build the Pacman agent this config describes.
    pub fn build(&self) -> Box<dyn Agent> {
        match self.kind {
            AgentKind::Reflex => Box::new(ReflexAgent),
            AgentKind::FeatureReflex => Box::<FeatureReflexAgent>::default(),
            AgentKind::MultiAgentSearch => {
                Box::new(MultiAgentSearchAgent::new(&self.search, self.evaluation))
            }
            AgentKind::ClosestDot => Box::new(ClosestDotAgent::new(self.strategy)),
        }
    }
}

/// Final tally of a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GameResult {
    pub score: i32,
    /// None if the round limit ran out first.
    pub outcome: Option<Outcome>,
    /// Rounds played. The last one may be partial if the game ended mid-round.
    pub rounds: usize,
}

/// A Simulation runs Pacman and the ghosts in turn order, one round at a time, until the game
/// ends or the round limit is reached.
pub struct Simulation {
    state: PacmanState,
    agents: Vec<Box<dyn Agent>>,
    max_rounds: usize,
    rounds: usize,
}

impl Simulation {
    /// Pacman against one [`RandomGhost`] per ghost in the layout.
    pub fn new(state: PacmanState, pacman: Box<dyn Agent>, max_rounds: usize) -> Self {
        let mut agents = vec![pacman];
        for index in 1..state.num_agents() {
            agents.push(Box::new(RandomGhost::new(index)));
        }
        Self::with_agents(state, agents, max_rounds)
    }

    /// `agents` are run in the order given; each must play its own position in that order.
    pub fn with_agents(state: PacmanState, agents: Vec<Box<dyn Agent>>, max_rounds: usize) -> Self {
        Self {
            state,
            agents,
            max_rounds,
            rounds: 0,
        }
    }

    pub fn state(&self) -> &PacmanState {
        &self.state
    }

    pub fn is_over(&self) -> bool {
        self.state.outcome().is_some() || self.rounds >= self.max_rounds
    }

    /// Play one round: every agent moves once, stopping early if the game ends.
    pub fn step(&mut self, rng: &mut Rng) -> Result<(), AgentError> {
        for agent in self.agents.iter_mut() {
            if self.state.outcome().is_some() {
                break;
            }
            let index = agent.index();
            let action = agent.get_action(&self.state, rng)?;
            debug!("round {} agent {} plays {}", self.rounds, index, action);
            self.state = self.state.generate_successor(index, action);
        }
        self.rounds += 1;
        Ok(())
    }

    /// Play until the game ends or the round limit is reached.
    pub fn run(&mut self, rng: &mut Rng) -> Result<GameResult, AgentError> {
        while !self.is_over() {
            self.step(rng)?;
        }
        let result = self.result();
        info!(
            "game over after {} rounds: {:?} with score {}",
            result.rounds, result.outcome, result.score
        );
        Ok(result)
    }

    pub fn result(&self) -> GameResult {
        GameResult {
            score: self.state.score(),
            outcome: self.state.outcome(),
            rounds: self.rounds,
        }
    }
}
