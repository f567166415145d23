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

//! Linear feature evaluation for reflex agents.
//!
//! A feature vector and a weight vector are both [`Counter`]s keyed by feature name, and the value
//! of an action is their dot product.

use agent_collections::Counter;
use log::trace;
use pacman_logic::{manhattan_distance, Direction, PacmanState};
use rand::seq::SliceRandom;

use crate::evaluation::nearest_distance;
use crate::{Agent, AgentError, Float, Rng};

/// Feature and weight vectors are keyed by feature name.
pub type FeatureVector = Counter<&'static str>;

/// The game score after the move.
pub const SUCCESSOR_SCORE: &str = "successor_score";
/// Distance from Pacman's new cell to the nearest pellet. Absent when no food is left.
pub const DISTANCE_TO_FOOD: &str = "distance_to_food";
/// Number of ghosts within one step of Pacman's new cell.
pub const GHOST_NEARBY: &str = "ghost_nearby";
/// One when the action is `Stop`.
pub const STOP: &str = "stop";
/// One when the action turns Pacman around.
pub const REVERSE: &str = "reverse";

/// Features of Pacman taking `action` in `state`.
pub fn features(state: &PacmanState, action: Direction) -> FeatureVector {
    let successor = state.generate_pacman_successor(action);
    let position = successor.pacman_position();

    let mut features = FeatureVector::new();
    features.set(SUCCESSOR_SCORE, successor.score() as Float);
    if let Some(distance) = nearest_distance(position, successor.food_positions()) {
        features.set(DISTANCE_TO_FOOD, distance as Float);
    }
    let nearby = successor
        .ghost_positions()
        .iter()
        .filter(|ghost| manhattan_distance(**ghost, position) <= 1)
        .count();
    features.set(GHOST_NEARBY, nearby as Float);
    if action == Direction::Stop {
        features.set(STOP, 1.0);
    }
    let heading = state.pacman_direction();
    if heading != Direction::Stop && action == heading.reverse() {
        features.set(REVERSE, 1.0);
    }
    features
}

/// Hand-tuned weights for [`features`].
pub fn weights() -> FeatureVector {
    [
        (SUCCESSOR_SCORE, 100.0),
        (DISTANCE_TO_FOOD, -1.0),
        (GHOST_NEARBY, -1000.0),
        (STOP, -100.0),
        (REVERSE, -2.0),
    ]
    .into_iter()
    .collect()
}

/// Pacman agent that takes the action whose features score highest under a weight vector.
#[derive(Debug, Clone)]
pub struct FeatureReflexAgent {
    weights: FeatureVector,
}

impl Default for FeatureReflexAgent {
    fn default() -> Self {
        Self::new(weights())
    }
}

impl FeatureReflexAgent {
    /// An agent with custom weights.
    pub fn new(weights: FeatureVector) -> Self {
        Self { weights }
    }

    /// Weighted sum of the features of `action`.
    pub fn evaluate(&self, state: &PacmanState, action: Direction) -> Float {
        features(state, action).dot(&self.weights)
    }

    /// The weights in use.
    pub fn weights(&self) -> &FeatureVector {
        &self.weights
    }
}

impl Agent for FeatureReflexAgent {
    fn index(&self) -> usize {
        0
    }

    fn get_action(&mut self, state: &PacmanState, rng: &mut Rng) -> Result<Direction, AgentError> {
        let scored: Vec<(Direction, Float)> = state
            .get_legal_actions(0)
            .into_iter()
            .map(|action| (action, self.evaluate(state, action)))
            .collect();
        trace!("feature values: {:?}", scored);
        best_of(&scored, rng).ok_or(AgentError::NoLegalActions { agent: 0 })
    }
}

/// One of the highest-valued actions, picked uniformly at random.
pub(crate) fn best_of(scored: &[(Direction, Float)], rng: &mut Rng) -> Option<Direction> {
    let best = scored
        .iter()
        .map(|(_, value)| *value)
        .fold(Float::NEG_INFINITY, Float::max);
    let tied: Vec<Direction> = scored
        .iter()
        .filter(|(_, value)| *value == best)
        .map(|(action, _)| *action)
        .collect();
    tied.choose(rng).copied()
}

#[cfg(test)]
mod tests {
    use pacman_logic::Layout;
    use rand::SeedableRng;

    use super::*;

    fn state(text: &str) -> PacmanState {
        PacmanState::new(Layout::parse(text).expect("valid layout"))
    }

    #[test]
    fn test_features_next_to_ghost() {
        let s = state("%%%%%%\n%P G.%\n%%%%%%");

        let east = features(&s, Direction::East);
        assert_eq!(east.get(SUCCESSOR_SCORE), -1.0);
        assert_eq!(east.get(DISTANCE_TO_FOOD), 2.0);
        assert_eq!(east.get(GHOST_NEARBY), 1.0);
        assert_eq!(east.get(STOP), 0.0);
        assert_eq!(east.get(REVERSE), 0.0);

        let stop = features(&s, Direction::Stop);
        assert_eq!(stop.get(GHOST_NEARBY), 0.0);
        assert_eq!(stop.get(DISTANCE_TO_FOOD), 3.0);
        assert_eq!(stop.get(STOP), 1.0);
    }

    #[test]
    fn test_reverse_feature_follows_heading() {
        let s = state("%%%%%%\n%P  .%\n%%%%%%").generate_pacman_successor(Direction::East);
        assert_eq!(features(&s, Direction::West).get(REVERSE), 1.0);
        assert_eq!(features(&s, Direction::East).get(REVERSE), 0.0);
    }

    #[test]
    fn test_no_food_leaves_distance_unset() {
        let s = state("%%%%\n%P %\n%%%%");
        assert!(!features(&s, Direction::East).contains_key(DISTANCE_TO_FOOD));
    }

    #[test]
    fn test_agent_stays_away_from_ghost() {
        let s = state("%%%%%%\n%P G.%\n%%%%%%");
        let mut agent = FeatureReflexAgent::default();
        let mut rng = Rng::seed_from_u64(7);
        assert_eq!(agent.get_action(&s, &mut rng), Ok(Direction::Stop));
    }

    #[test]
    fn test_agent_eats_last_pellet() {
        let s = state("%%%%%\n%.P %\n%%%%%");
        let mut agent = FeatureReflexAgent::default();
        let mut rng = Rng::seed_from_u64(7);
        assert_eq!(agent.get_action(&s, &mut rng), Ok(Direction::West));
    }

    #[test]
    fn test_custom_weights() {
        let s = state("%%%%%\n%.P %\n%%%%%");
        let agent = FeatureReflexAgent::new([(STOP, 5.0)].into_iter().collect());
        assert_eq!(agent.evaluate(&s, Direction::Stop), 5.0);
        assert_eq!(agent.evaluate(&s, Direction::West), 0.0);
    }
}
