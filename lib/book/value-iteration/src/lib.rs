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

//! Value iteration for finite Markov decision processes.
//!
//! See Chapter 17, Making Complex Decisions, Figure 17.4. Each sweep applies the Bellman
//! optimality update to every state using only the previous sweep's values, so the table after
//! k sweeps is the Bellman operator applied k times to the all-zero table. There is no
//! convergence test: the caller decides how many sweeps to run.

use std::fmt::Debug;
use std::hash::Hash;

use agent_collections::Counter;
use log::{debug, trace};
use serde::{Deserialize, Serialize};

pub use agent_collections::Float;

/// A finite MDP supplied by the host environment.
pub trait MarkovDecisionProcess {
    type State: Clone + Eq + Hash + Debug;
    type Action: Clone + PartialEq + Debug;

    fn states(&self) -> Vec<Self::State>;

    /// Actions available in `state`. Empty for terminal states.
    fn possible_actions(&self, state: &Self::State) -> Vec<Self::Action>;

    /// (next state, probability) pairs. The probabilities sum to one.
    fn transitions(&self, state: &Self::State, action: &Self::Action) -> Vec<(Self::State, Float)>;

    fn reward(&self, state: &Self::State, action: &Self::Action, next_state: &Self::State) -> Float;
}

#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum ValueIterationError {
    #[error("discount must be within [0, 1], got {0}")]
    InvalidDiscount(Float),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValueIterationConfig {
    pub discount: Float,
    pub iterations: u32,
}

impl Default for ValueIterationConfig {
    fn default() -> Self {
        Self {
            discount: 0.9,
            iterations: 100,
        }
    }
}

/// Runs value iteration when constructed, then answers value, Q-value and policy queries from the
/// final table.
#[derive(Debug, Clone)]
pub struct ValueIterationAgent<M>
where
    M: MarkovDecisionProcess,
{
    mdp: M,
    discount: Float,
    iterations: u32,
    values: Counter<M::State>,
}

impl<M> ValueIterationAgent<M>
where
    M: MarkovDecisionProcess,
{
    pub fn new(mdp: M, discount: Float, iterations: u32) -> Result<Self, ValueIterationError> {
        if !(0.0..=1.0).contains(&discount) {
            return Err(ValueIterationError::InvalidDiscount(discount));
        }
        let mut agent = Self {
            mdp,
            discount,
            iterations,
            values: Counter::new(),
        };
        agent.run();
        Ok(agent)
    }

    pub fn from_config(mdp: M, config: &ValueIterationConfig) -> Result<Self, ValueIterationError> {
        Self::new(mdp, config.discount, config.iterations)
    }

    fn run(&mut self) {
        let states = self.mdp.states();
        for sweep in 0..self.iterations {
            // States without actions are never written, so they keep reading as zero.
            let mut next_values = Counter::new();
            for state in &states {
                if let Some((_, q_value)) = self.best_action(state) {
                    next_values.set(state.clone(), q_value);
                }
            }
            self.values = next_values;
            trace!("value iteration sweep {} done", sweep + 1);
        }
        debug!(
            "ran {} sweeps of value iteration over {} states with discount {}",
            self.iterations,
            states.len(),
            self.discount
        );
    }

    /// Value of `state` after the configured number of sweeps.
    pub fn value(&self, state: &M::State) -> Float {
        self.values.get(state)
    }

    /// Expected discounted return of taking `action` in `state` and then following the current
    /// values. Recomputed on every call.
    pub fn q_value(&self, state: &M::State, action: &M::Action) -> Float {
        self.mdp
            .transitions(state, action)
            .iter()
            .map(|(next_state, probability)| {
                probability
                    * (self.mdp.reward(state, action, next_state)
                        + self.discount * self.values.get(next_state))
            })
            .sum()
    }

    /// The action with the highest Q-value, or None when `state` has no actions. Ties go to the
    /// first action the MDP lists.
    pub fn policy(&self, state: &M::State) -> Option<M::Action> {
        self.best_action(state).map(|(action, _)| action)
    }

    /// Same as [`Self::policy`]; value iteration never explores.
    pub fn action(&self, state: &M::State) -> Option<M::Action> {
        self.policy(state)
    }

    fn best_action(&self, state: &M::State) -> Option<(M::Action, Float)> {
        let mut best: Option<(M::Action, Float)> = None;
        for action in self.mdp.possible_actions(state) {
            let q_value = self.q_value(state, &action);
            let improves = match &best {
                None => true,
                Some((_, best_q_value)) => q_value > *best_q_value,
            };
            if improves {
                best = Some((action, q_value));
            }
        }
        best
    }

    pub fn values(&self) -> &Counter<M::State> {
        &self.values
    }

    pub fn mdp(&self) -> &M {
        &self.mdp
    }

    pub fn discount(&self) -> Float {
        self.discount
    }

    pub fn iterations(&self) -> u32 {
        self.iterations
    }
}
