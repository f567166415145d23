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

//! Uninformed and informed graph search.
//!
//! See Chapter 3, Solving Problems by Searching. All four strategies are the graph search of
//! Figure 3.7: a node is goal-tested when it is popped, and a state is expanded at most once.
//! Successors already expanded are not pushed again, but a state that is merely waiting on the
//! fringe can be pushed a second time with a different path. The copy with the better priority
//! gets expanded first and the other is skipped when popped.

use std::fmt::Debug;
use std::hash::Hash;

use agent_collections::{Fringe, PriorityQueue, Queue, Stack};
use log::{debug, trace};
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

pub use agent_collections::Float;

/// One edge out of a state: where it leads, the action that takes it, and what it costs.
#[derive(Debug, Clone, PartialEq)]
pub struct Successor<_State, _Action> {
    pub state: _State,
    pub action: _Action,
    pub cost: Float,
}

impl<_State, _Action> Successor<_State, _Action> {
    pub fn new(state: _State, action: _Action, cost: Float) -> Self {
        Self {
            state,
            action,
            cost,
        }
    }
}

/// A SearchProblem is supplied by the host environment. The search procedures never mutate it.
pub trait SearchProblem {
    type State: Clone + Eq + Hash + Debug;
    type Action: Clone + Debug;

    fn start_state(&self) -> Self::State;
    fn is_goal(&self, state: &Self::State) -> bool;
    fn successors(&self, state: &Self::State) -> Vec<Successor<Self::State, Self::Action>>;

    /// Total cost of following `actions` from the start state. Must agree with the sum of the
    /// step costs reported by `successors`.
    fn path_cost(&self, actions: &[Self::Action]) -> Float;
}

#[derive(Debug, Clone)]
struct SearchNode<_State, _Action> {
    state: _State,
    path: Vec<_Action>,
    cost: Float,
}

/// The graph search loop shared by every strategy. `priority` maps a state and the cost of the
/// path to it onto the fringe priority; stacks and queues ignore it.
fn graph_search<P, F, H>(problem: &P, mut fringe: F, priority: H) -> Option<Vec<P::Action>>
where
    P: SearchProblem,
    F: Fringe<SearchNode<P::State, P::Action>>,
    H: Fn(&P::State, Float) -> Float,
{
    let start = problem.start_state();
    let start_priority = priority(&start, 0.0);
    fringe.push(
        SearchNode {
            state: start,
            path: Vec::new(),
            cost: 0.0,
        },
        start_priority,
    );

    let mut expanded: FxHashSet<P::State> = FxHashSet::default();
    while let Some(node) = fringe.pop() {
        if problem.is_goal(&node.state) {
            debug!(
                "found goal after expanding {} states, path length {}, cost {}",
                expanded.len(),
                node.path.len(),
                node.cost
            );
            return Some(node.path);
        }
        if !expanded.insert(node.state.clone()) {
            continue;
        }
        trace!("expanding {:?}", node.state);

        for successor in problem.successors(&node.state) {
            if expanded.contains(&successor.state) {
                continue;
            }
            let mut path = node.path.clone();
            path.push(successor.action);
            let cost = node.cost + successor.cost;
            let successor_priority = priority(&successor.state, cost);
            fringe.push(
                SearchNode {
                    state: successor.state,
                    path,
                    cost,
                },
                successor_priority,
            );
        }
    }

    debug!("no path found after expanding {} states", expanded.len());
    None
}

/// Search the deepest nodes in the search tree first. See page 85.
pub fn depth_first_search<P: SearchProblem>(problem: &P) -> Option<Vec<P::Action>> {
    graph_search(problem, Stack::new(), |_, _| 0.0)
}

/// Search the shallowest nodes in the search tree first. See page 81.
pub fn breadth_first_search<P: SearchProblem>(problem: &P) -> Option<Vec<P::Action>> {
    graph_search(problem, Queue::new(), |_, _| 0.0)
}

/// Search the node of least total path cost first. See page 84.
pub fn uniform_cost_search<P: SearchProblem>(problem: &P) -> Option<Vec<P::Action>> {
    graph_search(problem, PriorityQueue::new(), |_, cost| cost)
}

/// Search the node with the lowest path cost plus heuristic estimate first. See page 93.
///
/// The result is only guaranteed optimal if `heuristic` never overestimates the remaining cost.
pub fn a_star_search<P, H>(problem: &P, heuristic: H) -> Option<Vec<P::Action>>
where
    P: SearchProblem,
    H: Fn(&P::State, &P) -> Float,
{
    graph_search(problem, PriorityQueue::new(), |state, cost| {
        cost + heuristic(state, problem)
    })
}

/// The trivial heuristic. A* with it behaves like uniform-cost search.
pub fn null_heuristic<P: SearchProblem>(_state: &P::State, _problem: &P) -> Float {
    0.0
}

/// Strategy selector for agents that are configured rather than hard-coded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchStrategy {
    DepthFirst,
    BreadthFirst,
    UniformCost,
    AStar,
}

impl SearchStrategy {
    /// Run the selected strategy. `heuristic` is only consulted by A*.
    pub fn search<P, H>(&self, problem: &P, heuristic: H) -> Option<Vec<P::Action>>
    where
        P: SearchProblem,
        H: Fn(&P::State, &P) -> Float,
    {
        match self {
            SearchStrategy::DepthFirst => depth_first_search(problem),
            SearchStrategy::BreadthFirst => breadth_first_search(problem),
            SearchStrategy::UniformCost => uniform_cost_search(problem),
            SearchStrategy::AStar => a_star_search(problem, heuristic),
        }
    }
}
