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

// Discount, noise and living reward settings that make value iteration produce particular
// policies on the bridge and discount grids.

use clap::Parser;
use env_logger::Env;
use gridworld::{bridge_grid, discount_grid, GridWorld};
use log::info;
use value_iteration::{Float, ValueIterationAgent};

/// Print the gridworld analysis answers and the policies they produce.
#[derive(Parser, Debug)]
#[command(name = "gridworld-analysis")]
struct Cli {
    /// Value iteration sweeps per answer.
    #[arg(short, long, default_value = "100")]
    iterations: u32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Parameters {
    discount: Float,
    noise: Float,
    living_reward: Float,
}

impl Parameters {
    fn new(discount: Float, noise: Float, living_reward: Float) -> Self {
        Self {
            discount,
            noise,
            living_reward,
        }
    }
}

struct Question {
    name: &'static str,
    goal: &'static str,
    grid: fn() -> GridWorld,
    /// None when no setting produces the goal policy.
    answer: Option<Parameters>,
}

fn questions() -> Vec<Question> {
    vec![
        Question {
            name: "question2",
            goal: "cross the bridge",
            grid: bridge_grid,
            answer: Some(Parameters::new(0.9, 0.0, 0.0)),
        },
        Question {
            name: "question3a",
            goal: "prefer the close exit, risking the cliff",
            grid: discount_grid,
            answer: Some(Parameters::new(0.01, 0.0, 0.0)),
        },
        Question {
            name: "question3b",
            goal: "prefer the close exit, avoiding the cliff",
            grid: discount_grid,
            answer: Some(Parameters::new(0.2, 0.2, -0.1)),
        },
        Question {
            name: "question3c",
            goal: "prefer the distant exit, risking the cliff",
            grid: discount_grid,
            answer: Some(Parameters::new(0.5, 0.0, 0.0)),
        },
        Question {
            name: "question3d",
            goal: "prefer the distant exit, avoiding the cliff",
            grid: discount_grid,
            answer: Some(Parameters::new(0.9, 0.5, 0.0)),
        },
        Question {
            name: "question3e",
            goal: "avoid both exits and the cliff",
            grid: discount_grid,
            answer: Some(Parameters::new(1.0, 0.0, 10.0)),
        },
        Question {
            // No exploration rate and learning rate find the far exit within 50 episodes.
            name: "question6",
            goal: "learn to cross the bridge",
            grid: bridge_grid,
            answer: None,
        },
    ]
}

fn solve(
    question: &Question,
    parameters: Parameters,
    iterations: u32,
) -> Result<ValueIterationAgent<GridWorld>, Box<dyn std::error::Error>> {
    let grid = (question.grid)()
        .with_noise(parameters.noise)?
        .with_living_reward(parameters.living_reward);
    Ok(gridworld::solve(grid, parameters.discount, iterations)?)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    println!("Answers to analysis questions:");
    for question in questions() {
        let parameters = match question.answer {
            Some(parameters) => parameters,
            None => {
                println!("    {:<12} {}: not possible", question.name, question.goal);
                continue;
            }
        };
        println!(
            "    {:<12} {}: discount {}, noise {}, living reward {}",
            question.name,
            question.goal,
            parameters.discount,
            parameters.noise,
            parameters.living_reward
        );
        let agent = solve(&question, parameters, cli.iterations)?;
        info!("{} values:\n{}", question.name, agent.mdp().render_values(&agent));
        for line in agent.mdp().render_policy(&agent).lines() {
            println!("        {}", line);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use gridworld::{Cell, GridAction, GridState};

    use super::*;

    fn solved(name: &str) -> ValueIterationAgent<GridWorld> {
        let question = questions()
            .into_iter()
            .find(|question| question.name == name)
            .expect("known question");
        let parameters = question.answer.expect("has an answer");
        solve(&question, parameters, 100).expect("valid parameters")
    }

    fn at(row: usize, col: usize) -> GridState {
        GridState::Cell(Cell::new(row, col))
    }

    // Follow the greedy policy from the start as if every move succeeded, for at most
    // `max_steps` actions. Returns the actions taken and the cell exited from, if any.
    fn greedy_walk(
        agent: &ValueIterationAgent<GridWorld>,
        max_steps: usize,
    ) -> (Vec<GridAction>, Vec<Cell>, Option<Cell>) {
        let grid = agent.mdp();
        let mut cell = match grid.start_state() {
            GridState::Cell(cell) => cell,
            GridState::Terminal => return (Vec::new(), Vec::new(), None),
        };
        let mut actions = Vec::new();
        let mut visited = vec![cell];
        for _ in 0..max_steps {
            let action = match agent.policy(&GridState::Cell(cell)) {
                Some(action) => action,
                None => break,
            };
            actions.push(action);
            let next = match action {
                GridAction::Exit => return (actions, visited, Some(cell)),
                GridAction::North => cell.row.checked_sub(1).map(|row| Cell::new(row, cell.col)),
                GridAction::South => Some(Cell::new(cell.row + 1, cell.col)),
                GridAction::West => cell.col.checked_sub(1).map(|col| Cell::new(cell.row, col)),
                GridAction::East => Some(Cell::new(cell.row, cell.col + 1)),
            };
            cell = next.filter(|next| !grid.is_wall(*next)).unwrap_or(cell);
            visited.push(cell);
        }
        (actions, visited, None)
    }

    #[test]
    fn test_bridge_is_crossed() {
        let agent = solved("question2");
        let start = agent.mdp().start_state();
        assert_eq!(agent.policy(&start), Some(GridAction::East));
    }

    #[test]
    fn test_short_sighted_agent_takes_close_exit_along_cliff() {
        let agent = solved("question3a");
        assert_eq!(agent.policy(&agent.mdp().start_state()), Some(GridAction::East));
        assert_eq!(agent.policy(&at(3, 2)), Some(GridAction::North));
    }

    #[test]
    fn test_patient_agent_takes_distant_exit_along_cliff() {
        let agent = solved("question3c");
        assert_eq!(agent.policy(&agent.mdp().start_state()), Some(GridAction::East));
        assert_eq!(agent.policy(&at(3, 2)), Some(GridAction::East));
    }

    #[test]
    fn test_cautious_short_sighted_agent_climbs_to_close_exit() {
        use GridAction::*;
        let agent = solved("question3b");
        let (actions, _, exit) = greedy_walk(&agent, 20);
        assert_eq!(actions, vec![North, North, North, East, East, South, South, Exit]);
        assert_eq!(exit, Some(Cell::new(2, 2)));
    }

    #[test]
    fn test_cautious_patient_agent_goes_around_to_distant_exit() {
        let agent = solved("question3d");
        let (actions, visited, exit) = greedy_walk(&agent, 20);
        assert_eq!(exit, Some(Cell::new(2, 4)));
        assert_eq!(actions.first(), Some(&GridAction::North));
        // Only the start cell lies on the row above the cliff.
        assert_eq!(visited.iter().filter(|cell| cell.row == 3).count(), 1);
        assert!(visited.iter().any(|cell| cell.row == 0));
    }

    #[test]
    fn test_generous_living_reward_never_exits() {
        let agent = solved("question3e");
        assert_ne!(agent.policy(&agent.mdp().start_state()), Some(GridAction::South));
        let (actions, _, exit) = greedy_walk(&agent, 50);
        assert_eq!(exit, None);
        assert_eq!(actions.len(), 50);
        assert!(!actions.contains(&GridAction::Exit));
    }

    #[test]
    fn test_every_answer_is_valid() {
        for question in questions() {
            if let Some(parameters) = question.answer {
                assert!(solve(&question, parameters, 1).is_ok(), "{}", question.name);
            }
        }
        assert!(questions().iter().any(|question| question.answer.is_none()));
    }
}
