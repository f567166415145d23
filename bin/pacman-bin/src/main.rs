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

use std::io::BufRead;
use std::path::{Path, PathBuf};

use clap::Parser;
use env_logger::Env;
use log::info;
use pacman_agents::{Agent, AgentConfig, AgentError, Rng, Simulation};
use pacman_logic::{layouts, Direction, Layout, PacmanState};
use rand::SeedableRng;

/// Play a game of Pacman against random ghosts.
#[derive(Parser, Debug)]
#[command(name = "pacman")]
struct Cli {
    /// Layout file, or the name of a built-in layout.
    #[arg(short, long, default_value = "testClassic")]
    layout: String,

    /// JSON agent config. Defaults to alpha-beta search at depth 2.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Random seed for ghosts and tie-breaking.
    #[arg(long, default_value = "42")]
    seed: u64,

    /// Stop after this many rounds.
    #[arg(long, default_value = "1000")]
    max_steps: usize,

    /// Steer Pacman from stdin with w/a/s/d, or space to stop.
    #[arg(long)]
    human: bool,
}

/// Pacman driven from a line-oriented reader.
struct HumanAgent<R> {
    input: R,
}

impl<R: BufRead> HumanAgent<R> {
    fn new(input: R) -> Self {
        Self { input }
    }
}

fn parse_direction(line: &str) -> Option<Direction> {
    match line.trim_end_matches(['\r', '\n']) {
        "w" | "n" | "north" => Some(Direction::North),
        "s" | "south" => Some(Direction::South),
        "d" | "e" | "east" => Some(Direction::East),
        "a" | "west" => Some(Direction::West),
        "" | " " | "stop" => Some(Direction::Stop),
        _ => None,
    }
}

impl<R: BufRead> Agent for HumanAgent<R> {
    fn index(&self) -> usize {
        0
    }

    fn get_action(&mut self, state: &PacmanState, _rng: &mut Rng) -> Result<Direction, AgentError> {
        println!("{}", state);
        let legal = state.get_legal_actions(0);
        loop {
            let mut line = String::new();
            match self.input.read_line(&mut line) {
                Ok(0) | Err(_) => return Err(AgentError::Quit { agent: 0 }),
                Ok(_) => {}
            }
            match parse_direction(&line) {
                Some(direction) if legal.contains(&direction) => return Ok(direction),
                _ => println!("legal moves: {:?}", legal),
            }
        }
    }
}

fn load_layout(layout: &str) -> Result<Layout, Box<dyn std::error::Error>> {
    let text = match layouts::by_name(layout) {
        Some(text) => text.to_string(),
        None => std::fs::read_to_string(Path::new(layout))?,
    };
    Ok(Layout::parse(&text)?)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let layout = load_layout(&cli.layout)?;
    let config = match &cli.config {
        Some(path) => AgentConfig::from_file(path)?,
        None => AgentConfig::default(),
    };
    info!("layout {} with config {:?}", cli.layout, config);

    let pacman: Box<dyn Agent> = if cli.human {
        Box::new(HumanAgent::new(std::io::stdin().lock()))
    } else {
        config.build()
    };
    let mut rng = Rng::seed_from_u64(cli.seed);
    let mut simulation = Simulation::new(PacmanState::new(layout), pacman, cli.max_steps);

    let result = match simulation.run(&mut rng) {
        Ok(result) => result,
        Err(AgentError::Quit { .. }) => simulation.result(),
        Err(err) => return Err(err.into()),
    };
    println!("{}", simulation.state());
    match result.outcome {
        Some(outcome) => println!(
            "{:?} with score {} after {} rounds",
            outcome, result.score, result.rounds
        ),
        None => println!(
            "no result after {} rounds, score {}",
            result.rounds, result.score
        ),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_direction() {
        assert_eq!(parse_direction("w\n"), Some(Direction::North));
        assert_eq!(parse_direction("a\r\n"), Some(Direction::West));
        assert_eq!(parse_direction("\n"), Some(Direction::Stop));
        assert_eq!(parse_direction("jump\n"), None);
    }

    #[test]
    fn test_human_agent_skips_illegal_input_and_quits_at_eof() {
        let layout = Layout::parse("%%%%%\n%P .%\n%%%%%").expect("valid layout");
        let state = PacmanState::new(layout);
        let mut rng = Rng::seed_from_u64(0);

        // West is a wall, so the agent keeps reading until it sees a legal move.
        let mut agent = HumanAgent::new("a\nd\n".as_bytes());
        assert_eq!(agent.get_action(&state, &mut rng), Ok(Direction::East));
        assert_eq!(
            agent.get_action(&state, &mut rng),
            Err(AgentError::Quit { agent: 0 })
        );
    }

    #[test]
    fn test_load_builtin_layout() {
        assert!(load_layout("tinyMaze").is_ok());
        assert!(load_layout("/nonexistent/layout.lay").is_err());
    }
}
