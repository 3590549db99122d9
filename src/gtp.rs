//! Go Text Protocol (GTP) front end.
//!
//! Implements the subset of GTP version 2 a GUI needs to play against the
//! engine:
//!
//! - `name`, `version`, `protocol_version`
//! - `list_commands`, `known_command <cmd>`, `quit`
//! - `boardsize <size>` - only 9 is accepted
//! - `clear_board`, `komi <value>`
//! - `play <color> <vertex>` - color must be the side to move
//! - `genmove <color>`
//! - `showboard`, `final_score`
//!
//! ## Example
//!
//! ```ignore
//! use ucb_go::gtp::GtpEngine;
//! let mut engine = GtpEngine::new(Default::default(), Default::default());
//! engine.run(std::io::stdin().lock(), std::io::stdout())?;
//! ```

use std::io::{self, BufRead, Write};

use tracing::warn;

use crate::board::{BoardState, Color};
use crate::constants::N;
use crate::driver::{PlayConfig, genmove};
use crate::mcts::{Mcts, MctsConfig};
use crate::moves::{Move, parse_vertex, vertex_string};

/// The list of known GTP commands.
const KNOWN_COMMANDS: &[&str] = &[
    "boardsize",
    "clear_board",
    "final_score",
    "genmove",
    "known_command",
    "komi",
    "list_commands",
    "name",
    "play",
    "protocol_version",
    "quit",
    "showboard",
    "version",
];

/// GTP engine state.
pub struct GtpEngine {
    /// Current game state
    state: BoardState,
    /// Search tree for the current game
    mcts: Mcts,
    mcts_cfg: MctsConfig,
    play_cfg: PlayConfig,
}

impl GtpEngine {
    pub fn new(mcts_cfg: MctsConfig, play_cfg: PlayConfig) -> Self {
        Self {
            state: BoardState::new(),
            mcts: Mcts::new(mcts_cfg),
            mcts_cfg,
            play_cfg,
        }
    }

    /// Use `komi` instead of the default for this and every cleared game.
    pub fn with_komi(mut self, komi: f64) -> Self {
        self.reset(komi);
        self
    }

    pub fn state(&self) -> &BoardState {
        &self.state
    }

    /// Start a new game with the given komi and a fresh search tree.
    fn reset(&mut self, komi: f64) {
        self.state = BoardState::with_komi(komi);
        self.mcts = Mcts::new(self.mcts_cfg);
    }

    /// Run the GTP command loop until `quit` or end of input.
    pub fn run(&mut self, input: impl BufRead, mut output: impl Write) -> io::Result<()> {
        for line in input.lines() {
            let line = line?;

            // Skip empty lines and comments
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let (id, command_line) = Self::parse_id(line);

            let parts: Vec<&str> = command_line.split_whitespace().collect();
            if parts.is_empty() {
                continue;
            }

            let command = parts[0].to_lowercase();
            let args = &parts[1..];

            let (success, message) = self.execute(&command, args);
            if !success {
                warn!(command = %command_line, error = %message, "gtp command failed");
            }

            let prefix = if success { '=' } else { '?' };
            let id_str = id.map(|i| i.to_string()).unwrap_or_default();
            write!(output, "{prefix}{id_str} {message}\n\n")?;
            output.flush()?;

            if command == "quit" {
                break;
            }
        }
        Ok(())
    }

    /// Parse an optional numeric command ID from the beginning of the line.
    fn parse_id(line: &str) -> (Option<u32>, &str) {
        let trimmed = line.trim();
        let end = trimmed
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(trimmed.len());
        if end > 0 {
            if let Ok(id) = trimmed[..end].parse::<u32>() {
                return (Some(id), trimmed[end..].trim());
            }
        }
        (None, trimmed)
    }

    fn parse_color(arg: &str) -> Option<Color> {
        match arg.to_lowercase().as_str() {
            "b" | "black" => Some(Color::Black),
            "w" | "white" => Some(Color::White),
            _ => None,
        }
    }

    /// Check that `arg` names the side to move.
    fn check_turn(&self, arg: &str) -> Result<(), String> {
        let color = Self::parse_color(arg).ok_or_else(|| format!("invalid color {arg}"))?;
        if color != self.state.color() {
            return Err(format!("{color} is not to move"));
        }
        Ok(())
    }

    /// Execute a GTP command and return (success, response).
    fn execute(&mut self, command: &str, args: &[&str]) -> (bool, String) {
        match self.dispatch(command, args) {
            Ok(msg) => (true, msg),
            Err(msg) => (false, msg),
        }
    }

    fn dispatch(&mut self, command: &str, args: &[&str]) -> Result<String, String> {
        let arg = |i: usize| args.get(i).copied().ok_or("missing argument".to_string());

        match command {
            "name" => Ok(env!("CARGO_PKG_NAME").to_string()),

            "version" => Ok(env!("CARGO_PKG_VERSION").to_string()),

            "protocol_version" => Ok("2".to_string()),

            "list_commands" => Ok(KNOWN_COMMANDS.join("\n")),

            "known_command" => {
                let known = KNOWN_COMMANDS.contains(&arg(0)?.to_lowercase().as_str());
                Ok(known.to_string())
            }

            "quit" => Ok(String::new()),

            "boardsize" => match arg(0)?.parse::<usize>() {
                Ok(size) if size == N => Ok(String::new()),
                Ok(size) => Err(format!(
                    "unacceptable size, only {N} is supported (got {size})"
                )),
                Err(_) => Err("invalid size".to_string()),
            },

            "clear_board" => {
                self.reset(self.state.komi());
                Ok(String::new())
            }

            "komi" => {
                let komi = arg(0)?
                    .parse::<f64>()
                    .map_err(|_| "invalid komi".to_string())?;
                if komi != self.state.komi() {
                    if !self.state.history().is_empty() {
                        return Err("cannot change komi during a game".to_string());
                    }
                    self.reset(komi);
                }
                Ok(String::new())
            }

            "play" => {
                self.check_turn(arg(0)?)?;
                let vertex = arg(1)?;
                let mv = parse_vertex(vertex).ok_or_else(|| format!("invalid vertex {vertex}"))?;
                self.state = self.state.play(mv).map_err(|e| e.to_string())?;
                Ok(String::new())
            }

            "genmove" => {
                self.check_turn(arg(0)?)?;
                if self.state.is_finished() {
                    self.state = self.state.next_state(Move::Pass);
                    return Ok("pass".to_string());
                }
                let mv = genmove(
                    &mut self.mcts,
                    &self.state,
                    self.play_cfg.budget,
                    self.play_cfg.policy,
                )
                .map_err(|e| e.to_string())?;
                self.state = self.state.next_state(mv);
                Ok(vertex_string(mv))
            }

            "showboard" => Ok(format!("\n{}", self.state)),

            "final_score" => {
                let score = self
                    .state
                    .winner()
                    .ok_or_else(|| "game is not finished".to_string())?;
                Ok(if score > 0.0 {
                    format!("B+{score}")
                } else if score < 0.0 {
                    format!("W+{}", -score)
                } else {
                    "0".to_string()
                })
            }

            _ => Err(format!("unknown command: {command}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::Budget;

    fn engine() -> GtpEngine {
        GtpEngine::new(
            MctsConfig {
                seed: Some(5),
                ..MctsConfig::default()
            },
            PlayConfig {
                budget: Budget::Iterations(10),
                ..PlayConfig::default()
            },
        )
    }

    #[test]
    fn test_parse_id_with_id() {
        let (id, cmd) = GtpEngine::parse_id("123 name");
        assert_eq!(id, Some(123));
        assert_eq!(cmd, "name");
    }

    #[test]
    fn test_parse_id_without_id() {
        let (id, cmd) = GtpEngine::parse_id("name");
        assert_eq!(id, None);
        assert_eq!(cmd, "name");
    }

    #[test]
    fn test_protocol_version() {
        let mut engine = engine();
        assert_eq!(engine.execute("protocol_version", &[]), (true, "2".to_string()));
    }

    #[test]
    fn test_known_command() {
        let mut engine = engine();
        assert_eq!(engine.execute("known_command", &["genmove"]), (true, "true".to_string()));
        assert_eq!(
            engine.execute("known_command", &["unknown_cmd"]),
            (true, "false".to_string())
        );
        assert!(!engine.execute("known_command", &[]).0);
    }

    #[test]
    fn test_boardsize() {
        let mut engine = engine();
        assert!(engine.execute("boardsize", &["9"]).0);
        assert!(!engine.execute("boardsize", &["19"]).0);
    }

    #[test]
    fn test_play_checks_turn_and_legality() {
        let mut engine = engine();
        assert!(!engine.execute("play", &["white", "D4"]).0);
        assert!(engine.execute("play", &["black", "D4"]).0);
        assert_eq!(engine.state().history(), &[Move::Place(3, 5)]);
        // Occupied point
        assert!(!engine.execute("play", &["w", "D4"]).0);
        assert!(engine.execute("play", &["w", "pass"]).0);
    }

    #[test]
    fn test_play_and_clear() {
        let mut engine = engine();
        assert!(engine.execute("play", &["b", "E5"]).0);
        assert!(engine.execute("clear_board", &[]).0);
        assert!(engine.state().history().is_empty());
    }

    #[test]
    fn test_komi_only_before_first_move() {
        let mut engine = engine();
        assert!(engine.execute("komi", &["7.5"]).0);
        assert_eq!(engine.state().komi(), 7.5);
        assert!(engine.execute("play", &["b", "A1"]).0);
        assert!(!engine.execute("komi", &["5.5"]).0);
        assert!(engine.execute("komi", &["7.5"]).0);
    }

    #[test]
    fn test_genmove_plays_a_legal_move() {
        let mut engine = engine();
        let (ok, vertex) = engine.execute("genmove", &["black"]);
        assert!(ok);
        let mv = parse_vertex(&vertex).unwrap();
        assert_eq!(engine.state().history(), &[mv]);
        assert_eq!(engine.state().color(), Color::White);
    }

    #[test]
    fn test_final_score() {
        let mut engine = engine();
        assert!(!engine.execute("final_score", &[]).0);
        for color in ["b", "w", "b"] {
            assert!(engine.execute("play", &[color, "pass"]).0);
        }
        assert_eq!(engine.execute("final_score", &[]), (true, "W+6.5".to_string()));
    }

    #[test]
    fn test_run_loop() {
        let mut engine = engine();
        let input = "1 name\nboardsize 13\n# comment\n2 quit\nname\n";
        let mut out = Vec::new();
        engine.run(input.as_bytes(), &mut out).unwrap();
        let out = String::from_utf8(out).unwrap();
        assert_eq!(
            out,
            "=1 ucb-go\n\n? unacceptable size, only 9 is supported (got 13)\n\n=2 \n\n"
        );
    }
}
