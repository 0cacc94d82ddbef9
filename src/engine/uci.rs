use super::{DifficultyLevel, EngineError, MoveEngine, MovesConsidered, PlannedMove};
use crate::game::{ChessGame, Position, Side};
use anyhow::{Context, Result};
use shakmaty::uci::UciMove;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};

/// A Stockfish (or any UCI) process speaking over stdin/stdout.
pub struct UciEngine {
    stdin: BufWriter<ChildStdin>,
    stdout: BufReader<ChildStdout>,
    child: Child,
    difficulty: DifficultyLevel,
}

impl UciEngine {
    pub fn launch(path: &str) -> Result<Self> {
        tracing::info!("Launching UCI engine at: {}", path);

        let working_dir = std::path::Path::new(path)
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(|p| p.to_path_buf())
            .unwrap_or_else(|| std::path::PathBuf::from("."));

        let mut child = Command::new(path)
            .current_dir(&working_dir)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .context("Failed to spawn engine process")?;
        tracing::info!("Engine process spawned with PID: {:?}", child.id());

        let stdin = child.stdin.take().context("No stdin")?;
        let stdout = child.stdout.take().context("No stdout")?;

        let mut engine = Self {
            stdin: BufWriter::new(stdin),
            stdout: BufReader::new(stdout),
            child,
            difficulty: DifficultyLevel::default(),
        };

        engine.send_command("uci")?;
        engine.wait_for_response("uciok")?;
        engine.send_command("isready")?;
        engine.wait_for_response("readyok")?;
        engine.apply_difficulty()?;

        tracing::info!("UCI engine initialized");
        Ok(engine)
    }

    fn apply_difficulty(&mut self) -> Result<()> {
        for cmd in self.difficulty.uci_commands() {
            self.send_command(&cmd)?;
        }
        self.send_command("isready")?;
        self.wait_for_response("readyok")
    }

    fn send_command(&mut self, cmd: &str) -> Result<()> {
        tracing::debug!("Sending to engine: {}", cmd);
        writeln!(self.stdin, "{}", cmd)?;
        self.stdin.flush()?;
        Ok(())
    }

    fn read_line(&mut self, line: &mut String) -> Result<()> {
        line.clear();
        let n = self.stdout.read_line(line)?;
        if n == 0 {
            anyhow::bail!("Engine closed stdout unexpectedly");
        }
        Ok(())
    }

    fn wait_for_response(&mut self, expected: &str) -> Result<()> {
        let mut line = String::new();
        loop {
            self.read_line(&mut line)
                .with_context(|| format!("waiting for '{}'", expected))?;
            if line.trim().starts_with(expected) {
                return Ok(());
            }
        }
    }

    fn search(&mut self, fen: &str, progress: &MovesConsidered) -> Result<Option<String>> {
        self.send_command(&format!("position fen {}", fen))?;
        self.send_command(&format!("go movetime {}", self.difficulty.movetime_ms()))?;

        let mut line = String::new();
        loop {
            self.read_line(&mut line)?;
            let trimmed = line.trim();
            tracing::trace!("Engine: {}", trimmed);

            if trimmed.starts_with("info ") {
                if let Some(nodes) = parse_info_nodes(trimmed) {
                    progress.raise_to(nodes);
                }
            } else if trimmed.starts_with("bestmove") {
                return Ok(parse_bestmove(trimmed));
            }
        }
    }
}

impl MoveEngine<ChessGame> for UciEngine {
    fn set_level(&mut self, level: u32) -> Result<(), EngineError> {
        self.difficulty = DifficultyLevel::from_level(level);
        tracing::info!("Engine difficulty: {}", self.difficulty);
        self.apply_difficulty()
            .map_err(|e| EngineError::Protocol(format!("{:#}", e)))
    }

    fn generate_move(
        &mut self,
        game: &ChessGame,
        side: Side,
        progress: &MovesConsidered,
    ) -> Result<PlannedMove, EngineError> {
        tracing::debug!("Searching for {:?} at {}", side, game.fen());
        let best = self
            .search(&game.fen(), progress)
            .map_err(|e| EngineError::Protocol(format!("{:#}", e)))?
            .ok_or(EngineError::NoMove)?;
        planned_from_uci(&best)
    }

    fn shutdown(&mut self) {
        let _ = self.send_command("quit");
        let _ = self.child.wait();
    }
}

/// Extracts the `nodes` field of an `info` line.
fn parse_info_nodes(line: &str) -> Option<u64> {
    let mut parts = line.split_whitespace();
    while let Some(token) = parts.next() {
        if token == "nodes" {
            return parts.next()?.parse().ok();
        }
    }
    None
}

/// `bestmove e2e4 ponder e7e5` -> `Some("e2e4")`; `bestmove (none)` -> `None`.
fn parse_bestmove(line: &str) -> Option<String> {
    line.split_whitespace()
        .nth(1)
        .filter(|m| *m != "(none)" && *m != "0000")
        .map(str::to_string)
}

fn planned_from_uci(uci: &str) -> Result<PlannedMove, EngineError> {
    let parsed: UciMove = uci
        .parse()
        .map_err(|_| EngineError::Protocol(format!("unparseable move '{}'", uci)))?;
    match parsed {
        UciMove::Normal { from, to, .. } => Ok(PlannedMove {
            from: Position::from(from),
            to: Position::from(to),
        }),
        _ => Err(EngineError::Protocol(format!("unsupported move '{}'", uci))),
    }
}
