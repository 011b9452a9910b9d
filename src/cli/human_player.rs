use std::io::{self, BufRead, Write};

use crate::game::PlayerState;
use crate::players::BasePlayer;
use crate::types::{InterruptKind, InterruptOutcome};

/// Asks on stdin. Anything other than a yes counts as a decline.
#[derive(Debug, Clone, Default)]
pub struct HumanPlayer;

impl HumanPlayer {
    pub fn new() -> Self {
        Self
    }

    fn prompt(kind: InterruptKind, player: &PlayerState) -> io::Result<String> {
        let mut stdout = io::stdout().lock();
        writeln!(stdout, "{} ({}) landed on {kind}.", player.name, player.location)?;
        write!(stdout, "Buy? [y/N] ")?;
        stdout.flush()?;
        let mut line = String::new();
        io::stdin().lock().read_line(&mut line)?;
        Ok(line)
    }
}

impl BasePlayer for HumanPlayer {
    fn decide(&self, kind: InterruptKind, player: &PlayerState) -> InterruptOutcome {
        match Self::prompt(kind, player) {
            Ok(answer) => parse_answer(&answer),
            Err(err) => {
                tracing::warn!(%err, "could not read answer, declining");
                InterruptOutcome::Declined
            }
        }
    }
}

fn parse_answer(answer: &str) -> InterruptOutcome {
    match answer.trim().to_ascii_lowercase().as_str() {
        "y" | "yes" => InterruptOutcome::Purchased,
        _ => InterruptOutcome::Declined,
    }
}
