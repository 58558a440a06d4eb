use std::{io, time::Duration};

use tracing::{debug, info};
use tragamonedas_core::{ReelRng, SpinEngine, SpinOutcome};
use tragamonedas_shared::{SessionSummary, SpinReport};

use crate::view::View;

pub const HELP: &str = "commands: spin (or s, or empty line), +, -, bet <amount>, help, quit";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Resolving,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Spin,
    Increase,
    Decrease,
    Bet(String),
    Help,
    Quit,
}

impl Command {
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        let (word, rest) = line
            .split_once(char::is_whitespace)
            .map_or((line, ""), |(w, r)| (w, r.trim()));
        match word.to_ascii_lowercase().as_str() {
            "" | "s" | "spin" => Some(Self::Spin),
            "+" => Some(Self::Increase),
            "-" => Some(Self::Decrease),
            "bet" | "b" => Some(Self::Bet(rest.to_string())),
            "help" | "h" | "?" => Some(Self::Help),
            "quit" | "q" | "exit" => Some(Self::Quit),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Bet text that is not a whole number counts as zero, which disables spinning.
pub fn parse_bet(text: &str) -> i64 {
    text.trim().parse().unwrap_or(0)
}

pub struct SlotController<R, V> {
    engine: SpinEngine<R>,
    view: V,
    bet_text: String,
    phase: Phase,
    delay: Duration,
    summary: SessionSummary,
}

impl<R: ReelRng, V: View> SlotController<R, V> {
    pub fn new(
        engine: SpinEngine<R>,
        view: V,
        bet_text: impl Into<String>,
        delay: Duration,
    ) -> io::Result<Self> {
        let summary = SessionSummary::new(
            engine.credits(),
            engine.paytable().theoretical_rtp(engine.reel_count()),
        );
        let mut controller = Self {
            engine,
            view,
            bet_text: bet_text.into(),
            phase: Phase::Idle,
            delay,
            summary,
        };
        controller.refresh()?;
        Ok(controller)
    }

    fn refresh(&mut self) -> io::Result<()> {
        self.view
            .show_outcome(&SpinOutcome::declined(self.engine.credits()))?;
        self.engine.set_bet(parse_bet(&self.bet_text));
        self.view.show_bet(&self.bet_text)
    }

    pub fn engine(&self) -> &SpinEngine<R> {
        &self.engine
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn bet_text(&self) -> &str {
        &self.bet_text
    }

    pub fn summary(&self) -> &SessionSummary {
        &self.summary
    }

    pub async fn handle(&mut self, command: Command) -> io::Result<Flow> {
        match command {
            Command::Spin => {
                self.handle_spin().await?;
            }
            Command::Increase => {
                self.modify_bet(1)?;
            }
            Command::Decrease => {
                self.modify_bet(-1)?;
            }
            Command::Bet(text) => self.enter_bet(&text)?,
            Command::Help => self.view.show_message(HELP)?,
            Command::Quit => return Ok(Flow::Quit),
        }
        Ok(Flow::Continue)
    }

    /// Disable the spin control, wait out the delay, then resolve the spin.
    pub async fn handle_spin(&mut self) -> io::Result<SpinOutcome> {
        self.phase = Phase::Resolving;
        self.view.set_spin_enabled(false)?;
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        let bet = self.engine.bet();
        let outcome = self.engine.spin();
        self.summary.record(bet, &outcome);
        // rounds count accepted spins; a declined attempt repeats the last one
        let round = self.summary.spins;
        let report =
            SpinReport::from_outcome(round, bet, &outcome, self.engine.rng().round_nonce());
        info!(
            round = report.round,
            bet = report.bet,
            symbols = ?report.symbols,
            amount_won = report.amount_won,
            credits = report.credits_after,
            declined = report.declined,
            nonce = ?report.nonce,
            "spin"
        );

        self.view.show_outcome(&outcome)?;
        self.view.set_spin_enabled(true)?;
        self.phase = Phase::Idle;
        Ok(outcome)
    }

    /// Returns whether the bet changed; out-of-range adjustments are ignored.
    pub fn modify_bet(&mut self, delta: i64) -> io::Result<bool> {
        if !self.engine.adjust_bet(delta) {
            debug!(bet = self.engine.bet(), delta, "bet adjustment ignored");
            return Ok(false);
        }
        self.bet_text = self.engine.bet().to_string();
        self.view.show_bet(&self.bet_text)?;
        Ok(true)
    }

    pub fn enter_bet(&mut self, text: &str) -> io::Result<()> {
        self.bet_text = text.trim().to_string();
        self.engine.set_bet(parse_bet(&self.bet_text));
        self.view.show_bet(&self.bet_text)
    }
}
