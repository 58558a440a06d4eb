use std::io::{self, Write};

use tragamonedas_core::SpinOutcome;
use tragamonedas_shared::SessionSummary;

/// What the controller needs from a display.
pub trait View {
    fn show_outcome(&mut self, outcome: &SpinOutcome) -> io::Result<()>;
    fn show_bet(&mut self, bet_text: &str) -> io::Result<()>;
    fn set_spin_enabled(&mut self, enabled: bool) -> io::Result<()>;
    fn show_message(&mut self, message: &str) -> io::Result<()>;
}

/// Line-oriented display. Reels keep their last symbols until the next
/// accepted spin replaces them.
pub struct TerminalView<W> {
    out: W,
    reels: Vec<String>,
}

impl<W: Write> TerminalView<W> {
    pub fn new(out: W, reel_count: usize) -> Self {
        Self {
            out,
            reels: vec![" ".to_string(); reel_count],
        }
    }

    pub fn reels(&self) -> &[String] {
        &self.reels
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> View for TerminalView<W> {
    fn show_outcome(&mut self, outcome: &SpinOutcome) -> io::Result<()> {
        if let Some(drawn) = &outcome.drawn {
            self.reels = drawn.iter().map(|s| s.token().to_string()).collect();
        }
        writeln!(self.out, "[ {} ]", self.reels.join(" | "))?;
        writeln!(self.out, "Credits: {}", outcome.credits_after)?;
        if outcome.is_win() {
            writeln!(self.out, "You won {} credits!", outcome.amount_won)?;
        } else {
            writeln!(self.out, "Try again.")?;
        }
        self.out.flush()
    }

    fn show_bet(&mut self, bet_text: &str) -> io::Result<()> {
        writeln!(self.out, "Bet: {bet_text}")?;
        self.out.flush()
    }

    fn set_spin_enabled(&mut self, enabled: bool) -> io::Result<()> {
        if !enabled {
            writeln!(self.out, "Spinning...")?;
            self.out.flush()?;
        }
        Ok(())
    }

    fn show_message(&mut self, message: &str) -> io::Result<()> {
        writeln!(self.out, "{message}")?;
        self.out.flush()
    }
}

pub fn render_summary(summary: &SessionSummary) -> String {
    let observed = summary
        .observed_rtp()
        .map(|rtp| format!("{:.2}%", rtp * 100.0))
        .unwrap_or_else(|| "n/a".to_string());
    let mut text = format!(
        "spins: {} (declined {})\n\
         wins: {} (biggest {})\n\
         wagered: {}  won: {}  net: {:+}\n\
         credits: {} -> {}\n\
         rtp: {} observed, {:.2}% theoretical",
        summary.spins,
        summary.declined,
        summary.wins,
        summary.biggest_win,
        summary.wagered,
        summary.won,
        summary.net(),
        summary.starting_credits,
        summary.final_credits,
        observed,
        summary.theoretical_rtp * 100.0,
    );
    if let Some(fair) = &summary.fair {
        text.push_str(&format!(
            "\nserver seed: {} (sha256 {})  client seed: {}",
            fair.server_seed, fair.server_seed_hash, fair.client_seed
        ));
    }
    text
}
