use std::io::{self, Write};

use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{debug, info};
use tragamonedas_core::{replay_draw, verify_draw, Paytable, ReelRng, SpinEngine, Symbol};
use tragamonedas_shared::{SessionSummary, SpinReport};

use crate::{
    controller::{Command, Flow, SlotController},
    view::View,
};

/// Feeds input lines to the controller until `quit` or end of input.
///
/// Lines that queued up while a spin was resolving are dropped, the same as
/// clicks on a disabled button.
pub async fn run_session<R: ReelRng, V: View>(
    controller: &mut SlotController<R, V>,
    input: &mut UnboundedReceiver<String>,
) -> io::Result<()> {
    while let Some(line) = input.recv().await {
        let Some(command) = Command::parse(&line) else {
            controller
                .view_mut()
                .show_message(&format!("unknown command: {}", line.trim()))?;
            continue;
        };
        let resolving = command == Command::Spin;
        if controller.handle(command).await? == Flow::Quit {
            break;
        }
        if resolving {
            while let Ok(skipped) = input.try_recv() {
                debug!(line = %skipped.trim(), "input ignored while resolving");
            }
        }
    }
    Ok(())
}

/// Spins up to `spins` times at a fixed bet, stopping at the first declined
/// spin. With `reports` set, one JSON line per attempt is written to it.
pub fn simulate<R: ReelRng, W: Write>(
    engine: &mut SpinEngine<R>,
    spins: u64,
    bet: i64,
    mut reports: Option<W>,
) -> io::Result<SessionSummary> {
    engine.set_bet(bet);
    let mut summary = SessionSummary::new(
        engine.credits(),
        engine.paytable().theoretical_rtp(engine.reel_count()),
    );
    for _ in 0..spins {
        let outcome = engine.spin();
        summary.record(bet, &outcome);
        if let Some(out) = reports.as_mut() {
            let report =
                SpinReport::from_outcome(summary.spins, bet, &outcome, engine.rng().round_nonce());
            serde_json::to_writer(&mut *out, &report)?;
            writeln!(out)?;
        }
        if outcome.was_declined() {
            info!(
                spins = summary.spins,
                credits = outcome.credits_after,
                "simulation stopped: spin declined"
            );
            break;
        }
    }
    Ok(summary)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Verified,
    Mismatch { actual: Vec<String> },
}

/// Replays a fair round over the classic table and compares it to `tokens`.
pub fn verify_round(server_seed: &str, client_seed: &str, nonce: u64, tokens: &[&str]) -> Verdict {
    let table = Paytable::classic();
    if verify_draw(server_seed, client_seed, nonce, &table, tokens) {
        return Verdict::Verified;
    }
    let actual = replay_draw(server_seed, client_seed, nonce, &table, tokens.len());
    Verdict::Mismatch {
        actual: actual.iter().map(Symbol::token).map(str::to_owned).collect(),
    }
}
