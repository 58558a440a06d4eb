use std::time::Duration;

use anyhow::bail;
use clap::{Parser, Subcommand, ValueEnum};
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use tragamonedas_core::{
    derive_hash_hex, EntropyRng, Paytable, ProvablyFairRng, ReelRng, SpinEngine, DEFAULT_CREDITS,
    DEFAULT_REELS,
};
use tragamonedas_shared::FairReveal;

use tragamonedas_cli::{
    controller::{SlotController, HELP},
    session::{run_session, simulate, verify_round, Verdict},
    view::{render_summary, TerminalView, View},
};

#[derive(Parser)]
#[command(name = "tragamonedas", about = "Three-reel slot machine for the terminal")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    /// Starting credits
    #[arg(long, global = true, env = "TRAGAMONEDAS_CREDITS", default_value_t = DEFAULT_CREDITS)]
    credits: i64,
    /// Number of reels
    #[arg(long, global = true, env = "TRAGAMONEDAS_REELS", default_value_t = DEFAULT_REELS)]
    reels: usize,
    /// Reel randomness source
    #[arg(
        long,
        global = true,
        value_enum,
        env = "TRAGAMONEDAS_RNG",
        default_value_t = RngKind::Fair
    )]
    rng: RngKind,
    /// Server seed for the fair source (random when omitted); the revealed seed for `verify`
    #[arg(long, global = true, env = "TRAGAMONEDAS_SERVER_SEED")]
    server_seed: Option<String>,
    #[arg(long, global = true, env = "TRAGAMONEDAS_CLIENT_SEED", default_value = "player")]
    client_seed: String,
    /// Seed for the std source, OS entropy when omitted
    #[arg(long, global = true, env = "TRAGAMONEDAS_SEED")]
    seed: Option<u64>,
    /// Log filter used when RUST_LOG is unset
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,
}

#[derive(Clone, Copy, ValueEnum)]
enum RngKind {
    /// HMAC-SHA256 stream, verifiable after the server seed is revealed
    Fair,
    /// rand's StdRng
    Std,
}

#[derive(Subcommand)]
enum Commands {
    /// Play interactively on stdin
    Play {
        /// Delay before a spin resolves
        #[arg(long, default_value_t = 1000)]
        delay_ms: u64,
        #[arg(long, default_value = "1")]
        bet: String,
    },
    /// Spin repeatedly at a fixed bet and report the totals
    Simulate {
        #[arg(long, default_value_t = 1000)]
        spins: u64,
        #[arg(long, default_value_t = 1)]
        bet: i64,
        /// Emit one JSON report per spin and a JSON summary
        #[arg(long)]
        json: bool,
    },
    /// Check the symbols a fair round produced against the revealed seeds
    Verify {
        #[arg(long)]
        nonce: u64,
        /// Comma separated tokens, one per reel
        #[arg(long, value_delimiter = ',', required = true)]
        symbols: Vec<String>,
    },
}

fn build_rng(cli: &Cli) -> (Box<dyn ReelRng>, Option<FairReveal>) {
    match cli.rng {
        RngKind::Fair => {
            let server_seed = cli
                .server_seed
                .clone()
                .unwrap_or_else(ProvablyFairRng::random_server_seed);
            let rng = ProvablyFairRng::new(server_seed.clone(), cli.client_seed.clone(), 0);
            let reveal = FairReveal {
                server_seed_hash: rng.server_seed_hash_hex(),
                server_seed,
                client_seed: cli.client_seed.clone(),
            };
            let rng: Box<dyn ReelRng> = Box::new(rng);
            (rng, Some(reveal))
        }
        RngKind::Std => {
            let rng = cli
                .seed
                .map(EntropyRng::seeded)
                .unwrap_or_else(EntropyRng::from_entropy);
            let rng: Box<dyn ReelRng> = Box::new(rng);
            (rng, None)
        }
    }
}

// Blocking stdin on its own thread, so a pending read never holds up shutdown.
fn stdin_lines() -> UnboundedReceiver<String> {
    let (tx, rx) = mpsc::unbounded_channel();
    std::thread::spawn(move || {
        for line in std::io::stdin().lines() {
            let Ok(line) = line else { break };
            if tx.send(line).is_err() {
                break;
            }
        }
    });
    rx
}

async fn play(
    engine: SpinEngine<Box<dyn ReelRng>>,
    delay: Duration,
    bet_text: String,
    fair: Option<FairReveal>,
) -> anyhow::Result<()> {
    let mut view = TerminalView::new(std::io::stdout(), engine.reel_count());
    if let Some(reveal) = &fair {
        view.show_message(&format!(
            "server seed commitment (sha256): {}",
            reveal.server_seed_hash
        ))?;
    }
    view.show_message(HELP)?;

    let mut controller = SlotController::new(engine, view, bet_text, delay)?;
    let mut input = stdin_lines();
    run_session(&mut controller, &mut input).await?;

    let mut summary = controller.summary().clone();
    summary.fair = fair;
    let text = render_summary(&summary);
    controller.view_mut().show_message(&text)?;
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match &cli.command {
        Commands::Play { delay_ms, bet } => {
            let (rng, fair) = build_rng(&cli);
            let engine = SpinEngine::new(cli.reels, Paytable::classic(), cli.credits, rng)?;
            info!(reels = cli.reels, credits = cli.credits, "starting session");
            play(engine, Duration::from_millis(*delay_ms), bet.clone(), fair).await?;
        }
        Commands::Simulate { spins, bet, json } => {
            let (rng, fair) = build_rng(&cli);
            let mut engine = SpinEngine::new(cli.reels, Paytable::classic(), cli.credits, rng)?;
            let mut summary = simulate(&mut engine, *spins, *bet, json.then(std::io::stdout))?;
            summary.fair = fair;
            if *json {
                println!("{}", serde_json::to_string(&summary)?);
            } else {
                println!("{}", render_summary(&summary));
            }
        }
        Commands::Verify { nonce, symbols } => {
            let Some(server_seed) = cli.server_seed.as_deref() else {
                bail!("verify needs the revealed --server-seed");
            };
            let tokens: Vec<&str> = symbols.iter().map(|s| s.trim()).collect();
            println!("server seed hash: {}", derive_hash_hex(server_seed.as_bytes()));
            match verify_round(server_seed, &cli.client_seed, *nonce, &tokens) {
                Verdict::Verified => println!("verified: round {nonce} drew {}", tokens.join(" ")),
                Verdict::Mismatch { actual } => {
                    warn!(nonce, claimed = ?tokens, actual = ?actual, "verification failed");
                    bail!("mismatch: round {nonce} drew {}", actual.join(" "));
                }
            }
        }
    }
    Ok(())
}
