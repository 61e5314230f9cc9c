//! Session play command.
//!
//! Plays a number of rounds as one player session under the configured table
//! rules, then prints the session statistics and an analysis of the retained
//! round history. A round the table rejects ends play early; the rounds
//! already played are still reported.

use anyhow::Result;
use clap::Args;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Serialize;

use rollquest_core::{AppConfig, Die, GameSession, RoundOutcome, SessionStatistics};
use rollquest_simulation::{BetReport, FaceDistribution, StatisticalAnalyzer, StreakReport};

use super::output::{banner, emit, parse_list, OutputFormat, RULE};
use super::simulate::{format_bets, format_streaks};

/// Arguments for the play command.
#[derive(Args, Debug, Clone)]
pub struct PlayArgs {
    /// Player name (truncated to the configured maximum length)
    #[arg(long, default_value = "Player")]
    pub name: String,

    /// Number of rounds to play
    #[arg(short = 'n', long, default_value = "10")]
    pub rounds: u64,

    /// Bet per round
    #[arg(long, default_value = "10")]
    pub bet: f64,

    /// Face to bet on every round (1-6); a random face each round if omitted
    #[arg(long)]
    pub face: Option<u8>,

    /// Six comma-separated die weights (fair die if omitted)
    #[arg(short, long)]
    pub weights: Option<String>,

    /// Starting balance (default from config)
    #[arg(long)]
    pub balance: Option<f64>,

    /// Funds to add before the first round
    #[arg(long)]
    pub add_funds: Option<f64>,

    /// Seed for reproducible play
    #[arg(long, env = "ROLLQUEST_SEED")]
    pub seed: Option<u64>,

    /// Output format: text, json
    #[arg(long, default_value = "text")]
    pub format: String,
}

/// Everything reported at the end of a session.
#[derive(Debug, Serialize)]
pub struct PlayOutput {
    pub statistics: SessionStatistics,
    pub face_distribution: FaceDistribution,
    pub streaks: StreakReport,
    pub bets: BetReport,
    pub history: Vec<RoundOutcome>,
}

pub fn run_play(args: PlayArgs, config: &AppConfig) -> Result<()> {
    let format = OutputFormat::parse(&args.format)?;
    let game = &config.game;

    let weights: Option<Vec<f64>> = args
        .weights
        .as_deref()
        .map(|w| parse_list(w, "weight"))
        .transpose()?;
    let die = Die::new(weights.as_deref())?;
    let mut rng = match args.seed {
        Some(seed) => ChaCha8Rng::seed_from_u64(seed),
        None => ChaCha8Rng::from_entropy(),
    };

    let initial = args.balance.unwrap_or(game.default_balance);
    let mut session = GameSession::new("", initial).with_player_name(&args.name, game);
    if let Some(amount) = args.add_funds {
        session = session.add_funds(amount, game)?;
    }

    tracing::info!(
        "{} starts with ${:.2} on a {} die",
        session.player_name,
        session.balance,
        die.mode()
    );

    for _ in 0..args.rounds {
        let face = args.face.unwrap_or_else(|| rng.gen_range(1..=6));
        let (next, outcome) = match session.play_round(&die, face, args.bet, game, &mut rng) {
            Ok(round) => round,
            Err(err) => {
                tracing::warn!(
                    "Stopping after {} rounds with balance ${:.2}: {}",
                    session.total_rounds,
                    session.balance,
                    err
                );
                break;
            }
        };
        tracing::debug!(
            round = outcome.round,
            bet_face = outcome.bet_face,
            result = outcome.result,
            won = outcome.won,
            balance = outcome.balance,
            "round settled"
        );
        session = next;
    }

    let analyzer = StatisticalAnalyzer::new(&session.history);
    let output = PlayOutput {
        statistics: session.statistics(),
        face_distribution: analyzer.face_distribution(),
        streaks: analyzer.streak_analysis(),
        bets: analyzer.bet_analysis(),
        history: session.history.clone(),
    };

    emit(format, &output, format_play)
}

fn format_play(output: &PlayOutput) -> String {
    let stats = &output.statistics;

    let mut text = banner("SESSION");
    text.push_str(&format!("Player: {}\n\n", stats.player_name));
    text.push_str(&format!(
        "Balance:        ${:.2} (started ${:.2})\n",
        stats.balance, stats.initial_balance
    ));
    text.push_str(&format!(
        "Profit:         ${:.2} ({:+.2}%)\n",
        stats.profit, stats.profit_percentage
    ));
    text.push_str(&format!(
        "Rounds:         {} ({} won, {} lost)\n",
        stats.total_rounds, stats.wins, stats.losses
    ));
    text.push_str(&format!("Win Rate:       {:.2}%\n\n", stats.win_rate));

    text.push_str("FACES ROLLED\n");
    text.push_str(RULE);
    text.push('\n');
    let faces = &output.face_distribution;
    for (face, count) in &faces.counts {
        let pct = faces.percentages.get(face).copied().unwrap_or(0.0);
        text.push_str(&format!(
            "{face}: {count:>5} ({pct:>6.2}%, fair {:.2}%)\n",
            faces.expected_percentage
        ));
    }
    text.push('\n');
    text.push_str(&format_streaks(&output.streaks));
    text.push('\n');
    text.push_str(&format_bets(&output.bets));
    text
}
