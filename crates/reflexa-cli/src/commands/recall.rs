use std::io::{self, BufRead, Write};

use clap::Args;
use rand::SeedableRng;
use rand_pcg::Mcg128Xsl64;
use reflexa_core::{AttemptOutcome, Color, Config, RecallGame};

use super::{ansi, ANSI_RESET};

#[derive(Args)]
pub struct RecallArgs {
    /// Seed for a reproducible sequence
    #[arg(long)]
    seed: Option<u64>,
    /// Print the final summary as JSON
    #[arg(long)]
    json: bool,
}

pub fn run(args: RecallArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let mut rng = match args.seed.or(config.challenge.seed) {
        Some(seed) => Mcg128Xsl64::seed_from_u64(seed),
        None => Mcg128Xsl64::from_entropy(),
    };
    let mut game = RecallGame::new(
        config.recall.start_length,
        config.recall.max_length,
        &mut rng,
    )?;

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    let mut stdout = io::stdout();

    loop {
        let shown: Vec<String> = game
            .sequence()
            .iter()
            .map(|c| format!("{}{c}{ANSI_RESET}", ansi(*c)))
            .collect();
        writeln!(stdout, "Repeat: {}", shown.join(" "))?;
        write!(stdout, "> ")?;
        stdout.flush()?;

        let Some(line) = lines.next().transpose()? else {
            break;
        };
        let attempt: Option<Vec<Color>> = line
            .split_whitespace()
            .map(|token| token.parse::<Color>().ok())
            .collect();
        let attempt = attempt.unwrap_or_default();

        match game.attempt(&attempt, &mut rng) {
            AttemptOutcome::Advanced { points, next_length } => {
                writeln!(stdout, "+{points}! next sequence has {next_length} colours")?;
            }
            AttemptOutcome::Failed | AttemptOutcome::Ignored => break,
        }
    }

    let summary = game.summary();
    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!();
        println!(
            "Recall over: score {}, rounds {}, longest {}",
            summary.score, summary.rounds_completed, summary.longest_sequence
        );
    }
    Ok(())
}
