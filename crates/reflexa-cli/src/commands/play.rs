use std::sync::Arc;
use std::time::Duration;

use clap::Args;
use reflexa_core::{
    Challenge, Color, Command, Config, Event, FixedOracle, SessionRuntime, SessionSink,
    SessionSummary, SurvivalSession, SystemTimeSource, Verdict,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

use super::{ansi, ANSI_RESET};

#[derive(Args)]
pub struct PlayArgs {
    /// Seed for a reproducible challenge sequence
    #[arg(long)]
    seed: Option<u64>,
    /// Simulated length of the rewarded action, in seconds
    #[arg(long, default_value = "5")]
    ad_seconds: u64,
    /// Decline every continuation offer
    #[arg(long)]
    decline: bool,
    /// Print events as JSON lines instead of text
    #[arg(long)]
    json: bool,
}

/// Prints the final summary; stands in for the stats store.
struct PrintSink {
    json: bool,
}

impl SessionSink for PrintSink {
    fn on_session_end(&mut self, summary: &SessionSummary) {
        if self.json {
            if let Ok(line) = serde_json::to_string(summary) {
                println!("{line}");
            }
            return;
        }
        println!();
        println!("Game over ({:?})", summary.end_reason);
        println!("  score:         {}", summary.final_score);
        println!("  xp:            {}", summary.derived_xp);
        println!("  answered:      {}", summary.challenges_answered);
        println!("  continuations: {}", summary.continuations_used);
        println!(
            "  active time:   {:.1}s",
            summary.active_play_time_ms as f64 / 1_000.0
        );
    }
}

pub fn run(args: PlayArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = Config::load()?;
    if let Some(seed) = args.seed {
        config.challenge.seed = Some(seed);
    }
    let settings = config.session_settings()?;
    let runtime_settings = config.runtime_settings();
    let oracle = FixedOracle {
        delay: Duration::from_secs(args.ad_seconds),
        verdict: if args.decline {
            Verdict::Declined
        } else {
            Verdict::Granted
        },
    };

    if !args.json {
        println!("Pick the INK colour, not the word. Type a number or a colour name.");
        println!("p = pause, r = resume, q = quit");
    }

    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    let json = args.json;
    rt.block_on(async move {
        let session = SurvivalSession::new(settings, chrono::Utc::now());
        let runtime = SessionRuntime::new(
            session,
            Arc::new(oracle),
            Arc::new(SystemTimeSource),
            runtime_settings,
        );
        let (cmd_tx, cmd_rx) = mpsc::channel(32);
        let (ev_tx, ev_rx) = mpsc::unbounded_channel();
        let mut sink = PrintSink { json };
        tokio::join!(
            runtime.run(cmd_rx, ev_tx, &mut sink),
            front_end(ev_rx, cmd_tx, json)
        );
    });
    // Stdin reads block a worker thread; do not wait for them.
    rt.shutdown_background();
    Ok(())
}

async fn front_end(
    mut events: mpsc::UnboundedReceiver<Event>,
    commands: mpsc::Sender<Command>,
    json: bool,
) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut current: Option<Challenge> = None;
    let mut stdin_open = true;

    loop {
        tokio::select! {
            event = events.recv() => {
                let Some(event) = event else { break };
                let ended = matches!(event, Event::SessionEnded { .. });
                if let Event::ChallengeShown { challenge, .. } = &event {
                    current = Some(challenge.clone());
                }
                render(&event, json);
                if ended {
                    break;
                }
            }
            line = lines.next_line(), if stdin_open => {
                let command = match line {
                    Ok(Some(line)) => parse_command(&line, current.as_ref()),
                    Ok(None) | Err(_) => {
                        stdin_open = false;
                        Some(Command::Quit)
                    }
                };
                match command {
                    Some(command) => {
                        if commands.send(command).await.is_err() {
                            break;
                        }
                    }
                    None => eprintln!("unrecognised input"),
                }
            }
        }
    }
}

fn parse_command(line: &str, current: Option<&Challenge>) -> Option<Command> {
    let input = line.trim();
    match input {
        "q" | "quit" => return Some(Command::Quit),
        "p" | "pause" => return Some(Command::Pause),
        "r" | "resume" => return Some(Command::Resume),
        _ => {}
    }
    if let Ok(index) = input.parse::<usize>() {
        let option = current?.options.get(index.checked_sub(1)?)?;
        return Some(Command::Answer(*option));
    }
    input.parse::<Color>().ok().map(Command::Answer)
}

fn render(event: &Event, json: bool) {
    if json {
        if let Ok(line) = serde_json::to_string(event) {
            println!("{line}");
        }
        return;
    }
    match event {
        Event::ChallengeShown { challenge, .. } => {
            let word = challenge.word.name().to_ascii_uppercase();
            println!();
            println!("  {}{word}{ANSI_RESET}", ansi(challenge.ink));
            let options: Vec<String> = challenge
                .options
                .iter()
                .enumerate()
                .map(|(i, c)| format!("{}) {c}", i + 1))
                .collect();
            println!("  {}", options.join("   "));
        }
        Event::AnswerScored {
            points,
            label,
            latency_ms,
            total_score,
            ..
        } => println!("  +{points} {label} ({latency_ms} ms), score {total_score}"),
        Event::AnswerRejected { expected, .. } => {
            let expected: Vec<&str> = expected.iter().map(|c| c.name()).collect();
            println!("  wrong! it was {}", expected.join("/"));
        }
        Event::RateShortfall {
            minute,
            required,
            actual,
            ..
        } => println!("  too slow: minute {minute} needed {required} inputs, got {actual}"),
        Event::ContinuationOffered { used, max, .. } => {
            println!("  continue? watching reward ({used}/{max} used)...")
        }
        Event::ContinuationGranted { used, max, .. } => {
            println!("  continuation granted ({used}/{max}); answer when ready")
        }
        Event::ContinuationDeclined { .. } => println!("  no continuation"),
        Event::SessionPaused { .. } => println!("  paused"),
        Event::SessionResumed { .. } => println!("  resumed"),
        Event::InputDiscarded { phase, .. } => println!("  (input ignored while {phase:?})"),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn challenge() -> Challenge {
        Challenge {
            word: Color::Red,
            ink: Color::Blue,
            options: vec![Color::Green, Color::Blue, Color::Red],
            correct_answers: vec![Color::Blue],
        }
    }

    #[test]
    fn parses_control_words() {
        assert_eq!(parse_command(" q ", None), Some(Command::Quit));
        assert_eq!(parse_command("pause", None), Some(Command::Pause));
        assert_eq!(parse_command("r", None), Some(Command::Resume));
    }

    #[test]
    fn parses_option_numbers_against_current_challenge() {
        let c = challenge();
        assert_eq!(parse_command("2", Some(&c)), Some(Command::Answer(Color::Blue)));
        assert_eq!(parse_command("0", Some(&c)), None);
        assert_eq!(parse_command("4", Some(&c)), None);
        assert_eq!(parse_command("1", None), None);
    }

    #[test]
    fn parses_colour_names() {
        assert_eq!(parse_command("Green", None), Some(Command::Answer(Color::Green)));
        assert_eq!(parse_command("teal", None), None);
    }
}
