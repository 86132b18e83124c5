use clap::Args;
use reflexa_core::{Config, QuotaPolicy};
use serde::Serialize;

#[derive(Args)]
pub struct RulesArgs {
    /// Number of minutes to list
    #[arg(long, default_value = "35")]
    minutes: u64,
    /// Print as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct QuotaRow {
    minute: u64,
    required: u32,
}

pub fn run(args: RulesArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let policy = QuotaPolicy {
        base_quota: config.survival.base_quota,
        quota_cap: config.survival.quota_cap,
    };
    let rows: Vec<QuotaRow> = (0..args.minutes)
        .map(|minute| QuotaRow {
            minute,
            required: policy.required_for_minute(minute),
        })
        .collect();

    if args.json {
        let out = serde_json::json!({
            "max_continuations": config.survival.max_continuations,
            "quota": rows,
            "scoring": config.scoring,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!(
        "Continuations per session: {}",
        config.survival.max_continuations
    );
    println!();
    println!("Minute  Required inputs");
    for row in &rows {
        println!("{:>6}  {:>15}", row.minute, row.required);
    }
    println!();
    println!("Reaction      Points  Label");
    for bucket in &config.scoring.buckets {
        println!(
            "< {:>6} ms  {:>6}  {}",
            bucket.max_latency_ms, bucket.points, bucket.label
        );
    }
    println!(
        "  slower     {:>6}  {}",
        config.scoring.slow_points, config.scoring.slow_label
    );
    Ok(())
}
