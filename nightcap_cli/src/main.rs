use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};
use nightcap_core::*;
use std::path::PathBuf;
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "nightcap")]
#[command(
    about = "Alcohol clearance and feeding schedule planner for nursing parents",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Assess a drinking plan against the feeding schedule (default)
    Plan(PlanArgs),

    /// Log a feed
    Feed {
        /// Feed time (RFC 3339); defaults to now
        #[arg(long)]
        at: Option<String>,

        /// Amount in millilitres, if known
        #[arg(long)]
        amount_ml: Option<f64>,
    },

    /// List saved plans
    Plans,

    /// Update the status of a saved plan
    Mark {
        /// Plan id (shown by `plans`)
        id: String,

        /// New status (completed or cancelled)
        #[arg(long)]
        status: String,
    },
}

#[derive(Args)]
struct PlanArgs {
    /// Planned start time (RFC 3339); defaults to now
    #[arg(long)]
    start: Option<String>,

    /// Number of standard drinks
    #[arg(long, default_value_t = 1)]
    drinks: u32,

    /// Pace: total span of the session (1h, 2h or 3h)
    #[arg(long, default_value = "2h")]
    pace: String,

    /// Drink category (beer, wine, spirits, cocktail, other)
    #[arg(long, default_value = "wine")]
    drink_type: String,

    /// Safety buffer in minutes; defaults to the configured value
    #[arg(long)]
    buffer_min: Option<u32>,

    /// Goal: min_freezer or max_relax
    #[arg(long, default_value = "min_freezer")]
    goal: String,

    /// Feeding right before the session is an option
    #[arg(long)]
    can_pre_feed: bool,

    /// A small pump session before the start is an option
    #[arg(long)]
    can_micro_pump: bool,

    /// Volume a micro-pump session is expected to cover
    #[arg(long)]
    pump_target_ml: Option<f64>,

    /// Save the plan to the plan store
    #[arg(long)]
    save: bool,
}

impl Default for PlanArgs {
    fn default() -> Self {
        Self {
            start: None,
            drinks: 1,
            pace: "2h".into(),
            drink_type: "wine".into(),
            buffer_min: None,
            goal: "min_freezer".into(),
            can_pre_feed: false,
            can_micro_pump: false,
            pump_target_ml: None,
            save: false,
        }
    }
}

fn main() -> Result<()> {
    // Initialize logging
    nightcap_core::logging::init();

    let cli = Cli::parse();

    // Determine data directory
    let config = Config::load()?;
    let data_dir = cli.data_dir.unwrap_or_else(|| config.data.data_dir.clone());
    tracing::debug!("Using data directory {:?}", data_dir);

    match cli.command {
        Some(Commands::Plan(args)) => cmd_plan(data_dir, args, &config),
        Some(Commands::Feed { at, amount_ml }) => cmd_feed(data_dir, at, amount_ml),
        Some(Commands::Plans) => cmd_plans(data_dir),
        Some(Commands::Mark { id, status }) => cmd_mark(data_dir, &id, &status),
        None => {
            // Default to "plan" with defaults
            cmd_plan(data_dir, PlanArgs::default(), &config)
        }
    }
}

fn cmd_plan(data_dir: PathBuf, args: PlanArgs, config: &Config) -> Result<()> {
    let start_at = match args.start {
        Some(ref s) => parse_timestamp(s)?,
        None => Utc::now(),
    };

    let plan = DrinkPlan {
        start_at,
        drinks: args.drinks,
        pace: args.pace.parse()?,
        drink_type: args.drink_type.parse()?,
        safety_buffer_min: args.buffer_min.unwrap_or(config.plan.safety_buffer_min),
        goal: args.goal.parse()?,
        can_pre_feed: args.can_pre_feed,
        can_micro_pump: args.can_micro_pump,
        micro_pump_target_ml: args.pump_target_ml,
    };

    let profile = config.engine_profile();
    let pattern = config.engine_pattern();
    let history = load_feed_history(&data_dir.join("feeds.csv"))?;

    let assessment = assess_plan(&plan, &profile, &history, &pattern)?;
    display_assessment(&assessment);

    let plus_one = plus_one_scenario(&plan, &profile, &history, &pattern)?;
    if plus_one.freezer_estimate_ml > 0.0 {
        println!(
            "  With one more drink: {} (plan ~{:.0} ml of stored milk)",
            plus_one.feasibility, plus_one.freezer_estimate_ml
        );
    } else {
        println!("  With one more drink: {}", plus_one.feasibility);
    }
    println!();

    if args.save {
        let stored = StoredPlan::scheduled(plan, assessment, Utc::now());
        let id = stored.id;
        PlanStore::new(data_dir.join("plans.jsonl")).append(&stored)?;
        println!("✓ Plan saved ({})", id);
    }

    Ok(())
}

fn cmd_feed(data_dir: PathBuf, at: Option<String>, amount_ml: Option<f64>) -> Result<()> {
    let at = match at {
        Some(ref s) => parse_timestamp(s)?,
        None => Utc::now(),
    };

    let feed = FeedHistoryPoint { at, amount_ml };
    append_feed(&data_dir.join("feeds.csv"), &feed)?;

    match amount_ml {
        Some(ml) => println!("✓ Feed logged at {} ({:.0} ml)", at.format("%H:%M"), ml),
        None => println!("✓ Feed logged at {}", at.format("%H:%M")),
    }

    Ok(())
}

fn cmd_plans(data_dir: PathBuf) -> Result<()> {
    let plans = PlanStore::new(data_dir.join("plans.jsonl")).load()?;

    if plans.is_empty() {
        println!("No saved plans.");
        return Ok(());
    }

    for plan in &plans {
        println!(
            "{}  {}  {} drinks from {}  {}  [{}]",
            plan.id,
            plan.plan.start_at.format("%Y-%m-%d"),
            plan.plan.drinks,
            plan.plan.start_at.format("%H:%M"),
            plan.assessment.feasibility,
            plan.status
        );
    }

    Ok(())
}

fn cmd_mark(data_dir: PathBuf, id: &str, status: &str) -> Result<()> {
    let id = Uuid::parse_str(id)
        .map_err(|e| Error::Store(format!("invalid plan id {}: {}", id, e)))?;
    let status = status.parse()?;

    let updated = PlanStore::new(data_dir.join("plans.jsonl")).set_status(id, status)?;
    println!("✓ Plan {} marked {}", updated.id, updated.status);

    Ok(())
}

fn parse_timestamp(s: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| Error::InvalidPlan(format!("malformed timestamp {}: {}", s, e)))
}

fn display_assessment(assessment: &PlanAssessment) {
    println!("\n╭─────────────────────────────────────────╮");
    println!("│  PLAN FEASIBILITY: {}", assessment.feasibility);
    println!("╰─────────────────────────────────────────╯");
    println!();
    println!(
        "  Milk presumed alcohol-free from: {}",
        assessment.safe_feed_at.format("%Y-%m-%d %H:%M UTC")
    );

    if assessment.next_feeds.is_empty() {
        println!("  No feed history yet - next feeds unknown.");
    } else {
        println!("  Expected feeds:");
        for feed in &assessment.next_feeds {
            println!("    → {}", feed.format("%Y-%m-%d %H:%M"));
        }
    }

    if assessment.freezer_needed_ml > 0.0 {
        println!(
            "  Stored milk to have ready: ~{:.0} ml",
            assessment.freezer_needed_ml
        );
    }

    if !assessment.tips.is_empty() {
        println!();
        println!("  Tips:");
        for tip in &assessment.tips {
            println!("  • {}", tip);
        }
    }

    println!();
    print_tipping_point("One more drink", &assessment.plus_one);
    print_tipping_point("Skipping stored milk", &assessment.no_freezer);
}

fn print_tipping_point(label: &str, tipping: &TippingPoint) {
    match (&tipping.possible, &tipping.condition) {
        (true, Some(condition)) => println!("  {}: possible if you {}.", label, condition),
        (true, None) => println!("  {}: fits as planned.", label),
        (false, _) => println!("  {}: does not fit within a reasonable shift.", label),
    }
}
