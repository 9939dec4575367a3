use chrono::Local;
use clap::Subcommand;
use serde_json::json;
use tomato_core::{Config, DailyLedger, Database};

#[derive(Subcommand)]
pub enum StatsAction {
    /// Work intervals completed today
    Today,
}

pub fn run(action: StatsAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let db = Database::open()?;

    match action {
        StatsAction::Today => {
            let completed = DailyLedger::new(db).load();
            let goal = config.timer.daily_goal;
            let stats = json!({
                "date": Local::now().date_naive().format("%Y-%m-%d").to_string(),
                "completed": completed,
                "daily_goal": goal,
                "goal_reached": completed >= goal,
            });
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
    }
    Ok(())
}
