use chrono::{Duration, NaiveDate};
use clap::Args;
use habitladder_core::{Clock, ParticipantId};

use super::{open_coach, print_json, CliResult};
use crate::render;

#[derive(Args)]
pub struct WeekArgs {
    /// Participant id
    id: i64,
    /// First day (YYYY-MM-DD), default seven days ago
    #[arg(long)]
    from: Option<NaiveDate>,
    /// Last day (YYYY-MM-DD), default yesterday
    #[arg(long)]
    to: Option<NaiveDate>,
    /// Print as JSON
    #[arg(long)]
    json: bool,
}

pub fn run(args: WeekArgs) -> CliResult {
    let coach = open_coach()?;
    let today = coach.clock().today();
    let from = args.from.unwrap_or(today - Duration::days(7));
    let to = args.to.unwrap_or(today - Duration::days(1));

    let summary = coach.week_summary(ParticipantId(args.id), from, to)?;
    if args.json {
        print_json(&summary)?;
    } else {
        println!("{}", render::week_summary(&summary));
    }
    Ok(())
}
