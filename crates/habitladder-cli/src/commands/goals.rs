use clap::Args;
use habitladder_core::ParticipantId;

use super::{no_program, open_coach, print_json, CliResult};
use crate::render;

#[derive(Args)]
pub struct GoalsArgs {
    /// Participant id
    id: i64,
    /// Print as JSON
    #[arg(long)]
    json: bool,
}

pub fn run(args: GoalsArgs) -> CliResult {
    let coach = open_coach()?;
    let brief = coach
        .day_opens(ParticipantId(args.id))?
        .ok_or_else(|| no_program(args.id))?;

    if args.json {
        print_json(&brief)?;
    } else {
        println!("{}", render::goals(&brief));
    }
    Ok(())
}
