use clap::Subcommand;
use habitladder_core::ParticipantId;

use super::{no_program, open_coach, print_json, CliResult};
use crate::render;

#[derive(Subcommand)]
pub enum ProgramAction {
    /// Start a program, or resume a stopped one where it left off
    Start {
        /// Participant id
        id: i64,
    },
    /// Discard progress and start the ladder again from today
    Restart {
        /// Participant id
        id: i64,
    },
    /// Stop daily events for a participant
    Stop {
        /// Participant id
        id: i64,
    },
    /// Show ladder day, points, streak and current goals
    Status {
        /// Participant id
        id: i64,
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
}

pub fn run(action: ProgramAction) -> CliResult {
    let coach = open_coach()?;

    match action {
        ProgramAction::Start { id } => {
            let program = coach.start_program(ParticipantId(id))?;
            println!(
                "program started for {id} (day {}/{})",
                program.day_index,
                coach.config().program.duration_days
            );
        }
        ProgramAction::Restart { id } => {
            let program = coach.restart_program(ParticipantId(id))?;
            println!("program restarted for {id} from {}", program.start_date);
        }
        ProgramAction::Stop { id } => {
            coach
                .stop_program(ParticipantId(id))?
                .ok_or_else(|| no_program(id))?;
            println!("program stopped for {id}");
        }
        ProgramAction::Status { id, json } => {
            let status = coach
                .status(ParticipantId(id))?
                .ok_or_else(|| no_program(id))?;
            if json {
                print_json(&status)?;
            } else {
                println!("{}", render::status(&status));
            }
        }
    }
    Ok(())
}
