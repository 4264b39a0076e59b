use std::io::BufRead;

use clap::Subcommand;
use habitladder_core::{AnswerReply, ParticipantId};

use super::{no_program, open_coach, print_json, CliResult};
use crate::render;

#[derive(Subcommand)]
pub enum SurveyAction {
    /// Open today's survey (replaces an unfinished one) and print the first question
    Open {
        /// Participant id
        id: i64,
    },
    /// Answer the question the open survey is waiting on
    Answer {
        /// Participant id
        id: i64,
        /// Answer text: minutes, or HH:MM for times
        text: String,
        /// Print the reply as JSON
        #[arg(long)]
        json: bool,
    },
    /// Open the survey and answer it interactively from stdin
    Run {
        /// Participant id
        id: i64,
    },
}

fn print_reply(reply: &AnswerReply) {
    match reply {
        AnswerReply::Rejected { rejection } => println!("{}", render::rejection(rejection)),
        AnswerReply::Next { next } => println!("{}", render::question(*next)),
        AnswerReply::Finalized { outcome } => println!("{}", render::outcome(outcome)),
    }
}

pub fn run(action: SurveyAction) -> CliResult {
    let coach = open_coach()?;

    match action {
        SurveyAction::Open { id } => {
            let session = coach
                .survey_opens(ParticipantId(id))?
                .ok_or_else(|| no_program(id))?;
            println!("Evening survey:");
            println!("{}", render::question(session.awaiting()));
        }
        SurveyAction::Answer { id, text, json } => {
            let Some(reply) = coach.answer_received(ParticipantId(id), &text)? else {
                return Err(format!("no open survey for participant {id}").into());
            };
            if json {
                print_json(&reply)?;
            } else {
                print_reply(&reply);
            }
        }
        SurveyAction::Run { id } => {
            let session = coach
                .survey_opens(ParticipantId(id))?
                .ok_or_else(|| no_program(id))?;
            println!("Evening survey:");
            println!("{}", render::question(session.awaiting()));

            for line in std::io::stdin().lock().lines() {
                let line = line?;
                let Some(reply) = coach.answer_received(ParticipantId(id), &line)? else {
                    break;
                };
                print_reply(&reply);
                if matches!(reply, AnswerReply::Finalized { .. }) {
                    return Ok(());
                }
            }
            println!("Survey left open; continue later with `habitladder survey answer {id} <text>`.");
        }
    }
    Ok(())
}
