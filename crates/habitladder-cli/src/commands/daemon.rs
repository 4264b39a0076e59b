use habitladder_core::{next_trigger, Clock, Coach, Database, ParticipantId, SystemClock, Trigger};

use super::{open_coach, CliResult};
use crate::render;

/// Deliver one trigger to one participant, printing the message it produces.
fn fire(
    coach: &Coach<Database, SystemClock>,
    trigger: Trigger,
    id: ParticipantId,
) -> habitladder_core::error::Result<()> {
    match trigger {
        Trigger::Morning => {
            if let Some(brief) = coach.day_opens(id)? {
                println!("[{id}]\n{}\n", render::goals(&brief));
            }
        }
        Trigger::Evening => {
            if let Some(session) = coach.survey_opens(id)? {
                println!("[{id}]\nEvening survey:\n{}\n", render::question(session.awaiting()));
            }
        }
    }
    Ok(())
}

async fn serve(coach: Coach<Database, SystemClock>) -> CliResult {
    loop {
        let now = coach.clock().now();
        let (at, trigger) = next_trigger(now, &coach.config().schedule);
        let wait = (at - now).to_std().unwrap_or_default();
        tracing::info!(%at, ?trigger, "waiting for next trigger");

        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("received shutdown signal");
                return Ok(());
            }
            _ = tokio::time::sleep(wait) => {}
        }

        let participants = coach.active_participants()?;
        tracing::info!(?trigger, count = participants.len(), "firing trigger");
        for id in participants {
            if let Err(e) = fire(&coach, trigger, id) {
                tracing::error!(participant = %id, ?trigger, "trigger failed: {e}");
            }
        }
    }
}

pub fn run() -> CliResult {
    let coach = open_coach()?;
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(serve(coach))
}
