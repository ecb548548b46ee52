use chrono::Utc;
use maintenance::{bootstrap, scoring};
use tracing::info;

/// Scores the event given as the first argument, or every completed event
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let store = bootstrap("score-event")?;
    let now = Utc::now();

    let reports = match std::env::args().nth(1) {
        Some(event_id) => vec![scoring::score_event(store.as_ref(), &event_id, now).await?],
        None => scoring::score_completed_events(store.as_ref(), now).await?,
    };

    for report in &reports {
        info!(
            "Event {}: scored {}, already scored {}, skipped {}, {} coins paid, {} stakes voided",
            report.event_id, report.scored, report.already_scored, report.skipped, report.coins_paid, report.voided_stakes
        );
        for score in report.scores.iter().filter(|s| s.rank == Some(1)) {
            info!("Leader of {}: {} with {:.2} pts", score.league_id, score.user_id, score.total);
        }
    }
    Ok(())
}
