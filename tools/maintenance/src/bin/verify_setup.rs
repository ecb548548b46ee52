use fantasy_store::Collection;
use maintenance::{bootstrap, verify};
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let store = bootstrap("verify-setup")?;

    let report = verify::verify_setup(store.as_ref()).await;
    if !report.is_ok() {
        for failure in &report.failures {
            error!("FAILED: {}", failure);
        }
        anyhow::bail!("Setup verification failed with {} problems", report.failures.len());
    }

    info!("Setup verified: {} fighters, {} fights", report.count(Collection::Fighters), report.count(Collection::Fights));
    Ok(())
}
