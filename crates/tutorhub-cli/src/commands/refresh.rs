use anyhow::{Result, bail};
use tutorhub_application::RefreshOutcome;

use super::Context;

/// Resolves a restored session by fetching the identity now, instead of
/// waiting for the next protected navigation.
pub async fn run(context: &Context) -> Result<()> {
    let session = context.store.snapshot();
    if !session.is_transient() {
        if session.is_authenticated() {
            println!("Identity already loaded");
        } else {
            println!("Not logged in");
        }
        return Ok(());
    }

    let refresher = context.refresher();
    let Some(ticket) = refresher.acquire() else {
        bail!("Could not start the identity refresh");
    };
    refresher.settled().await;
    refresher.release(ticket);

    match refresher.last_outcome() {
        Some(RefreshOutcome::Applied) => match context.store.identity() {
            Some(identity) => println!(
                "Logged in as {} ({})",
                identity.display_name(),
                if identity.is_privileged() {
                    "teacher"
                } else {
                    "student"
                }
            ),
            None => println!("Identity refreshed"),
        },
        Some(RefreshOutcome::Failed(e)) => println!("Logged out: {}", e),
        Some(other) => println!("Refresh did not apply: {:?}", other),
        None => println!("Refresh did not finish"),
    }

    Ok(())
}
