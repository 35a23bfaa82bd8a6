use anyhow::Result;
use tutorhub_application::Navigator;

use super::{Context, describe};

/// Navigates to `path` and prints the guard's decision. When the decision
/// was made on a restored session, also prints the decision once the
/// identity has been fetched.
pub async fn run(context: &Context, path: &str) -> Result<()> {
    let refresher = context.refresher();
    let mut navigator = Navigator::from_config(&context.config, refresher.clone());

    let first = navigator.navigate(path);
    println!("{}", describe(&first));

    if refresher.is_in_flight() {
        refresher.settled().await;
        let settled = navigator.navigate(path);
        if settled != first {
            println!("after identity refresh: {}", describe(&settled));
        }
    }

    navigator.leave();
    Ok(())
}
