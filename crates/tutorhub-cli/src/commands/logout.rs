use anyhow::Result;

use super::Context;

pub fn run(context: &Context) -> Result<()> {
    let was_authenticated = context.store.is_authenticated();
    context.store.clear();

    if was_authenticated {
        println!("Logged out");
    } else {
        println!("Not logged in");
    }
    Ok(())
}
