use anyhow::Result;

use super::Context;

pub fn run(context: &Context) -> Result<()> {
    let session = context.store.snapshot();

    println!("Storage:      {}", context.storage_path().display());

    if !session.is_authenticated() {
        println!("Session:      logged out");
        return Ok(());
    }

    match session.identity() {
        Some(identity) => {
            println!(
                "Session:      logged in as {} ({})",
                identity.display_name(),
                identity.id
            );
            println!(
                "Role:         {}",
                if identity.is_privileged() {
                    "teacher"
                } else {
                    "student"
                }
            );
        }
        None => {
            println!("Session:      restored, identity not loaded");
            println!("              run `tutorhub refresh` to fetch it");
        }
    }

    let token = if context.store.access_token().is_some() {
        "stored"
    } else {
        "missing"
    };
    println!("Access token: {}", token);

    Ok(())
}
