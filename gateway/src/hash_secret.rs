//! `gateway hash-secret`: produces `client_secret_hash` values for client files.

use std::io::{BufRead, Write};

pub fn run(secrets: Vec<String>) -> anyhow::Result<()> {
    let secrets = if secrets.is_empty() {
        std::io::stdin().lock().lines().collect::<Result<Vec<_>, _>>()?
    } else {
        secrets
    };

    let mut stdout = std::io::stdout().lock();
    stdout.write_all(render(&secrets).as_bytes())?;

    Ok(())
}

fn render(secrets: &[String]) -> String {
    secrets
        .iter()
        .filter(|secret| !secret.is_empty())
        .map(|secret| format!("{}\n", clients::hash_secret(secret)))
        .collect()
}
