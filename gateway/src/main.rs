use args::{Args, Command};
use clap::Parser;
use server::ServeConfig;
use tokio_util::sync::CancellationToken;

mod args;
mod hash_secret;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let mut args = Args::parse();

    if let Some(Command::HashSecret { secrets }) = args.command.take() {
        return hash_secret::run(secrets);
    }

    server::init_logger(&args.log_filter);

    let config = args.load_config()?;
    let listen_address = args.listen_address(&config)?;

    let shutdown_signal = CancellationToken::new();
    let signal = shutdown_signal.clone();

    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log::error!("Failed to listen for shutdown signal: {e}");
            return;
        }

        log::info!("Received shutdown signal, stopping the server");
        signal.cancel();
    });

    server::serve(ServeConfig {
        listen_address,
        config,
        shutdown_signal,
        log_filter: args.log_filter,
    })
    .await?;

    Ok(())
}
