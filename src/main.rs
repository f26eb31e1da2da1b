use homework_notifier::{
    BotConfig, HomeworkPoller, PracticumApi, TelegramNotifier,
    logging::{LoggingConfig, init_logging},
};
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    dotenvy::dotenv().ok();

    let log_guard = init_logging(&LoggingConfig::from_env())
        .map_err(|e| color_eyre::eyre::eyre!("Failed to initialize logging: {e}"))?;
    info!(version = env!("CARGO_PKG_VERSION"), "Homework bot starting up");

    let config = match BotConfig::from_env() {
        Ok(config) => config,
        Err(e) if e.is_fatal() => {
            error!(severity = "critical", error = %e, "Missing or invalid configuration, exiting");
            drop(log_guard);
            std::process::exit(0);
        },
        Err(e) => return Err(e.into()),
    };

    let api = PracticumApi::new(&config)?;
    let notifier = TelegramNotifier::new(&config)?;
    let mut poller = HomeworkPoller::new(api, notifier, config.polling.clone());

    let shutdown = poller.shutdown_sender();
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl-C");
            return;
        }
        let _ = shutdown.send(());
    });

    poller.run().await;
    info!("Homework bot stopped");

    Ok(())
}
