//! Periodic polling of the review API

use tokio::{sync::broadcast, time::sleep};
use tracing::{debug, error, info, instrument};

use super::{api::HomeworkSource, cursor::PollCursor};
use crate::{
    config::PollingConfig,
    homework::{ApiResponse, format_status, validate_response},
    notifier::Notifier,
    result::{BotError, Result},
};

/// What a single iteration ended with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Valid response without new statuses
    Idle,
    /// A status change was formatted and handed to the notifier
    Notified,
    /// The iteration failed; `reported` tells whether the chat was told
    Failed { reported: bool },
}

/// Poll loop: fetch, validate, notify, advance the cursor, sleep
#[derive(Debug)]
pub struct HomeworkPoller<S, N> {
    source: S,
    notifier: N,
    cursor: PollCursor,
    config: PollingConfig,
    shutdown_tx: broadcast::Sender<()>,
    shutdown_rx: broadcast::Receiver<()>,
}

impl<S, N> HomeworkPoller<S, N>
where
    S: HomeworkSource,
    N: Notifier,
{
    /// Create a poller whose cursor starts at the current time
    pub fn new(source: S, notifier: N, config: PollingConfig) -> Self {
        let (shutdown_tx, shutdown_rx) = broadcast::channel(1);

        Self {
            source,
            notifier,
            cursor: PollCursor::now(),
            config,
            shutdown_tx,
            shutdown_rx,
        }
    }

    /// Start from an explicit cursor instead of now
    pub fn with_cursor(mut self, cursor: PollCursor) -> Self {
        self.cursor = cursor;
        self
    }

    /// Poll until a shutdown signal arrives.
    ///
    /// The retry period is slept after every iteration, whatever its outcome.
    #[instrument(skip(self), fields(retry_period = ?self.config.retry_period))]
    pub async fn run(&mut self) {
        info!(cursor = %self.cursor, "Starting homework poller");

        loop {
            let outcome = self.run_once().await;
            debug!(?outcome, cursor = %self.cursor, "Poll iteration finished");

            tokio::select! {
                _ = sleep(self.config.retry_period) => {}
                _ = self.shutdown_rx.recv() => {
                    info!("Homework poller received shutdown signal");
                    break;
                }
            }
        }
    }

    /// Run one iteration without sleeping.
    ///
    /// Errors never escape: they are logged and, when notifiable, sent to the chat.
    #[instrument(skip(self), fields(cursor = %self.cursor))]
    pub async fn run_once(&mut self) -> TickOutcome {
        match self.poll().await {
            Ok(outcome) => outcome,
            Err(e) => self.report(e).await,
        }
    }

    async fn poll(&mut self) -> Result<TickOutcome> {
        let raw = self.source.fetch(self.cursor).await?;
        let response = validate_response(raw)?;

        let outcome = self.notify_latest(&response).await;
        // Only a response that passed validation moves the window
        self.cursor = PollCursor::new(response.current_date);
        outcome
    }

    async fn notify_latest(&self, response: &ApiResponse) -> Result<TickOutcome> {
        let Some(record) = response.latest() else {
            debug!("No new statuses");
            return Ok(TickOutcome::Idle);
        };

        let message = format_status(&record)?;
        self.notifier.notify(&message).await;
        debug!(homework = ?record.homework_name, "Status change forwarded");
        Ok(TickOutcome::Notified)
    }

    async fn report(&self, error: BotError) -> TickOutcome {
        if !error.is_notifiable() {
            error!(error = %error, "Polling failed, retrying on next tick");
            return TickOutcome::Failed { reported: false };
        }

        error!(error = %error, "Polling failed, reporting to chat");
        self.notifier.notify(&error.report_message()).await;
        TickOutcome::Failed { reported: true }
    }

    /// Get a shutdown sender for external shutdown control
    pub fn shutdown_sender(&self) -> broadcast::Sender<()> {
        self.shutdown_tx.clone()
    }

    pub fn cursor(&self) -> PollCursor {
        self.cursor
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }
}
