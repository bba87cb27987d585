//! Concurrent process execution with graceful shutdown.
//!
//! Each component exposes `run(CancellationToken)`; the runner executes them
//! concurrently, cancels everything on SIGINT/SIGTERM or on the first process
//! error, then runs cleanup closers under a timeout.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

type ProcessFuture = Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send>>;
type Process = Box<dyn FnOnce(CancellationToken) -> ProcessFuture + Send>;
type Closer = Pin<Box<dyn Future<Output = ()> + Send>>;

pub struct Runner {
    processes: Vec<(String, Process)>,
    closers: Vec<Closer>,
    closer_timeout: Duration,
}

impl Runner {
    pub fn new() -> Self {
        Self {
            processes: Vec::new(),
            closers: Vec::new(),
            closer_timeout: Duration::from_secs(10),
        }
    }

    /// Add a named long-running process. The name only shows up in logs.
    pub fn with_process<F, Fut>(mut self, name: impl Into<String>, process: F) -> Self
    where
        F: FnOnce(CancellationToken) -> Fut + Send + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        self.processes
            .push((name.into(), Box::new(|token| Box::pin(process(token)))));
        self
    }

    /// Add a cleanup step executed after every process has stopped.
    pub fn with_closer<Fut>(mut self, closer: Fut) -> Self
    where
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.closers.push(Box::pin(closer));
        self
    }

    pub fn with_closer_timeout(mut self, timeout: Duration) -> Self {
        self.closer_timeout = timeout;
        self
    }

    /// Run until every process finishes. Returns an error if any process
    /// failed; the caller decides the exit code.
    pub async fn run(self) -> anyhow::Result<()> {
        let token = CancellationToken::new();
        let mut join_set = JoinSet::new();

        for (name, process) in self.processes {
            let process_token = token.clone();
            join_set.spawn(async move {
                let result = process(process_token).await;
                (name, result)
            });
        }

        spawn_signal_handlers(token.clone());

        // The first failure cancels everything else; cancellation-driven
        // completions are not failures.
        let mut first_error = None;
        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok((name, Ok(()))) => {
                    info!(process = %name, "Process completed");
                }
                Ok((name, Err(err))) => {
                    error!(process = %name, error = %format!("{:#}", err), "Process failed");
                    if first_error.is_none() {
                        first_error = Some(err);
                    }
                    token.cancel();
                }
                Err(err) => {
                    error!(error = %err, "Process panicked");
                    if first_error.is_none() {
                        first_error = Some(anyhow::anyhow!("process panicked: {}", err));
                    }
                    token.cancel();
                }
            }
        }

        if !self.closers.is_empty() {
            info!(timeout = ?self.closer_timeout, "Running closers");
            let closers = async {
                for closer in self.closers {
                    closer.await;
                }
            };
            if tokio::time::timeout(self.closer_timeout, closers).await.is_err() {
                error!("Closers timed out");
            }
        }

        match first_error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

impl Default for Runner {
    fn default() -> Self {
        Self::new()
    }
}

fn spawn_signal_handlers(token: CancellationToken) {
    let sigint_token = token.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Received shutdown signal");
                sigint_token.cancel();
            }
            Err(err) => {
                error!(error = %err, "Error setting up signal handler");
            }
        }
    });

    #[cfg(unix)]
    tokio::spawn(async move {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
                info!("Received SIGTERM signal");
                token.cancel();
            }
            Err(err) => {
                error!(error = %err, "Error setting up SIGTERM handler");
            }
        }
    });
}
