//! Background worker that resolves source chains off the UI thread.
//!
//! The worker owns a current-thread tokio runtime and the HTTP client.
//! Requests are handled one at a time. Requests that queued up while a
//! resolve was running are collapsed to the newest one, since the UI would
//! discard the older cycles' results anyway.

use std::sync::mpsc::{Receiver, Sender, channel};
use std::thread::{self, JoinHandle};

use debtclock_core::{CycleId, Resolution, SourceChain};

use super::{ReqwestTransport, TokioSleeper};

/// Request sent to the background worker
#[derive(Debug)]
pub enum RefreshRequest {
    /// Resolve a chain for the given cycle
    Resolve { id: CycleId, chain: SourceChain },
    /// Graceful shutdown
    Shutdown,
}

/// Response from the background worker
#[derive(Debug)]
pub struct RefreshResponse {
    pub id: CycleId,
    pub resolution: Resolution,
}

pub struct RefreshWorker {
    request_tx: Sender<RefreshRequest>,
    response_rx: Receiver<RefreshResponse>,
    thread: Option<JoinHandle<()>>,
}

impl RefreshWorker {
    /// Start the worker thread.
    pub fn new(transport: ReqwestTransport) -> std::io::Result<Self> {
        let (request_tx, request_rx) = channel();
        let (response_tx, response_rx) = channel();

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;

        let thread = thread::Builder::new()
            .name("debtclock-refresh".to_string())
            .spawn(move || {
                let ctx = WorkerContext {
                    runtime,
                    transport,
                    response_tx,
                };
                ctx.run(request_rx);
            })?;

        Ok(Self {
            request_tx,
            response_rx,
            thread: Some(thread),
        })
    }

    /// Queue a chain for resolution. Returns false once the worker is gone.
    pub fn send(&self, id: CycleId, chain: SourceChain) -> bool {
        self.request_tx
            .send(RefreshRequest::Resolve { id, chain })
            .is_ok()
    }

    /// Try to receive a response (non-blocking)
    pub fn try_recv(&self) -> Option<RefreshResponse> {
        self.response_rx.try_recv().ok()
    }

    pub fn shutdown(&self) {
        let _ = self.request_tx.send(RefreshRequest::Shutdown);
    }
}

impl Drop for RefreshWorker {
    fn drop(&mut self) {
        self.shutdown();
        // A resolve in progress can sit in retry backoff for seconds, so only
        // an idle worker is joined; a busy one ends with the process.
        if let Some(thread) = self.thread.take()
            && thread.is_finished()
        {
            let _ = thread.join();
        }
    }
}

struct WorkerContext {
    runtime: tokio::runtime::Runtime,
    transport: ReqwestTransport,
    response_tx: Sender<RefreshResponse>,
}

/// Replace `request` with whatever was queued behind it.
///
/// Only the newest resolve survives; a queued shutdown wins over everything.
fn newest_request(
    mut request: RefreshRequest,
    request_rx: &Receiver<RefreshRequest>,
) -> RefreshRequest {
    while let RefreshRequest::Resolve { id, .. } = &request {
        let Ok(next) = request_rx.try_recv() else {
            break;
        };
        tracing::debug!(cycle = id.0, "Skipping superseded refresh");
        request = next;
    }
    request
}

impl WorkerContext {
    fn run(&self, request_rx: Receiver<RefreshRequest>) {
        while let Ok(request) = request_rx.recv() {
            match newest_request(request, &request_rx) {
                RefreshRequest::Shutdown => break,
                RefreshRequest::Resolve { id, chain } => {
                    tracing::debug!(cycle = id.0, sources = chain.sources().len(), "Resolving");
                    let resolution = self
                        .runtime
                        .block_on(chain.resolve(&self.transport, &TokioSleeper));
                    if self
                        .response_tx
                        .send(RefreshResponse { id, resolution })
                        .is_err()
                    {
                        break;
                    }
                }
            }
        }
        tracing::debug!("Refresh worker stopped");
    }
}
