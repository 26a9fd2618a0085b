//! Single-consumer serialization of database writes.
//!
//! The embedded store does not tolerate concurrent writers, so every mutation
//! is funneled through one bounded channel drained by a single worker task.
//! Submitting is fire-and-forget: execution errors are logged and the failed
//! operation is dropped, never retried and never reported to the submitter.

use log::{debug, error};
use sqlite::Value;
use tokio::sync::{mpsc, oneshot};

use crate::database::Database;

/// A queued mutation: a SQL template plus its positional arguments.
///
/// The queue never inspects the statement; it only guarantees that operations
/// execute one at a time, in submission order.
pub struct WriteOperation {
    statement: String,
    args: Vec<Value>,
    ack: Option<oneshot::Sender<()>>,
}

impl WriteOperation {
    pub fn new(statement: impl Into<String>, args: Vec<Value>) -> Self {
        WriteOperation {
            statement: statement.into(),
            args,
            ack: None,
        }
    }

    pub fn statement(&self) -> &str {
        &self.statement
    }

    pub fn args(&self) -> &[Value] {
        &self.args
    }
}

/// Producer handle to the write queue. Cheap to clone.
#[derive(Clone)]
pub struct WriteQueue {
    tx: mpsc::Sender<WriteOperation>,
}

/// The single consumer. Exactly one exists per database; run it to completion
/// on its own task.
pub struct WriteWorker {
    database: Database,
    rx: mpsc::Receiver<WriteOperation>,
}

impl WriteQueue {
    /// Create a queue bounded at `capacity`, together with its worker.
    pub fn new(database: Database, capacity: usize) -> (WriteQueue, WriteWorker) {
        let (tx, rx) = mpsc::channel(capacity);
        (WriteQueue { tx }, WriteWorker { database, rx })
    }

    /// Enqueue an operation.
    ///
    /// Waits for a free slot when the queue is full (backpressure, not
    /// failure) and returns as soon as the operation is accepted — not when
    /// it executes.
    pub async fn submit(&self, operation: WriteOperation) {
        if self.tx.send(operation).await.is_err() {
            error!("write queue is closed; dropping operation");
        }
    }

    /// Enqueue an operation and return a receiver that fires once the worker
    /// has executed it, whether or not execution succeeded.
    pub async fn submit_acked(&self, mut operation: WriteOperation) -> oneshot::Receiver<()> {
        let (ack, done) = oneshot::channel();
        operation.ack = Some(ack);
        self.submit(operation).await;
        done
    }

    /// Wait until every operation submitted before this call has executed.
    ///
    /// Works by queuing an acked no-op marker behind them; FIFO ordering does
    /// the rest.
    pub async fn flush(&self) {
        let done = self.submit_acked(WriteOperation::new("SELECT 1", vec![])).await;
        let _ = done.await;
    }
}

impl WriteWorker {
    /// Drain the queue until every producer handle is dropped.
    pub async fn run(mut self) {
        debug!("write worker started");
        while let Some(mut operation) = self.rx.recv().await {
            if let Err(e) = self.database.execute(&operation) {
                error!("error writing to db: {e}");
            }
            if let Some(ack) = operation.ack.take() {
                let _ = ack.send(());
            }
        }
        debug!("write worker stopped");
    }
}
