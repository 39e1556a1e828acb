//! Downstream notification of successful writes.
//!
//! Notification is best effort. A failing notifier never fails the write that
//! triggered it; the service logs the error and moves on.

use std::sync::mpsc::{self, Receiver, Sender};

use tracing::info;

use crate::accession::Accession;
use crate::error::{BioSamplesError, Result};

/// Receives the accession of every successfully reconciled record.
pub trait Notifier: Send + Sync {
    fn notify(&self, accession: &Accession) -> Result<()>;
}

/// Notifier that only logs.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingNotifier;

impl Notifier for LoggingNotifier {
    fn notify(&self, accession: &Accession) -> Result<()> {
        info!(accession = %accession, "Record written");
        Ok(())
    }
}

/// Notifier that pushes accessions onto a channel for a consumer thread.
#[derive(Debug, Clone)]
pub struct QueueNotifier {
    sender: Sender<Accession>,
}

impl QueueNotifier {
    /// Create a notifier and the receiving end of its queue.
    pub fn channel() -> (Self, Receiver<Accession>) {
        let (sender, receiver) = mpsc::channel();
        (Self { sender }, receiver)
    }
}

impl Notifier for QueueNotifier {
    fn notify(&self, accession: &Accession) -> Result<()> {
        self.sender
            .send(accession.clone())
            .map_err(|_| BioSamplesError::Notification {
                accession: accession.to_string(),
                message: "queue consumer has gone away".into(),
            })
    }
}
