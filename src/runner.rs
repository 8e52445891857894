//! Output loop driven by the host pipeline.
//!
//! The host hands over a channel of messages and two callbacks. The loop
//! drains the channel until it disconnects, encodes and writes each
//! message, reports failures through `log_error`, and returns every message
//! through `recycle`.

use crossbeam_channel::Receiver;
use log::warn;
use thiserror::Error;

use crate::{
    cef::{EncodeError, Encoder},
    message::Message,
    rate_limited_warner::RateLimitedWarner,
    syslog::{Dialer, SyslogError, SyslogWriter},
};

/// Failure to deliver one message.
#[derive(Debug, Error)]
pub enum OutputError {
    #[error(transparent)]
    Encode(#[from] EncodeError),
    #[error("syslog output write error: {0}")]
    Write(#[from] SyslogError),
}

/// Callbacks supplied by the host runtime.
pub trait OutputRunner {
    fn in_chan(&self) -> &Receiver<Message>;

    /// Report a message that could not be delivered.
    fn log_error(&self, err: &OutputError);

    /// Hand a processed message back to the host.
    fn recycle(&self, message: Message);
}

/// Counts reported when the input channel closes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub delivered: u64,
    pub dropped: u64,
}

/// Drain `runner`'s channel into `writer`, closing the writer at the end.
pub fn run_output<R, E, D>(runner: &R, writer: &SyslogWriter<D>, encoder: &E) -> RunSummary
where
    R: OutputRunner + ?Sized,
    E: Encoder + ?Sized,
    D: Dialer,
{
    let warner = RateLimitedWarner::default();
    let mut delivered = 0;

    for message in runner.in_chan().iter() {
        let outcome = encoder
            .encode(&message)
            .map_err(OutputError::from)
            .and_then(|record| {
                writer
                    .write_frame(&record.as_frame())
                    .map_err(OutputError::from)
            });
        match outcome {
            Ok(_) => delivered += 1,
            Err(err) => {
                runner.log_error(&err);
                warner.record_drop();
                warner.warn_if_due(|count| {
                    warn!("syslog output dropped {count} records to {}", writer.endpoint());
                });
            }
        }
        runner.recycle(message);
    }

    warner.flush(|count| {
        warn!("syslog output dropped {count} records to {}", writer.endpoint());
    });
    if let Err(err) = writer.close() {
        warn!("syslog output failed to close {}: {err}", writer.endpoint());
    }
    RunSummary {
        delivered,
        dropped: warner.total_dropped(),
    }
}
