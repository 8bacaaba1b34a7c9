// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! In-memory publisher for unit tests.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::time::Instant;

use crate::error::ProtocolError;

use super::{OutboundMessage, Publisher};

/// Something the recorder saw, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Recorded {
    Publish(OutboundMessage),
    Flush,
}

#[derive(Debug, Default)]
struct Inner {
    log: Vec<(Instant, Recorded)>,
    fail_after: Option<usize>,
}

/// Publisher that records every call with the (test) clock time.
#[derive(Debug, Clone, Default)]
pub(crate) struct RecordingPublisher {
    inner: Arc<Mutex<Inner>>,
}

impl RecordingPublisher {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Makes every publish after the first `count` fail.
    pub(crate) fn fail_after(&self, count: usize) {
        self.inner.lock().fail_after = Some(count);
    }

    /// Returns the published messages, without flushes.
    pub(crate) fn messages(&self) -> Vec<OutboundMessage> {
        self.timed_messages().into_iter().map(|(_, m)| m).collect()
    }

    /// Returns the published messages with the time they were published.
    pub(crate) fn timed_messages(&self) -> Vec<(Instant, OutboundMessage)> {
        self.inner
            .lock()
            .log
            .iter()
            .filter_map(|(at, rec)| match rec {
                Recorded::Publish(msg) => Some((*at, msg.clone())),
                Recorded::Flush => None,
            })
            .collect()
    }

    /// Returns the full call log.
    pub(crate) fn log(&self) -> Vec<Recorded> {
        self.inner.lock().log.iter().map(|(_, r)| r.clone()).collect()
    }
}

impl Publisher for RecordingPublisher {
    async fn publish(&self, message: OutboundMessage) -> Result<(), ProtocolError> {
        let mut inner = self.inner.lock();
        let published = inner
            .log
            .iter()
            .filter(|(_, r)| matches!(r, Recorded::Publish(_)))
            .count();
        if inner.fail_after.is_some_and(|limit| published >= limit) {
            return Err(ProtocolError::ConnectionFailed("recorder offline".to_string()));
        }
        inner.log.push((Instant::now(), Recorded::Publish(message)));
        Ok(())
    }

    async fn flush(&self) -> Result<(), ProtocolError> {
        self.inner.lock().log.push((Instant::now(), Recorded::Flush));
        Ok(())
    }
}
