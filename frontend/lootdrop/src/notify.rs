// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use std::fmt;

use lootdrop_abi::RemoteError;

/// User-visible alerts, provided by the host UI.
pub trait Notifier: Send + Sync {
    fn alert(&self, message: &str);
}

/// Result of a user action. Remote failures end here; they are alerted and
/// never propagated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    /// The remote call was confirmed
    Completed,
    /// Nothing was submitted (invalid input, action already in flight, ...)
    Skipped,
    /// The remote call was rejected
    Failed(RemoteError),
}

impl fmt::Display for ActionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionOutcome::Completed => write!(f, "completed"),
            ActionOutcome::Skipped => write!(f, "skipped"),
            ActionOutcome::Failed(error) => write!(f, "failed: {error}"),
        }
    }
}
