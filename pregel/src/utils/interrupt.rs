/*
 * SPDX-FileCopyrightText: 2026 The pregel-rs authors
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// A cloneable flag used to stop a computation from another thread.
///
/// Once [raised](Self::interrupt), the
/// [scheduler](crate::scheduler::SuperstepScheduler) stops at the next
/// barrier boundary. Invocations of the superstep in progress may complete,
/// but their outputs are discarded.
#[derive(Debug, Clone, Default)]
pub struct InterruptHandle(Arc<AtomicBool>);

impl InterruptHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests the computation to stop.
    pub fn interrupt(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_interrupted(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    /// Clears the flag, so that the computation can be resumed.
    pub fn reset(&self) {
        self.0.store(false, Ordering::Relaxed);
    }
}
