// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Compensation steps for multi-step writes.
//!
//! The store has no cross-document transactions. An operation that writes
//! several documents or blobs registers an undo step after each completed
//! write; if a later step fails, the undo steps run newest-first.

use crate::error::{AppError, Result};
use futures_util::future::BoxFuture;
use std::future::Future;

/// Pending compensations for one operation.
pub struct Saga {
    operation: &'static str,
    undo: Vec<(&'static str, BoxFuture<'static, Result<()>>)>,
}

impl Saga {
    pub fn new(operation: &'static str) -> Self {
        Self {
            operation,
            undo: Vec::new(),
        }
    }

    /// Register an undo step for a write that just succeeded.
    pub fn on_failure<F>(&mut self, step: &'static str, undo: F)
    where
        F: Future<Output = Result<()>> + Send + 'static,
    {
        self.undo.push((step, Box::pin(undo)));
    }

    /// Run all compensations and hand back the original error.
    ///
    /// Compensation failures are logged; they leave orphaned data behind.
    pub async fn abort(self, err: AppError) -> AppError {
        tracing::warn!(
            operation = self.operation,
            error = %err,
            steps = self.undo.len(),
            "Operation failed, compensating"
        );

        for (step, undo) in self.undo.into_iter().rev() {
            match undo.await {
                Ok(()) => tracing::info!(operation = self.operation, step, "Compensated"),
                Err(e) => tracing::error!(
                    operation = self.operation,
                    step,
                    error = %e,
                    "Compensation failed"
                ),
            }
        }
        err
    }

    /// Drop the compensations once every step succeeded.
    pub fn complete(self) {
        tracing::debug!(operation = self.operation, "Operation complete");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[tokio::test]
    async fn test_abort_runs_undo_newest_first() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut saga = Saga::new("test");

        for step in ["first", "second"] {
            let log = log.clone();
            saga.on_failure(step, async move {
                log.lock().unwrap().push(step);
                Ok(())
            });
        }

        let err = saga
            .abort(AppError::Database("boom".to_string()))
            .await;
        assert!(matches!(err, AppError::Database(_)));
        assert_eq!(*log.lock().unwrap(), vec!["second", "first"]);
    }

    #[tokio::test]
    async fn test_complete_does_not_run_undo() {
        let ran = Arc::new(Mutex::new(false));
        let mut saga = Saga::new("test");
        let flag = ran.clone();
        saga.on_failure("step", async move {
            *flag.lock().unwrap() = true;
            Ok(())
        });

        saga.complete();
        assert!(!*ran.lock().unwrap());
    }

    #[tokio::test]
    async fn test_failed_compensation_keeps_original_error() {
        let mut saga = Saga::new("test");
        saga.on_failure("step", async { Err(AppError::Storage("gone".to_string())) });

        let err = saga.abort(AppError::Conflict("original".to_string())).await;
        assert!(matches!(err, AppError::Conflict(msg) if msg == "original"));
    }
}
