//! Shared session state for the repositories of one unit of work.

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::error::{AppError, AppResult};
use crate::models::{Employee, Indicator, IndicatorType, Report};
use crate::store::{
    Aggregate, Change, ChangeSet, EmployeeQuery, IndicatorQuery, ReportQuery, StoreSession,
};

struct ContextState {
    session: Option<Box<dyn StoreSession>>,
    pending: ChangeSet,
}

impl ContextState {
    fn session(&mut self) -> AppResult<&mut Box<dyn StoreSession>> {
        self.session.as_mut().ok_or(AppError::SessionClosed)
    }
}

/// Store session plus the changes staged against it.
///
/// Cloning shares the same session; every repository of a unit of work holds
/// a clone. Reads go straight to the session, writes are staged until
/// [`StoreContext::save_changes`].
#[derive(Clone)]
pub struct StoreContext {
    state: Arc<Mutex<ContextState>>,
}

impl StoreContext {
    pub fn new(session: Box<dyn StoreSession>) -> Self {
        Self {
            state: Arc::new(Mutex::new(ContextState {
                session: Some(session),
                pending: ChangeSet::new(),
            })),
        }
    }

    pub async fn select_employees(&self, query: &EmployeeQuery) -> AppResult<Vec<Employee>> {
        let mut state = self.state.lock().await;
        state.session()?.select_employees(query).await
    }

    pub async fn select_indicators(&self, query: &IndicatorQuery) -> AppResult<Vec<Indicator>> {
        let mut state = self.state.lock().await;
        state.session()?.select_indicators(query).await
    }

    pub async fn select_reports(&self, query: &ReportQuery) -> AppResult<Vec<Report>> {
        let mut state = self.state.lock().await;
        state.session()?.select_reports(query).await
    }

    pub async fn aggregate_indicator_value(
        &self,
        indicator_type: IndicatorType,
        aggregate: Aggregate,
    ) -> AppResult<Option<f64>> {
        let mut state = self.state.lock().await;
        state
            .session()?
            .aggregate_indicator_value(indicator_type, aggregate)
            .await
    }

    /// Queues a change for the next commit.
    pub async fn stage(&self, change: Change) -> AppResult<()> {
        let mut state = self.state.lock().await;
        state.session()?;
        tracing::trace!(entity = %change.kind(), pending = state.pending.len() + 1, "Change staged");
        state.pending.push(change);
        Ok(())
    }

    pub async fn pending_changes(&self) -> usize {
        self.state.lock().await.pending.len()
    }

    /// Applies every staged change in one store transaction.
    ///
    /// The commit runs on its own task, so it finishes even if the caller's
    /// future is dropped while waiting. The staged batch is consumed whether
    /// or not the store accepts it.
    pub async fn save_changes(&self) -> AppResult<usize> {
        let state = Arc::clone(&self.state);
        let commit = tokio::spawn(async move {
            let mut state = state.lock_owned().await;
            let changes = std::mem::take(&mut state.pending);
            let session = state.session()?;
            if changes.is_empty() {
                return Ok(0);
            }
            session.apply(changes).await
        });

        commit.await.map_err(|e| AppError::Internal {
            source: anyhow::Error::new(e),
        })?
    }

    /// Drops the session and any staged changes. Returns false if already released.
    pub async fn release(&self) -> bool {
        let mut state = self.state.lock().await;
        state.pending.clear();
        state.session.take().is_some()
    }
}
