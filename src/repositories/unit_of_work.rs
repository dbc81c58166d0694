//! Unit of work: one store session, its repositories and one commit point.

use std::any::{Any, TypeId};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

use dashmap::DashMap;

use crate::error::{AppError, AppResult};
use crate::models::{Employee, Indicator, Report};
use crate::repositories::{
    BaseRepository, EmployeeRepository, Entity, IndicatorRepository, ReportRepository,
    Repository, StoreContext,
};
use crate::store::{Store, StoreSession};

/// Owns one store session for the duration of a logical operation.
///
/// Repositories are created on first access and cached, so every caller in
/// the same unit of work sees the same instances and the same staged
/// changes. Nothing reaches the store until [`UnitOfWork::save_changes`].
pub struct UnitOfWork {
    context: StoreContext,
    employees: OnceLock<Arc<EmployeeRepository>>,
    indicators: OnceLock<Arc<IndicatorRepository>>,
    reports: OnceLock<Arc<ReportRepository>>,
    /// Generic repositories keyed by entity type.
    repositories: DashMap<TypeId, Arc<dyn Any + Send + Sync>>,
    disposed: AtomicBool,
}

impl UnitOfWork {
    pub fn new(session: Box<dyn StoreSession>) -> Self {
        Self {
            context: StoreContext::new(session),
            employees: OnceLock::new(),
            indicators: OnceLock::new(),
            reports: OnceLock::new(),
            repositories: DashMap::new(),
            disposed: AtomicBool::new(false),
        }
    }

    /// Opens a session on `store` and binds a new unit of work to it.
    pub async fn begin(store: &dyn Store) -> AppResult<Self> {
        let session = store.open_session().await?;
        tracing::trace!(backend = store.backend(), "Unit of work started");
        Ok(Self::new(session))
    }

    pub fn employees(&self) -> Arc<EmployeeRepository> {
        Arc::clone(
            self.employees
                .get_or_init(|| Arc::new(EmployeeRepository::new(self.base::<Employee>()))),
        )
    }

    pub fn indicators(&self) -> Arc<IndicatorRepository> {
        Arc::clone(
            self.indicators
                .get_or_init(|| Arc::new(IndicatorRepository::new(self.base::<Indicator>()))),
        )
    }

    pub fn reports(&self) -> Arc<ReportRepository> {
        Arc::clone(
            self.reports
                .get_or_init(|| Arc::new(ReportRepository::new(self.base::<Report>()))),
        )
    }

    /// Repository for `E`: the specialized one when the entity has one,
    /// otherwise a cached [`BaseRepository`].
    pub fn get_repository<E: Entity>(&self) -> AppResult<Arc<dyn Repository<E>>> {
        if self.is_disposed() {
            return Err(AppError::SessionClosed);
        }
        Ok(E::specialized_repository(self).unwrap_or_else(|| self.base::<E>()))
    }

    /// Cached generic repository for `E`, created on first request.
    pub fn base<E: Entity>(&self) -> Arc<BaseRepository<E>> {
        let cached = self
            .repositories
            .entry(TypeId::of::<E>())
            .or_insert_with(|| {
                Arc::new(BaseRepository::<E>::new(self.context.clone())) as Arc<dyn Any + Send + Sync>
            })
            .clone();

        cached
            .downcast::<BaseRepository<E>>()
            .unwrap_or_else(|_| Arc::new(BaseRepository::new(self.context.clone())))
    }

    /// Commits every staged change as one store transaction.
    ///
    /// Returns the number of changes applied. On failure nothing is applied
    /// and the staged changes are discarded.
    pub async fn save_changes(&self) -> AppResult<usize> {
        if self.is_disposed() {
            return Err(AppError::SessionClosed);
        }
        let applied = self.context.save_changes().await?;
        tracing::debug!(applied, "Unit of work committed");
        Ok(applied)
    }

    pub async fn pending_changes(&self) -> usize {
        self.context.pending_changes().await
    }

    /// Releases the store session. Safe to call more than once.
    pub async fn dispose(&self) {
        if self.disposed.swap(true, Ordering::SeqCst) {
            return;
        }
        let discarded = self.context.pending_changes().await;
        if self.context.release().await && discarded > 0 {
            tracing::warn!(discarded, "Unit of work disposed with uncommitted changes");
        }
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::SeqCst)
    }
}
