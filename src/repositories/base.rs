//! Generic repository over any stored entity.

use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::BoxFuture;

use crate::error::AppResult;
use crate::repositories::{StoreContext, UnitOfWork};
use crate::store::{Change, EntityKind, Record};

/// A type the store can load and persist.
pub trait Entity: Clone + Send + Sync + 'static {
    /// Select description understood by the store session.
    type Query: Send + Sync;

    const KIND: EntityKind;

    fn query_all() -> Self::Query;

    fn query_by_id(id: i32) -> Self::Query;

    fn into_record(self) -> Record;

    fn fetch<'a>(
        context: &'a StoreContext,
        query: &'a Self::Query,
    ) -> BoxFuture<'a, AppResult<Vec<Self>>>;

    /// Domain-specific repository registered on the unit of work, if any.
    fn specialized_repository(_uow: &UnitOfWork) -> Option<Arc<dyn Repository<Self>>> {
        None
    }
}

/// CRUD primitives shared by every repository.
///
/// Mutations are staged on the unit of work and reach the store only on
/// `save_changes`.
#[async_trait]
pub trait Repository<E: Entity>: Send + Sync {
    async fn get_all(&self) -> AppResult<Vec<E>>;

    /// `None` when no row has this id.
    async fn get_by_id(&self, id: i32) -> AppResult<Option<E>>;

    /// Rows matching `predicate`, skipping `page_number * page_size` matches
    /// and returning at most `page_size`. Pages are zero-based.
    async fn find(
        &self,
        predicate: &(dyn for<'x> Fn(&'x E) -> bool + Sync),
        page_number: usize,
        page_size: usize,
    ) -> AppResult<Vec<E>>;

    async fn create(&self, entity: E) -> AppResult<()>;

    /// Replaces the stored row with the same id; a missing id is a no-op.
    async fn update(&self, entity: E) -> AppResult<()>;

    /// Removes the row with this id if present.
    async fn delete(&self, id: i32) -> AppResult<()>;
}

/// The one generic [`Repository`] implementation.
pub struct BaseRepository<E> {
    context: StoreContext,
    _entity: PhantomData<fn() -> E>,
}

impl<E: Entity> BaseRepository<E> {
    pub fn new(context: StoreContext) -> Self {
        Self {
            context,
            _entity: PhantomData,
        }
    }

    pub fn context(&self) -> &StoreContext {
        &self.context
    }

    pub async fn fetch(&self, query: &E::Query) -> AppResult<Vec<E>> {
        E::fetch(&self.context, query).await
    }
}

/// Window of a paged find.
pub fn page_window(page_number: usize, page_size: usize) -> (usize, usize) {
    (page_number.saturating_mul(page_size), page_size)
}

#[async_trait]
impl<E: Entity> Repository<E> for BaseRepository<E> {
    async fn get_all(&self) -> AppResult<Vec<E>> {
        self.fetch(&E::query_all()).await
    }

    async fn get_by_id(&self, id: i32) -> AppResult<Option<E>> {
        let rows = self.fetch(&E::query_by_id(id)).await?;
        Ok(rows.into_iter().next())
    }

    async fn find(
        &self,
        predicate: &(dyn for<'x> Fn(&'x E) -> bool + Sync),
        page_number: usize,
        page_size: usize,
    ) -> AppResult<Vec<E>> {
        let (skip, take) = page_window(page_number, page_size);
        let rows = self.fetch(&E::query_all()).await?;
        Ok(rows
            .into_iter()
            .filter(|e| predicate(e))
            .skip(skip)
            .take(take)
            .collect())
    }

    async fn create(&self, entity: E) -> AppResult<()> {
        self.context.stage(Change::Insert(entity.into_record())).await
    }

    async fn update(&self, entity: E) -> AppResult<()> {
        self.context.stage(Change::Update(entity.into_record())).await
    }

    async fn delete(&self, id: i32) -> AppResult<()> {
        if self.get_by_id(id).await?.is_some() {
            self.context.stage(Change::Delete(E::KIND, id)).await?;
        }
        Ok(())
    }
}

/// Implements [`Repository`] for a specialized repository by forwarding to
/// its `base` field.
macro_rules! delegate_repository {
    ($repo:ty, $entity:ty) => {
        #[async_trait::async_trait]
        impl $crate::repositories::Repository<$entity> for $repo {
            async fn get_all(&self) -> $crate::error::AppResult<Vec<$entity>> {
                $crate::repositories::Repository::get_all(&*self.base).await
            }

            async fn get_by_id(&self, id: i32) -> $crate::error::AppResult<Option<$entity>> {
                $crate::repositories::Repository::get_by_id(&*self.base, id).await
            }

            async fn find(
                &self,
                predicate: &(dyn for<'x> Fn(&'x $entity) -> bool + Sync),
                page_number: usize,
                page_size: usize,
            ) -> $crate::error::AppResult<Vec<$entity>> {
                $crate::repositories::Repository::find(&*self.base, predicate, page_number, page_size).await
            }

            async fn create(&self, entity: $entity) -> $crate::error::AppResult<()> {
                $crate::repositories::Repository::create(&*self.base, entity).await
            }

            async fn update(&self, entity: $entity) -> $crate::error::AppResult<()> {
                $crate::repositories::Repository::update(&*self.base, entity).await
            }

            async fn delete(&self, id: i32) -> $crate::error::AppResult<()> {
                $crate::repositories::Repository::delete(&*self.base, id).await
            }
        }
    };
}

pub(crate) use delegate_repository;
