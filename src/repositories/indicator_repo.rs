//! Indicator repository.

use std::sync::Arc;

use futures::FutureExt;
use futures::future::BoxFuture;
use jiff::civil::DateTime;

use crate::error::AppResult;
use crate::models::{Indicator, IndicatorType};
use crate::repositories::base::delegate_repository;
use crate::repositories::{BaseRepository, Entity, Repository, StoreContext, UnitOfWork};
use crate::store::{Aggregate, EntityKind, IndicatorQuery, Record};

impl Entity for Indicator {
    type Query = IndicatorQuery;

    const KIND: EntityKind = EntityKind::Indicator;

    fn query_all() -> IndicatorQuery {
        IndicatorQuery::All
    }

    fn query_by_id(id: i32) -> IndicatorQuery {
        IndicatorQuery::Id(id)
    }

    fn into_record(self) -> Record {
        Record::Indicator(self)
    }

    fn fetch<'a>(
        context: &'a StoreContext,
        query: &'a IndicatorQuery,
    ) -> BoxFuture<'a, AppResult<Vec<Self>>> {
        context.select_indicators(query).boxed()
    }

    fn specialized_repository(uow: &UnitOfWork) -> Option<Arc<dyn Repository<Self>>> {
        Some(uow.indicators())
    }
}

/// Indicator repository with type, time-window and value queries.
pub struct IndicatorRepository {
    base: Arc<BaseRepository<Indicator>>,
}

impl IndicatorRepository {
    pub fn new(base: Arc<BaseRepository<Indicator>>) -> Self {
        Self { base }
    }

    pub async fn get_by_type(&self, indicator_type: IndicatorType) -> AppResult<Vec<Indicator>> {
        self.base.fetch(&IndicatorQuery::Type(indicator_type)).await
    }

    /// Indicators collected within `[start, end]`.
    pub async fn get_by_date_range(
        &self,
        start: DateTime,
        end: DateTime,
    ) -> AppResult<Vec<Indicator>> {
        self.base
            .fetch(&IndicatorQuery::DateRange { start, end })
            .await
    }

    /// Indicators whose value is at least `min_value`.
    pub async fn get_above_value(&self, min_value: f64) -> AppResult<Vec<Indicator>> {
        self.base.fetch(&IndicatorQuery::AboveValue(min_value)).await
    }

    pub async fn get_average_value(&self, indicator_type: IndicatorType) -> AppResult<Option<f64>> {
        self.base
            .context()
            .aggregate_indicator_value(indicator_type, Aggregate::Average)
            .await
    }

    pub async fn get_max_value(&self, indicator_type: IndicatorType) -> AppResult<Option<f64>> {
        self.base
            .context()
            .aggregate_indicator_value(indicator_type, Aggregate::Max)
            .await
    }
}

delegate_repository!(IndicatorRepository, Indicator);
