//! Indicator service for business logic operations.

use std::sync::Arc;

use jiff::civil::DateTime;
use validator::Validate;

use crate::dto::IndicatorDto;
use crate::error::{AppError, AppResult};
use crate::models::{Indicator, IndicatorType};
use crate::repositories::{Repository, UnitOfWork};

const ENTITY: &str = "Indicator";

fn to_dtos(indicators: Vec<Indicator>) -> Vec<IndicatorDto> {
    indicators.into_iter().map(IndicatorDto::from).collect()
}

/// Indicator operations over one unit of work.
#[derive(Clone)]
pub struct IndicatorService {
    uow: Arc<UnitOfWork>,
}

impl IndicatorService {
    /// Creates a new IndicatorService.
    ///
    /// # Arguments
    /// * `uow` - Unit of work shared with the other services of the request
    pub fn new(uow: Arc<UnitOfWork>) -> Self {
        Self { uow }
    }

    async fn load(&self, id: i32) -> AppResult<Indicator> {
        self.uow
            .indicators()
            .get_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(ENTITY, "id", id))
    }

    /// Creates an indicator, failing with `EntityAlreadyExists` if the id is taken.
    pub async fn create(&self, dto: IndicatorDto) -> AppResult<IndicatorDto> {
        let repo = self.uow.indicators();
        if repo.get_by_id(dto.id).await?.is_some() {
            tracing::warn!(indicator_id = dto.id, "Indicator already exists");
            return Err(AppError::already_exists(ENTITY, dto.id));
        }
        dto.validate()?;

        repo.create(Indicator::from(dto.clone())).await?;
        self.uow.save_changes().await?;
        tracing::info!(indicator_id = dto.id, indicator_type = %dto.indicator_type, "Indicator created");
        Ok(dto)
    }

    /// Replaces every field of an existing indicator.
    ///
    /// # Returns
    /// The stored indicator, or `EntityNotFound` if the id is unknown
    pub async fn update(&self, dto: IndicatorDto) -> AppResult<IndicatorDto> {
        self.load(dto.id).await?;
        dto.validate()?;

        self.uow.indicators().update(Indicator::from(dto.clone())).await?;
        self.uow.save_changes().await?;
        tracing::info!(indicator_id = dto.id, "Indicator updated");
        Ok(dto)
    }

    /// Deletes an indicator, detaching it from any report.
    ///
    /// # Arguments
    /// * `id` - The indicator's ID
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let indicator = self.load(id).await?;

        self.uow.indicators().delete(indicator.id).await?;
        self.uow.save_changes().await?;
        tracing::info!(indicator_id = id, "Indicator deleted");
        Ok(())
    }

    /// Loads one indicator.
    ///
    /// # Returns
    /// The indicator if found, or `EntityNotFound`
    pub async fn get_by_id(&self, id: i32) -> AppResult<IndicatorDto> {
        tracing::debug!(indicator_id = id, "Fetching indicator");
        self.load(id).await.map(IndicatorDto::from)
    }

    /// Lists every indicator.
    pub async fn get_all(&self) -> AppResult<Vec<IndicatorDto>> {
        Ok(to_dtos(self.uow.indicators().get_all().await?))
    }

    /// Indicators of one type.
    ///
    /// # Arguments
    /// * `indicator_type` - Type to match
    pub async fn get_by_type(&self, indicator_type: IndicatorType) -> AppResult<Vec<IndicatorDto>> {
        Ok(to_dtos(self.uow.indicators().get_by_type(indicator_type).await?))
    }

    /// Indicators collected between `start` and `end`, both inclusive.
    ///
    /// # Returns
    /// `Validation` error when `start` is after `end`
    pub async fn get_by_date_range(
        &self,
        start: DateTime,
        end: DateTime,
    ) -> AppResult<Vec<IndicatorDto>> {
        if start > end {
            return Err(AppError::validation(
                "start",
                format!("start {start} is after end {end}"),
            ));
        }
        Ok(to_dtos(
            self.uow.indicators().get_by_date_range(start, end).await?,
        ))
    }

    /// Indicators whose value is at least `min_value`.
    pub async fn get_above_value(&self, min_value: f64) -> AppResult<Vec<IndicatorDto>> {
        Ok(to_dtos(self.uow.indicators().get_above_value(min_value).await?))
    }

    /// Mean value of all indicators of a type.
    ///
    /// # Returns
    /// `EntityNotFound` when no indicator of the type exists
    pub async fn get_average_value(&self, indicator_type: IndicatorType) -> AppResult<f64> {
        self.uow
            .indicators()
            .get_average_value(indicator_type)
            .await?
            .ok_or_else(|| AppError::not_found(ENTITY, "type", indicator_type))
    }

    /// Largest value among indicators of a type.
    ///
    /// # Returns
    /// `EntityNotFound` when no indicator of the type exists
    pub async fn get_max_value(&self, indicator_type: IndicatorType) -> AppResult<f64> {
        self.uow
            .indicators()
            .get_max_value(indicator_type)
            .await?
            .ok_or_else(|| AppError::not_found(ENTITY, "type", indicator_type))
    }
}
