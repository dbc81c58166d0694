//! Report service for business logic operations.
//!
//! Besides plain CRUD, reports carry a collection of indicators; attaching
//! and detaching them goes through a report update so that the store keeps
//! the ownership links in step.

use std::sync::Arc;

use validator::Validate;

use crate::dto::{IndicatorDto, ReportDto};
use crate::error::{AppError, AppResult};
use crate::models::{Indicator, Report, ReportStatus};
use crate::repositories::{Repository, UnitOfWork};

const ENTITY: &str = "Report";

fn to_dtos(reports: Vec<Report>) -> Vec<ReportDto> {
    reports.into_iter().map(ReportDto::from).collect()
}

/// Report operations over one unit of work.
#[derive(Clone)]
pub struct ReportService {
    uow: Arc<UnitOfWork>,
}

impl ReportService {
    /// Creates a new ReportService.
    ///
    /// # Arguments
    /// * `uow` - Unit of work shared with the other services of the request
    pub fn new(uow: Arc<UnitOfWork>) -> Self {
        Self { uow }
    }

    async fn load(&self, id: i32) -> AppResult<Report> {
        self.uow
            .reports()
            .get_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(ENTITY, "id", id))
    }

    /// Stages `report` as an update and commits.
    async fn save(&self, report: Report) -> AppResult<ReportDto> {
        let dto = ReportDto::from(report.clone());
        self.uow.reports().update(report).await?;
        self.uow.save_changes().await?;
        Ok(dto)
    }

    /// Creates a report.
    ///
    /// The owning employee must exist; otherwise the store rejects the commit.
    pub async fn create(&self, dto: ReportDto) -> AppResult<ReportDto> {
        let repo = self.uow.reports();
        if repo.get_by_id(dto.id).await?.is_some() {
            tracing::warn!(report_id = dto.id, "Report already exists");
            return Err(AppError::already_exists(ENTITY, dto.id));
        }
        dto.validate()?;

        repo.create(Report::from(dto.clone())).await?;
        self.uow.save_changes().await?;
        tracing::info!(report_id = dto.id, employee_id = dto.employee_id, "Report created");
        Ok(dto)
    }

    /// Replaces the scalar fields of a report, keeping its indicators.
    pub async fn update(&self, dto: ReportDto) -> AppResult<ReportDto> {
        let existing = self.load(dto.id).await?;
        dto.validate()?;

        let mut report = Report::from(dto);
        report.indicators = existing.indicators;
        let updated = self.save(report).await?;
        tracing::info!(report_id = updated.id, "Report updated");
        Ok(updated)
    }

    /// Deletes a report together with its attached indicators.
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let report = self.load(id).await?;

        self.uow.reports().delete(report.id).await?;
        self.uow.save_changes().await?;
        tracing::info!(report_id = id, indicators = report.indicators.len(), "Report deleted");
        Ok(())
    }

    /// Loads one report with its indicators.
    ///
    /// # Arguments
    /// * `id` - The report's ID
    ///
    /// # Returns
    /// The report if found, or `EntityNotFound`
    pub async fn get_by_id(&self, id: i32) -> AppResult<ReportDto> {
        tracing::debug!(report_id = id, "Fetching report");
        self.load(id).await.map(ReportDto::from)
    }

    /// Lists every report.
    pub async fn get_all(&self) -> AppResult<Vec<ReportDto>> {
        Ok(to_dtos(self.uow.reports().get_all().await?))
    }

    /// Moves a report to `status`.
    ///
    /// # Arguments
    /// * `id` - The report's ID
    /// * `status` - New review state
    ///
    /// # Returns
    /// The updated report, or `EntityNotFound`
    pub async fn update_status(&self, id: i32, status: ReportStatus) -> AppResult<ReportDto> {
        let mut report = self.load(id).await?;
        let previous = report.status;
        report.status = status;

        let updated = self.save(report).await?;
        tracing::info!(report_id = id, from = %previous, to = %status, "Report status changed");
        Ok(updated)
    }

    /// Sets the report content, replacing what was there.
    pub async fn add_content(&self, id: i32, content: String) -> AppResult<ReportDto> {
        let mut report = self.load(id).await?;
        report.content = content;

        let updated = self.save(report).await?;
        tracing::info!(report_id = id, "Report content set");
        Ok(updated)
    }

    /// Sets the printed flag.
    pub async fn mark_as_printed(&self, id: i32) -> AppResult<ReportDto> {
        let mut report = self.load(id).await?;
        report.is_printed = true;

        let updated = self.save(report).await?;
        tracing::info!(report_id = id, "Report marked as printed");
        Ok(updated)
    }

    /// Attaches an indicator to a report.
    ///
    /// An indicator id the store does not know yet is inserted as part of the
    /// same commit. A stored, unattached indicator is attached as stored; the
    /// caller's copy does not overwrite it.
    ///
    /// # Arguments
    /// * `report_id` - Report receiving the indicator
    /// * `indicator` - Indicator to attach
    ///
    /// # Returns
    /// The report's indicators after the attach. `EntityNotFound` for a
    /// missing report, `EntityAlreadyExists` when this or another report
    /// already holds an indicator with this id
    pub async fn add_indicator_to_report(
        &self,
        report_id: i32,
        indicator: IndicatorDto,
    ) -> AppResult<Vec<IndicatorDto>> {
        let mut report = self.load(report_id).await?;
        let indicator_id = indicator.id;
        if report.find_indicator(indicator_id).is_some() {
            tracing::warn!(report_id, indicator_id, "Indicator already attached");
            return Err(AppError::already_exists("Indicator", indicator_id));
        }
        indicator.validate()?;

        let attached = match self.uow.indicators().get_by_id(indicator_id).await? {
            Some(stored) => {
                if let Some(holder) = self.uow.reports().get_by_indicator_id(indicator_id).await? {
                    tracing::warn!(
                        report_id,
                        indicator_id,
                        holder_id = holder.id,
                        "Indicator belongs to another report"
                    );
                    return Err(AppError::already_exists("Indicator", indicator_id));
                }
                stored
            }
            None => Indicator::from(indicator),
        };

        report.indicators.push(attached);
        let indicators = report.indicators.clone();
        self.save(report).await?;
        tracing::info!(report_id, indicator_id, "Indicator attached to report");
        Ok(indicators.into_iter().map(IndicatorDto::from).collect())
    }

    /// Detaches an indicator from a report. The indicator itself is kept.
    ///
    /// # Returns
    /// `EntityNotFound` when the report is missing or does not hold the indicator
    pub async fn remove_indicator_from_report(
        &self,
        report_id: i32,
        indicator_id: i32,
    ) -> AppResult<()> {
        let mut report = self.load(report_id).await?;
        if report.detach_indicator(indicator_id).is_none() {
            tracing::warn!(report_id, indicator_id, "Indicator not attached to report");
            return Err(AppError::not_found("Indicator", "id", indicator_id));
        }

        self.save(report).await?;
        tracing::info!(report_id, indicator_id, "Indicator removed from report");
        Ok(())
    }

    /// Indicators attached to a report.
    ///
    /// # Returns
    /// `EntityNotFound` when the report is missing
    pub async fn get_indicators_by_report_id(&self, report_id: i32) -> AppResult<Vec<IndicatorDto>> {
        let report = self.load(report_id).await?;
        Ok(report.indicators.into_iter().map(IndicatorDto::from).collect())
    }

    /// Reports owned by an employee.
    ///
    /// # Arguments
    /// * `employee_id` - Owning employee's ID
    pub async fn get_reports_by_employee_id(&self, employee_id: i32) -> AppResult<Vec<ReportDto>> {
        Ok(to_dtos(
            self.uow
                .reports()
                .get_reports_by_employee_id(employee_id)
                .await?,
        ))
    }

    /// Reports in one review state.
    pub async fn get_by_status(&self, status: ReportStatus) -> AppResult<Vec<ReportDto>> {
        Ok(to_dtos(self.uow.reports().get_by_status(status).await?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{IndicatorType, Role};
    use crate::store::fixtures::{employee, indicator, report};
    use crate::store::{MemoryStore, Record};

    async fn seeded() -> MemoryStore {
        let store = MemoryStore::new();
        store
            .seed([
                Record::Employee(employee(1, Role::Staff)),
                Record::Employee(employee(2, Role::Manager)),
                Record::Report(report(5, 1)),
            ])
            .await
            .unwrap();
        store
    }

    async fn service(store: &MemoryStore) -> ReportService {
        ReportService::new(Arc::new(UnitOfWork::begin(store).await.unwrap()))
    }

    fn sensor_nine() -> IndicatorDto {
        indicator(9, IndicatorType::Humidity, 41.0).into()
    }

    #[tokio::test]
    async fn attach_then_detach_indicator() {
        let store = seeded().await;
        let svc = service(&store).await;

        let attached = svc.add_indicator_to_report(5, sensor_nine()).await.unwrap();
        assert_eq!(attached.len(), 1);
        assert_eq!(svc.get_indicators_by_report_id(5).await.unwrap(), vec![sensor_nine()]);

        svc.remove_indicator_from_report(5, 9).await.unwrap();
        assert!(svc.get_indicators_by_report_id(5).await.unwrap().is_empty());
        assert_eq!(store.commit_count(), 2);

        let err = svc.remove_indicator_from_report(5, 9).await.unwrap_err();
        assert!(matches!(err, AppError::EntityNotFound { .. }));
        assert_eq!(store.commit_count(), 2);
    }

    #[tokio::test]
    async fn attaching_twice_is_rejected() {
        let store = seeded().await;
        let svc = service(&store).await;

        svc.add_indicator_to_report(5, sensor_nine()).await.unwrap();
        let err = svc.add_indicator_to_report(5, sensor_nine()).await.unwrap_err();
        assert!(matches!(err, AppError::EntityAlreadyExists { .. }));
        assert_eq!(svc.get_indicators_by_report_id(5).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn indicator_held_by_another_report_is_not_moved() {
        let store = seeded().await;
        let mut other = report(6, 2);
        other.indicators = vec![indicator(9, IndicatorType::Humidity, 40.0)];
        store.seed([Record::Report(other)]).await.unwrap();
        let svc = service(&store).await;

        let mut forged = sensor_nine();
        forged.name = "forged".into();
        forged.value = 999.0;
        let err = svc.add_indicator_to_report(5, forged).await.unwrap_err();
        assert!(matches!(err, AppError::EntityAlreadyExists { .. }));

        assert!(svc.get_indicators_by_report_id(5).await.unwrap().is_empty());
        let kept = svc.get_indicators_by_report_id(6).await.unwrap();
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].value, 40.0);
        assert_eq!(store.commit_count(), 0);
    }

    #[tokio::test]
    async fn stored_unattached_indicator_is_attached_as_stored() {
        let store = seeded().await;
        store
            .seed([Record::Indicator(indicator(9, IndicatorType::Humidity, 40.0))])
            .await
            .unwrap();
        let svc = service(&store).await;

        let mut stale = sensor_nine();
        stale.name = "renamed".into();
        stale.value = 999.0;
        let attached = svc.add_indicator_to_report(5, stale).await.unwrap();

        let stored: IndicatorDto = indicator(9, IndicatorType::Humidity, 40.0).into();
        assert_eq!(attached, vec![stored.clone()]);
        let fresh = service(&store).await;
        assert_eq!(fresh.get_indicators_by_report_id(5).await.unwrap(), vec![stored]);
    }

    #[tokio::test]
    async fn operations_on_missing_report_fail_without_commit() {
        let store = seeded().await;
        let svc = service(&store).await;

        assert!(matches!(
            svc.update_status(77, ReportStatus::Approved).await,
            Err(AppError::EntityNotFound { .. })
        ));
        assert!(matches!(
            svc.add_content(77, "x".into()).await,
            Err(AppError::EntityNotFound { .. })
        ));
        assert!(matches!(
            svc.mark_as_printed(77).await,
            Err(AppError::EntityNotFound { .. })
        ));
        assert!(matches!(
            svc.add_indicator_to_report(77, sensor_nine()).await,
            Err(AppError::EntityNotFound { .. })
        ));
        assert!(matches!(
            svc.remove_indicator_from_report(77, 9).await,
            Err(AppError::EntityNotFound { .. })
        ));
        assert!(matches!(
            svc.get_indicators_by_report_id(77).await,
            Err(AppError::EntityNotFound { .. })
        ));
        assert!(matches!(svc.delete(77).await, Err(AppError::EntityNotFound { .. })));
        assert_eq!(store.commit_count(), 0);
    }

    #[tokio::test]
    async fn status_change_is_durable() {
        let store = seeded().await;
        let svc = service(&store).await;

        svc.update_status(5, ReportStatus::Rejected).await.unwrap();
        svc.update_status(5, ReportStatus::Approved).await.unwrap();

        // a fresh unit of work sees the committed state
        let fresh = service(&store).await;
        assert_eq!(fresh.get_by_id(5).await.unwrap().status, ReportStatus::Approved);
        assert_eq!(
            fresh.get_by_status(ReportStatus::Approved).await.unwrap().len(),
            1
        );
    }

    #[tokio::test]
    async fn content_and_printed_flag() {
        let store = seeded().await;
        let svc = service(&store).await;

        svc.add_content(5, "first".into()).await.unwrap();
        let dto = svc.add_content(5, "second".into()).await.unwrap();
        assert_eq!(dto.content, "second");
        let dto = svc.mark_as_printed(5).await.unwrap();
        assert!(dto.is_printed);
    }

    #[tokio::test]
    async fn update_keeps_indicators() {
        let store = seeded().await;
        let svc = service(&store).await;
        svc.add_indicator_to_report(5, sensor_nine()).await.unwrap();

        let mut dto = svc.get_by_id(5).await.unwrap();
        dto.employee_id = 2;
        svc.update(dto).await.unwrap();

        assert_eq!(svc.get_indicators_by_report_id(5).await.unwrap().len(), 1);
        assert_eq!(svc.get_reports_by_employee_id(2).await.unwrap().len(), 1);
        assert!(svc.get_reports_by_employee_id(1).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn create_and_delete_report() {
        let store = seeded().await;
        let svc = service(&store).await;

        assert!(matches!(
            svc.create(report(5, 1).into()).await,
            Err(AppError::EntityAlreadyExists { .. })
        ));
        svc.create(report(6, 2).into()).await.unwrap();
        svc.add_indicator_to_report(6, sensor_nine()).await.unwrap();
        svc.delete(6).await.unwrap();

        assert_eq!(svc.get_all().await.unwrap().len(), 1);
        // cascade removed the attached indicator
        let uow = UnitOfWork::begin(&store).await.unwrap();
        assert!(uow.indicators().get_by_id(9).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn report_for_unknown_employee_is_rejected_by_store() {
        let store = seeded().await;
        let svc = service(&store).await;

        let err = svc.create(report(8, 99).into()).await.unwrap_err();
        assert!(err.is_infrastructure());
        assert!(matches!(
            svc.get_by_id(8).await,
            Err(AppError::EntityNotFound { .. })
        ));
    }
}
