//! Employee service for business logic operations.
//!
//! Enforces the existence rules around employee CRUD and guards the paged
//! employee listing behind the `Administrator` role.

use std::sync::Arc;

use validator::Validate;

use crate::dto::EmployeeDto;
use crate::error::{AppError, AppResult};
use crate::models::{Employee, Role};
use crate::repositories::{Repository, UnitOfWork};
use crate::security::SecurityContext;

const ENTITY: &str = "Employee";

/// Employee operations over one unit of work.
#[derive(Clone)]
pub struct EmployeeService {
    uow: Arc<UnitOfWork>,
    page_size: usize,
}

impl EmployeeService {
    /// Creates a new EmployeeService.
    ///
    /// # Arguments
    /// * `uow` - Unit of work shared with the other services of the request
    /// * `page_size` - Page size used by [`EmployeeService::get_employees_filtered`]
    pub fn new(uow: Arc<UnitOfWork>, page_size: usize) -> Self {
        Self { uow, page_size }
    }

    async fn load(&self, id: i32) -> AppResult<Employee> {
        self.uow
            .employees()
            .get_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(ENTITY, "id", id))
    }

    /// Creates an employee.
    ///
    /// # Returns
    /// The stored employee, or `EntityAlreadyExists` if the id is taken
    pub async fn create(&self, dto: EmployeeDto) -> AppResult<EmployeeDto> {
        let repo = self.uow.employees();
        if repo.get_by_id(dto.id).await?.is_some() {
            tracing::warn!(employee_id = dto.id, "Employee already exists");
            return Err(AppError::already_exists(ENTITY, dto.id));
        }
        dto.validate()?;

        repo.create(Employee::from(dto.clone())).await?;
        self.uow.save_changes().await?;
        tracing::info!(employee_id = dto.id, "Employee created");
        Ok(dto)
    }

    /// Replaces every field of an existing employee.
    ///
    /// # Arguments
    /// * `dto` - Full employee; `dto.id` selects the row
    ///
    /// # Returns
    /// The stored employee, or `EntityNotFound` if the id is unknown
    pub async fn update(&self, dto: EmployeeDto) -> AppResult<EmployeeDto> {
        self.load(dto.id).await?;
        dto.validate()?;

        self.uow.employees().update(Employee::from(dto.clone())).await?;
        self.uow.save_changes().await?;
        tracing::info!(employee_id = dto.id, "Employee updated");
        Ok(dto)
    }

    /// Deletes an employee.
    ///
    /// Fails with an infrastructure error if the employee still owns reports.
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let employee = self.load(id).await?;

        self.uow.employees().delete(employee.id).await?;
        self.uow.save_changes().await?;
        tracing::info!(employee_id = id, "Employee deleted");
        Ok(())
    }

    /// Loads one employee.
    ///
    /// # Arguments
    /// * `id` - The employee's ID
    ///
    /// # Returns
    /// The employee if found, or `EntityNotFound`
    pub async fn get_by_id(&self, id: i32) -> AppResult<EmployeeDto> {
        tracing::debug!(employee_id = id, "Fetching employee");
        self.load(id).await.map(EmployeeDto::from)
    }

    /// Lists every employee in id order.
    pub async fn get_all(&self) -> AppResult<Vec<EmployeeDto>> {
        let employees = self.uow.employees().get_all().await?;
        Ok(employees.into_iter().map(EmployeeDto::from).collect())
    }

    /// Employees holding `role`.
    ///
    /// # Arguments
    /// * `role` - Role to match
    ///
    /// # Returns
    /// Matching employees; empty when nobody holds the role
    pub async fn search_by_role(&self, role: Role) -> AppResult<Vec<EmployeeDto>> {
        let employees = self.uow.employees().search_by_role(role).await?;
        Ok(employees.into_iter().map(EmployeeDto::from).collect())
    }

    /// Looks up an employee by exact email.
    pub async fn get_by_email(&self, email: &str) -> AppResult<EmployeeDto> {
        self.uow
            .employees()
            .get_by_email(email)
            .await?
            .map(EmployeeDto::from)
            .ok_or_else(|| AppError::not_found(ENTITY, "email", email))
    }

    /// Changes the role of an existing employee.
    ///
    /// # Arguments
    /// * `id` - The employee's ID
    /// * `role` - New role
    ///
    /// # Returns
    /// The updated employee, or `EntityNotFound`
    pub async fn assign_role(&self, id: i32, role: Role) -> AppResult<EmployeeDto> {
        let mut employee = self.load(id).await?;
        employee.role = role;

        self.uow.employees().update(employee.clone()).await?;
        self.uow.save_changes().await?;
        tracing::info!(employee_id = id, %role, "Employee role assigned");
        Ok(employee.into())
    }

    /// One page of all employees, for administrators only.
    ///
    /// # Arguments
    /// * `security` - Identity of the caller
    /// * `page_number` - Zero-based page index
    ///
    /// # Returns
    /// `AccessDenied` when there is no caller or the caller is not an administrator
    pub async fn get_employees_filtered(
        &self,
        security: &SecurityContext,
        page_number: usize,
    ) -> AppResult<Vec<EmployeeDto>> {
        let Some(caller) = security.current_caller() else {
            tracing::warn!("Employee listing requested without a caller");
            return Err(AppError::access_denied("No authenticated caller"));
        };
        if !caller.has_role(Role::Administrator) {
            tracing::warn!(caller_id = caller.id, "Employee listing denied");
            return Err(AppError::access_denied(
                "Administrator role required to list employees",
            ));
        }

        let page = self
            .uow
            .employees()
            .find(&|_| true, page_number, self.page_size)
            .await?;
        Ok(page.into_iter().map(EmployeeDto::from).collect())
    }
}
