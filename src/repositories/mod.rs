//! Repository layer for data access operations.
//!
//! Repositories never talk to the store on their own: each one belongs to a
//! [`UnitOfWork`], reads through its session and stages writes until the
//! unit of work commits.

mod base;
mod context;
mod employee_repo;
mod indicator_repo;
mod report_repo;
mod unit_of_work;

pub use base::{BaseRepository, Entity, Repository, page_window};
pub use context::StoreContext;
pub use employee_repo::EmployeeRepository;
pub use indicator_repo::IndicatorRepository;
pub use report_repo::ReportRepository;
pub use unit_of_work::UnitOfWork;
