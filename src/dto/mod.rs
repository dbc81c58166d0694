//! Transfer objects exchanged with service consumers.
//!
//! Services accept and return these types only; entities never cross the
//! service boundary. Conversions in both directions are plain `From` impls.

mod employee;
mod indicator;
mod report;

pub use employee::EmployeeDto;
pub use indicator::IndicatorDto;
pub use report::ReportDto;
