use diesel::prelude::*;
use diesel_derive_enum::DbEnum;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Role held by an employee; also carried by callers in the security context.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    ToSchema,
    DbEnum,
    clap::ValueEnum,
)]
#[db_enum(existing_type_path = "crate::schema::sql_types::EmployeeRole")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Administrator,
    Manager,
    Staff,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Administrator => write!(f, "administrator"),
            Role::Manager => write!(f, "manager"),
            Role::Staff => write!(f, "staff"),
        }
    }
}

/// Employee entity.
///
/// Maps one-to-one onto the `employees` table, so the same struct is used for
/// SELECT, INSERT and UPDATE.
#[derive(Debug, Clone, PartialEq, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = crate::schema::employees)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Employee {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub phone_number: String,
    pub role: Role,
}
