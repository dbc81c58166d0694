use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidateEmail, ValidationError};

use crate::models::{Employee, Role};

/// Employee as seen by service consumers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeDto {
    #[schema(example = 1)]
    pub id: i32,
    #[validate(length(min = 1, max = 255, message = "Name is required"))]
    #[schema(example = "Ada Lovelace", min_length = 1, max_length = 255)]
    pub name: String,
    /// Empty when unknown; otherwise a well-formed address.
    #[validate(custom(function = "optional_email"))]
    #[schema(format = "email", example = "ada@ecotrack.io")]
    #[serde(default)]
    pub email: String,
    #[validate(length(max = 64, message = "Phone number is too long"))]
    #[serde(default)]
    pub phone_number: String,
    pub role: Role,
}

fn optional_email(email: &str) -> Result<(), ValidationError> {
    if email.is_empty() || email.validate_email() {
        Ok(())
    } else {
        Err(ValidationError::new("email").with_message("Invalid email format".into()))
    }
}

impl From<Employee> for EmployeeDto {
    fn from(employee: Employee) -> Self {
        Self {
            id: employee.id,
            name: employee.name,
            email: employee.email,
            phone_number: employee.phone_number,
            role: employee.role,
        }
    }
}

impl From<EmployeeDto> for Employee {
    fn from(dto: EmployeeDto) -> Self {
        Self {
            id: dto.id,
            name: dto.name,
            email: dto.email,
            phone_number: dto.phone_number,
            role: dto.role,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dto() -> EmployeeDto {
        EmployeeDto {
            id: 1,
            name: "Ada".into(),
            email: "ada@ecotrack.io".into(),
            phone_number: "+44 20 0000".into(),
            role: Role::Manager,
        }
    }

    #[test]
    fn rejects_blank_name_and_bad_email() {
        assert!(dto().validate().is_ok());

        let mut invalid = dto();
        invalid.name.clear();
        assert!(invalid.validate().is_err());

        let mut invalid = dto();
        invalid.email = "not-an-email".into();
        assert!(invalid.validate().is_err());
    }

    #[test]
    fn name_alone_is_enough() {
        let json = serde_json::json!({ "id": 3, "name": "Grace", "role": "staff" });
        let dto: EmployeeDto = serde_json::from_value(json).unwrap();
        assert!(dto.email.is_empty());
        assert!(dto.phone_number.is_empty());
        assert!(dto.validate().is_ok());
    }

    #[test]
    fn serializes_camel_case() {
        let json = serde_json::to_value(dto()).unwrap();
        assert_eq!(json["phoneNumber"], "+44 20 0000");
        assert_eq!(json["role"], "manager");
    }
}
