use std::sync::OnceLock;

use regex::Regex;

use crate::error::ConstraintKind;

/// Structured description of a PostgreSQL constraint violation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstraintViolation {
    pub kind: ConstraintKind,
    pub table: String,
    pub detail: String,
}

/// Extracts table, column and key information from PostgreSQL constraint
/// violation messages.
pub struct ConstraintParser;

struct RegexPatterns {
    key_value: Regex,
    column_name: Regex,
    table_name: Regex,
    referencing_table: Regex,
}

impl RegexPatterns {
    fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            // "Key (field)=(value)"
            key_value: Regex::new(r"Key \(([^)]+)\)=\(([^)]*)\)")?,
            column_name: Regex::new(r#"column "([^"]+)""#)?,
            // first quoted table or relation in the message
            table_name: Regex::new(r#"(?:table|relation) "([^"]+)""#)?,
            // "... is still referenced from table "reports""
            referencing_table: Regex::new(r#"referenced from table "([^"]+)""#)?,
        })
    }
}

static REGEX_PATTERNS: OnceLock<Option<RegexPatterns>> = OnceLock::new();

impl ConstraintParser {
    fn patterns() -> Option<&'static RegexPatterns> {
        REGEX_PATTERNS
            .get_or_init(|| RegexPatterns::new().ok())
            .as_ref()
    }

    /// Builds a violation description from the pieces PostgreSQL reports.
    ///
    /// # Arguments
    /// * `kind` - Which constraint failed
    /// * `message` - Primary error message
    /// * `details` - DETAIL line, when the driver exposes it separately
    /// * `table_name` - Table reported by the driver, if any
    pub fn parse(
        kind: ConstraintKind,
        message: &str,
        details: Option<&str>,
        table_name: Option<&str>,
    ) -> ConstraintViolation {
        let table = table_name
            .map(str::to_string)
            .or_else(|| Self::extract_table_from_message(message))
            .unwrap_or_else(|| "unknown".to_string());

        let detail_text = details.unwrap_or(message);
        let detail = match kind {
            ConstraintKind::Unique => Self::extract_key_value_from_message(detail_text)
                .or_else(|| Self::extract_key_value_from_message(message))
                .map(|(field, value)| format!("{field}={value} already exists"))
                .unwrap_or_else(|| message.to_string()),
            ConstraintKind::ForeignKey => {
                let key = Self::extract_key_value_from_message(detail_text)
                    .or_else(|| Self::extract_key_value_from_message(message));
                let referencing = Self::extract_referencing_table(detail_text)
                    .or_else(|| Self::extract_referencing_table(message));
                match (key, referencing) {
                    (Some((field, value)), Some(from)) => {
                        format!("{field}={value} is still referenced from {from}")
                    }
                    (Some((field, value)), None) => {
                        format!("{field}={value} does not reference an existing row")
                    }
                    _ => message.to_string(),
                }
            }
            ConstraintKind::NotNull => Self::extract_column_from_message(message)
                .map(|column| format!("{column} is required"))
                .unwrap_or_else(|| message.to_string()),
            ConstraintKind::Check => message.to_string(),
        };

        ConstraintViolation {
            kind,
            table,
            detail,
        }
    }

    /// Extracts a column name from a `column "name"` fragment.
    pub fn extract_column_from_message(message: &str) -> Option<String> {
        Self::patterns()?
            .column_name
            .captures(message)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
    }

    /// Extracts the first table named in the message.
    pub fn extract_table_from_message(message: &str) -> Option<String> {
        Self::patterns()?
            .table_name
            .captures(message)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
    }

    /// Extracts `(field, value)` from `Key (field)=(value)`.
    pub fn extract_key_value_from_message(message: &str) -> Option<(String, String)> {
        Self::patterns()?.key_value.captures(message).and_then(|caps| {
            let field = caps.get(1)?.as_str().to_string();
            let value = caps.get(2)?.as_str().to_string();
            Some((field, value))
        })
    }

    fn extract_referencing_table(message: &str) -> Option<String> {
        Self::patterns()?
            .referencing_table
            .captures(message)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_primary_key_duplicate() {
        let violation = ConstraintParser::parse(
            ConstraintKind::Unique,
            "duplicate key value violates unique constraint \"indicators_pkey\"",
            Some("Key (id)=(1) already exists."),
            Some("indicators"),
        );
        assert_eq!(violation.table, "indicators");
        assert_eq!(violation.detail, "id=1 already exists");
    }

    #[test]
    fn parses_restricted_delete() {
        let message = "update or delete on table \"employees\" violates foreign key constraint \"reports_employee_id_fkey\" on table \"reports\"";
        let violation = ConstraintParser::parse(
            ConstraintKind::ForeignKey,
            message,
            Some("Key (id)=(3) is still referenced from table \"reports\"."),
            None,
        );
        assert_eq!(violation.table, "employees");
        assert_eq!(violation.detail, "id=3 is still referenced from reports");
    }

    #[test]
    fn parses_missing_reference() {
        let message = "insert or update on table \"reports\" violates foreign key constraint \"reports_employee_id_fkey\"\nDETAIL: Key (employee_id)=(999) is not present in table \"employees\".";
        let violation = ConstraintParser::parse(ConstraintKind::ForeignKey, message, None, None);
        assert_eq!(violation.table, "reports");
        assert_eq!(
            violation.detail,
            "employee_id=999 does not reference an existing row"
        );
    }

    #[test]
    fn parses_not_null() {
        let message = "null value in column \"name\" of relation \"employees\" violates not-null constraint";
        let violation = ConstraintParser::parse(ConstraintKind::NotNull, message, None, None);
        assert_eq!(violation.table, "employees");
        assert_eq!(violation.detail, "name is required");
    }

    #[test]
    fn falls_back_to_raw_message() {
        let violation = ConstraintParser::parse(
            ConstraintKind::Check,
            "new row violates check constraint",
            None,
            None,
        );
        assert_eq!(violation.table, "unknown");
        assert_eq!(violation.detail, "new row violates check constraint");
    }

    #[test]
    fn extracts_key_value() {
        assert_eq!(
            ConstraintParser::extract_key_value_from_message("Key (email)=(a@b.c) already exists."),
            Some(("email".to_string(), "a@b.c".to_string()))
        );
        assert_eq!(ConstraintParser::extract_key_value_from_message("nothing"), None);
    }
}
