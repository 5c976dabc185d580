//! Core data models for the ECU catalog.
//!
//! [`EcuRecord`] is the row type owned by the record store; [`NewEcu`] carries
//! the three user-supplied fields through insert, update and import.
//! [`UserAccount`] belongs to the access gate.

use serde::Serialize;

/// One catalogued ECU.
///
/// `(part_number, model_name)` is the natural key. `manufacturer` is not part
/// of identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EcuRecord {
    pub id: i64,
    pub part_number: String,
    pub model_name: String,
    pub manufacturer: String,
}

/// The editable fields of a record, always stored trimmed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEcu {
    pub part_number: String,
    pub model_name: String,
    pub manufacturer: String,
}

impl NewEcu {
    /// Build from raw input, trimming surrounding whitespace from every field.
    pub fn new(part_number: &str, model_name: &str, manufacturer: &str) -> Self {
        Self {
            part_number: part_number.trim().to_string(),
            model_name: model_name.trim().to_string(),
            manufacturer: manufacturer.trim().to_string(),
        }
    }

    /// A copy with every field trimmed. Stores call this so records built
    /// through the public fields are normalized too.
    pub fn trimmed(&self) -> Self {
        Self::new(&self.part_number, &self.model_name, &self.manufacturer)
    }

    /// True when every field is non-empty after trimming.
    pub fn is_complete(&self) -> bool {
        !self.part_number.is_empty() && !self.model_name.is_empty() && !self.manufacturer.is_empty()
    }

    pub(crate) fn into_record(self, id: i64) -> EcuRecord {
        EcuRecord {
            id,
            part_number: self.part_number,
            model_name: self.model_name,
            manufacturer: self.manufacturer,
        }
    }
}

/// A registered gate user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserAccount {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub address: Option<String>,
    pub login: String,
    pub password_hash: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_trims_all_fields() {
        let ecu = NewEcu::new("  0281 ", "\tEDC17C\n", " Bosch ");
        assert_eq!(ecu.part_number, "0281");
        assert_eq!(ecu.model_name, "EDC17C");
        assert_eq!(ecu.manufacturer, "Bosch");
        assert!(ecu.is_complete());
    }

    #[test]
    fn whitespace_only_field_is_incomplete() {
        assert!(!NewEcu::new("123", "   ", "Bosch").is_complete());
        assert!(!NewEcu::new("", "ME7", "Bosch").is_complete());
        assert!(!NewEcu::new("123", "ME7", "").is_complete());
    }
}
