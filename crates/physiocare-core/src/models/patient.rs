//! Patient models.

use serde::{Deserialize, Serialize};

use super::RecordItem;

/// A patient as returned by the backend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PatientItem {
    /// Backend ID
    #[serde(rename = "_id")]
    pub id: String,
    /// First name
    pub name: String,
    /// Surname(s)
    pub surname: String,
    /// Birth date (ISO-8601)
    pub birth_date: String,
    /// Postal address
    #[serde(default)]
    pub address: Option<String>,
    /// Health insurance number
    pub insurance_number: String,
    /// Contact email
    pub email: String,
    /// Profile image URL
    #[serde(default)]
    pub image: Option<String>,
}

impl PatientItem {
    /// Name and surname joined for display.
    pub fn full_name(&self) -> String {
        join_name(&self.name, &self.surname)
    }
}

/// A patient together with their medical records.
///
/// This is the detailed shape of `GET patients/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PatientDetail {
    pub patient: PatientItem,
    #[serde(default)]
    pub records: Vec<RecordItem>,
}

impl PatientDetail {
    /// The record new appointments are filed under.
    pub fn primary_record(&self) -> Option<&RecordItem> {
        self.records.first()
    }

    /// Total number of appointments across all records.
    pub fn appointment_count(&self) -> usize {
        self.records.iter().map(|r| r.appointments.len()).sum()
    }
}

pub(crate) fn join_name(name: &str, surname: &str) -> String {
    format!("{} {}", name.trim(), surname.trim())
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_backend_patient() {
        let json = r#"{
            "_id": "p-1",
            "name": "Lucía",
            "surname": "Pérez Gil",
            "birthDate": "1990-04-12T00:00:00.000Z",
            "insuranceNumber": "ABC123456",
            "email": "lucia@example.com"
        }"#;

        let patient: PatientItem = serde_json::from_str(json).unwrap();
        assert_eq!(patient.id, "p-1");
        assert_eq!(patient.insurance_number, "ABC123456");
        assert_eq!(patient.address, None);
        assert_eq!(patient.full_name(), "Lucía Pérez Gil");
    }

    #[test]
    fn test_serialize_uses_backend_names() {
        let patient = PatientItem {
            id: "p-1".into(),
            name: "Lucía".into(),
            surname: "Pérez".into(),
            birth_date: "1990-04-12".into(),
            address: Some("Calle Mayor 1".into()),
            insurance_number: "ABC123456".into(),
            email: "lucia@example.com".into(),
            image: None,
        };

        let value = serde_json::to_value(&patient).unwrap();
        assert_eq!(value["_id"], "p-1");
        assert_eq!(value["birthDate"], "1990-04-12");
        assert_eq!(value["insuranceNumber"], "ABC123456");
    }

    #[test]
    fn test_join_name_trims() {
        assert_eq!(join_name("Ana", ""), "Ana");
        assert_eq!(join_name(" Ana ", " Ruiz "), "Ana Ruiz");
        assert_eq!(join_name("", ""), "");
    }
}
