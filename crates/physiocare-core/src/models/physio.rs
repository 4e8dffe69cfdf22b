//! Physiotherapist models.

use serde::{Deserialize, Serialize};

use super::patient::join_name;

/// A physiotherapist as returned by the backend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PhysioItem {
    /// Backend ID
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub surname: String,
    /// Clinical specialty (e.g., "Sports", "Neurological")
    pub specialty: String,
    /// Professional license number
    pub license_number: String,
    pub email: String,
    /// Profile image URL
    #[serde(default)]
    pub image: Option<String>,
}

impl PhysioItem {
    pub fn full_name(&self) -> String {
        join_name(&self.name, &self.surname)
    }
}

/// Short physio reference embedded in an appointment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PhysioBrief {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub surname: String,
}

impl PhysioBrief {
    pub fn full_name(&self) -> String {
        join_name(&self.name, &self.surname)
    }
}

/// How an appointment refers to its physio.
///
/// Populated responses embed a [`PhysioBrief`]; unpopulated ones carry only
/// the id.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum PhysioRef {
    Brief(PhysioBrief),
    Id(String),
}

impl PhysioRef {
    pub fn id(&self) -> &str {
        match self {
            PhysioRef::Brief(brief) => &brief.id,
            PhysioRef::Id(id) => id,
        }
    }

    /// Display name, empty when only the id is known.
    pub fn display_name(&self) -> String {
        match self {
            PhysioRef::Brief(brief) => brief.full_name(),
            PhysioRef::Id(_) => String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_physio_ref_embedded() {
        let json = r#"{"_id":"ph-1","name":"Marta","surname":"Soler"}"#;
        let physio: PhysioRef = serde_json::from_str(json).unwrap();

        assert_eq!(physio.id(), "ph-1");
        assert_eq!(physio.display_name(), "Marta Soler");
    }

    #[test]
    fn test_physio_ref_bare_id() {
        let physio: PhysioRef = serde_json::from_str(r#""ph-2""#).unwrap();

        assert_eq!(physio.id(), "ph-2");
        assert_eq!(physio.display_name(), "");
    }

    #[test]
    fn test_deserialize_physio() {
        let json = r#"{
            "_id": "ph-1",
            "name": "Marta",
            "surname": "Soler",
            "specialty": "Sports",
            "licenseNumber": "LIC-0042",
            "email": "marta@example.com",
            "image": null
        }"#;

        let physio: PhysioItem = serde_json::from_str(json).unwrap();
        assert_eq!(physio.license_number, "LIC-0042");
        assert_eq!(physio.full_name(), "Marta Soler");
    }
}
