use serde::Deserialize;
use serde::Serialize;
use uuid::Uuid;

use super::Crop;
use super::Query;

/// A culture planted within a crop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlantedCulture {
    pub id:      Uuid,
    pub name:    String,
    pub crop_id: Uuid,
    #[serde(default)]
    pub crop:    Option<Crop>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlantedDraft {
    pub id:      Option<Uuid>,
    pub name:    String,
    pub crop_id: Uuid,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPlanted {
    pub name:    String,
    pub crop_id: Uuid,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlantedPatch {
    pub name:    Option<String>,
    pub crop_id: Option<Uuid>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PlantedFilter {
    All,
    /// Case-insensitive substring of the name.
    NameContains(String),
    Crop(Uuid),
}

impl Query for PlantedFilter {
    fn cache_slot(&self) -> Option<(&'static str, Uuid)> {
        match self {
            PlantedFilter::Crop(id) => Some(("crop", *id)),
            _ => None,
        }
    }
}
