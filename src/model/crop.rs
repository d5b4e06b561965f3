use serde::Deserialize;
use serde::Serialize;
use uuid::Uuid;

use super::Query;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Crop {
    pub id:      Uuid,
    pub name:    String,
    /// `YYYY`
    pub year:    String,
    pub farm_id: Uuid,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CropDraft {
    pub id:      Option<Uuid>,
    pub name:    String,
    pub year:    String,
    pub farm_id: Uuid,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCrop {
    pub name:    String,
    pub year:    String,
    pub farm_id: Uuid,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CropPatch {
    pub name:    Option<String>,
    pub year:    Option<String>,
    pub farm_id: Option<Uuid>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CropFilter {
    All,
    /// Case-insensitive substring of the name.
    NameContains(String),
    Year {
        year:    String,
        farm_id: Option<Uuid>,
    },
    /// Inclusive range of years.
    YearRange {
        start: u16,
        end:   u16,
    },
    Farm(Uuid),
}

impl Query for CropFilter {
    fn cache_slot(&self) -> Option<(&'static str, Uuid)> {
        match self {
            CropFilter::Farm(id) => Some(("farm", *id)),
            _ => None,
        }
    }

    fn requires_match(&self) -> bool {
        matches!(self, CropFilter::Farm(_))
    }
}
