use serde::Deserialize;
use serde::Serialize;
use uuid::Uuid;

use super::Crop;
use super::ProducerSummary;
use super::Query;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Farm {
    pub id:              Uuid,
    pub name:            String,
    pub city:            String,
    pub state:           String,
    pub total_area:      f64,
    pub arable_area:     f64,
    pub vegetation_area: f64,
    pub producer_id:     Uuid,
    #[serde(default)]
    pub producer:        Option<ProducerSummary>,
    #[serde(default)]
    pub crops:           Vec<Crop>,
}

/// Farm as listed by its producer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FarmSummary {
    pub id:              Uuid,
    pub name:            String,
    pub city:            String,
    pub state:           String,
    pub total_area:      f64,
    pub arable_area:     f64,
    pub vegetation_area: f64,
}

impl From<&Farm> for FarmSummary {
    fn from(f: &Farm) -> Self {
        Self {
            id:              f.id,
            name:            f.name.clone(),
            city:            f.city.clone(),
            state:           f.state.clone(),
            total_area:      f.total_area,
            arable_area:     f.arable_area,
            vegetation_area: f.vegetation_area,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FarmDraft {
    pub id:              Option<Uuid>,
    pub name:            String,
    pub city:            String,
    pub state:           String,
    pub total_area:      f64,
    pub arable_area:     f64,
    pub vegetation_area: f64,
    pub producer_id:     Uuid,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewFarm {
    pub name:            String,
    pub city:            String,
    pub state:           String,
    pub total_area:      f64,
    pub arable_area:     f64,
    pub vegetation_area: f64,
    pub producer_id:     Uuid,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FarmPatch {
    pub name:            Option<String>,
    pub city:            Option<String>,
    pub state:           Option<String>,
    pub total_area:      Option<f64>,
    pub arable_area:     Option<f64>,
    pub vegetation_area: Option<f64>,
    pub producer_id:     Option<Uuid>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FarmFilter {
    All,
    /// Case-insensitive substring of the name.
    NameContains(String),
    /// Farms of a state, optionally narrowed down to a city.
    Location {
        state: String,
        city:  Option<String>,
    },
    Producer(Uuid),
}

impl Query for FarmFilter {
    fn cache_slot(&self) -> Option<(&'static str, Uuid)> {
        match self {
            FarmFilter::Producer(id) => Some(("producer", *id)),
            _ => None,
        }
    }
}
