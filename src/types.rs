use std::ops::Deref;

use serde::Deserialize;
use serde::Serialize;

/// Kind of a Brazilian taxpayer identifier.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display, strum::EnumString, strum::EnumIter,
)]
pub enum DocumentType {
    /// Individual taxpayer, 11 digits.
    #[serde(rename = "CPF")]
    #[strum(serialize = "CPF")]
    Cpf,
    /// Corporate taxpayer, 14 digits.
    #[serde(rename = "CNPJ")]
    #[strum(serialize = "CNPJ")]
    Cnpj,
}

impl DocumentType {
    /// Length of a normalized document of this kind.
    pub fn digits(&self) -> usize {
        match self {
            DocumentType::Cpf => 11,
            DocumentType::Cnpj => 14,
        }
    }
}

/// Relations a primary store can be asked to load along with a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum RelationKind {
    /// Producer's farms.
    Farms,
    /// Farm's owner.
    Producer,
    /// Farm's crops.
    Crops,
    /// Planted culture's crop.
    Crop,
}

/// Where a value came from.
///
/// A snapshot is whatever JSON was stored in the cache at the time of the last write or read-through. Relation fields
/// embedded in it are frozen and may disagree with the current state of the primary store. A fresh value has just been
/// loaded from the primary store.
#[derive(Debug, Clone, PartialEq)]
pub enum Record<T> {
    Fresh(T),
    Snapshot(T),
}

impl<T> Record<T> {
    #[inline]
    pub fn is_snapshot(&self) -> bool {
        matches!(self, Record::Snapshot(_))
    }

    #[inline]
    pub fn is_fresh(&self) -> bool {
        matches!(self, Record::Fresh(_))
    }

    pub fn into_inner(self) -> T {
        match self {
            Record::Fresh(v) | Record::Snapshot(v) => v,
        }
    }
}

impl<T> Deref for Record<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        match self {
            Record::Fresh(v) | Record::Snapshot(v) => v,
        }
    }
}
