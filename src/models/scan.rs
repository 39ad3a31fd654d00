use serde::{Deserialize, Deserializer, Serialize};

use super::item::WasteItem;

// ---------------------------------------------------------------------------
// Detection: raw record returned by the vision classifier
// ---------------------------------------------------------------------------

/// Every field tolerates being absent or `null`; a record with no usable
/// item code simply fails to match the catalog.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Detection {
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub item_code: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub category: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub estimated_quantity: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tip: String,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// ---------------------------------------------------------------------------
// ScanLine: a detection accepted against the catalog
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanLine {
    pub item: WasteItem,
    pub quantity: f64,
    pub description: String,
    pub tip: String,
    /// True when the classifier's code was unknown and a category
    /// stand-in was used instead.
    pub substituted: bool,
}
