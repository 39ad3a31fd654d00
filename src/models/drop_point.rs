use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DropPointKind {
    /// Local collection point (bank sampah unit).
    Unit,
    /// Collection center (bank sampah induk).
    Induk,
    Pelapak,
}

impl DropPointKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DropPointKind::Unit => "unit",
            DropPointKind::Induk => "induk",
            DropPointKind::Pelapak => "pelapak",
        }
    }
}

/// A physical location where waste can be dropped off.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DropPoint {
    pub id: String,
    pub name: String,
    pub kind: DropPointKind,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
    pub operator: Option<String>,
}

/// A drop point annotated with its distance from a query origin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NearbyDropPoint {
    #[serde(flatten)]
    pub point: DropPoint,
    pub distance_km: f64,
}
