use std::collections::HashMap;
use std::path::PathBuf;

use crate::models::{Category, MarginConfig, Unit, WasteItem};

pub const API_BASE: &str = "https://api.wastemarket.id/v1";
pub const META_FILE: &str = "meta.json";

/// Identifier of the single global margin configuration record.
pub const MARGIN_CONFIG_ID: &str = "global";

pub const VISION_ENDPOINT: &str = "https://api.openai.com/v1";
pub const VISION_MODEL: &str = "gpt-4o-mini";
pub const CHAT_ENDPOINT: &str = "https://api.openai.com/v1";
pub const CHAT_MODEL: &str = "gpt-4o-mini";

pub const DEFAULT_MARGINS: MarginConfig = MarginConfig {
    tier1to2: 0.15,
    tier2to3: 0.20,
    tier3to4: 0.25,
};

pub fn json_files() -> HashMap<&'static str, &'static str> {
    HashMap::from([
        ("catalog", "catalog.json"),
        ("drop_points", "drop-points.json"),
        ("transactions", "transactions.json"),
        ("meta", META_FILE),
    ])
}

pub fn default_cache_dir() -> PathBuf {
    if let Some(cache) = dirs::cache_dir() {
        cache.join("wastemarket-sdk")
    } else {
        PathBuf::from(".wastemarket-sdk-cache")
    }
}

/// Catalog used when no remote copy is reachable or cached.
pub fn builtin_catalog() -> Vec<WasteItem> {
    let rows: [(&str, &str, Category, f64, Unit); 17] = [
        ("1.1", "Kardus", Category::Paper, 1500.0, Unit::Kg),
        ("1.2", "Kertas HVS", Category::Paper, 2500.0, Unit::Kg),
        ("1.3", "Koran", Category::Paper, 2000.0, Unit::Kg),
        ("1.4", "Duplex", Category::Paper, 600.0, Unit::Kg),
        ("2.1", "Botol PET Bening", Category::Plastic, 3500.0, Unit::Kg),
        ("2.2", "Gelas Plastik", Category::Plastic, 4000.0, Unit::Kg),
        ("2.3", "Plastik Kresek", Category::Plastic, 500.0, Unit::Kg),
        ("2.4", "Jerigen HDPE", Category::Plastic, 3000.0, Unit::Kg),
        ("3.1", "Aluminium", Category::Metal, 11000.0, Unit::Kg),
        ("3.2", "Besi", Category::Metal, 3000.0, Unit::Kg),
        ("3.3", "Tembaga", Category::Metal, 70000.0, Unit::Kg),
        ("3.4", "Kuningan", Category::Metal, 40000.0, Unit::Kg),
        ("4.1", "Handphone Bekas", Category::Electronics, 15000.0, Unit::Set),
        ("4.2", "Kipas Angin", Category::Electronics, 20000.0, Unit::Set),
        ("4.3", "Aki Bekas", Category::Electronics, 12000.0, Unit::Set),
        ("5.1", "Minyak Jelantah", Category::Other, 5000.0, Unit::Kg),
        ("5.2", "Botol Kaca", Category::Other, 500.0, Unit::Kg),
    ];

    rows.into_iter()
        .map(|(code, name, category, base_price, unit)| WasteItem {
            code: code.to_string(),
            name: name.to_string(),
            category,
            base_price,
            unit,
        })
        .collect()
}
