//! Shared fixtures for the marketplace SDK integration tests.
//!
//! `setup_sample_db()` builds an offline `Connection` over a temporary cache
//! directory with a small catalog, three drop points and a transactions
//! snapshot.

#![allow(dead_code)]

use std::sync::Mutex;
use std::time::Duration;

use wastemarket_sdk::assistant::ChatModel;
use wastemarket_sdk::models::{
    Category, ChatMessage, Detection, DropPoint, DropPointKind, Unit, WasteItem,
};
use wastemarket_sdk::{CacheManager, Catalog, Connection, MarketError, Result, VisionClassifier};

pub const OFFLINE_API: &str = "http://backend.invalid/v1";

/// Create a `Connection` with sample data loaded.
///
/// The caller must keep the returned `TempDir` alive for the whole test.
pub fn setup_sample_db() -> (Connection, tempfile::TempDir) {
    let tmp_dir = tempfile::tempdir().unwrap();
    write_transactions(tmp_dir.path());

    let conn = Connection::new(offline_cache(tmp_dir.path())).unwrap();
    conn.register_records(&sample_items()).unwrap();
    conn.register_records(&sample_drop_points()).unwrap();

    (conn, tmp_dir)
}

pub fn offline_cache(dir: &std::path::Path) -> CacheManager {
    CacheManager::new(
        Some(dir.to_path_buf()),
        OFFLINE_API,
        true,
        Duration::from_secs(30),
    )
    .unwrap()
}

fn item(code: &str, name: &str, category: Category, base_price: f64, unit: Unit) -> WasteItem {
    WasteItem {
        code: code.to_string(),
        name: name.to_string(),
        category,
        base_price,
        unit,
    }
}

/// At margins 0.15 / 0.20 / 0.25 these price out as:
///
/// | code | tier 1 | tier 2 | tier 3 | tier 4 |
/// |------|--------|--------|--------|--------|
/// | X.1  | 1500   | 1275   | 1020   | 765    |
/// | 1.1  | 1500   | 1275   | 1020   | 765    |
/// | 2.1  | 3500   | 2975   | 2380   | 1785   |
/// | 3.1  | 11000  | 9350   | 7480   | 5610   |
/// | 4.1  | 15000  | 12750  | 10200  | 7650   |
pub fn sample_items() -> Vec<WasteItem> {
    vec![
        item("X.1", "Sample Paper", Category::Paper, 1500.0, Unit::Kg),
        item("1.1", "Kardus", Category::Paper, 1500.0, Unit::Kg),
        item("2.1", "Botol PET", Category::Plastic, 3500.0, Unit::Kg),
        item("3.1", "Aluminium", Category::Metal, 11000.0, Unit::Kg),
        item("4.1", "Handphone Bekas", Category::Electronics, 15000.0, Unit::Set),
    ]
}

pub fn sample_catalog() -> Catalog {
    Catalog::new(sample_items()).unwrap()
}

pub fn sample_drop_points() -> Vec<DropPoint> {
    vec![
        DropPoint {
            id: "dp-1".to_string(),
            name: "Bank Sampah Melati".to_string(),
            kind: DropPointKind::Unit,
            address: "Jl. Melati 1, Jakarta".to_string(),
            latitude: -6.2000,
            longitude: 106.8166,
            operator: Some("siti".to_string()),
        },
        DropPoint {
            id: "dp-2".to_string(),
            name: "Bank Sampah Induk Kenanga".to_string(),
            kind: DropPointKind::Induk,
            address: "Jl. Kenanga 9, Jakarta".to_string(),
            latitude: -6.2250,
            longitude: 106.8000,
            operator: None,
        },
        DropPoint {
            id: "dp-3".to_string(),
            name: "Pelapak Jaya Abadi".to_string(),
            kind: DropPointKind::Pelapak,
            address: "Jl. Industri 3, Bekasi".to_string(),
            latitude: -6.1500,
            longitude: 106.9000,
            operator: None,
        },
    ]
}

/// Transactions snapshot, wrapped in a `data` object like the backend serves it.
///
/// Consumer-tier values: TRX-001 = 11220, TRX-002 = 8415 (one unknown line),
/// TRX-003 = 7650 (cancelled), TRX-004 = 7140.
fn write_transactions(dir: &std::path::Path) {
    let body = serde_json::json!({
        "data": [
            {
                "id": "TRX-001",
                "timestamp": "2024-05-01T10:00:00Z",
                "party": "siti",
                "dropPointId": "dp-1",
                "items": [{"code": "1.1", "qty": 10.0}, {"code": "2.1", "qty": 2.0}],
                "status": "done"
            },
            {
                "id": "TRX-002",
                "timestamp": "2024-05-02T09:00:00Z",
                "party": "budi",
                "dropPointId": "dp-2",
                "items": [{"code": "3.1", "qty": 1.5}, {"code": "UNKNOWN", "qty": 3.0}],
                "status": "pending"
            },
            {
                "id": "TRX-003",
                "timestamp": "2024-05-03T08:30:00Z",
                "party": "siti",
                "dropPointId": "dp-1",
                "items": [{"code": "4.1", "qty": 1.0}],
                "status": "cancelled"
            },
            {
                "id": "TRX-004",
                "timestamp": "2024-05-04T16:45:00Z",
                "party": "budi",
                "dropPointId": "dp-1",
                "items": [{"code": "2.1", "qty": 4.0}],
                "status": "done"
            }
        ]
    });
    std::fs::write(dir.join("transactions.json"), body.to_string()).unwrap();
}

// ---------------------------------------------------------------------------
// Service fakes
// ---------------------------------------------------------------------------

/// Classifier that always returns the same detections.
pub struct StaticClassifier(pub Vec<Detection>);

impl VisionClassifier for StaticClassifier {
    fn classify(&self, _image: &[u8], _mime: &str, _catalog: &Catalog) -> Result<Vec<Detection>> {
        Ok(self.0.clone())
    }
}

/// Classifier standing in for an unreachable service.
pub struct FailingClassifier;

impl VisionClassifier for FailingClassifier {
    fn classify(&self, _image: &[u8], _mime: &str, _catalog: &Catalog) -> Result<Vec<Detection>> {
        Err(MarketError::Service("connection refused".into()))
    }
}

pub fn detection(code: &str, category: &str, qty: f64) -> Detection {
    Detection {
        description: format!("detected {}", code),
        item_code: code.to_string(),
        category: category.to_string(),
        estimated_quantity: qty,
        tip: "Rinse before drop-off".to_string(),
    }
}

/// Chat model that records every request and answers with a fixed reply.
pub struct RecordingChat {
    pub reply: String,
    pub requests: Mutex<Vec<Vec<ChatMessage>>>,
}

impl RecordingChat {
    pub fn new(reply: &str) -> Self {
        Self {
            reply: reply.to_string(),
            requests: Mutex::new(Vec::new()),
        }
    }
}

impl ChatModel for RecordingChat {
    fn complete(&self, messages: &[ChatMessage]) -> Result<String> {
        self.requests.lock().unwrap().push(messages.to_vec());
        Ok(self.reply.clone())
    }
}

pub struct FailingChat;

impl ChatModel for FailingChat {
    fn complete(&self, _messages: &[ChatMessage]) -> Result<String> {
        Err(MarketError::Service("HTTP 503".into()))
    }
}
