use std::fmt;

use chrono::Utc;
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// LineEntry: (item code, quantity) pair
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineEntry {
    pub code: String,
    /// Kilograms for mass-priced items, count for set-priced items.
    pub qty: f64,
}

impl LineEntry {
    pub fn new(code: impl Into<String>, qty: f64) -> Self {
        Self {
            code: code.into(),
            qty,
        }
    }
}

// ---------------------------------------------------------------------------
// TransactionStatus
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Pending,
    Done,
    Cancelled,
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TransactionStatus::Pending => "pending",
            TransactionStatus::Done => "done",
            TransactionStatus::Cancelled => "cancelled",
        })
    }
}

// ---------------------------------------------------------------------------
// TransactionRecord: an exchange event owned by the backend
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRecord {
    pub id: String,
    /// RFC 3339 timestamp.
    pub timestamp: String,
    pub party: String,
    pub drop_point_id: String,
    #[serde(default)]
    pub items: Vec<LineEntry>,
    pub status: TransactionStatus,
}

impl TransactionRecord {
    /// Draft a new pending transaction with a generated id and the current time.
    pub fn pending(
        party: impl Into<String>,
        drop_point_id: impl Into<String>,
        items: Vec<LineEntry>,
    ) -> Self {
        let suffix: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(8)
            .map(char::from)
            .collect();
        Self {
            id: format!("TRX-{}", suffix.to_uppercase()),
            timestamp: Utc::now().to_rfc3339(),
            party: party.into(),
            drop_point_id: drop_point_id.into(),
            items,
            status: TransactionStatus::Pending,
        }
    }
}
