//! Photo-based waste recognition.
//!
//! A [`VisionClassifier`] turns an image into raw [`Detection`]s; the
//! [`Scanner`] reconciles them against the catalog and never fails: any
//! classifier error becomes an empty outcome carrying a [`Notice`].

use std::time::Duration;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::aggregate::{aggregate, Aggregate};
use crate::catalog::Catalog;
use crate::error::{MarketError, Result};
use crate::models::{Category, Detection, LineEntry, MarginConfig, Notice, ScanLine, Tier};

// ---------------------------------------------------------------------------
// VisionClassifier
// ---------------------------------------------------------------------------

pub trait VisionClassifier: Send + Sync {
    /// Classify the waste visible in an image. `catalog` is provided so the
    /// prompt can list valid item codes.
    fn classify(&self, image: &[u8], mime_type: &str, catalog: &Catalog) -> Result<Vec<Detection>>;
}

/// Classifier backed by an OpenAI-compatible chat completions endpoint with
/// image input.
pub struct OpenAiVisionClassifier {
    client: Client,
    endpoint: String,
    model: String,
    api_key: Option<String>,
}

impl OpenAiVisionClassifier {
    pub fn new(
        endpoint: &str,
        model: &str,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            model: model.to_string(),
            api_key,
        })
    }
}

impl VisionClassifier for OpenAiVisionClassifier {
    fn classify(&self, image: &[u8], mime_type: &str, catalog: &Catalog) -> Result<Vec<Detection>> {
        let data_url = format!("data:{};base64,{}", mime_type, STANDARD.encode(image));
        let body = json!({
            "model": self.model,
            "temperature": 0.2,
            "messages": [
                { "role": "system", "content": classification_prompt(catalog) },
                {
                    "role": "user",
                    "content": [
                        { "type": "text", "text": "Identify the recyclable waste in this photo." },
                        { "type": "image_url", "image_url": { "url": data_url } }
                    ]
                }
            ]
        });

        let mut request = self
            .client
            .post(format!("{}/chat/completions", self.endpoint))
            .json(&body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let resp: Value = request.send()?.error_for_status()?.json()?;
        let content = resp["choices"][0]["message"]["content"]
            .as_str()
            .ok_or_else(|| MarketError::Service("vision response has no message content".into()))?;
        parse_detections(content)
    }
}

fn classification_prompt(catalog: &Catalog) -> String {
    let mut prompt = String::from(
        "You classify recyclable waste for a waste bank. Answer with a JSON array only. \
         Each element has: description, itemCode, category, estimatedQuantity (kg, or \
         count for set items), tip. Use only these item codes:\n",
    );
    for item in catalog.items() {
        prompt.push_str(&format!(
            "{} {} ({}, per {})\n",
            item.code, item.name, item.category, item.unit
        ));
    }
    prompt
}

/// Parse classifier output into detections.
///
/// Tolerates Markdown code fences and an object wrapper of the form
/// `{"items": [...]}`. Only an unreadable envelope is an error; a single
/// malformed record becomes an empty [`Detection`] that
/// [`reconcile`] counts as unclassified.
pub fn parse_detections(content: &str) -> Result<Vec<Detection>> {
    let trimmed = content.trim();
    let body = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .map(|rest| rest.trim_end().trim_end_matches("```"))
        .unwrap_or(trimmed)
        .trim();

    let value: Value = serde_json::from_str(body)
        .map_err(|e| MarketError::Service(format!("malformed vision response: {}", e)))?;
    let rows = match value {
        Value::Array(rows) => rows,
        Value::Object(mut map) => match map.remove("items") {
            Some(Value::Array(rows)) => rows,
            _ => return Err(MarketError::Service("vision response has no items array".into())),
        },
        _ => return Err(MarketError::Service("vision response is not a list".into())),
    };

    Ok(rows
        .into_iter()
        .map(|row| {
            serde_json::from_value(row).unwrap_or_else(|e| {
                debug!("malformed detection kept as unclassified: {}", e);
                Detection::default()
            })
        })
        .collect())
}

// ---------------------------------------------------------------------------
// Reconciliation
// ---------------------------------------------------------------------------

/// What to do with a detection whose item code is not in the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnmatchedCodePolicy {
    /// Drop it and count it as unclassified.
    #[default]
    Discard,
    /// Substitute the first catalog item of the detection's category; drop
    /// it only when the category is unknown or empty.
    FirstInCategory,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanOutcome {
    pub lines: Vec<ScanLine>,
    /// Detections that could not be matched to a catalog item.
    pub unclassified: usize,
    /// True when classification did not run and the outcome is a placeholder.
    pub degraded: bool,
    pub notice: Option<Notice>,
}

impl ScanOutcome {
    /// Empty outcome used when classification could not run.
    pub fn fallback(notice: Notice) -> Self {
        Self {
            lines: Vec::new(),
            unclassified: 0,
            degraded: true,
            notice: Some(notice),
        }
    }

    pub fn is_degraded(&self) -> bool {
        self.degraded
    }

    /// Recognized items as line entries.
    pub fn line_entries(&self) -> Vec<LineEntry> {
        self.lines
            .iter()
            .map(|l| LineEntry::new(l.item.code.clone(), l.quantity))
            .collect()
    }

    /// Value the recognized items at a tier.
    pub fn total(&self, catalog: &Catalog, margins: &MarginConfig, tier: Tier) -> Aggregate {
        aggregate(&self.line_entries(), catalog, margins, tier)
    }
}

/// Match detections to catalog items under `policy`.
///
/// Negative or non-numeric quantity estimates are treated as zero.
pub fn reconcile(detections: Vec<Detection>, catalog: &Catalog, policy: UnmatchedCodePolicy) -> ScanOutcome {
    let mut outcome = ScanOutcome::default();

    for d in detections {
        let (item, substituted) = match catalog.get(d.item_code.trim()) {
            Some(item) => (Some(item), false),
            None => match policy {
                UnmatchedCodePolicy::Discard => (None, false),
                UnmatchedCodePolicy::FirstInCategory => {
                    let stand_in = d
                        .category
                        .parse::<Category>()
                        .ok()
                        .and_then(|c| catalog.first_in_category(c));
                    (stand_in, true)
                }
            },
        };

        match item {
            Some(item) => outcome.lines.push(ScanLine {
                item: item.clone(),
                quantity: d.estimated_quantity.max(0.0),
                description: d.description,
                tip: d.tip,
                substituted,
            }),
            None => {
                debug!(code = %d.item_code, category = %d.category, "unclassified detection");
                outcome.unclassified += 1;
            }
        }
    }

    outcome
}

// ---------------------------------------------------------------------------
// Scanner
// ---------------------------------------------------------------------------

pub struct Scanner<'a> {
    classifier: Option<&'a dyn VisionClassifier>,
    catalog: &'a Catalog,
    policy: UnmatchedCodePolicy,
}

impl<'a> Scanner<'a> {
    pub fn new(
        classifier: Option<&'a dyn VisionClassifier>,
        catalog: &'a Catalog,
        policy: UnmatchedCodePolicy,
    ) -> Self {
        Self {
            classifier,
            catalog,
            policy,
        }
    }

    /// Classify an image and reconcile the result against the catalog.
    ///
    /// Never returns an error: a missing classifier, an empty image or a
    /// failed call yields [`ScanOutcome::fallback`].
    pub fn scan(&self, image: &[u8], mime_type: &str) -> ScanOutcome {
        let Some(classifier) = self.classifier else {
            return ScanOutcome::fallback(Notice::warning("Photo recognition is not configured."));
        };
        if image.is_empty() {
            return ScanOutcome::fallback(Notice::warning("The photo is empty."));
        }

        match classifier.classify(image, mime_type, self.catalog) {
            Ok(detections) => {
                let mut outcome = reconcile(detections, self.catalog, self.policy);
                if outcome.unclassified > 0 {
                    outcome.notice = Some(Notice::warning(format!(
                        "{} item(s) could not be matched to the price list.",
                        outcome.unclassified
                    )));
                }
                outcome
            }
            Err(e) => {
                warn!("vision classification failed: {}", e);
                ScanOutcome::fallback(Notice::error(
                    "Photo recognition failed. Please try again or enter items manually.",
                ))
            }
        }
    }
}
