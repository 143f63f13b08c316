//! Content-risk scoring collaborator.
//!
//! Given message text, the scorer returns a severity in [0, 1] plus a
//! taxonomy classification. The HTTP implementation calls a comment-analysis
//! API that scores several risk attributes per message; the blend of those
//! sub-scores into one severity lives here, not in the engine, which only
//! consumes the resulting triple.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;

use modbot_core::Category;

/// Result of scoring one piece of text.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreResult {
    /// Blended severity in [0, 1].
    pub severity: f64,
    /// Taxonomy category suggested by the dominant risk attribute.
    pub category: Category,
    /// Suggested subcategory from that category's list.
    pub subcategory: String,
}

#[async_trait]
pub trait Scorer: Send + Sync {
    async fn score(&self, text: &str) -> Result<ScoreResult>;
}

/// The risk attributes requested from the analysis API, with the taxonomy
/// classification each one suggests when dominant.
const ATTRIBUTES: [(&str, Category, &str); 6] = [
    ("SEVERE_TOXICITY", Category::HateHarassment, "other"),
    ("TOXICITY", Category::HateHarassment, "other"),
    ("IDENTITY_ATTACK", Category::HateHarassment, "other"),
    ("THREAT", Category::Violence, "toward others"),
    ("FLIRTATION", Category::IntimateMaterials, "other"),
    ("PROFANITY", Category::Other, "other"),
];

/// Blend per-attribute scores into one severity.
///
/// Mean of the sub-scores, minus the amount by which their spread exceeds its
/// own average magnitude (population stddev minus mean absolute deviation),
/// floored at 0. A message that is uniformly risky across attributes keeps
/// its full mean; one carried by a single outlier attribute is discounted.
pub fn blend_severity(scores: &[f64]) -> f64 {
    if scores.is_empty() {
        return 0.0;
    }
    let n = scores.len() as f64;
    let mean = scores.iter().sum::<f64>() / n;
    let variance = scores.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / n;
    let mean_abs_dev = scores.iter().map(|s| (s - mean).abs()).sum::<f64>() / n;
    let penalty = (variance.sqrt() - mean_abs_dev).max(0.0);
    (mean - penalty).clamp(0.0, 1.0)
}

#[derive(Serialize)]
struct AnalyzeRequest<'a> {
    comment: CommentBody<'a>,
    languages: &'a [&'a str],
    #[serde(rename = "requestedAttributes")]
    requested_attributes: serde_json::Value,
    #[serde(rename = "doNotStore")]
    do_not_store: bool,
}

#[derive(Serialize)]
struct CommentBody<'a> {
    text: &'a str,
}

/// HTTP client for the comment-analysis API.
#[derive(Clone)]
pub struct HttpScorer {
    client: Client,
    base_url: String,
    api_key: String,
}

impl HttpScorer {
    pub fn new(base_url: String, api_key: String) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .context("failed to build scoring HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }
}

#[async_trait]
impl Scorer for HttpScorer {
    async fn score(&self, text: &str) -> Result<ScoreResult> {
        let mut requested = serde_json::Map::new();
        for (name, _, _) in ATTRIBUTES {
            requested.insert(name.to_string(), serde_json::json!({}));
        }

        let request = AnalyzeRequest {
            comment: CommentBody { text },
            languages: &["en"],
            requested_attributes: serde_json::Value::Object(requested),
            do_not_store: true,
        };

        let url = format!(
            "{}/v1alpha1/comments:analyze?key={}",
            self.base_url, self.api_key
        );
        let response = self.client.post(&url).json(&request).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(anyhow!(
                "scoring API error: {} - {}",
                status,
                error_text
            ));
        }

        let body: serde_json::Value = response.json().await?;
        let attribute_scores = body
            .get("attributeScores")
            .and_then(|v| v.as_object())
            .context("scoring response missing attributeScores")?;

        let mut scores = Vec::with_capacity(ATTRIBUTES.len());
        let mut dominant: Option<(f64, Category, &str)> = None;
        for (name, category, subcategory) in ATTRIBUTES {
            let value = attribute_scores
                .get(name)
                .and_then(|a| a.pointer("/summaryScore/value"))
                .and_then(|v| v.as_f64())
                .with_context(|| format!("scoring response missing score for {}", name))?;
            scores.push(value);
            if dominant.map_or(true, |(best, _, _)| value > best) {
                dominant = Some((value, category, subcategory));
            }
        }

        let (_, category, subcategory) =
            dominant.context("scoring response contained no attributes")?;

        Ok(ScoreResult {
            severity: blend_severity(&scores),
            category,
            subcategory: subcategory.to_string(),
        })
    }
}
