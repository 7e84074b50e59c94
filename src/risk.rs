use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::{DcasError, Result};
use crate::models::{RiskAnalysisResult, RiskLevel, Transaction};
use crate::settings::{ApiKey, Settings};

/// Scores a batch of transactions. Implementations may score only a prefix
/// of the batch; callers merge whatever comes back by transaction id.
pub trait RiskScorer {
    fn name(&self) -> &'static str;
    fn score(&self, txns: &[Transaction]) -> Result<Vec<RiskAnalysisResult>>;
}

// ---------------------------------------------------------------------------
// Local fallback
// ---------------------------------------------------------------------------

const HIGH_VALUE_SCORE: u8 = 85;
const BASELINE_SCORE: u8 = 10;

/// Deterministic offline scorer used when no credential is configured.
pub struct LocalRiskScorer {
    high_value_threshold: f64,
}

impl LocalRiskScorer {
    pub fn new(high_value_threshold: f64) -> Self {
        Self { high_value_threshold }
    }

    pub fn assess(&self, txn: &Transaction) -> RiskAnalysisResult {
        if txn.amount > self.high_value_threshold {
            RiskAnalysisResult {
                transaction_id: txn.id.clone(),
                risk_score: HIGH_VALUE_SCORE,
                risk_level: RiskLevel::High,
                reasoning: "High value transaction".to_string(),
                is_anomaly: true,
            }
        } else {
            RiskAnalysisResult {
                transaction_id: txn.id.clone(),
                risk_score: BASELINE_SCORE,
                risk_level: RiskLevel::Low,
                reasoning: "Within expected range".to_string(),
                is_anomaly: false,
            }
        }
    }
}

impl RiskScorer for LocalRiskScorer {
    fn name(&self) -> &'static str {
        "local"
    }

    fn score(&self, txns: &[Transaction]) -> Result<Vec<RiskAnalysisResult>> {
        Ok(txns.iter().map(|t| self.assess(t)).collect())
    }
}

// ---------------------------------------------------------------------------
// Gemini
// ---------------------------------------------------------------------------

pub struct GeminiRiskScorer {
    client: reqwest::blocking::Client,
    api_key: ApiKey,
    api_base: String,
    model: String,
    max_batch: usize,
}

impl GeminiRiskScorer {
    pub fn new(api_key: ApiKey, settings: &Settings) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(concat!("dcas/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            api_key,
            api_base: settings.api_base.trim_end_matches('/').to_string(),
            model: settings.model.clone(),
            max_batch: settings.max_batch,
        })
    }

    pub fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.api_base, self.model)
    }

    /// The slice actually submitted: a size guard on the request, not a rule.
    pub fn batch<'a>(&self, txns: &'a [Transaction]) -> &'a [Transaction] {
        &txns[..txns.len().min(self.max_batch)]
    }

    pub fn request_body(&self, txns: &[Transaction]) -> Result<Value> {
        let prompt = build_prompt(self.batch(txns))?;
        Ok(json!({
            "contents": [{ "role": "user", "parts": [{ "text": prompt }] }],
            "generationConfig": {
                "responseMimeType": "application/json",
                "responseSchema": response_schema(),
            }
        }))
    }
}

impl RiskScorer for GeminiRiskScorer {
    fn name(&self) -> &'static str {
        "gemini"
    }

    fn score(&self, txns: &[Transaction]) -> Result<Vec<RiskAnalysisResult>> {
        let body = self.request_body(txns)?;
        tracing::info!(
            model = %self.model,
            submitted = self.batch(txns).len(),
            total = txns.len(),
            "requesting risk analysis"
        );
        let response: Value = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", self.api_key.expose())
            .json(&body)
            .send()?
            .error_for_status()?
            .json()?;
        parse_generate_content(&response)
    }
}

pub fn build_prompt(txns: &[Transaction]) -> Result<String> {
    let payload = serde_json::to_string(txns)?;
    Ok(format!(
        "You are assisting a cash audit. Review the transactions below for audit risk.\n\
         Treat these as elevated-risk signals:\n\
         - round-number amounts\n\
         - transactions dated on a Saturday or Sunday\n\
         - unusually high amounts relative to the rest of the batch\n\
         - repeated amounts or repeated reference numbers\n\
         Respond with a JSON array holding one object per transaction with the fields \
         transactionId, riskScore (0-100), riskLevel (Low, Medium or High), reasoning \
         and isAnomaly (boolean).\n\n\
         Transactions: {payload}"
    ))
}

fn response_schema() -> Value {
    json!({
        "type": "ARRAY",
        "items": {
            "type": "OBJECT",
            "properties": {
                "transactionId": { "type": "STRING" },
                "riskScore": { "type": "NUMBER" },
                "riskLevel": { "type": "STRING", "enum": ["Low", "Medium", "High"] },
                "reasoning": { "type": "STRING" },
                "isAnomaly": { "type": "BOOLEAN" }
            },
            "required": ["transactionId", "riskScore", "riskLevel", "reasoning", "isAnomaly"]
        }
    })
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireResult {
    transaction_id: String,
    risk_score: f64,
    risk_level: String,
    reasoning: String,
    is_anomaly: bool,
}

impl WireResult {
    fn validate(self) -> Result<RiskAnalysisResult> {
        if !self.risk_score.is_finite() || !(0.0..=100.0).contains(&self.risk_score) {
            return Err(DcasError::RiskResponse(format!(
                "riskScore {} out of range for {}",
                self.risk_score, self.transaction_id
            )));
        }
        let risk_level = RiskLevel::parse(&self.risk_level).ok_or_else(|| {
            DcasError::RiskResponse(format!("unknown riskLevel {:?}", self.risk_level))
        })?;
        Ok(RiskAnalysisResult {
            transaction_id: self.transaction_id,
            risk_score: self.risk_score.round() as u8,
            risk_level,
            reasoning: self.reasoning,
            is_anomaly: self.is_anomaly,
        })
    }
}

/// Parse the model's JSON text. Any entry outside the schema rejects the
/// whole response.
pub fn parse_results_json(text: &str) -> Result<Vec<RiskAnalysisResult>> {
    let wire: Vec<WireResult> = serde_json::from_str(text)?;
    wire.into_iter().map(WireResult::validate).collect()
}

/// Pull the generated text out of a `generateContent` response body.
/// A response without text yields no results.
pub fn parse_generate_content(body: &Value) -> Result<Vec<RiskAnalysisResult>> {
    let text: String = body
        .pointer("/candidates/0/content/parts")
        .and_then(Value::as_array)
        .map(|parts| {
            parts
                .iter()
                .filter_map(|p| p.get("text").and_then(Value::as_str))
                .collect()
        })
        .unwrap_or_default();
    if text.trim().is_empty() {
        tracing::warn!("risk analysis response contained no text");
        return Ok(Vec::new());
    }
    parse_results_json(&text)
}

// ---------------------------------------------------------------------------
// Selection and invocation
// ---------------------------------------------------------------------------

pub fn scorer_from_settings(settings: &Settings) -> Result<Box<dyn RiskScorer>> {
    match &settings.api_key {
        Some(key) => Ok(Box::new(GeminiRiskScorer::new(key.clone(), settings)?)),
        None => {
            tracing::warn!("no API key configured, using local risk analysis");
            Ok(Box::new(LocalRiskScorer::new(settings.high_value_threshold)))
        }
    }
}

/// Run one CAAT pass. Failures are logged and produce no results, so the
/// caller's existing risk fields stay as they were.
pub fn analyze_transactions(scorer: &dyn RiskScorer, txns: &[Transaction]) -> Vec<RiskAnalysisResult> {
    match scorer.score(txns) {
        Ok(results) => {
            tracing::info!(scorer = scorer.name(), results = results.len(), "risk analysis complete");
            results
        }
        Err(e) => {
            tracing::error!(scorer = scorer.name(), error = %e, "risk analysis failed");
            Vec::new()
        }
    }
}
