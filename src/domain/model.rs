use crate::utils::error::{AdviceError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdviceKind {
    GrowthAnalysis,
    MilestoneEvaluation,
    GeneralAdvice,
}

impl AdviceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AdviceKind::GrowthAnalysis => "growth_analysis",
            AdviceKind::MilestoneEvaluation => "milestone_evaluation",
            AdviceKind::GeneralAdvice => "general_advice",
        }
    }
}

impl fmt::Display for AdviceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AdviceKind {
    type Err = AdviceError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "growth_analysis" => Ok(AdviceKind::GrowthAnalysis),
            "milestone_evaluation" => Ok(AdviceKind::MilestoneEvaluation),
            "general_advice" => Ok(AdviceKind::GeneralAdvice),
            other => Err(AdviceError::InvalidRequestKind(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GrowthData {
    pub name: String,
    pub age_months: f64,
    pub gender: String,
    /// Centimetres.
    pub height: f64,
    /// Kilograms.
    pub weight: f64,
    pub bmi: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Milestone {
    pub title: String,
    pub is_achieved: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MilestoneData {
    pub age_months: f64,
    pub milestones: Vec<Milestone>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionData {
    pub question: String,
}

/// A decoded advice request. The payload always matches the kind.
#[derive(Debug, Clone, PartialEq)]
pub enum AdviceRequest {
    GrowthAnalysis(GrowthData),
    MilestoneEvaluation(MilestoneData),
    GeneralAdvice(QuestionData),
}

/// Wire envelope: `{ "type": ..., "data": ... }`.
#[derive(Debug, Deserialize)]
pub struct RawAdviceRequest {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub data: serde_json::Value,
}

impl AdviceRequest {
    pub fn kind(&self) -> AdviceKind {
        match self {
            AdviceRequest::GrowthAnalysis(_) => AdviceKind::GrowthAnalysis,
            AdviceRequest::MilestoneEvaluation(_) => AdviceKind::MilestoneEvaluation,
            AdviceRequest::GeneralAdvice(_) => AdviceKind::GeneralAdvice,
        }
    }

    /// Resolves the kind first, then decodes and validates the payload for it.
    pub fn from_parts(kind: &str, payload: &serde_json::Value) -> Result<Self> {
        let kind: AdviceKind = kind.parse()?;
        let request = match kind {
            AdviceKind::GrowthAnalysis => AdviceRequest::GrowthAnalysis(decode(kind, payload)?),
            AdviceKind::MilestoneEvaluation => {
                AdviceRequest::MilestoneEvaluation(decode(kind, payload)?)
            }
            AdviceKind::GeneralAdvice => AdviceRequest::GeneralAdvice(decode(kind, payload)?),
        };
        request.validate()?;
        Ok(request)
    }

    pub fn from_json_slice(body: &[u8]) -> Result<Self> {
        if body.is_empty() {
            return Err(AdviceError::MalformedBody("empty body".to_string()));
        }
        let raw: RawAdviceRequest = serde_json::from_slice(body)
            .map_err(|e| AdviceError::MalformedBody(e.to_string()))?;
        Self::from_parts(&raw.kind, &raw.data)
    }

    fn validate(&self) -> Result<()> {
        let kind = self.kind().as_str();
        match self {
            AdviceRequest::GrowthAnalysis(data) => {
                require_text(kind, "name", &data.name)?;
                require_text(kind, "gender", &data.gender)?;
                require_age(kind, data.age_months)?;
                require_positive(kind, "height", data.height)?;
                require_positive(kind, "weight", data.weight)?;
                require_positive(kind, "bmi", data.bmi)?;
            }
            AdviceRequest::MilestoneEvaluation(data) => {
                require_age(kind, data.age_months)?;
                for (index, milestone) in data.milestones.iter().enumerate() {
                    require_text(kind, &format!("milestones[{index}].title"), &milestone.title)?;
                }
            }
            AdviceRequest::GeneralAdvice(data) => {
                require_text(kind, "question", &data.question)?;
            }
        }
        Ok(())
    }
}

fn decode<T: serde::de::DeserializeOwned>(kind: AdviceKind, payload: &serde_json::Value) -> Result<T> {
    T::deserialize(payload).map_err(|e| AdviceError::invalid_payload(kind.as_str(), e.to_string()))
}

fn require_text(kind: &str, field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(AdviceError::invalid_payload(kind, format!("{field} is empty")));
    }
    Ok(())
}

fn require_age(kind: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(AdviceError::invalid_payload(
            kind,
            format!("ageMonths must be a non-negative number, got {value}"),
        ));
    }
    Ok(())
}

fn require_positive(kind: &str, field: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(AdviceError::invalid_payload(
            kind,
            format!("{field} must be a positive number, got {value}"),
        ));
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptPair {
    pub system_prompt: String,
    pub user_prompt: String,
}

/// Result of exactly one gateway call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayOutcome {
    Success(String),
    RateLimited,
    PaymentRequired,
    ServiceError(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AdviceResponse {
    Advice {
        advice: String,
    },
    Error {
        error: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        detail: Option<String>,
    },
}

impl AdviceResponse {
    pub fn error(message: impl Into<String>) -> Self {
        AdviceResponse::Error {
            error: message.into(),
            detail: None,
        }
    }
}
