use crate::domain::model::{AdviceRequest, GrowthData, MilestoneData, PromptPair};
use crate::utils::error::Result;

const GROWTH_SYSTEM_PROMPT: &str = "You are a pediatric growth specialist AI assistant. \
Analyze child growth data using WHO standards and provide clear, actionable insights for parents. \
Focus on being supportive and informative, not alarming.";

const MILESTONE_SYSTEM_PROMPT: &str = "You are a child development specialist AI. \
Evaluate milestone achievements and provide supportive, age-appropriate guidance to parents.";

const GENERAL_SYSTEM_PROMPT: &str = "You are a friendly parenting AI assistant with expertise in \
child development and nutrition for children aged 3 months to 10 years. \
Provide practical, evidence-based advice.";

/// Builds the prompts for an untyped `(type, data)` pair.
///
/// The kind is checked before the payload is looked at, so an unknown kind
/// fails with `InvalidRequestKind` regardless of what `payload` holds.
pub fn build(kind: &str, payload: &serde_json::Value) -> Result<PromptPair> {
    let request = AdviceRequest::from_parts(kind, payload)?;
    Ok(build_for(&request))
}

pub fn build_for(request: &AdviceRequest) -> PromptPair {
    match request {
        AdviceRequest::GrowthAnalysis(data) => PromptPair {
            system_prompt: GROWTH_SYSTEM_PROMPT.to_string(),
            user_prompt: growth_user_prompt(data),
        },
        AdviceRequest::MilestoneEvaluation(data) => PromptPair {
            system_prompt: MILESTONE_SYSTEM_PROMPT.to_string(),
            user_prompt: milestone_user_prompt(data),
        },
        AdviceRequest::GeneralAdvice(data) => PromptPair {
            system_prompt: GENERAL_SYSTEM_PROMPT.to_string(),
            user_prompt: data.question.clone(),
        },
    }
}

fn growth_user_prompt(data: &GrowthData) -> String {
    format!(
        "Analyze this child's growth data:\n\
         - Name: {}\n\
         - Age: {} months\n\
         - Gender: {}\n\
         - Height: {} cm\n\
         - Weight: {} kg\n\
         - BMI: {}\n\
         \n\
         Provide a brief analysis (max 3 paragraphs) covering:\n\
         1. Overall growth assessment relative to WHO standards\n\
         2. Any notable trends or observations\n\
         3. Practical recommendations for parents",
        data.name, data.age_months, data.gender, data.height, data.weight, data.bmi
    )
}

fn milestone_user_prompt(data: &MilestoneData) -> String {
    let lines = data
        .milestones
        .iter()
        .map(|m| {
            let status = if m.is_achieved { "Achieved" } else { "Not yet" };
            format!("- {}: {}", m.title, status)
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "Evaluate these milestones for a {}-month-old child:\n\
         {}\n\
         \n\
         Provide a brief evaluation (max 3 paragraphs) covering:\n\
         1. Development assessment for this age\n\
         2. Notable achievements\n\
         3. Gentle suggestions for supporting continued development",
        data.age_months, lines
    )
}
