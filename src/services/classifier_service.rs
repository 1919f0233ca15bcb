use crate::error::{Error, Result};
use crate::models::screening::{CvVerdict, Verdict};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value as JsonValue;
use std::time::Duration;

/// The LLM seam. The screening engine only ever sees this trait, so tests
/// can drive the decision table without a network call.
#[async_trait]
pub trait CvClassifier: Send + Sync {
    async fn classify(&self, prompt: &str) -> Result<CvVerdict>;
}

/// Everything the prompt needs besides the CV itself.
#[derive(Debug, Clone)]
pub struct PromptContext<'a> {
    pub job_title: &'a str,
    pub job_description: &'a str,
    pub candidate_name: &'a str,
    pub cv_text: &'a str,
    pub global_instructions: Option<&'a str>,
}

/// Build the classification prompt. The model is instructed to answer with
/// exactly one of the six verdict labels and nothing but a JSON object.
pub fn build_prompt(ctx: &PromptContext<'_>) -> String {
    let mut prompt = format!(
        r#"You are a strict CV screening specialist. Evaluate how well the candidate's CV fits the job below.

Job title: {title}
Job description:
{description}

Candidate: {candidate}

CV:
{cv}
"#,
        title = ctx.job_title,
        description = ctx.job_description,
        candidate = ctx.candidate_name,
        cv = ctx.cv_text,
    );

    if let Some(instructions) = ctx.global_instructions {
        if !instructions.trim().is_empty() {
            prompt.push_str("\nOrganization screening instructions:\n");
            prompt.push_str(instructions);
            prompt.push('\n');
        }
    }

    prompt.push_str(
        r#"
Respond with a single JSON object and no surrounding commentary:
{ "result": <one of "No Fit" | "Bad Fit" | "Good Fit" | "Strong Fit" | "Ineligible CV" | "Insufficient Data">,
  "reason": "<concise explanation>",
  "confidence": <0-100>,
  "jobFitScore": <0-100> }
"#,
    );

    prompt
}

/// Strip a Markdown code fence (``` or ```json) wrapping the payload, if
/// any. Models wrap JSON this way often enough that parsing must tolerate it.
pub fn strip_code_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    let rest = rest.strip_suffix("```").unwrap_or(rest);
    rest.trim()
}

/// Parse the classifier's raw text into a typed verdict. Any deviation from
/// the expected shape, including a verdict outside the six-label set, is an
/// invalid-response error; malformed upstream text never crosses this
/// boundary.
pub fn parse_verdict_response(raw: &str) -> Result<CvVerdict> {
    let body = strip_code_fences(raw);
    let value: JsonValue = serde_json::from_str(body).map_err(|e| {
        Error::InvalidClassifierResponse(format!("response is not valid JSON: {}", e))
    })?;

    let result_str = value
        .get("result")
        .and_then(|v| v.as_str())
        .ok_or_else(|| Error::InvalidClassifierResponse("missing 'result' field".into()))?;
    let result = Verdict::parse(result_str).ok_or_else(|| {
        Error::InvalidClassifierResponse(format!("unknown verdict '{}'", result_str))
    })?;

    let reason = value
        .get("reason")
        .and_then(|v| v.as_str())
        .unwrap_or_default()
        .to_string();
    let confidence = score_field(&value, "confidence")?;
    let job_fit_score = score_field(&value, "jobFitScore")?;

    Ok(CvVerdict {
        result,
        reason,
        confidence,
        job_fit_score,
    })
}

fn score_field(value: &JsonValue, key: &str) -> Result<i32> {
    let raw = value
        .get(key)
        .ok_or_else(|| Error::InvalidClassifierResponse(format!("missing '{}' field", key)))?;
    let n = raw.as_i64().ok_or_else(|| {
        Error::InvalidClassifierResponse(format!("'{}' is not an integer: {}", key, raw))
    })?;
    if !(0..=100).contains(&n) {
        return Err(Error::InvalidClassifierResponse(format!(
            "'{}' out of range: {}",
            key, n
        )));
    }
    Ok(n as i32)
}

#[derive(Clone)]
pub struct ClassifierService {
    client: Client,
    api_key: String,
    model: String,
    reasoning_effort: String,
    timeout: Duration,
}

impl ClassifierService {
    pub fn new(
        api_key: String,
        client: Client,
        model: String,
        reasoning_effort: String,
        timeout_secs: u64,
    ) -> Self {
        Self {
            client,
            api_key,
            model,
            reasoning_effort,
            timeout: Duration::from_secs(timeout_secs),
        }
    }

    async fn chat_completion(&self, prompt: &str) -> Result<String> {
        let payload = serde_json::json!({
            "model": self.model,
            "messages": [
                {"role": "user", "content": prompt}
            ],
            "reasoning_effort": self.reasoning_effort,
        });

        let res = self
            .client
            .post("https://api.openai.com/v1/chat/completions")
            .bearer_auth(&self.api_key)
            .json(&payload)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    Error::ClassifierTimeout(self.timeout.as_secs())
                } else {
                    Error::Reqwest(e)
                }
            })?;

        if !res.status().is_success() {
            let status = res.status();
            let text = res.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!("OpenAI API Error {}: {}", status, text).into());
        }

        let body: JsonValue = res.json().await?;
        body.get("choices")
            .and_then(|c| c.get(0))
            .and_then(|c| c.get("message"))
            .and_then(|m| m.get("content"))
            .and_then(|c| c.as_str())
            .map(|s| s.to_string())
            .ok_or_else(|| {
                Error::InvalidClassifierResponse("missing message content in completion".into())
            })
    }
}

#[async_trait]
impl CvClassifier for ClassifierService {
    async fn classify(&self, prompt: &str) -> Result<CvVerdict> {
        let raw = self.chat_completion(prompt).await?;
        parse_verdict_response(&raw)
    }
}
