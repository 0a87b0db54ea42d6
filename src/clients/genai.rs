//! Gemini `generateContent` adapter.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::clients::TextGenerator;
use crate::error::RemoteError;

const GENERATE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

#[derive(Clone, Serialize, Deserialize, Debug)]
struct Part {
    text: String,
}

#[derive(Clone, Serialize, Deserialize, Debug)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Clone, Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct ThinkingConfig {
    thinking_budget: u32,
}

#[derive(Clone, Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    thinking_config: ThinkingConfig,
}

#[derive(Clone, Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    system_instruction: Content,
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Clone, Deserialize, Debug)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Clone, Deserialize, Debug)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

impl GenerateResponse {
    fn text(self) -> Option<String> {
        let text: String = self
            .candidates
            .into_iter()
            .next()?
            .content?
            .parts
            .into_iter()
            .map(|part| part.text)
            .collect();
        if text.trim().is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

#[derive(Clone)]
pub struct GeminiClient {
    client: reqwest::Client,
    api_key: String,
    model: String,
}

impl GeminiClient {
    pub fn new(api_key: String, model: String) -> Result<Self, RemoteError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()?;

        Ok(Self {
            client,
            api_key,
            model,
        })
    }
}

fn build_request(system_instruction: &str, content: &str) -> GenerateRequest {
    GenerateRequest {
        system_instruction: Content {
            parts: vec![Part { text: system_instruction.to_string() }],
        },
        contents: vec![Content {
            parts: vec![Part { text: content.to_string() }],
        }],
        generation_config: GenerationConfig {
            thinking_config: ThinkingConfig { thinking_budget: 0 },
        },
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(&self, system_instruction: &str, content: &str) -> Result<String, RemoteError> {
        let endpoint = format!("{}/{}:generateContent", GENERATE_URL, self.model);
        let response = self
            .client
            .post(&endpoint)
            .query(&[("key", self.api_key.as_str())])
            .json(&build_request(system_instruction, content))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(RemoteError::Http {
                endpoint,
                status: response.status().as_u16(),
            });
        }

        let body: GenerateResponse = response
            .json()
            .await
            .map_err(|e| RemoteError::InvalidResponse(format!("undecodable generation: {}", e)))?;

        body.text()
            .ok_or_else(|| RemoteError::InvalidResponse("generation returned no text".to_string()))
    }
}
