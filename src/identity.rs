//! Card identity and the external image classifier client.
//!
//! The classifier is an OpenAI-compatible vision endpoint that looks at a
//! card photo and returns structured identity fields. Every field except
//! the English name may be absent; downstream code must not assume a
//! fixed rarity vocabulary.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::Config;
use crate::error::{AnalyzeError, Result};

/// Identified card, produced by the classifier and consumed read-only by
/// every downstream component.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CardIdentity {
    /// English card name, e.g. "Jolteon ex"
    pub name: String,
    /// Collector number / identifier, e.g. "209/SAR"
    pub number: String,
    /// Japanese card name, used for domestic buylist queries
    pub local_name: String,
    /// Rarity code as printed (SAR, SR, UR, ...), if recognized
    pub rarity: Option<String>,
    /// True when the pictured card is a Japanese print
    pub is_japanese: bool,
    /// True when the pictured card is professionally slabbed
    pub is_slab: bool,
    /// Grade on the slab, if any
    pub grade: Option<u8>,
}

impl CardIdentity {
    /// Whether the photographed card is already a top-tier graded card.
    /// Such cards must not feed ungraded-price queries to sources that
    /// cannot distinguish grading state.
    pub fn is_graded_top(&self) -> bool {
        self.is_slab && self.grade == Some(10)
    }

    /// Normalized rarity token: non-alphabetic characters stripped,
    /// uppercased, so "SAR", "sar" and "#SAR" collapse to one token.
    /// Falls back to the identifier suffix after its first '/'.
    pub fn rarity_token(&self) -> Option<String> {
        let raw = match &self.rarity {
            Some(r) if !r.is_empty() => r.clone(),
            _ => self.number.split('/').nth(1)?.to_string(),
        };
        let token: String = raw
            .chars()
            .filter(|c| c.is_ascii_alphabetic())
            .collect::<String>()
            .to_uppercase();
        if token.is_empty() {
            None
        } else {
            Some(token)
        }
    }

    /// Identifier with leading '#' markers removed ("#209/SAR" -> "209/SAR").
    pub fn clean_number(&self) -> String {
        self.number.trim_start_matches('#').to_string()
    }

    /// Bare numeric part of the identifier ("209/SAR" -> "209").
    pub fn bare_number(&self) -> String {
        self.clean_number()
            .split('/')
            .next()
            .unwrap_or_default()
            .to_string()
    }
}

/// Raw classifier output. Everything is optional; the conversion into
/// `CardIdentity` decides what is usable.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawIdentity {
    card_name: Option<String>,
    card_number: Option<String>,
    jp_name: Option<String>,
    rarity: Option<String>,
    is_japanese: Option<bool>,
    is_slab: Option<bool>,
    grade: Option<u8>,
}

impl RawIdentity {
    fn into_identity(self) -> Result<CardIdentity> {
        let name = self
            .card_name
            .filter(|n| !n.trim().is_empty())
            .ok_or_else(|| AnalyzeError::Classifier("no card name recognized".to_string()))?;

        Ok(CardIdentity {
            name,
            number: self.card_number.unwrap_or_default(),
            local_name: self.jp_name.unwrap_or_default(),
            rarity: self.rarity.filter(|r| !r.trim().is_empty()),
            is_japanese: self.is_japanese.unwrap_or(false),
            is_slab: self.is_slab.unwrap_or(false),
            grade: self.grade,
        })
    }
}

/// Chat-completion response envelope (only the fields we read).
#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

const SYSTEM_PROMPT: &str = "You are a trading card appraiser. Look at the image and reply with \
JSON only, containing: cardName (English name), cardNumber (collector number including rarity \
suffix when printed, e.g. \"209/SAR\"), jpName (Japanese name), rarity (SAR, SR, UR, HR, AR, RR \
or similar; null when unknown), isJapanese (boolean, true for Japanese prints), isSlab (boolean), \
grade (number or null).";

/// Client for the image classifier.
pub struct ClassifierClient {
    http: reqwest::Client,
    base_url: String,
    model: String,
    api_key: String,
}

impl ClassifierClient {
    pub fn new(config: &Config) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: config.classifier_base_url.clone(),
            model: config.classifier_model.clone(),
            api_key: config.classifier_api_key.clone(),
        }
    }

    /// Identifies the card in the given image (data URL or https URL).
    ///
    /// Classifier failures are not recoverable inside the pipeline; the
    /// request fails with a user-visible identification error.
    pub async fn identify(&self, image: &str) -> Result<CardIdentity> {
        let url = format!("{}/chat/completions", self.base_url);
        let body = serde_json::json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": SYSTEM_PROMPT },
                { "role": "user", "content": [
                    { "type": "text", "text": "Identify this card." },
                    { "type": "image_url", "image_url": { "url": image } }
                ]}
            ],
            "response_format": { "type": "json_object" }
        });

        log::info!("Querying classifier ({})...", self.model);

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .timeout(Duration::from_secs(30))
            .json(&body)
            .send()
            .await
            .map_err(|e| AnalyzeError::Classifier(e.to_string()))?;

        if !response.status().is_success() {
            return Err(AnalyzeError::Classifier(format!(
                "classifier returned {}",
                response.status()
            )));
        }

        let envelope: ChatResponse = response
            .json()
            .await
            .map_err(|e| AnalyzeError::Classifier(e.to_string()))?;

        let content = envelope
            .choices
            .first()
            .and_then(|c| c.message.content.as_deref())
            .ok_or_else(|| AnalyzeError::Classifier("empty classifier response".to_string()))?;

        let raw: RawIdentity = serde_json::from_str(content)
            .map_err(|e| AnalyzeError::Classifier(format!("unparseable identity: {}", e)))?;

        let identity = raw.into_identity()?;
        log::info!(
            "Identified: {} ({}) [{}]",
            identity.local_name,
            identity.number,
            identity.rarity.as_deref().unwrap_or("?")
        );
        Ok(identity)
    }
}

#[cfg(test)]
#[path = "identity_tests.rs"]
mod tests;
