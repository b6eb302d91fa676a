//! Generation parameters per model
//!
//! Lookups never fail: an unknown model gets the `"auto"` profile.

use crate::protocol::types::AUTO_MODEL;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

/// Sampling and length parameters for one model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelParameterProfile {
    pub max_tokens: u32,
    pub temperature: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub presence_penalty: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frequency_penalty: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
}

impl ModelParameterProfile {
    pub fn new(max_tokens: u32, temperature: f32) -> Self {
        Self {
            max_tokens,
            temperature,
            presence_penalty: None,
            frequency_penalty: None,
            top_p: None,
        }
    }

    pub fn with_penalties(mut self, presence: f32, frequency: f32) -> Self {
        self.presence_penalty = Some(presence);
        self.frequency_penalty = Some(frequency);
        self
    }

    pub fn with_top_p(mut self, top_p: f32) -> Self {
        self.top_p = Some(top_p);
        self
    }
}

/// Model name to profile mapping
#[derive(Debug, Clone)]
pub struct ProfileStore {
    profiles: HashMap<String, ModelParameterProfile>,
    fallback: ModelParameterProfile,
}

impl ProfileStore {
    /// Store containing only the `"auto"` profile
    pub fn new(auto: ModelParameterProfile) -> Self {
        let mut profiles = HashMap::new();
        profiles.insert(AUTO_MODEL.to_string(), auto.clone());
        Self {
            profiles,
            fallback: auto,
        }
    }

    /// The profiles shipped with the crate
    pub fn builtin() -> Self {
        let auto = ModelParameterProfile::new(2000, 0.7).with_penalties(0.1, 0.1);
        let claude = ModelParameterProfile::new(2000, 0.7).with_top_p(0.9);

        Self::new(auto)
            .with_profile(
                "gpt-4o",
                ModelParameterProfile::new(4000, 0.7).with_penalties(0.1, 0.1),
            )
            .with_profile(
                "gpt-4o-mini",
                ModelParameterProfile::new(2000, 0.7).with_penalties(0.1, 0.1),
            )
            .with_profile(
                "gpt-3.5-turbo",
                ModelParameterProfile::new(1500, 0.8).with_penalties(0.0, 0.2),
            )
            .with_profile("claude-3-haiku-20240307", claude.clone())
            .with_profile("claude-3-haiku", claude)
            .with_profile(
                "claude-3-5-sonnet-20241022",
                ModelParameterProfile::new(4000, 0.7).with_top_p(0.9),
            )
            .with_profile(
                "qwen-turbo",
                ModelParameterProfile::new(1500, 0.8).with_top_p(0.8),
            )
            .with_profile(
                "qwen-plus",
                ModelParameterProfile::new(2000, 0.7).with_top_p(0.8),
            )
            .with_profile(
                "deepseek-chat",
                ModelParameterProfile::new(2000, 0.7).with_penalties(0.0, 0.1),
            )
            .with_profile(
                "gemini-1.5-flash",
                ModelParameterProfile::new(2048, 0.7).with_top_p(0.95),
            )
            .with_profile(
                "gemini-1.5-pro",
                ModelParameterProfile::new(4096, 0.7).with_top_p(0.95),
            )
    }

    /// Add or replace a profile. Replacing `"auto"` also replaces the fallback.
    pub fn with_profile(
        mut self,
        model: impl Into<String>,
        profile: ModelParameterProfile,
    ) -> Self {
        let model = model.into();
        if model == AUTO_MODEL {
            self.fallback = profile.clone();
        }
        self.profiles.insert(model, profile);
        self
    }

    /// Profile for `model`, or the `"auto"` profile when unknown
    pub fn profile_for(&self, model: &str) -> &ModelParameterProfile {
        self.profiles.get(model).unwrap_or_else(|| {
            debug!("No profile for model '{}', using '{}'", model, AUTO_MODEL);
            &self.fallback
        })
    }
}

impl Default for ProfileStore {
    fn default() -> Self {
        Self::builtin()
    }
}
