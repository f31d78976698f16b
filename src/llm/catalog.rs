use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::BenchConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    OpenAI,
    Anthropic,
    Gemini,
    Local,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OpenAI => "openai",
            Self::Anthropic => "anthropic",
            Self::Gemini => "gemini",
            Self::Local => "local",
        }
    }

    pub fn info(&self) -> &'static ProviderInfo {
        match self {
            Self::OpenAI => &PROVIDERS[0],
            Self::Anthropic => &PROVIDERS[1],
            Self::Gemini => &PROVIDERS[2],
            Self::Local => &PROVIDERS[3],
        }
    }

    pub fn is_hosted(&self) -> bool {
        !matches!(self, Self::Local)
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub struct ProviderInfo {
    pub kind: ProviderKind,
    pub name: &'static str,
    pub env_var: &'static str,
    pub prefix: &'static str,
    pub base_url: &'static str,
}

/// Built-in providers, in classification order.
pub static PROVIDERS: &[ProviderInfo] = &[
    ProviderInfo {
        kind: ProviderKind::OpenAI,
        name: "OpenAI",
        env_var: "OPENAI_API_KEY",
        prefix: "gpt",
        base_url: "https://api.openai.com/v1",
    },
    ProviderInfo {
        kind: ProviderKind::Anthropic,
        name: "Anthropic",
        env_var: "ANTHROPIC_API_KEY",
        prefix: "claude",
        base_url: "https://api.anthropic.com",
    },
    ProviderInfo {
        kind: ProviderKind::Gemini,
        name: "Google Gemini",
        env_var: "GEMINI_API_KEY",
        prefix: "gemini",
        base_url: "https://generativelanguage.googleapis.com/v1beta/openai",
    },
    ProviderInfo {
        kind: ProviderKind::Local,
        name: "Local / Ollama",
        env_var: "",
        prefix: "",
        base_url: "http://localhost:11434",
    },
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrefixRule {
    pub prefix: String,
    pub kind: ProviderKind,
}

/// Ordered prefix table. The first rule whose prefix matches wins; matching is
/// case-sensitive.
#[derive(Debug, Clone)]
pub struct ModelClassifier {
    rules: Vec<PrefixRule>,
}

impl ModelClassifier {
    pub fn new(rules: Vec<PrefixRule>) -> Self {
        Self { rules }
    }

    /// Hosted rules in catalog order, then every local family prefix.
    pub fn from_config(config: &BenchConfig) -> Self {
        let hosted = [
            (ProviderKind::OpenAI, &config.providers.openai),
            (ProviderKind::Anthropic, &config.providers.anthropic),
            (ProviderKind::Gemini, &config.providers.gemini),
        ];

        let mut rules: Vec<PrefixRule> = hosted
            .iter()
            .map(|(kind, overrides)| PrefixRule {
                prefix: overrides.prefix.clone().unwrap_or_else(|| kind.info().prefix.to_string()),
                kind: *kind,
            })
            .collect();

        rules.extend(config.local.prefixes.iter().map(|p| PrefixRule {
            prefix: p.clone(),
            kind: ProviderKind::Local,
        }));

        Self { rules }
    }

    pub fn classify(&self, model: &str) -> Option<ProviderKind> {
        self.rules
            .iter()
            .find(|rule| model.starts_with(rule.prefix.as_str()))
            .map(|rule| rule.kind)
    }

    pub fn rules(&self) -> &[PrefixRule] {
        &self.rules
    }

    /// Pairs `(earlier, later)` where the later rule can never match because the
    /// earlier prefix already captures everything it would.
    pub fn shadowed_rules(&self) -> Vec<(&PrefixRule, &PrefixRule)> {
        let mut shadowed = Vec::new();
        for (i, earlier) in self.rules.iter().enumerate() {
            for later in &self.rules[i + 1..] {
                if later.prefix.starts_with(earlier.prefix.as_str()) {
                    shadowed.push((earlier, later));
                }
            }
        }
        shadowed
    }
}
