use crate::domain::user::AccountTier;
use serde::Serialize;

/// Model used when the client sends none or an unknown key
pub const DEFAULT_MODEL_KEY: &str = "z-ai/glm-5";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "alias")]
pub enum BackendKind {
    /// Hosted gateway model with the provider alias to call
    Hosted(&'static str),
    /// Internal agent service
    Agent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ModelSpec {
    pub key: &'static str,
    pub tier: AccountTier,
    pub cost: i32,
    pub backend: BackendKind,
}

const fn hosted(key: &'static str, alias: &'static str, tier: AccountTier, cost: i32) -> ModelSpec {
    ModelSpec {
        key,
        tier,
        cost,
        backend: BackendKind::Hosted(alias),
    }
}

pub static CATALOG: &[ModelSpec] = &[
    hosted("claude-opus-4-6", "anthropic/claude-opus-4.6", AccountTier::Pro, 5),
    hosted("openai/gpt-5.2-codex", "openai/gpt-5.2-codex", AccountTier::Pro, 5),
    ModelSpec {
        key: "capmap",
        tier: AccountTier::Advanced,
        cost: 3,
        backend: BackendKind::Agent,
    },
    hosted("openai/gpt-5.2", "openai/gpt-5.2", AccountTier::Advanced, 2),
    hosted("claude-sonnet-4-6", "anthropic/claude-sonnet-4.6", AccountTier::Advanced, 2),
    hosted("gemini-3-pro", "google/gemini-3-pro-preview", AccountTier::Advanced, 2),
    hosted("gemini-3.1-pro", "google/gemini-3.1-pro-preview", AccountTier::Advanced, 2),
    hosted("openai/gpt-5.1-codex-max", "openai/gpt-5.1-codex-max", AccountTier::Advanced, 2),
    hosted("minimax/minimax-m2.5", "minimax/minimax-m2.5", AccountTier::Advanced, 2),
    hosted("moonshotai/kimi-k2.5", "moonshotai/kimi-k2.5", AccountTier::Advanced, 2),
    hosted("gemini-3-flash", "google/gemini-3-flash-preview", AccountTier::Free, 1),
    hosted("qwen/qwen3.5-plus-02-15", "qwen/qwen3.5-plus-02-15", AccountTier::Free, 1),
    hosted(DEFAULT_MODEL_KEY, DEFAULT_MODEL_KEY, AccountTier::Free, 1),
];

/// Catalog entry as offered to a particular caller
#[derive(Debug, Clone, Serialize)]
pub struct ModelOption {
    pub key: &'static str,
    pub name: &'static str,
    pub tier: AccountTier,
    pub cost: i32,
    pub allowed: bool,
}

pub fn options_for(tier: AccountTier) -> Vec<ModelOption> {
    CATALOG
        .iter()
        .map(|spec| ModelOption {
            key: spec.key,
            name: display_name(spec.key),
            tier: spec.tier,
            cost: spec.cost,
            allowed: tier.rank() >= spec.tier.rank(),
        })
        .collect()
}

pub fn lookup(key: &str) -> Option<&'static ModelSpec> {
    CATALOG.iter().find(|spec| spec.key == key)
}

/// Catalog entry for a key. Unknown keys are free, cost 1, and run on the default model.
pub fn resolve(key: &str) -> ModelSpec {
    lookup(key).copied().unwrap_or(ModelSpec {
        key: DEFAULT_MODEL_KEY,
        tier: AccountTier::Free,
        cost: 1,
        backend: BackendKind::Hosted(DEFAULT_MODEL_KEY),
    })
}

/// Short name shown to users, e.g. `gpt-5.2` for `openai/gpt-5.2`
pub fn display_name(key: &str) -> &str {
    key.rsplit('/').next().unwrap_or(key)
}

pub fn upgrade_message(key: &str, required: AccountTier) -> String {
    format!(
        "{} requires a {} plan. Please upgrade to use this model.",
        display_name(key),
        required.plan_name()
    )
}
