use serde::{Deserialize, Serialize};

#[derive(Debug, Eq, PartialEq, Clone, Deserialize, Serialize, Default)]
#[serde(deny_unknown_fields)] // To prevent typos.
pub struct RawConfig {
    #[serde(default)]
    pub rules: Vec<RawRule>,
}

/// RawRule is one spy rule as configured by the operator, before any
/// parsing or validation.
#[derive(Debug, Eq, PartialEq, Clone, Deserialize, Serialize)]
pub struct RawRule {
    pub rule_name: String,
    pub upstream_url: String,
    /// Name of the response transformer plugin. A rule without a plugin is
    /// a plain rule and skips the action whitelist check.
    pub plugin: Option<String>,
    pub path: Option<String>,
    pub method: Option<String>,
    pub condition: Option<RawCondition>,
    /// Comma separated action expressions, e.g.
    /// `replace.status_code=400, replace.body=ok`. May be empty.
    #[serde(default)]
    pub data: String,
}

/// Condition is opaque to the rule parser and carried through unchanged.
#[derive(Debug, Eq, PartialEq, Clone, Deserialize, Serialize)]
#[serde(untagged)]
pub enum RawCondition {
    Flag(bool),
    Expr(String),
}
