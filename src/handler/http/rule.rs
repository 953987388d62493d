use std::collections::HashMap;

use thiserror::Error;
use tracing::debug;

use crate::handler::http::expression::{parse_action_data, ActionExpression, ExpressionError};
use crate::handler::http::plugin::PluginRegistry;
use crate::raw_config::{RawCondition, RawRule};

/// Rule is one compiled spy rule, stored in the rule table under its
/// [generate_rule_id] key.
#[derive(Debug, Eq, PartialEq, Clone)]
pub struct Rule {
    pub rule_name: String,
    pub path: Option<String>,
    pub plugin: Option<String>,
    pub condition: Option<RawCondition>,
    pub method: Option<String>,
    pub action_expressions: Vec<ActionExpression>,
}

#[derive(Debug, Eq, PartialEq, Clone, Error)]
pub enum RuleError {
    #[error(transparent)]
    Expression(#[from] ExpressionError),
    #[error("Invalid plugin: {0}")]
    InvalidPlugin(String),
    #[error("Unsupport action: {0}")]
    UnsupportedAction(String),
}

/// rule_id joins the normalized components which are present with `:`.
/// Absent components are omitted entirely, no empty segment is emitted.
///
/// Plugin and method are lower-cased; the path loses one leading `/` and
/// any trailing `/`, so `/foo` and `/foo/` group under the same id.
pub fn rule_id(plugin: Option<&str>, path: Option<&str>, method: Option<&str>) -> String {
    let mut components = Vec::with_capacity(3);
    if let Some(plugin) = plugin {
        components.push(plugin.to_lowercase());
    }
    if let Some(path) = path {
        let path = path.strip_prefix('/').unwrap_or(path);
        components.push(path.trim_end_matches('/').to_string());
    }
    if let Some(method) = method {
        components.push(method.to_lowercase());
    }
    components.join(":")
}

/// generate_rule_id derives the grouping key of a raw rule. Entries with a
/// colliding id overwrite each other, the last one wins.
pub fn generate_rule_id(entry: &RawRule) -> String {
    rule_id(
        entry.plugin.as_deref(),
        entry.path.as_deref(),
        entry.method.as_deref(),
    )
}

/// RuleConfig is the compiled rule table. `rules` and `error_messages`
/// never hold entries at the same time: the first error encountered while
/// compiling a batch discards every rule of that batch.
#[derive(Debug, Eq, PartialEq, Clone, Default)]
pub struct RuleConfig {
    pub rules: HashMap<String, Rule>,
    pub error_messages: Vec<String>,
}

impl RuleConfig {
    /// parse_data compiles the raw entries without plugin validation.
    pub fn parse_data(entries: &[RawRule]) -> Self {
        let mut rules = HashMap::new();
        for entry in entries {
            let action_expressions = match parse_action_data(&entry.data) {
                Ok(expressions) => expressions,
                Err(error) => return Self::failed(error.into()),
            };
            let id = generate_rule_id(entry);
            debug!("rule {} compiled under id {}", entry.rule_name, id);
            rules.insert(
                id,
                Rule {
                    rule_name: entry.rule_name.clone(),
                    path: entry.path.clone(),
                    plugin: entry.plugin.clone(),
                    condition: entry.condition.clone(),
                    method: entry.method.clone(),
                    action_expressions,
                },
            );
        }
        Self {
            rules,
            error_messages: vec![],
        }
    }

    /// parse compiles the raw entries and checks every action of a plugin
    /// bound rule against that plugin's whitelist in the registry.
    pub fn parse(entries: &[RawRule], registry: &PluginRegistry) -> Self {
        let config = Self::parse_data(entries);
        if !config.error_messages.is_empty() {
            return config;
        }

        // Walk the input entries so the first reported error is
        // deterministic; entries shadowed by a colliding id resolve to the
        // surviving rule and are not validated on their own.
        for entry in entries {
            let rule = match config.rules.get(&generate_rule_id(entry)) {
                Some(rule) => rule,
                None => continue,
            };
            let plugin = match &rule.plugin {
                Some(plugin) => plugin,
                None => continue,
            };
            let supported = match registry.supported_actions(plugin) {
                Some(actions) => actions,
                None => return Self::failed(RuleError::InvalidPlugin(plugin.clone())),
            };
            for expression in &rule.action_expressions {
                if !supported.contains(&expression.action.as_str()) {
                    return Self::failed(RuleError::UnsupportedAction(expression.action.clone()));
                }
            }
        }
        config
    }

    fn failed(error: RuleError) -> Self {
        Self {
            rules: HashMap::new(),
            error_messages: vec![error.to_string()],
        }
    }

    pub fn get(&self, id: &str) -> Option<&Rule> {
        self.rules.get(id)
    }

    /// lookup computes the id of the given components and fetches the rule.
    pub fn lookup(
        &self,
        plugin: Option<&str>,
        path: Option<&str>,
        method: Option<&str>,
    ) -> Option<&Rule> {
        self.rules.get(&rule_id(plugin, path, method))
    }
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::{generate_rule_id, rule_id, RuleConfig};
    use crate::raw_config::RawRule;

    fn shared_rule() -> RawRule {
        RawRule {
            rule_name: "ruleName".to_string(),
            upstream_url: "http://upstream.url".to_string(),
            plugin: Some("plugin".to_string()),
            path: None,
            method: None,
            condition: None,
            data: String::new(),
        }
    }

    #[test_case(Some("plugin"), Some("/foo"), None => "plugin:foo" ; "path is trimmed")]
    #[test_case(Some("plugin"), Some("/foo/bar"), None => "plugin:foo/bar" ; "subpath is kept")]
    #[test_case(Some("plugin"), Some("/foo"), Some("GET") => "plugin:foo:get" ; "method is lower cased")]
    #[test_case(Some("plugin"), Some("/foo/"), Some("GET") => "plugin:foo:get" ; "trailing slash is trimmed")]
    #[test_case(Some("Plugin"), Some("/foo/"), Some("GET") => "plugin:foo:get" ; "plugin is lower cased")]
    #[test_case(None, Some("/foo/"), Some("GET") => "foo:get" ; "no plugin")]
    #[test_case(Some("plugin"), None, Some("GET") => "plugin:get" ; "no path")]
    #[test_case(Some("plugin"), Some("/foo/"), None => "plugin:foo" ; "no method")]
    fn test_rule_id(plugin: Option<&str>, path: Option<&str>, method: Option<&str>) -> String {
        rule_id(plugin, path, method)
    }

    #[test]
    fn test_generate_rule_id_from_entry() {
        let entry = RawRule {
            path: Some("/foo/".to_string()),
            method: Some("GET".to_string()),
            ..shared_rule()
        };
        assert_eq!(generate_rule_id(&entry), "plugin:foo:get");
    }

    #[test]
    fn test_empty_entries() {
        assert_eq!(RuleConfig::parse_data(&[]), RuleConfig::default());
    }

    #[test]
    fn test_colliding_id_last_entry_wins() {
        let entries = vec![
            RawRule {
                rule_name: "first".to_string(),
                path: Some("/foo".to_string()),
                data: "status_code=400".to_string(),
                ..shared_rule()
            },
            RawRule {
                rule_name: "second".to_string(),
                path: Some("/foo/".to_string()),
                data: "status_code=500".to_string(),
                ..shared_rule()
            },
        ];
        let config = RuleConfig::parse_data(&entries);
        assert_eq!(config.rules.len(), 1);
        let rule = config.get("plugin:foo").unwrap();
        assert_eq!(rule.rule_name, "second");
        assert_eq!(rule.action_expressions[0].param, "500");
    }

    #[test]
    fn test_late_error_clears_earlier_rules() {
        let entries = vec![
            RawRule {
                path: Some("/foo".to_string()),
                data: "status_code=400".to_string(),
                ..shared_rule()
            },
            RawRule {
                path: Some("/bar".to_string()),
                data: "=400".to_string(),
                ..shared_rule()
            },
        ];
        let config = RuleConfig::parse_data(&entries);
        assert!(config.rules.is_empty());
        assert_eq!(
            config.error_messages,
            vec!["Action name is missing in the expression: \"=400\"".to_string()]
        );
    }
}
