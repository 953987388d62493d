use anyhow::Result;
use async_trait::async_trait;
use http::StatusCode;
use tracing::{debug, info};

use crate::handler::http::plugin::{HandleResponseParams, ResponsePlugin};
use crate::handler::http::rule::Rule;

/// The reference response transformer. It applies the `replace.*` actions
/// of its bound rule: `replace.status_code` rewrites the response head,
/// `replace.body` swaps the returned body text.
pub struct ResponseTransformerPlugin {
    rule: Rule,
}

impl ResponseTransformerPlugin {
    pub const NAME: &'static str = "response-transformer";
    pub const ACTIONS: &'static [&'static str] = &["replace.status_code", "replace.body"];

    pub fn new(rule: Rule) -> Self {
        info!(
            "Rule: {} on path {:?} with plugin {:?}",
            rule.rule_name, rule.path, rule.plugin
        );
        Self { rule }
    }
}

#[async_trait]
impl ResponsePlugin for ResponseTransformerPlugin {
    async fn handle_response(&self, params: HandleResponseParams<'_>) -> Result<String> {
        let mut body = String::from_utf8_lossy(params.response_buffer).into_owned();
        for expression in &self.rule.action_expressions {
            match expression.action.as_str() {
                "replace.status_code" => {
                    let code: u16 = expression.param.parse()?;
                    params.response.status = StatusCode::from_u16(code)?;
                }
                "replace.body" => {
                    body = expression.param.clone();
                }
                action => debug!("no handler for action {}", action),
            }
        }
        Ok(body)
    }
}
