use std::sync::Arc;

use anyhow::{anyhow, Result};
use bytes::Bytes;
use hyper::Body;
use tracing::debug;

use crate::handler::http::plugin::{HandleResponseParams, PluginRegistry};
use crate::handler::http::rule::{rule_id, Rule, RuleConfig};

/// SpyService resolves intercepted exchanges against the compiled rule
/// table and runs the plugin bound to the matched rule. The table is
/// immutable after construction; the service is cheap to clone and safe to
/// share between concurrent connections.
#[derive(Clone)]
pub struct SpyService {
    rules: Arc<RuleConfig>,
    registry: Arc<PluginRegistry>,
}

impl SpyService {
    pub fn new(rules: RuleConfig, registry: PluginRegistry) -> Self {
        Self {
            rules: Arc::new(rules),
            registry: Arc::new(registry),
        }
    }

    /// match_rule resolves the most specific rule for a request: plugin
    /// qualified ids first, method specific before method free.
    fn match_rule(&self, path: &str, method: &str) -> Option<&Rule> {
        for plugin in self.registry.names() {
            for candidate in [
                rule_id(Some(plugin), Some(path), Some(method)),
                rule_id(Some(plugin), Some(path), None),
            ] {
                if let Some(rule) = self.rules.get(&candidate) {
                    return Some(rule);
                }
            }
        }
        for candidate in [
            rule_id(None, Some(path), Some(method)),
            rule_id(None, Some(path), None),
        ] {
            if let Some(rule) = self.rules.get(&candidate) {
                return Some(rule);
            }
        }
        None
    }

    /// handle_response runs the plugin of the matched rule over the
    /// buffered upstream body and returns the body text to write back.
    /// Unmatched exchanges and rules without a plugin pass the body
    /// through unchanged.
    pub async fn handle_response(
        &self,
        request: &http::request::Parts,
        response: &mut http::response::Parts,
        response_buffer: &Bytes,
    ) -> Result<String> {
        let rule = match self.match_rule(request.uri.path(), request.method.as_str()) {
            Some(rule) => rule.clone(),
            None => return Ok(String::from_utf8_lossy(response_buffer).into_owned()),
        };
        debug!("response matched, rule({:?})", rule);

        let plugin_name = match &rule.plugin {
            Some(name) => name.clone(),
            None => return Ok(String::from_utf8_lossy(response_buffer).into_owned()),
        };
        let plugin = self
            .registry
            .build(&plugin_name, rule)
            .ok_or_else(|| anyhow!("Invalid plugin: {}", plugin_name))?;
        plugin
            .handle_response(HandleResponseParams {
                response_buffer,
                request,
                response,
            })
            .await
    }
}

/// read_body collects a whole hyper body, the shape in which the
/// interception point hands the upstream response to
/// [SpyService::handle_response].
pub async fn read_body(body: Body) -> Result<Bytes> {
    Ok(hyper::body::to_bytes(body).await?)
}
