use std::collections::HashMap;

use anyhow::Result;
use async_trait::async_trait;
use bytes::Bytes;

use crate::handler::http::rule::Rule;

pub mod response_transformer;

use self::response_transformer::ResponseTransformerPlugin;

/// HandleResponseParams carries one intercepted exchange: the fully
/// buffered upstream body plus the request head and the response head
/// about to be written back to the client.
pub struct HandleResponseParams<'a> {
    pub response_buffer: &'a Bytes,
    pub request: &'a http::request::Parts,
    pub response: &'a mut http::response::Parts,
}

/// A response plugin is bound to exactly one compiled rule when built and
/// rewrites the body of every response matched by that rule. The bound
/// rule must not be mutated; the returned string is the body text the
/// proxy layer writes back.
#[async_trait]
pub trait ResponsePlugin: Send + Sync {
    async fn handle_response(&self, params: HandleResponseParams<'_>) -> Result<String>;
}

pub type PluginBuilder = fn(Rule) -> Box<dyn ResponsePlugin>;

/// One registry entry: the action whitelist checked at rule compile time
/// and the constructor run at dispatch time.
pub struct PluginRegistration {
    pub actions: &'static [&'static str],
    pub builder: PluginBuilder,
}

/// PluginRegistry maps a plugin name to its registration. It is built
/// explicitly at startup and passed into rule parsing and dispatch, so
/// independent registries can coexist in one process.
pub struct PluginRegistry {
    plugins: HashMap<String, PluginRegistration>,
}

impl PluginRegistry {
    pub fn empty() -> Self {
        Self {
            plugins: HashMap::new(),
        }
    }

    pub fn register(&mut self, name: &str, registration: PluginRegistration) {
        self.plugins.insert(name.to_string(), registration);
    }

    /// supported_actions returns the whitelist of the named plugin, or
    /// `None` for a plugin missing from the registry.
    pub fn supported_actions(&self, name: &str) -> Option<&'static [&'static str]> {
        self.plugins.get(name).map(|registration| registration.actions)
    }

    /// build binds a plugin instance to the given rule.
    pub fn build(&self, name: &str, rule: Rule) -> Option<Box<dyn ResponsePlugin>> {
        self.plugins
            .get(name)
            .map(|registration| (registration.builder)(rule))
    }

    /// names lists the registered plugin names in a stable order.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.plugins.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl Default for PluginRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register(
            ResponseTransformerPlugin::NAME,
            PluginRegistration {
                actions: ResponseTransformerPlugin::ACTIONS,
                builder: |rule| Box::new(ResponseTransformerPlugin::new(rule)),
            },
        );
        registry
    }
}
