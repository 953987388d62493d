//! Rule driven response transformation behind an HTTP reverse-proxy
//! interception point. Raw spy rules are compiled once at startup into a
//! [`handler::http::rule::RuleConfig`]; matched responses are rewritten by
//! the plugin bound to the matching rule.

pub mod cmd;
pub mod handler;
pub mod raw_config;

pub use crate::handler::http::plugin::PluginRegistry;
pub use crate::handler::http::rule::RuleConfig;
pub use crate::handler::http::service::SpyService;
