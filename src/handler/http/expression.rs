use thiserror::Error;

/// ActionExpression is one `action=param` unit of a rule's `data` string.
#[derive(Debug, Eq, PartialEq, Clone)]
pub struct ActionExpression {
    pub action: String,
    pub param: String,
}

/// Errors embed the offending segment as written in `data`, trimmed of
/// outer whitespace only, so the operator can find it in the config file.
#[derive(Debug, Eq, PartialEq, Clone, Error)]
pub enum ExpressionError {
    #[error("Action name is missing in the expression: \"{0}\"")]
    ActionMissing(String),
    #[error("Param is missing in the expression: \"{0}\"")]
    ParamMissing(String),
}

/// parse_action_data splits a `data` string like
/// `"replace.status_code=400, replace.body=ok"` into ordered expressions.
///
/// Segments split on the first `=` only, so a param may itself contain `=`.
/// The first malformed segment aborts the whole parse; later segments are
/// not evaluated.
pub fn parse_action_data(data: &str) -> Result<Vec<ActionExpression>, ExpressionError> {
    data.split(',')
        .map(|segment| {
            let segment = segment.trim();
            let (action, param) = match segment.split_once('=') {
                Some((action, param)) => (action.trim(), param.trim()),
                None => (segment, ""),
            };
            if action.is_empty() {
                return Err(ExpressionError::ActionMissing(segment.to_string()));
            }
            if param.is_empty() {
                return Err(ExpressionError::ParamMissing(segment.to_string()));
            }
            Ok(ActionExpression {
                action: action.to_string(),
                param: param.to_string(),
            })
        })
        .collect()
}
