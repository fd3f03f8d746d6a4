//! Derivation of schema facts from validation rule expressions.

use crate::metadata::{Rule, RuleExpr};

/// What a single field's rules say about its schema
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivedRule {
    pub schema_type: &'static str,
    pub required: bool,
    pub format: Option<&'static str>,
    pub enum_values: Option<Vec<String>>,
}

impl DerivedRule {
    pub fn from_expr(expr: &RuleExpr) -> Self {
        let tokens = tokens(expr);
        Self {
            schema_type: param_type(&tokens),
            required: tokens.contains(&"required"),
            format: tokens.contains(&"date").then_some("date"),
            enum_values: enum_values(&tokens),
        }
    }

    /// Whether the derived type is the fallback for unknown rules
    pub fn is_default_type(&self) -> bool {
        self.schema_type == "string"
    }
}

/// Split an expression into rule tokens; opaque rule objects are dropped
pub fn tokens(expr: &RuleExpr) -> Vec<&str> {
    match expr {
        RuleExpr::Pipe(rules) => rules.split('|').map(str::trim).collect(),
        RuleExpr::List(rules) => rules
            .iter()
            .filter_map(|rule| match rule {
                Rule::Name(name) => Some(name.trim()),
                Rule::Opaque(_) => None,
            })
            .collect(),
    }
}

/// Schema type implied by the tokens, in priority order
pub fn param_type(tokens: &[&str]) -> &'static str {
    if tokens.contains(&"integer") {
        "integer"
    } else if tokens.contains(&"numeric") {
        "number"
    } else if tokens.contains(&"boolean") {
        "boolean"
    } else if tokens.contains(&"array") {
        "array"
    } else {
        // date, ip, email, file...
        "string"
    }
}

/// Values of the first `in:` rule, kept verbatim
pub fn enum_values(tokens: &[&str]) -> Option<Vec<String>> {
    tokens
        .iter()
        .find_map(|token| token.strip_prefix("in:"))
        .map(|values| values.split(',').map(str::to_string).collect())
}
