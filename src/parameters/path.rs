use super::{Parameter, ParameterGenerator, ParameterLocation};
use once_cell::sync::Lazy;
use regex::Regex;

static PATH_VARIABLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{(\w+\??)\}").expect("path variable pattern is valid"));

/// Path variables of a URI template, optional markers included
pub struct PathParameterGenerator<'a> {
    uri: &'a str,
}

impl<'a> PathParameterGenerator<'a> {
    /// `uri` must still carry its `?` markers
    pub fn new(uri: &'a str) -> Self {
        Self { uri }
    }
}

impl ParameterGenerator for PathParameterGenerator<'_> {
    fn location(&self) -> ParameterLocation {
        ParameterLocation::Path
    }

    fn parameters(&self) -> Vec<Parameter> {
        PATH_VARIABLE
            .captures_iter(self.uri)
            .map(|caps| {
                let variable = &caps[1];
                let name = variable.trim_end_matches('?');
                let mut parameter = Parameter::new(self.location(), name);
                parameter.param_type = Some("integer".to_string());
                parameter.required = Some(!variable.ends_with('?'));
                parameter
            })
            .collect()
    }
}
