use super::rules::DerivedRule;
use super::{Parameter, ParameterGenerator, ParameterLocation};
use crate::metadata::RuleSet;
use crate::schema::Schema;

/// Flat query parameters compiled from validation rules.
///
/// Wildcard fields (`values.*`) are folded into their array parent.
pub struct QueryParameterGenerator<'a> {
    rules: &'a RuleSet,
}

impl<'a> QueryParameterGenerator<'a> {
    pub fn new(rules: &'a RuleSet) -> Self {
        Self { rules }
    }
}

impl ParameterGenerator for QueryParameterGenerator<'_> {
    fn location(&self) -> ParameterLocation {
        ParameterLocation::Query
    }

    fn parameters(&self) -> Vec<Parameter> {
        let mut parameters: Vec<Parameter> = Vec::new();

        for (field, expr) in self.rules {
            let derived = DerivedRule::from_expr(expr);

            if field.split('.').any(|segment| segment == "*") {
                let key = field.split('.').next().unwrap_or(field);
                let parent = find_or_insert(&mut parameters, self.location(), key, "array");
                parent.param_type = Some("array".to_string());

                let mut items = Schema::of_type(derived.schema_type);
                items.enum_values = derived.enum_values;
                parent.items = Some(items);
                continue;
            }

            let parameter = find_or_insert(&mut parameters, self.location(), field, derived.schema_type);
            if !derived.is_default_type() {
                parameter.param_type = Some(derived.schema_type.to_string());
            }
            if derived.required {
                parameter.required = Some(true);
            }
            if derived.enum_values.is_some() {
                parameter.enum_values = derived.enum_values;
            }
            if let Some(format) = derived.format {
                parameter.format = Some(format.to_string());
            }
        }

        for parameter in parameters.iter_mut() {
            if parameter.param_type.as_deref() == Some("array") && parameter.items.is_none() {
                parameter.items = Some(Schema::of_type("string"));
            }
        }

        parameters
    }
}

fn find_or_insert<'p>(
    parameters: &'p mut Vec<Parameter>,
    location: ParameterLocation,
    name: &str,
    param_type: &str,
) -> &'p mut Parameter {
    let index = match parameters.iter().position(|p| p.name == name) {
        Some(index) => index,
        None => {
            let mut parameter = Parameter::new(location, name);
            parameter.param_type = Some(param_type.to_string());
            parameter.required = Some(false);
            parameters.push(parameter);
            parameters.len() - 1
        }
    };
    &mut parameters[index]
}
