use super::rules::DerivedRule;
use super::{Parameter, ParameterGenerator, ParameterLocation};
use crate::metadata::RuleSet;
use crate::schema::Schema;

/// A single `body` parameter whose schema is the tree of all rule fields.
///
/// Dotted fields build nested schemas: `points.*.x` makes `points` an array
/// of objects with an `x` property.
pub struct BodyParameterGenerator<'a> {
    rules: &'a RuleSet,
}

impl<'a> BodyParameterGenerator<'a> {
    pub fn new(rules: &'a RuleSet) -> Self {
        Self { rules }
    }

    /// Compile the rules into the body schema
    pub fn schema(&self) -> Schema {
        let mut root = Schema::object();
        root.properties = Some(Default::default());

        for (field, expr) in self.rules {
            let derived = DerivedRule::from_expr(expr);
            let segments: Vec<&str> = field.split('.').collect();
            visit(&mut root, &segments, &derived);
        }

        fill_array_items(&mut root);
        root
    }
}

impl ParameterGenerator for BodyParameterGenerator<'_> {
    fn location(&self) -> ParameterLocation {
        ParameterLocation::Body
    }

    fn parameters(&self) -> Vec<Parameter> {
        if self.rules.is_empty() {
            return Vec::new();
        }

        let mut parameter = Parameter::new(self.location(), "body");
        parameter.schema = Some(self.schema());
        vec![parameter]
    }
}

/// Walk `segments` below `parent`, creating nodes as needed
fn visit(parent: &mut Schema, segments: &[&str], rule: &DerivedRule) {
    let Some((&head, rest)) = segments.split_first() else {
        return;
    };

    let into_items = head == "*" && parent.is_type("array");
    let child = if into_items {
        &mut **parent.items.get_or_insert_with(Box::default)
    } else {
        parent
            .properties
            .get_or_insert_with(Default::default)
            .entry(head.to_string())
            .or_default()
    };

    match rest.first() {
        None => {
            apply_leaf(child, rule);
            if rule.required && !into_items && parent.is_type("object") {
                parent.mark_required(head);
            }
        }
        Some(&"*") => {
            child.schema_type = Some("array".to_string());
            visit(child, rest, rule);
        }
        Some(_) => {
            if !child.is_type("array") {
                child.schema_type = Some("object".to_string());
            }
            visit(child, rest, rule);
        }
    }
}

fn apply_leaf(node: &mut Schema, rule: &DerivedRule) {
    let keeps_container_type = rule.is_default_type() && node.has_children();
    if !keeps_container_type {
        node.schema_type = Some(rule.schema_type.to_string());
    }
    if let Some(format) = rule.format {
        node.format = Some(format.to_string());
    }
    if let Some(values) = &rule.enum_values {
        node.enum_values = Some(values.clone());
    }
}

/// Arrays never declared an element type hold strings
fn fill_array_items(node: &mut Schema) {
    if node.is_type("array") && node.items.is_none() {
        node.items = Some(Box::new(Schema::of_type("string")));
    }
    if let Some(items) = node.items.as_mut() {
        fill_array_items(items);
    }
    if let Some(properties) = node.properties.as_mut() {
        for property in properties.values_mut() {
            fill_array_items(property);
        }
    }
}
