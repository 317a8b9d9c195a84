//! Attribute schemas: what a resource accepts, what it computes and
//!  what the host must check before calling into it.

pub mod validators;

use std::fmt::Write as _;

use serde_json::{Map, Value};

use crate::diagnostics::{AttributePath, Diagnostic, Diagnostics};

/// Checks a single string value. `path` locates the value for the
///  returned diagnostics.
pub type Validator = fn(&str, &AttributePath) -> Diagnostics;

#[derive(Debug, Clone)]
pub enum AttributeKind {
    String,
    Bool,
    Int,
    StringList,
    /// A list of nested blocks
    List(Block),
}

impl AttributeKind {
    fn name(&self) -> &'static str {
        match self {
            AttributeKind::String => "string",
            AttributeKind::Bool => "bool",
            AttributeKind::Int => "number",
            AttributeKind::StringList => "list of string",
            AttributeKind::List(_) => "list of object",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Attribute {
    pub name: &'static str,
    pub kind: AttributeKind,
    pub required: bool,
    pub computed: bool,
    /// Changing the value replaces the instance
    pub force_new: bool,
    pub min_items: usize,
    pub default: Option<Value>,
    pub validator: Option<Validator>,
    pub description: &'static str,
}

impl Attribute {
    fn new(name: &'static str, kind: AttributeKind) -> Self {
        Self {
            name,
            kind,
            required: false,
            computed: false,
            force_new: false,
            min_items: 0,
            default: None,
            validator: None,
            description: "",
        }
    }

    pub fn string(name: &'static str) -> Self {
        Self::new(name, AttributeKind::String)
    }

    pub fn bool(name: &'static str) -> Self {
        Self::new(name, AttributeKind::Bool)
    }

    pub fn int(name: &'static str) -> Self {
        Self::new(name, AttributeKind::Int)
    }

    pub fn string_list(name: &'static str) -> Self {
        Self::new(name, AttributeKind::StringList)
    }

    pub fn list(name: &'static str, block: Block) -> Self {
        Self::new(name, AttributeKind::List(block))
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn computed(mut self) -> Self {
        self.computed = true;
        self
    }

    pub fn force_new(mut self) -> Self {
        self.force_new = true;
        self
    }

    pub fn min_items(mut self, min: usize) -> Self {
        self.min_items = min;
        self
    }

    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn validator(mut self, validator: Validator) -> Self {
        self.validator = Some(validator);
        self
    }

    pub fn describe(mut self, description: &'static str) -> Self {
        self.description = description;
        self
    }

    fn flags(&self) -> Vec<&'static str> {
        let mut flags = Vec::new();
        if self.required {
            flags.push("required");
        } else if self.computed {
            flags.push("computed");
        } else {
            flags.push("optional");
        }
        if self.force_new {
            flags.push("forces new");
        }
        flags
    }

    fn validate(&self, value: &Value, path: &AttributePath, diags: &mut Diagnostics) {
        match (&self.kind, value) {
            (AttributeKind::String, Value::String(s)) => {
                if let Some(validator) = self.validator {
                    diags.extend(validator(s, path));
                }
            }
            (AttributeKind::Bool, Value::Bool(_)) => {}
            (AttributeKind::Int, Value::Number(n)) if n.is_i64() || n.is_u64() => {}
            (AttributeKind::StringList, Value::Array(items)) => {
                self.check_min_items(items.len(), path, diags);
                for (i, item) in items.iter().enumerate() {
                    if !item.is_string() {
                        diags.push(wrong_type("string", &path.index(i)));
                    }
                }
            }
            (AttributeKind::List(block), Value::Array(items)) => {
                self.check_min_items(items.len(), path, diags);
                for (i, item) in items.iter().enumerate() {
                    let item_path = path.index(i);
                    match item {
                        Value::Object(fields) => block.validate(fields, &item_path, diags),
                        _ => diags.push(wrong_type("object", &item_path)),
                    }
                }
            }
            (kind, _) => diags.push(wrong_type(kind.name(), path)),
        }
    }

    fn check_min_items(&self, len: usize, path: &AttributePath, diags: &mut Diagnostics) {
        if len < self.min_items {
            diags.push(
                Diagnostic::error(
                    "Not enough list items",
                    format!(
                        "Attribute {} requires at least {} item(s), got {}.",
                        path, self.min_items, len
                    ),
                )
                .with_path(path.clone()),
            );
        }
    }
}

fn wrong_type(expected: &str, path: &AttributePath) -> Diagnostic {
    Diagnostic::error(
        "Incorrect attribute value type",
        format!("Inappropriate value for attribute {}: {} required.", path, expected),
    )
    .with_path(path.clone())
}

#[derive(Debug, Clone, Default)]
pub struct Block {
    pub attributes: Vec<Attribute>,
}

impl Block {
    pub fn new(attributes: Vec<Attribute>) -> Self {
        Self { attributes }
    }

    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.name == name)
    }

    fn validate(&self, fields: &Map<String, Value>, path: &AttributePath, diags: &mut Diagnostics) {
        for name in fields.keys() {
            if self.attribute(name).is_none() {
                diags.push(
                    Diagnostic::error(
                        "Unsupported argument",
                        format!("An argument named {:?} is not expected here.", name),
                    )
                    .with_path(path.attribute(name)),
                );
            }
        }

        for attribute in &self.attributes {
            let attr_path = path.attribute(attribute.name);
            match fields.get(attribute.name) {
                None | Some(Value::Null) => {
                    if attribute.required {
                        diags.push(
                            Diagnostic::error(
                                "Missing required argument",
                                format!(
                                    "The argument {:?} is required, but no definition was found.",
                                    attribute.name
                                ),
                            )
                            .with_path(attr_path),
                        );
                    }
                }
                // computed values come back from earlier runs and are
                // not checked against their declared type
                Some(_) if attribute.computed => {}
                Some(value) => attribute.validate(value, &attr_path, diags),
            }
        }
    }

    fn apply_defaults(&self, fields: &mut Map<String, Value>) {
        for attribute in &self.attributes {
            let absent = matches!(fields.get(attribute.name), None | Some(Value::Null));
            if absent {
                if let Some(default) = &attribute.default {
                    fields.insert(attribute.name.to_string(), default.clone());
                }
                continue;
            }

            if let (AttributeKind::List(block), Some(Value::Array(items))) =
                (&attribute.kind, fields.get_mut(attribute.name))
            {
                for item in items.iter_mut() {
                    if let Value::Object(nested) = item {
                        block.apply_defaults(nested);
                    }
                }
            }
        }
    }

    fn describe(&self, indent: usize, out: &mut String) {
        for attribute in &self.attributes {
            let _ = write!(
                out,
                "{:indent$}{} ({}, {})",
                "",
                attribute.name,
                attribute.kind.name(),
                attribute.flags().join(", "),
                indent = indent
            );
            if let Some(default) = &attribute.default {
                let _ = write!(out, " [default {}]", default);
            }
            if !attribute.description.is_empty() {
                let _ = write!(out, ": {}", attribute.description);
            }
            out.push('\n');
            if let AttributeKind::List(block) = &attribute.kind {
                block.describe(indent + 2, out);
            }
        }
    }
}

/// Schema of one resource type or data source
#[derive(Debug, Clone)]
pub struct ResourceSchema {
    pub description: &'static str,
    pub block: Block,
}

impl ResourceSchema {
    pub fn new(description: &'static str, attributes: Vec<Attribute>) -> Self {
        Self {
            description,
            block: Block::new(attributes),
        }
    }

    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.block.attribute(name)
    }

    /// Check presence, types, list sizes and per-value validators.
    pub fn validate(&self, attributes: &Map<String, Value>) -> Diagnostics {
        let mut diags = Diagnostics::new();
        self.block.validate(attributes, &AttributePath::root(), &mut diags);
        diags
    }

    /// Fill in declared defaults for absent attributes, including those
    ///  of nested blocks
    pub fn apply_defaults(&self, attributes: &mut Map<String, Value>) {
        self.block.apply_defaults(attributes);
    }

    /// Human readable listing, one attribute per line
    pub fn describe(&self) -> String {
        let mut out = format!("{}\n", self.description);
        self.block.describe(2, &mut out);
        out
    }
}
