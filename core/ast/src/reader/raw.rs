//! Field access on raw compiler records.

use std::str::FromStr;

use serde_json::{Map, Value};

use crate::{
    errors::AstError,
    nodes::{BUILTIN_REFERENCE, NodeId, SourceLocation},
    reader::AstFormat,
};

static NULL: Value = Value::Null;

/// One unit root found in compiler output.
pub(crate) struct UnitEntry<'v> {
    pub(crate) key: String,
    pub(crate) index: Option<i64>,
    pub(crate) root: &'v Value,
}

/// Locates the unit roots of the accepted output shapes.
pub(crate) fn unit_entries(output: &Value) -> Result<Vec<UnitEntry<'_>>, AstError> {
    if let Some(sources) = output.get("sources").and_then(Value::as_object) {
        let source_list: Vec<&str> = output
            .get("sourceList")
            .and_then(Value::as_array)
            .map(|list| list.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default();
        return sources
            .iter()
            .map(|(key, entry)| {
                let root = ["ast", "legacyAST", "AST"]
                    .iter()
                    .find_map(|name| entry.get(*name).filter(|root| root.is_object()))
                    .ok_or_else(|| {
                        AstError::malformed("SourceUnit", format!("no AST for source `{key}`"))
                    })?;
                let index = source_list
                    .iter()
                    .position(|listed| *listed == key.as_str())
                    .and_then(|position| i64::try_from(position).ok())
                    .or_else(|| entry.get("id").and_then(Value::as_i64));
                Ok(UnitEntry {
                    key: key.clone(),
                    index,
                    root,
                })
            })
            .collect();
    }
    match output {
        Value::Array(roots) => Ok(roots.iter().map(root_entry).collect()),
        Value::Object(_) => Ok(vec![root_entry(output)]),
        _ => Err(AstError::malformed(
            "SourceUnit",
            "compiler output must be an object or an array",
        )),
    }
}

fn root_entry(root: &Value) -> UnitEntry<'_> {
    let key = root
        .get("absolutePath")
        .or_else(|| attributes(root).get("absolutePath"))
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    UnitEntry {
        key,
        index: None,
        root,
    }
}

/// The kind tag of a record, for diagnostics.
pub(crate) fn tag(raw: &Value) -> &str {
    raw.get("nodeType")
        .or_else(|| raw.get("name"))
        .and_then(Value::as_str)
        .unwrap_or("<record>")
}

/// Legacy attribute object; `null` when absent.
pub(crate) fn attributes(raw: &Value) -> &Value {
    raw.get("attributes").unwrap_or(&NULL)
}

/// Legacy child records.
pub(crate) fn children(raw: &Value) -> &[Value] {
    raw.get("children")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default()
}

/// A present, non-null field.
pub(crate) fn field<'v>(raw: &'v Value, name: &str) -> Option<&'v Value> {
    raw.get(name).filter(|value| !value.is_null())
}

pub(crate) fn required<'v>(raw: &'v Value, name: &str) -> Result<&'v Value, AstError> {
    field(raw, name).ok_or_else(|| missing(raw, name))
}

pub(crate) fn string(raw: &Value, name: &str) -> Result<String, AstError> {
    required(raw, name)?
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| wrong_shape(raw, name, "a string"))
}

pub(crate) fn opt_string(raw: &Value, name: &str) -> Option<String> {
    field(raw, name).and_then(Value::as_str).map(str::to_string)
}

pub(crate) fn string_or_default(raw: &Value, name: &str) -> String {
    opt_string(raw, name).unwrap_or_default()
}

pub(crate) fn boolean(raw: &Value, name: &str) -> bool {
    field(raw, name).and_then(Value::as_bool).unwrap_or(false)
}

/// The record's own id; `None` when the compiler left it out.
pub(crate) fn id(raw: &Value) -> Result<Option<NodeId>, AstError> {
    field(raw, "id")
        .map(|id| id.as_i64().ok_or_else(|| wrong_shape(raw, "id", "an integer id")))
        .transpose()
}

/// A cross-reference id, defaulting to the builtin sentinel.
pub(crate) fn reference(raw: &Value, name: &str) -> NodeId {
    field(raw, name)
        .and_then(Value::as_i64)
        .unwrap_or(BUILTIN_REFERENCE)
}

pub(crate) fn ids(raw: &Value, name: &str) -> Vec<NodeId> {
    field(raw, name)
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(Value::as_i64).collect())
        .unwrap_or_default()
}

pub(crate) fn strings(raw: &Value, name: &str) -> Vec<String> {
    field(raw, name)
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// A string field parsed into one of the scalar enums.
pub(crate) fn parsed<T: FromStr<Err = String>>(raw: &Value, name: &str) -> Result<T, AstError> {
    let text = string(raw, name)?;
    text.parse()
        .map_err(|reason: String| AstError::malformed(tag(raw), format!("`{name}`: {reason}")))
}

pub(crate) fn parsed_or<T: FromStr<Err = String>>(
    raw: &Value,
    name: &str,
    default: T,
) -> Result<T, AstError> {
    if field(raw, name).is_none() {
        return Ok(default);
    }
    parsed(raw, name)
}

pub(crate) fn opt_parsed<T: FromStr<Err = String>>(
    raw: &Value,
    name: &str,
) -> Result<Option<T>, AstError> {
    if field(raw, name).is_none() {
        return Ok(None);
    }
    parsed(raw, name).map(Some)
}

/// The record's own `src`; records without one get [`SourceLocation::UNKNOWN`].
pub(crate) fn src(raw: &Value) -> Result<SourceLocation, AstError> {
    Ok(opt_src(raw, "src")?.unwrap_or_default())
}

pub(crate) fn opt_src(raw: &Value, name: &str) -> Result<Option<SourceLocation>, AstError> {
    match field(raw, name) {
        None => Ok(None),
        Some(Value::String(text)) => text.parse().map(Some),
        Some(_) => Err(wrong_shape(raw, name, "an `offset:length:index` string")),
    }
}

/// The record without nested node records, which live on as typed children.
/// Inline assembly keeps its embedded `AST` until it has been expanded.
pub(crate) fn shallow(raw: &Value, format: AstFormat) -> Value {
    let Some(object) = raw.as_object() else {
        return raw.clone();
    };
    let keep_nested = raw.get("nodeType").and_then(Value::as_str) == Some("InlineAssembly");
    let stripped: Map<String, Value> = object
        .iter()
        .filter(|(key, value)| match format {
            AstFormat::Legacy => key.as_str() != "children",
            AstFormat::Modern => {
                (keep_nested && key.as_str() == "AST") || !holds_node_record(value)
            }
        })
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();
    Value::Object(stripped)
}

fn holds_node_record(value: &Value) -> bool {
    match value {
        Value::Object(object) => object.contains_key("nodeType"),
        Value::Array(items) => items.iter().any(holds_node_record),
        _ => false,
    }
}

/// `typeDescriptions.typeString` of a modern expression or type name.
pub(crate) fn modern_type_string(raw: &Value) -> String {
    raw.get("typeDescriptions")
        .and_then(|descriptions| field(descriptions, "typeString"))
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

pub(crate) fn missing(raw: &Value, name: &str) -> AstError {
    AstError::malformed(tag(raw), format!("missing field `{name}`"))
}

pub(crate) fn wrong_shape(raw: &Value, name: &str, expected: &str) -> AstError {
    AstError::malformed(tag(raw), format!("field `{name}` is not {expected}"))
}
