//! Flag schema synthesis and argument binding
//!
//! A schema is derived from a handler's declared fields and turned into a
//! `clap` parser on every bind, so nothing parsed in one dispatch leaks into
//! the next.

use crate::{
    core::coerce::{self, FieldKind, Value},
    error::{CommanderError, Result},
};
use clap::{
    Arg, ArgAction, ColorChoice,
    error::{ContextKind, ContextValue},
};
use indexmap::IndexMap;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::{collections::HashSet, sync::LazyLock};
use tracing::{debug, instrument};

/// Id of the hidden positional collecting tokens after flag parsing stops.
/// Flag names cannot start with `_`, so it never collides with a flag.
const REST_ID: &str = "__rest";

static FLAG_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9][A-Za-z0-9_.-]*$").expect("flag name pattern is valid")
});

/// A field as declared by the registrant
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    field: String,
    kind: Option<FieldKind>,
    flag: Option<String>,
    default: String,
    usage: String,
}

impl FieldSpec {
    /// Declare a field; `kind` is `None` for types that cannot bind to a flag
    pub fn new(field: impl Into<String>, kind: Option<FieldKind>) -> Self {
        Self {
            field: field.into(),
            kind,
            flag: None,
            default: String::new(),
            usage: String::new(),
        }
    }

    /// Override the flag name
    #[must_use]
    pub fn with_flag(mut self, flag: impl Into<String>) -> Self {
        self.flag = Some(flag.into());
        self
    }

    /// Set the string form of the default value
    #[must_use]
    pub fn with_default(mut self, default: impl Into<String>) -> Self {
        self.default = default.into();
        self
    }

    /// Set the one-line help text
    #[must_use]
    pub fn with_usage(mut self, usage: impl Into<String>) -> Self {
        self.usage = usage.into();
        self
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn kind(&self) -> Option<FieldKind> {
        self.kind
    }
}

/// Resolved description of one bindable flag
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    /// Field name in the argument structure
    pub field: String,
    /// Flag name without leading dashes
    pub flag: String,
    pub kind: FieldKind,
    /// Declared default, before coercion
    pub default: String,
    pub usage: String,
}

impl FieldDescriptor {
    /// Declared default coerced to the field's kind
    pub fn default_value(&self) -> Value {
        coerce::coerce(&self.default, self.kind)
    }
}

/// Ordered flag schema of a structured handler
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    fields: Vec<FieldDescriptor>,
}

impl Schema {
    /// Build a schema from declared fields. Fields of unsupported kinds are
    /// left out.
    pub fn from_specs(specs: impl IntoIterator<Item = FieldSpec>) -> Self {
        let fields = specs
            .into_iter()
            .filter_map(|spec| {
                let Some(kind) = spec.kind else {
                    debug!("Skipping field '{}': unsupported kind", spec.field);
                    return None;
                };
                let flag = match spec.flag {
                    Some(flag) if !flag.is_empty() => flag,
                    _ => spec.field.to_lowercase(),
                };
                Some(FieldDescriptor {
                    field: spec.field,
                    flag,
                    kind,
                    default: spec.default,
                    usage: spec.usage,
                })
            })
            .collect();

        Self { fields }
    }

    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Look up a descriptor by flag name
    pub fn get(&self, flag: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.flag == flag)
    }

    /// Check that every flag name is usable and unique
    pub fn validate(&self, command: &str) -> Result<()> {
        let mut seen = HashSet::new();
        for field in &self.fields {
            if !FLAG_NAME.is_match(&field.flag) {
                return Err(CommanderError::invalid_handler(
                    command,
                    format!("invalid flag name '{}' for field '{}'", field.flag, field.field),
                ));
            }
            if !seen.insert(field.flag.as_str()) {
                return Err(CommanderError::invalid_handler(
                    command,
                    format!("flag '--{}' is declared more than once", field.flag),
                ));
            }
        }
        Ok(())
    }
}

/// Values bound for one dispatch, keyed by field name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoundArgs {
    values: IndexMap<String, Value>,
    rest: Vec<String>,
}

impl BoundArgs {
    /// Every field at its coerced default
    pub fn defaults(schema: &Schema) -> Self {
        Self {
            values: schema
                .fields()
                .iter()
                .map(|f| (f.field.clone(), f.default_value()))
                .collect(),
            rest: Vec::new(),
        }
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.values.get(field)
    }

    pub fn bool(&self, field: &str) -> Option<bool> {
        self.get(field).and_then(Value::as_bool)
    }

    pub fn int(&self, field: &str) -> Option<i64> {
        self.get(field).and_then(Value::as_int)
    }

    pub fn string(&self, field: &str) -> Option<&str> {
        self.get(field).and_then(Value::as_str)
    }

    /// Typed field value; falls back to the type's default when the field
    /// was not bound
    pub fn field<T: crate::core::args::FieldType>(&self, field: &str) -> T {
        self.get(field).and_then(T::from_value).unwrap_or_default()
    }

    /// Tokens left over once flag parsing stopped
    pub fn rest(&self) -> &[String] {
        &self.rest
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Synthesize a flag parser for a schema.
///
/// Flags are long-form only: `--name`, `--name value` or `--name=value`. The
/// single-dash spelling `-name` is rejected as an unknown argument, as is any
/// dash-prefixed token before the first positional. Everything from the first
/// positional (or after `--`) on is collected into [`BoundArgs::rest`].
pub fn build_parser(command: &str, schema: &Schema) -> Result<clap::Command> {
    schema.validate(command)?;

    let mut parser = clap::Command::new(command.to_string())
        .no_binary_name(true)
        .disable_help_flag(true)
        .disable_version_flag(true)
        .args_override_self(true)
        .color(ColorChoice::Never);

    for field in schema.fields() {
        let arg = Arg::new(field.flag.clone())
            .long(field.flag.clone())
            .value_name(field.kind.type_hint())
            .action(ArgAction::Set);

        let arg = match field.kind {
            FieldKind::Bool => arg
                .num_args(0..=1)
                .require_equals(true)
                .default_missing_value("true")
                .value_parser(coerce::parse_bool_token),
            FieldKind::Int => arg
                .allow_hyphen_values(true)
                .value_parser(coerce::parse_int_token),
            FieldKind::String => arg.allow_hyphen_values(true),
        };
        parser = parser.arg(arg);
    }

    Ok(parser.arg(
        Arg::new(REST_ID)
            .action(ArgAction::Append)
            .num_args(1..)
            .trailing_var_arg(true)
            .hide(true),
    ))
}

/// Parse `tokens` against `schema`. Flags absent from `tokens` keep their
/// declared default.
#[instrument(skip(schema, tokens), fields(fields = schema.len(), tokens = tokens.len()))]
pub fn bind(command: &str, schema: &Schema, tokens: &[String]) -> Result<BoundArgs> {
    let parser = build_parser(command, schema)?;
    let matches = parser
        .try_get_matches_from(tokens.iter())
        .map_err(|e| parse_error(command, &e))?;

    let mut values = IndexMap::with_capacity(schema.len());
    for field in schema.fields() {
        let parsed = match field.kind {
            FieldKind::Bool => matches.get_one::<bool>(&field.flag).copied().map(Value::Bool),
            FieldKind::Int => matches.get_one::<i64>(&field.flag).copied().map(Value::Int),
            FieldKind::String => matches.get_one::<String>(&field.flag).cloned().map(Value::Str),
        };
        let value = parsed.unwrap_or_else(|| field.default_value());
        debug!("Bound --{} = {}", field.flag, value);
        values.insert(field.field.clone(), value);
    }

    let rest: Vec<String> = matches
        .get_many::<String>(REST_ID)
        .map(|tail| tail.cloned().collect())
        .unwrap_or_default();
    if !rest.is_empty() {
        debug!("Unparsed trailing tokens: {:?}", rest);
    }

    Ok(BoundArgs { values, rest })
}

/// Convert a clap error into a parse error naming the offending token
fn parse_error(command: &str, err: &clap::Error) -> CommanderError {
    let context_string = |kind| match err.get(kind) {
        Some(ContextValue::String(s)) if !s.is_empty() => Some(s.clone()),
        _ => None,
    };

    let token = context_string(ContextKind::InvalidValue).or_else(|| {
        context_string(ContextKind::InvalidArg)
            .and_then(|arg| arg.split_whitespace().next().map(str::to_string))
    });

    let rendered = err.to_string();
    let message = rendered
        .lines()
        .next()
        .unwrap_or_default()
        .trim_start_matches("error: ")
        .to_string();

    CommanderError::parse(command, token, message)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema() -> Schema {
        Schema::from_specs([
            FieldSpec::new("Flag1", Some(FieldKind::Bool))
                .with_flag("flag1")
                .with_default("false")
                .with_usage("Test flag 1"),
            FieldSpec::new("Flag2", Some(FieldKind::String))
                .with_flag("flag2")
                .with_default("test")
                .with_usage("Test flag 2"),
            FieldSpec::new("Count", Some(FieldKind::Int)).with_default("3"),
        ])
    }

    fn tokens(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_flag_name_defaults_to_lowercased_field() {
        let schema = schema();
        assert_eq!(schema.fields()[2].flag, "count");
        assert!(schema.get("count").is_some());
        assert!(schema.get("Count").is_none());
    }

    #[test]
    fn test_unsupported_fields_are_omitted() {
        let schema = Schema::from_specs([
            FieldSpec::new("ratio", None).with_default("0.5"),
            FieldSpec::new("name", Some(FieldKind::String)),
        ]);
        assert_eq!(schema.len(), 1);
        assert_eq!(schema.fields()[0].flag, "name");
    }

    #[test]
    fn test_bind_defaults() {
        let bound = bind("test", &schema(), &[]).unwrap();
        assert_eq!(bound.bool("Flag1"), Some(false));
        assert_eq!(bound.string("Flag2"), Some("test"));
        assert_eq!(bound.int("Count"), Some(3));
        assert!(bound.rest().is_empty());
        assert_eq!(bound, BoundArgs::defaults(&schema()));
    }

    #[test]
    fn test_bind_empty_defaults_are_zero_values() {
        let schema = Schema::from_specs([
            FieldSpec::new("b", Some(FieldKind::Bool)),
            FieldSpec::new("i", Some(FieldKind::Int)).with_default("oops"),
            FieldSpec::new("s", Some(FieldKind::String)),
        ]);
        let bound = bind("test", &schema, &[]).unwrap();
        assert_eq!(bound.bool("b"), Some(false));
        assert_eq!(bound.int("i"), Some(0));
        assert_eq!(bound.string("s"), Some(""));
    }

    #[test]
    fn test_bind_bool_presence() {
        let bound = bind("test", &schema(), &tokens(&["--flag1"])).unwrap();
        assert_eq!(bound.bool("Flag1"), Some(true));
        assert_eq!(bound.string("Flag2"), Some("test"));
    }

    #[test]
    fn test_bind_bool_explicit_value() {
        let schema = Schema::from_specs([
            FieldSpec::new("verbose", Some(FieldKind::Bool)).with_default("true"),
        ]);
        let bound = bind("test", &schema, &[]).unwrap();
        assert_eq!(bound.bool("verbose"), Some(true));

        let bound = bind("test", &schema, &tokens(&["--verbose=false"])).unwrap();
        assert_eq!(bound.bool("verbose"), Some(false));

        let bound = bind("test", &schema, &tokens(&["--verbose"])).unwrap();
        assert_eq!(bound.bool("verbose"), Some(true));
    }

    #[test]
    fn test_bind_values() {
        let bound = bind(
            "test",
            &schema(),
            &tokens(&["--flag2", "value", "--count=-7"]),
        )
        .unwrap();
        assert_eq!(bound.bool("Flag1"), Some(false));
        assert_eq!(bound.string("Flag2"), Some("value"));
        assert_eq!(bound.int("Count"), Some(-7));
    }

    #[test]
    fn test_bind_repeated_flag_last_wins() {
        let bound = bind(
            "test",
            &schema(),
            &tokens(&["--count", "1", "--count", "0x10"]),
        )
        .unwrap();
        assert_eq!(bound.int("Count"), Some(16));
    }

    #[test]
    fn test_bind_stops_at_first_positional() {
        let bound = bind(
            "test",
            &schema(),
            &tokens(&["--flag1", "extra", "--flag2", "late"]),
        )
        .unwrap();
        assert_eq!(bound.bool("Flag1"), Some(true));
        assert_eq!(bound.string("Flag2"), Some("test"));
        assert_eq!(bound.rest(), ["extra", "--flag2", "late"]);
    }

    #[test]
    fn test_bind_double_dash_ends_flags() {
        let bound = bind("test", &schema(), &tokens(&["--", "--flag1"])).unwrap();
        assert_eq!(bound.bool("Flag1"), Some(false));
        assert_eq!(bound.rest(), ["--flag1"]);
    }

    #[test]
    fn test_bind_unknown_flag() {
        let err = bind("test", &schema(), &tokens(&["--bogus"])).unwrap_err();
        match &err {
            CommanderError::Parse { command, token, .. } => {
                assert_eq!(command, "test");
                assert_eq!(token.as_deref(), Some("--bogus"));
            }
            other => panic!("Expected parse error, got {other:?}"),
        }

        let err = bind("test", &schema(), &tokens(&["-x"])).unwrap_err();
        assert!(matches!(err, CommanderError::Parse { .. }));
        assert_eq!(err.token(), Some("-x"));

        let err = bind("test", &schema(), &tokens(&["--flag2", "v", "--bogus"])).unwrap_err();
        assert!(matches!(err, CommanderError::Parse { .. }));
        assert_eq!(err.token(), Some("--bogus"));

        let err = bind("test", &schema(), &tokens(&["--bogus=1"])).unwrap_err();
        assert!(matches!(err, CommanderError::Parse { .. }));
    }

    #[test]
    fn test_bind_single_dash_long_flag_is_unknown() {
        let err = bind("test", &schema(), &tokens(&["-flag1"])).unwrap_err();
        assert!(matches!(err, CommanderError::Parse { .. }));
    }

    #[test]
    fn test_bind_flags_after_positional_are_not_parsed() {
        let bound = bind("test", &schema(), &tokens(&["extra", "--bogus"])).unwrap();
        assert_eq!(
            bound,
            BoundArgs {
                rest: tokens(&["extra", "--bogus"]),
                ..BoundArgs::defaults(&schema())
            }
        );
    }

    #[test]
    fn test_bind_malformed_int() {
        let err = bind("test", &schema(), &tokens(&["--count", "many"])).unwrap_err();
        assert!(matches!(err, CommanderError::Parse { .. }));
        assert_eq!(err.token(), Some("many"));
    }

    #[test]
    fn test_bind_malformed_bool() {
        let err = bind("test", &schema(), &tokens(&["--flag1=maybe"])).unwrap_err();
        assert!(matches!(err, CommanderError::Parse { .. }));
        assert_eq!(err.token(), Some("maybe"));
    }

    #[test]
    fn test_bind_missing_value() {
        let err = bind("test", &schema(), &tokens(&["--flag2"])).unwrap_err();
        assert!(matches!(err, CommanderError::Parse { .. }));
    }

    #[test]
    fn test_validate_rejects_duplicate_flags() {
        let schema = Schema::from_specs([
            FieldSpec::new("a", Some(FieldKind::Bool)).with_flag("same"),
            FieldSpec::new("b", Some(FieldKind::Int)).with_flag("same"),
        ]);
        let err = schema.validate("dup").unwrap_err();
        assert!(matches!(err, CommanderError::InvalidHandler { .. }));
        assert!(bind("dup", &schema, &[]).is_err());
    }

    #[test]
    fn test_validate_rejects_bad_names() {
        for flag in ["-x", "with space", "a=b", "_hidden"] {
            let schema = Schema::from_specs([
                FieldSpec::new("a", Some(FieldKind::String)).with_flag(flag),
            ]);
            assert!(
                matches!(
                    schema.validate("bad"),
                    Err(CommanderError::InvalidHandler { .. })
                ),
                "{flag}"
            );
        }
    }
}
