//! Declarative field validation.
//!
//! A [`RuleSet`] is an ordered list of fields, each carrying an ordered list
//! of `(Rule, message)` pairs. Evaluation walks every field and collects all
//! violations before reporting, so a caller either gets `Ok(())` or the full
//! set of messages and never acts on half-valid input.

use async_trait::async_trait;
use axum_helpers::FieldErrors;
use serde_json::{Map, Value};
use validator::ValidateEmail;

use crate::error::{UserError, UserResult};

/// Fields whose values are compared byte-for-byte and must not be trimmed.
const UNTRIMMED_FIELDS: &[&str] = &["password", "password_confirmation"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    /// Present, not null and not blank.
    Required,
    String,
    Email,
    /// Minimum length in characters.
    Min(usize),
    /// Maximum length in characters.
    Max(usize),
    /// Equal to `<field>_confirmation`.
    Confirmed,
    /// Not already taken, per the [`UniquenessProbe`].
    Unique,
}

/// Answers whether a value is already in use for a field.
#[async_trait]
pub trait UniquenessProbe: Send + Sync {
    async fn is_taken(&self, field: &str, value: &str) -> UserResult<bool>;
}

/// Probe for rule sets without `unique` rules.
pub struct NoUniqueness;

#[async_trait]
impl UniquenessProbe for NoUniqueness {
    async fn is_taken(&self, _field: &str, _value: &str) -> UserResult<bool> {
        Ok(false)
    }
}

#[derive(Debug, Clone)]
pub struct FieldRules {
    field: &'static str,
    checks: Vec<(Rule, &'static str)>,
}

impl FieldRules {
    pub fn new(field: &'static str) -> Self {
        Self {
            field,
            checks: Vec::new(),
        }
    }

    pub fn rule(mut self, rule: Rule, message: &'static str) -> Self {
        self.checks.push((rule, message));
        self
    }

    fn required_message(&self) -> Option<&'static str> {
        self.checks
            .iter()
            .find(|(rule, _)| *rule == Rule::Required)
            .map(|(_, message)| *message)
    }
}

#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    fields: Vec<FieldRules>,
    partial: bool,
}

impl RuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, rules: FieldRules) -> Self {
        self.fields.push(rules);
        self
    }

    /// Only validate fields present in the input.
    pub fn partial(mut self) -> Self {
        self.partial = true;
        self
    }

    pub async fn validate(
        &self,
        input: &Map<String, Value>,
        probe: &dyn UniquenessProbe,
    ) -> UserResult<()> {
        let mut errors = FieldErrors::new();

        for rules in &self.fields {
            if self.partial && !input.contains_key(rules.field) {
                continue;
            }

            let value = input.get(rules.field).filter(|v| is_present(v));
            let Some(value) = value else {
                if let Some(message) = rules.required_message() {
                    errors.add(rules.field, message);
                }
                continue;
            };

            for (rule, message) in &rules.checks {
                if !check(*rule, rules.field, value, input, probe).await? {
                    errors.add(rules.field, *message);
                }
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(UserError::Validation(errors))
        }
    }
}

async fn check(
    rule: Rule,
    field: &str,
    value: &Value,
    input: &Map<String, Value>,
    probe: &dyn UniquenessProbe,
) -> UserResult<bool> {
    let text = value.as_str();
    let passed = match rule {
        Rule::Required => true,
        Rule::String => text.is_some(),
        Rule::Email => text.is_some_and(|s| s.validate_email()),
        Rule::Min(min) => text.is_none_or(|s| s.chars().count() >= min),
        Rule::Max(max) => text.is_none_or(|s| s.chars().count() <= max),
        Rule::Confirmed => match text {
            Some(s) => input
                .get(&format!("{field}_confirmation"))
                .and_then(Value::as_str)
                .is_some_and(|confirmation| confirmation == s),
            None => true,
        },
        Rule::Unique => match text {
            Some(s) => !probe.is_taken(field, s).await?,
            None => true,
        },
    };
    Ok(passed)
}

fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(s) => !s.trim().is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
        _ => true,
    }
}

/// Trim string inputs (except passwords) and turn empty strings into null.
pub fn normalize(mut input: Map<String, Value>) -> Map<String, Value> {
    for (key, value) in input.iter_mut() {
        if let Value::String(s) = value {
            if !UNTRIMMED_FIELDS.contains(&key.as_str()) {
                let trimmed = s.trim();
                if trimmed.len() != s.len() {
                    *s = trimmed.to_string();
                }
            }
            if s.is_empty() {
                *value = Value::Null;
            }
        }
    }
    input
}
