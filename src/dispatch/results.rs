//! Per-account result map and the shapes emitted by a dispatch

use serde::{Serialize, Serializer};
use std::collections::BTreeMap;

use crate::common::errors::ClientError;

/// What one account produced: its payload, or the error rendered as text
#[derive(Debug, Clone, PartialEq)]
pub enum AccountOutcome<T> {
    Ok(T),
    Err(String),
}

impl<T> AccountOutcome<T> {
    pub fn from_result(result: Result<T, ClientError>) -> Self {
        match result {
            Ok(value) => AccountOutcome::Ok(value),
            Err(err) => AccountOutcome::Err(format!("error: {}", err)),
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, AccountOutcome::Ok(_))
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            AccountOutcome::Ok(value) => Some(value),
            AccountOutcome::Err(_) => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            AccountOutcome::Ok(_) => None,
            AccountOutcome::Err(message) => Some(message.as_str()),
        }
    }
}

impl<T: Serialize> Serialize for AccountOutcome<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            AccountOutcome::Ok(value) => value.serialize(serializer),
            AccountOutcome::Err(message) => serializer.serialize_str(message),
        }
    }
}

/// Outcome of every dispatched account, keyed by account name
///
/// Holds exactly one entry per account, success or failure.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct AccountResults<T> {
    entries: BTreeMap<String, AccountOutcome<T>>,
}

impl<T> Default for AccountResults<T> {
    fn default() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }
}

impl<T> AccountResults<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an account's result, replacing any earlier one
    pub fn insert(&mut self, account: impl Into<String>, result: Result<T, ClientError>) {
        self.entries
            .insert(account.into(), AccountOutcome::from_result(result));
    }

    pub fn get(&self, account: &str) -> Option<&AccountOutcome<T>> {
        self.entries.get(account)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AccountOutcome<T>)> {
        self.entries.iter().map(|(name, outcome)| (name.as_str(), outcome))
    }

    /// Successful payloads only
    pub fn successes(&self) -> impl Iterator<Item = (&str, &T)> {
        self.iter()
            .filter_map(|(name, outcome)| outcome.value().map(|value| (name, value)))
    }

    pub fn failures(&self) -> impl Iterator<Item = (&str, &str)> {
        self.iter()
            .filter_map(|(name, outcome)| outcome.error().map(|error| (name, error)))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Final value of a dispatch
///
/// Serializes either as the bare per-account map, or as the two-element
/// array `[perAccountResults, aggregate]` when a total was computed.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum DispatchOutput<T, U> {
    Results(AccountResults<T>),
    Aggregated(AccountResults<T>, U),
}

/// Render an output the way the CLI prints it: JSON indented by four spaces
pub fn to_pretty_json<T: Serialize>(value: &T) -> Result<String, ClientError> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut serializer)?;
    String::from_utf8(buf).map_err(|e| ClientError::Internal(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_outcome_serialization() {
        let mut results: AccountResults<Vec<i64>> = AccountResults::new();
        results.insert("main", Ok(vec![1, 2]));
        results.insert("sub", Err(ClientError::Timeout("cancel_order".to_string())));

        assert_eq!(
            serde_json::to_value(&results).unwrap(),
            json!({
                "main": [1, 2],
                "sub": "error: Operation timed out: cancel_order"
            })
        );
    }

    #[test]
    fn test_aggregated_output_is_pair() {
        let mut results: AccountResults<u32> = AccountResults::new();
        results.insert("main", Ok(7));
        let output = DispatchOutput::Aggregated(results, json!({"BTC": "7"}));

        assert_eq!(
            serde_json::to_value(&output).unwrap(),
            json!([{"main": 7}, {"BTC": "7"}])
        );
    }

    #[test]
    fn test_pretty_json_uses_four_spaces() {
        let mut results: AccountResults<u32> = AccountResults::new();
        results.insert("main", Ok(1));
        assert_eq!(to_pretty_json(&results).unwrap(), "{\n    \"main\": 1\n}");
    }

    #[test]
    fn test_successes_and_failures() {
        let mut results: AccountResults<u32> = AccountResults::new();
        results.insert("a", Ok(1));
        results.insert("b", Err(ClientError::SymbolNotFound("X".to_string())));

        assert_eq!(results.successes().count(), 1);
        let failures: Vec<_> = results.failures().collect();
        assert_eq!(failures, vec![("b", "error: symbol X not found")]);
    }
}
