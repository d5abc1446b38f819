//! Authorization gates evaluated over authenticated claims.

use serde_json::{Map, Value};

/// Decides, from the data authentication attached to a request, whether the caller may use
/// a handler.
pub trait Authorization: Send + Sync {
    fn gate(&self, authorization_data: &Map<String, Value>) -> bool;
}

impl<F> Authorization for F
where
    F: Fn(&Map<String, Value>) -> bool + Send + Sync,
{
    fn gate(&self, authorization_data: &Map<String, Value>) -> bool {
        self(authorization_data)
    }
}

/// Allows callers whose claim `claim` equals `value`, or contains it when the claim is a list.
#[derive(Clone, Debug, PartialEq)]
pub struct ClaimEquals {
    pub claim: String,
    pub value: Value,
}

impl ClaimEquals {
    pub fn new(claim: impl Into<String>, value: impl Into<Value>) -> Self {
        ClaimEquals {
            claim: claim.into(),
            value: value.into(),
        }
    }
}

impl Authorization for ClaimEquals {
    fn gate(&self, authorization_data: &Map<String, Value>) -> bool {
        match authorization_data.get(&self.claim) {
            Some(Value::Array(items)) => items.contains(&self.value),
            Some(value) => *value == self.value,
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn claims(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn closures_are_gates() {
        let admins_only = |data: &Map<String, Value>| data.get("role") == Some(&json!("admin"));
        assert!(admins_only.gate(&claims(json!({"role": "admin"}))));
        assert!(!admins_only.gate(&claims(json!({}))));
    }

    #[test]
    fn claim_equals() {
        let gate = ClaimEquals::new("scope", "read:users");
        assert!(gate.gate(&claims(json!({"scope": "read:users"}))));
        assert!(gate.gate(&claims(json!({"scope": ["write:users", "read:users"]}))));
        assert!(!gate.gate(&claims(json!({"scope": "write:users"}))));
    }
}
