//! Admin audit-log actions and detail redaction.
//!
//! Entries are written for membership, credential, billing and workspace
//! lifecycle changes. Details are stored as JSON after redaction.

/// Known action names for `admin_audit_logs.action`.
pub mod actions {
    pub const WORKSPACE_CREATE: &str = "workspace.create";
    pub const WORKSPACE_UPDATE: &str = "workspace.update";
    pub const WORKSPACE_DELETE: &str = "workspace.delete";
    pub const MEMBER_ADD: &str = "member.add";
    pub const MEMBER_ROLE_CHANGE: &str = "member.role_change";
    pub const MEMBER_REMOVE: &str = "member.remove";
    pub const INTEGRATION_UPSERT: &str = "integration.upsert";
    pub const INTEGRATION_DELETE: &str = "integration.delete";
    pub const CHECKOUT_START: &str = "billing.checkout_start";
    pub const SUBSCRIPTION_SYNC: &str = "billing.subscription_sync";
}

/// Substrings that mark a JSON key as sensitive.
pub const SENSITIVE_FIELDS: &[&str] = &[
    "password",
    "token",
    "secret",
    "api_key",
    "private_key",
    "authorization",
    "credential",
];

const REDACTED: &str = "[REDACTED]";

/// Replace the value of every key containing a [`SENSITIVE_FIELDS`] entry
/// (case-insensitive) with `"[REDACTED]"`, recursing into objects and arrays.
pub fn redact_sensitive_fields(value: &serde_json::Value) -> serde_json::Value {
    match value {
        serde_json::Value::Object(map) => {
            let mut redacted = serde_json::Map::new();
            for (key, val) in map {
                let lower_key = key.to_lowercase();
                if SENSITIVE_FIELDS.iter().any(|f| lower_key.contains(f)) {
                    redacted.insert(key.clone(), serde_json::Value::String(REDACTED.into()));
                } else {
                    redacted.insert(key.clone(), redact_sensitive_fields(val));
                }
            }
            serde_json::Value::Object(redacted)
        }
        serde_json::Value::Array(arr) => {
            serde_json::Value::Array(arr.iter().map(redact_sensitive_fields).collect())
        }
        other => other.clone(),
    }
}
