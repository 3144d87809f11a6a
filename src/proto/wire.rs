//! JSON bodies exchanged with the `/valkey/*` endpoints.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body of `POST /valkey/set`.
#[derive(Debug, Serialize)]
pub struct SetRequest<'a> {
    pub key: &'a str,
    pub value: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ex: Option<u64>,
}

/// Body of `POST /valkey/expire`.
#[derive(Debug, Serialize)]
pub struct ExpireRequest<'a> {
    pub key: &'a str,
    pub seconds: u64,
}

/// Body of `POST /valkey/exec`.
#[derive(Debug, Serialize)]
pub struct ExecRequest<'a> {
    pub command: &'a str,
    pub args: &'a [Value],
}

#[derive(Debug, Deserialize)]
pub struct SuccessReply {
    pub success: bool,
}

#[derive(Debug, Deserialize)]
pub struct GetReply {
    #[serde(default)]
    pub value: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DeletedReply {
    pub deleted: bool,
}

#[derive(Debug, Deserialize)]
pub struct ExistsReply {
    pub exists: bool,
}

#[derive(Debug, Deserialize)]
pub struct TtlReply {
    pub ttl: i64,
}

#[derive(Debug, Deserialize)]
pub struct ExecReply {
    #[serde(default)]
    pub result: Value,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_set_without_expiry_omits_ex() {
        let body = SetRequest {
            key: "k",
            value: "v",
            ex: None,
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({"key": "k", "value": "v"})
        );
    }

    #[test]
    fn test_set_with_expiry() {
        let body = SetRequest {
            key: "k",
            value: "v",
            ex: Some(3600),
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({"key": "k", "value": "v", "ex": 3600})
        );
    }

    #[test]
    fn test_get_reply_null_and_missing() {
        let reply: GetReply = serde_json::from_str(r#"{"value":null}"#).unwrap();
        assert_eq!(reply.value, None);
        let reply: GetReply = serde_json::from_str("{}").unwrap();
        assert_eq!(reply.value, None);
    }

    #[test]
    fn test_exec_reply_keeps_any_value() {
        let reply: ExecReply =
            serde_json::from_str(r#"{"result":["a",null,3]}"#).unwrap();
        assert_eq!(reply.result, json!(["a", null, 3]));
    }

    #[test]
    fn test_ttl_reply_passes_sentinels() {
        let reply: TtlReply = serde_json::from_str(r#"{"ttl":-2}"#).unwrap();
        assert_eq!(reply.ttl, -2);
    }
}
