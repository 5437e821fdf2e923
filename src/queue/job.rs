//! Transfer job payload.
//!
//! The router serializes a [`Job`]; the dispatcher receives untrusted bytes
//! as a [`RawJob`] and only acts on the [`Job`] that survives validation.

use crate::chain::{parse_address, Address};
use crate::state::Symbol;
use crate::types::{Error, Result};
use crate::validation::{self, Field};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Validated transfer request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub chat_id: i64,
    pub address: Address,
    /// Decimal amount in whole token units, as typed.
    pub amount: String,
    pub token: Symbol,
}

/// Job payload exactly as received, every field optional and untyped.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawJob {
    #[serde(default)]
    pub chat_id: Option<Value>,
    #[serde(default)]
    pub address: Option<Value>,
    #[serde(default)]
    pub amount: Option<Value>,
    #[serde(default)]
    pub token: Option<Value>,
}

fn render(field: &Option<Value>) -> String {
    match field {
        None | Some(Value::Null) => "unknown".to_string(),
        Some(Value::String(text)) => text.clone(),
        Some(other) => other.to_string(),
    }
}

impl RawJob {
    /// Parse a body leniently; anything that is not a JSON object yields an
    /// empty payload.
    pub fn from_bytes(body: &[u8]) -> Self {
        serde_json::from_slice(body).unwrap_or_default()
    }

    /// Chat to notify, when the payload names one.
    pub fn chat_id(&self) -> Option<i64> {
        match self.chat_id.as_ref()? {
            Value::Number(number) => number.as_i64(),
            Value::String(text) => text.parse().ok(),
            _ => None,
        }
    }

    /// Fenced block echoing the payload in failure notifications.
    pub fn echo(&self) -> String {
        format!(
            "```\nAddress:\n{}\n\nAmount:\n{}\n\nToken:\n{}\n```",
            render(&self.address),
            render(&self.amount),
            render(&self.token)
        )
    }
}

fn text_field<'a>(field: &'a Option<Value>, name: &str, kind: Field) -> Result<&'a str> {
    let text = field
        .as_ref()
        .and_then(Value::as_str)
        .ok_or_else(|| Error::validation(format!("job field {} is missing", name)))?;
    if !validation::matches(kind, text) {
        return Err(Error::validation(format!("job field {} is malformed", name)));
    }
    Ok(text)
}

impl TryFrom<&RawJob> for Job {
    type Error = Error;

    fn try_from(raw: &RawJob) -> Result<Self> {
        let chat_id = raw
            .chat_id()
            .ok_or_else(|| Error::validation("job field chatId is missing or malformed"))?;
        let address = parse_address(text_field(&raw.address, "address", Field::Address)?)?;
        let amount = text_field(&raw.amount, "amount", Field::Amount)?.to_string();
        let token = Symbol::parse(text_field(&raw.token, "token", Field::Token)?)?;
        Ok(Self {
            chat_id,
            address,
            amount,
            token,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn job() -> Job {
        Job {
            chat_id: -1001,
            address: parse_address("0x1111111111111111111111111111111111111111").unwrap(),
            amount: "1.5".to_string(),
            token: Symbol::parse("$ABC").unwrap(),
        }
    }

    #[test]
    fn test_wire_shape() {
        let value = serde_json::to_value(job()).unwrap();
        assert_eq!(
            value,
            json!({
                "chatId": -1001,
                "address": "0x1111111111111111111111111111111111111111",
                "amount": "1.5",
                "token": "$abc",
            })
        );
    }

    #[test]
    fn test_producer_output_validates() {
        let body = serde_json::to_vec(&job()).unwrap();
        let raw = RawJob::from_bytes(&body);
        assert_eq!(Job::try_from(&raw).unwrap(), job());
    }

    #[test]
    fn test_chat_id_as_string() {
        let raw = RawJob::from_bytes(br#"{"chatId": "42"}"#);
        assert_eq!(raw.chat_id(), Some(42));
    }

    #[test]
    fn test_rejects_malformed_fields() {
        let cases = [
            json!({"chatId": 1, "address": "0x11", "amount": "1", "token": "$abc"}),
            json!({"chatId": 1, "address": "0x1111111111111111111111111111111111111111", "amount": "0", "token": "$abc"}),
            json!({"chatId": 1, "address": "0x1111111111111111111111111111111111111111", "amount": "1", "token": "abc"}),
            json!({"address": "0x1111111111111111111111111111111111111111", "amount": "1", "token": "$abc"}),
            json!({"chatId": 1, "address": "0x1111111111111111111111111111111111111111", "amount": 1, "token": "$abc"}),
        ];
        for case in cases {
            let raw = RawJob::from_bytes(case.to_string().as_bytes());
            assert!(Job::try_from(&raw).is_err(), "accepted {}", case);
        }
    }

    #[test]
    fn test_garbage_body_echoes_unknown() {
        let raw = RawJob::from_bytes(b"not json");
        assert_eq!(raw.chat_id(), None);
        assert!(raw.echo().contains("Address:\nunknown"));
    }
}
