//! Per-model request shapes. Each upstream takes a single prompt, but each
//! wants it delivered differently; adding a model means adding a row to
//! [`ENCODINGS`].
use anyhow::Result;
use reqwest::Method;
use serde_json::{Map, Value};

pub const JSON_CONTENT_TYPE: &str = "application/json";
pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestEncoding {
    /// GET with the prompt as a single query parameter
    Query { param: &'static str },
    /// POST a JSON object holding the prompt under `field`
    Json { field: &'static str },
    /// POST a form body with the prompt under `field`, followed by fixed pairs
    Form {
        field: &'static str,
        extra: &'static [(&'static str, &'static str)],
    },
}

const ENCODINGS: &[(&str, RequestEncoding)] = &[
    ("chatgpt4", RequestEncoding::Query { param: "q" }),
    ("gemini-dark", RequestEncoding::Json { field: "gemini-deep" }),
    (
        "gemma-27b",
        RequestEncoding::Form {
            field: "27b",
            extra: &[],
        },
    ),
    (
        "qwen-72b",
        RequestEncoding::Form {
            field: "prompt",
            extra: &[("model", "qwen2.5-72b-chat")],
        },
    ),
    (
        "grok4",
        RequestEncoding::Form {
            field: "text",
            extra: &[],
        },
    ),
    ("gpt-oss", RequestEncoding::Json { field: "text" }),
];

/// Look up how a model expects its prompt
pub fn request_encoding(model_id: &str) -> Option<RequestEncoding> {
    ENCODINGS
        .iter()
        .find(|(id, _)| *id == model_id)
        .map(|(_, encoding)| *encoding)
}

impl RequestEncoding {
    pub fn method(&self) -> Method {
        match self {
            RequestEncoding::Query { .. } => Method::GET,
            RequestEncoding::Json { .. } | RequestEncoding::Form { .. } => Method::POST,
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            RequestEncoding::Query { .. } | RequestEncoding::Json { .. } => JSON_CONTENT_TYPE,
            RequestEncoding::Form { .. } => FORM_CONTENT_TYPE,
        }
    }

    /// The request URL; only query encodings carry the prompt here
    pub fn url(&self, endpoint: &str, prompt: &str) -> String {
        match self {
            RequestEncoding::Query { param } => {
                let separator = if endpoint.contains('?') { '&' } else { '?' };
                format!(
                    "{}{}{}={}",
                    endpoint,
                    separator,
                    param,
                    urlencoding::encode(prompt)
                )
            }
            _ => endpoint.to_string(),
        }
    }

    /// The request body, if the encoding has one
    pub fn body(&self, prompt: &str) -> Result<Option<String>> {
        match self {
            RequestEncoding::Query { .. } => Ok(None),
            RequestEncoding::Json { field } => {
                let mut body = Map::new();
                body.insert(field.to_string(), Value::String(prompt.to_string()));
                Ok(Some(Value::Object(body).to_string()))
            }
            RequestEncoding::Form { field, extra } => {
                let mut pairs = vec![(*field, prompt)];
                pairs.extend(extra.iter().copied());
                Ok(Some(serde_urlencoded::to_string(&pairs)?))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::list_models;
    use serde_json::json;

    #[test]
    fn test_every_registered_model_has_an_encoding() {
        for model in list_models() {
            assert!(
                request_encoding(&model.id).is_some(),
                "missing encoding for {}",
                model.id
            );
        }
        assert!(request_encoding("unknown").is_none());
    }

    #[test]
    fn test_query_encoding() {
        let encoding = request_encoding("chatgpt4").unwrap();
        assert_eq!(encoding.method(), Method::GET);
        assert_eq!(encoding.content_type(), JSON_CONTENT_TYPE);
        assert_eq!(
            encoding.url("https://shahad.top/chatbotapi.php", "hello world & more"),
            "https://shahad.top/chatbotapi.php?q=hello%20world%20%26%20more"
        );
        assert_eq!(encoding.body("hello").unwrap(), None);
    }

    #[test]
    fn test_json_encodings() -> Result<()> {
        let gemini = request_encoding("gemini-dark").unwrap();
        assert_eq!(gemini.method(), Method::POST);
        let body: Value = serde_json::from_str(&gemini.body("hi")?.unwrap())?;
        assert_eq!(body, json!({"gemini-deep": "hi"}));

        let oss = request_encoding("gpt-oss").unwrap();
        let body: Value = serde_json::from_str(&oss.body("hi")?.unwrap())?;
        assert_eq!(body, json!({"text": "hi"}));
        assert_eq!(oss.url("https://sii3.top/api/gpt-oss.php", "hi"), "https://sii3.top/api/gpt-oss.php");
        Ok(())
    }

    #[test]
    fn test_form_encodings() -> Result<()> {
        let gemma = request_encoding("gemma-27b").unwrap();
        assert_eq!(gemma.content_type(), FORM_CONTENT_TYPE);
        assert_eq!(gemma.body("hello world")?.unwrap(), "27b=hello+world");

        let qwen = request_encoding("qwen-72b").unwrap();
        assert_eq!(
            qwen.body("a&b")?.unwrap(),
            "prompt=a%26b&model=qwen2.5-72b-chat"
        );

        let grok = request_encoding("grok4").unwrap();
        assert_eq!(grok.method(), Method::POST);
        assert_eq!(grok.body("hey")?.unwrap(), "text=hey");
        Ok(())
    }
}
