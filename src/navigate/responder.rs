//! Serialization of structured navigation data.

use axum::http::{header, HeaderValue};
use serde_json::Value;

use crate::error::{Error, Result};
use crate::http::Context;

/// Query parameter that switches a data response to JSONP.
pub const CALLBACK_PARAM: &str = "callback";

const CALLBACK_MAX_LEN: usize = 512;

/// Writes a navigation's `data` value into the response.
///
/// The default is [`JsonResponder`]; an application may install its own
/// with `App::set_responder` to take over serialization entirely.
pub trait DataResponder: Send + Sync {
    fn respond(&self, ctx: &mut Context, data: &Value) -> Result<()>;
}

/// JSON, or JSONP when the request carries a usable `callback` parameter.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonResponder;

impl DataResponder for JsonResponder {
    fn respond(&self, ctx: &mut Context, data: &Value) -> Result<()> {
        let callback = ctx
            .query_param(CALLBACK_PARAM)
            .map(sanitize_callback)
            .filter(|cb| !cb.is_empty());

        let body = match &callback {
            Some(callback) => {
                ctx.set_content_type("text/javascript; charset=utf-8");
                jsonp_body(data, callback)?
            }
            None => {
                ctx.set_content_type("application/json; charset=utf-8");
                serde_json::to_string(data).map_err(Error::internal)?
            }
        };

        ctx.response_headers_mut().insert(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        );
        ctx.set_body(body);
        Ok(())
    }
}

/// Wrap `data` in a guarded JSONP call to `callback`.
///
/// The callback is reduced to identifier characters, dots and brackets, and
/// cut at 512 characters. An empty callback after cleanup falls back to
/// plain JSON.
pub fn jsonp_body(data: &Value, callback: &str) -> Result<String> {
    let json = serde_json::to_string(data)
        .map_err(Error::internal)?
        .replace('\u{2028}', "\\u2028")
        .replace('\u{2029}', "\\u2029");

    let callback = sanitize_callback(callback);
    if callback.is_empty() {
        return Ok(json);
    }
    Ok(format!(
        "/**/ typeof {cb} === 'function' && {cb}({json});",
        cb = callback
    ))
}

fn sanitize_callback(callback: &str) -> String {
    callback
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '$' | '.' | '[' | ']'))
        .take(CALLBACK_MAX_LEN)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{Method, Uri};
    use serde_json::json;

    #[test]
    fn test_json_response() {
        let mut ctx = Context::new(Method::GET, Uri::from_static("/api/list"));
        JsonResponder.respond(&mut ctx, &json!({"a": 1})).unwrap();

        assert_eq!(ctx.body_text(), Some(r#"{"a":1}"#));
        let headers = ctx.response_headers();
        assert_eq!(headers[header::CONTENT_TYPE], "application/json; charset=utf-8");
        assert_eq!(headers[header::X_CONTENT_TYPE_OPTIONS], "nosniff");
    }

    #[test]
    fn test_jsonp_response() {
        let mut ctx = Context::new(Method::GET, Uri::from_static("/api/list?callback=cb"));
        JsonResponder.respond(&mut ctx, &json!([1])).unwrap();

        assert_eq!(ctx.body_text(), Some("/**/ typeof cb === 'function' && cb([1]);"));
        let headers = ctx.response_headers();
        assert_eq!(headers[header::CONTENT_TYPE], "text/javascript; charset=utf-8");
        assert_eq!(headers[header::X_CONTENT_TYPE_OPTIONS], "nosniff");
    }

    #[test]
    fn test_empty_callback_is_plain_json() {
        for uri in ["/api?callback=", "/api?callback=%28%29%3B"] {
            let mut ctx = Context::new(Method::GET, Uri::from_static(uri));
            JsonResponder.respond(&mut ctx, &json!({"a": 1})).unwrap();

            assert_eq!(ctx.body_text(), Some(r#"{"a":1}"#));
            let headers = ctx.response_headers();
            assert_eq!(headers[header::CONTENT_TYPE], "application/json; charset=utf-8");
            assert_eq!(headers[header::X_CONTENT_TYPE_OPTIONS], "nosniff");
        }
    }

    #[test]
    fn test_callback_is_sanitized() {
        let body = jsonp_body(&json!(1), "alert(1);//app.cb[0]").unwrap();
        assert_eq!(body, "/**/ typeof alert1app.cb[0] === 'function' && alert1app.cb[0](1);");

        let long = "a".repeat(600);
        let body = jsonp_body(&json!(null), &long).unwrap();
        assert!(body.contains(&format!(" {}(", "a".repeat(512))));
        assert!(!body.contains(&"a".repeat(513)));

        assert_eq!(jsonp_body(&json!(2), "();").unwrap(), "2");
    }

    #[test]
    fn test_line_separators_escaped() {
        let body = jsonp_body(&json!("a\u{2028}b\u{2029}c"), "cb").unwrap();
        assert!(body.contains(r"a\u2028b\u2029c"));
        assert!(!body.contains('\u{2028}'));
    }
}
