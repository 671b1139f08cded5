//! Response types and the decoder that classifies raw HTTP responses.
//!
//! # Design
//! Decoding is a single split on the status code:
//! - `200`: the body must match the call site's success shape. A mismatch
//!   is a protocol violation and fails with `Error::Decode`.
//! - anything else: the body is read as an `ErrorResponse` on a best-effort
//!   basis. If it parses, the result is `ApiError { response: Some(..) }`.
//!   If it does not, only the status survives as `ApiError { response: None }`.
//!
//! Only the first JSON value of a body is read; anything after it is
//! ignored. JSON fields default when absent, and a `null` body decodes to the
//! default value, so `{}` and `null` are both a valid `BasicResponse` and a
//! valid (empty) `ErrorResponse`. A malformed error body and an empty one
//! stay distinguishable through `ApiError::response`.
//!
//! Content responses never buffer the body. The stream moves into
//! `MessageContentResponse` and the caller owns it from then on.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, Error};
use crate::http::{Body, HttpResponse};

pub const STATUS_OK: u16 = 200;
pub const CONTENT_DISPOSITION: &str = "Content-Disposition";

/// Success body of push and reply calls.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BasicResponse {
    pub request_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserProfileResponse {
    pub request_id: String,
    pub user_id: String,
    pub display_name: String,
    pub picture_url: String,
    pub status_message: String,
}

/// One field-level validation failure reported by the platform.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ErrorDetail {
    pub message: String,
    pub property: String,
}

/// Structured error body of a non-200 response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ErrorResponse {
    pub request_id: String,
    pub message: String,
    /// Kept in the order the platform sent them.
    pub details: Vec<ErrorDetail>,
}

/// Binary payload of a message-content call.
#[derive(Debug)]
pub struct MessageContentResponse {
    pub content: Body,
    pub file_name: String,
}

/// Decoding of the success branch for one call site.
#[async_trait]
pub trait Decode: Sized + Send {
    async fn decode(response: HttpResponse) -> Result<Self, Error>;
}

#[async_trait]
impl Decode for BasicResponse {
    async fn decode(response: HttpResponse) -> Result<Self, Error> {
        decode_json(response).await
    }
}

#[async_trait]
impl Decode for UserProfileResponse {
    async fn decode(response: HttpResponse) -> Result<Self, Error> {
        decode_json(response).await
    }
}

#[async_trait]
impl Decode for MessageContentResponse {
    async fn decode(response: HttpResponse) -> Result<Self, Error> {
        let file_name = {
            let value = response
                .header(CONTENT_DISPOSITION)
                .ok_or_else(|| Error::ContentDisposition("header missing".to_string()))?;
            parse_content_disposition(value).ok_or_else(|| Error::ContentDisposition(value.to_string()))?
        };
        Ok(Self {
            content: response.body,
            file_name,
        })
    }
}

/// Classify a raw response into a typed value or a typed error.
pub async fn decode_response<T: Decode>(response: HttpResponse) -> Result<T, Error> {
    if response.status != STATUS_OK {
        let status = response.status;
        let err = match response.body.collect().await {
            Ok(bytes) => decode_error_body(status, &bytes),
            Err(_) => ApiError { code: status, response: None },
        };
        return Err(err.into());
    }
    T::decode(response).await
}

/// Build the `ApiError` for a non-200 body. Never fails.
pub fn decode_error_body(status: u16, body: &[u8]) -> ApiError {
    ApiError {
        code: status,
        response: decode_first_value::<ErrorResponse>(body).ok(),
    }
}

pub fn decode_json_body<T: DeserializeOwned + Default>(body: &[u8]) -> Result<T, Error> {
    decode_first_value(body).map_err(Error::Decode)
}

async fn decode_json<T: DeserializeOwned + Default>(response: HttpResponse) -> Result<T, Error> {
    let bytes = response.body.collect().await?;
    decode_json_body(&bytes)
}

/// Decode the first JSON value of `body`, treating `null` as `T::default()`.
fn decode_first_value<T: DeserializeOwned + Default>(body: &[u8]) -> Result<T, serde_json::Error> {
    match serde_json::Deserializer::from_slice(body).into_iter::<Option<T>>().next() {
        Some(value) => value.map(Option::unwrap_or_default),
        // empty or whitespace-only body: surface the EOF error
        None => serde_json::from_slice(body),
    }
}

/// Extract the `filename` parameter of a `Content-Disposition` value.
///
/// Returns `None` when the value is unparseable (no disposition type,
/// malformed parameter, unterminated quote, duplicate `filename`). A
/// well-formed value without a `filename` parameter yields an empty string.
pub fn parse_content_disposition(value: &str) -> Option<String> {
    let (disposition, mut rest) = match value.find(';') {
        Some(idx) => value.split_at(idx),
        None => (value, ""),
    };
    let disposition = disposition.trim();
    if disposition.is_empty() || !disposition.chars().all(is_token_char) {
        return None;
    }

    let mut file_name = None;
    loop {
        rest = rest.trim_start();
        if rest.is_empty() {
            break;
        }
        rest = rest.strip_prefix(';')?.trim_start();
        if rest.is_empty() {
            // trailing semicolon
            break;
        }

        let (name, after) = split_token(rest);
        if name.is_empty() {
            return None;
        }
        let after = after.trim_start().strip_prefix('=')?.trim_start();
        let (param, after) = match after.strip_prefix('"') {
            Some(quoted) => parse_quoted(quoted)?,
            None => {
                let (token, after) = split_token(after);
                if token.is_empty() {
                    return None;
                }
                (token.to_string(), after)
            }
        };

        if name.eq_ignore_ascii_case("filename") {
            if file_name.is_some() {
                return None;
            }
            file_name = Some(param);
        }
        rest = after;
    }

    Some(file_name.unwrap_or_default())
}

fn is_token_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || "!#$%&'*+-.^_`|~".contains(c)
}

fn split_token(s: &str) -> (&str, &str) {
    let end = s.find(|c: char| !is_token_char(c)).unwrap_or(s.len());
    s.split_at(end)
}

/// Parse a quoted-string body (opening quote already consumed).
fn parse_quoted(s: &str) -> Option<(String, &str)> {
    let mut out = String::new();
    let mut chars = s.char_indices();
    while let Some((idx, c)) = chars.next() {
        match c {
            '"' => return Some((out, &s[idx + 1..])),
            '\\' => {
                let (_, escaped) = chars.next()?;
                out.push(escaped);
            }
            c => out.push(c),
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TransportError;

    fn response(status: u16, headers: &[(&str, &str)], body: &'static str) -> HttpResponse {
        HttpResponse {
            status,
            headers: headers
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            body: Body::from_bytes(body),
        }
    }

    #[tokio::test]
    async fn empty_object_decodes_to_basic_response() {
        let res: BasicResponse = decode_response(response(200, &[], "{}")).await.unwrap();
        assert_eq!(res, BasicResponse::default());
        assert!(res.request_id.is_empty());
    }

    #[tokio::test]
    async fn profile_decodes_all_fields() {
        let body = r#"{"userId":"U4af4980629","displayName":"LINE taro","pictureUrl":"https://example.com/abcdefghijklmn","statusMessage":"Hello, LINE!"}"#;
        let res: UserProfileResponse = decode_response(response(200, &[], body)).await.unwrap();
        assert_eq!(res.user_id, "U4af4980629");
        assert_eq!(res.display_name, "LINE taro");
        assert_eq!(res.picture_url, "https://example.com/abcdefghijklmn");
        assert_eq!(res.status_message, "Hello, LINE!");
    }

    #[tokio::test]
    async fn success_with_bad_body_is_decode_error() {
        let err = decode_response::<BasicResponse>(response(200, &[], "not json"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Decode(_)));
        assert!(err.api().is_none());
    }

    #[tokio::test]
    async fn structured_error_preserves_detail_order() {
        let body = r#"{"message":"Request body has 2 error(s).","details":[{"message":"may not be empty","property":"messages[0].text"},{"message":"must be specified","property":"to"}]}"#;
        let err = decode_response::<BasicResponse>(response(400, &[], body))
            .await
            .unwrap_err();
        let api = err.api().unwrap();
        assert_eq!(api.code, 400);
        let parsed = api.response.as_ref().unwrap();
        assert_eq!(parsed.message, "Request body has 2 error(s).");
        let properties: Vec<&str> = parsed.details.iter().map(|d| d.property.as_str()).collect();
        assert_eq!(properties, ["messages[0].text", "to"]);
    }

    #[tokio::test]
    async fn malformed_error_body_keeps_status_only() {
        let err = decode_response::<BasicResponse>(response(400, &[], "<html>Bad Request</html>"))
            .await
            .unwrap_err();
        assert_eq!(err.api(), Some(&ApiError { code: 400, response: None }));
    }

    #[test]
    fn empty_error_object_is_distinct_from_malformed() {
        let empty = decode_error_body(500, b"{}");
        assert_eq!(empty.response, Some(ErrorResponse::default()));
        let malformed = decode_error_body(500, b"");
        assert_eq!(malformed.response, None);
    }

    #[test]
    fn error_body_reads_only_the_first_value() {
        let err = decode_error_body(400, br#"{"message":"x"} {"message":"y"}"#);
        assert_eq!(err.response.unwrap().message, "x");
    }

    #[test]
    fn null_error_body_is_an_empty_response() {
        let err = decode_error_body(400, b"null");
        assert_eq!(err.response, Some(ErrorResponse::default()));
    }

    #[tokio::test]
    async fn null_success_body_decodes_to_default() {
        let res: BasicResponse = decode_response(response(200, &[], "null")).await.unwrap();
        assert_eq!(res, BasicResponse::default());
        let res: BasicResponse = decode_json_body(b"{\"requestId\":\"r1\"}\ntrailing").unwrap();
        assert_eq!(res.request_id, "r1");
    }

    #[test]
    fn empty_success_body_is_a_decode_error() {
        assert!(matches!(decode_json_body::<BasicResponse>(b"  "), Err(Error::Decode(_))));
    }

    #[tokio::test]
    async fn unreadable_error_body_keeps_status_only() {
        let chunks = vec![
            Ok(bytes::Bytes::from_static(br#"{"message":"#)),
            Err(TransportError::Other("connection reset".to_string())),
        ];
        let res = HttpResponse {
            status: 500,
            headers: Vec::new(),
            body: Body::from_stream(futures::stream::iter(chunks)),
        };
        let err = decode_response::<BasicResponse>(res).await.unwrap_err();
        assert_eq!(err.api(), Some(&ApiError { code: 500, response: None }));
    }

    #[tokio::test]
    async fn error_branch_applies_to_content_calls() {
        let err = decode_response::<MessageContentResponse>(response(404, &[], r#"{"message":"Not found"}"#))
            .await
            .unwrap_err();
        let api = err.api().unwrap();
        assert_eq!(api.code, 404);
        assert_eq!(api.response.as_ref().unwrap().message, "Not found");
    }

    #[tokio::test]
    async fn content_response_hands_over_open_stream() {
        let res = response(
            200,
            &[("Content-Disposition", "attachment; filename=foo.png")],
            "\u{89}PNG-bytes",
        );
        let content: MessageContentResponse = decode_response(res).await.unwrap();
        assert_eq!(content.file_name, "foo.png");
        let bytes = content.content.collect().await.unwrap();
        assert_eq!(&bytes[..], "\u{89}PNG-bytes".as_bytes());
    }

    #[tokio::test]
    async fn content_without_disposition_fails() {
        let err = decode_response::<MessageContentResponse>(response(200, &[], "bytes"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::ContentDisposition(_)));
        assert!(err.api().is_none());
    }

    #[tokio::test]
    async fn content_with_garbled_disposition_fails() {
        let res = response(200, &[("content-disposition", "attachment; filename=\"foo.png")], "bytes");
        let err = decode_response::<MessageContentResponse>(res).await.unwrap_err();
        assert!(matches!(err, Error::ContentDisposition(_)));
    }

    #[test]
    fn content_disposition_forms() {
        assert_eq!(parse_content_disposition("attachment; filename=foo.png").as_deref(), Some("foo.png"));
        assert_eq!(
            parse_content_disposition("attachment; filename=\"my photo.jpg\"").as_deref(),
            Some("my photo.jpg")
        );
        assert_eq!(
            parse_content_disposition("inline;FILENAME=\"a\\\"b.txt\";").as_deref(),
            Some("a\"b.txt")
        );
        assert_eq!(
            parse_content_disposition("attachment; size=42; filename=x.m4a").as_deref(),
            Some("x.m4a")
        );
        assert_eq!(parse_content_disposition("attachment").as_deref(), Some(""));
    }

    #[test]
    fn content_disposition_rejects_malformed_values() {
        assert_eq!(parse_content_disposition(""), None);
        assert_eq!(parse_content_disposition("; filename=foo.png"), None);
        assert_eq!(parse_content_disposition("attachment; filename"), None);
        assert_eq!(parse_content_disposition("attachment; filename="), None);
        assert_eq!(parse_content_disposition("attachment; filename=a; filename=b"), None);
        assert_eq!(parse_content_disposition("attach ment"), None);
    }
}
