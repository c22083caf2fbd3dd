//! HTTP request/response context for log events.
//!
//! The fluent chain reads request and response data through the
//! [`HttpRequest`] and [`HttpResponse`] traits. Every read goes through
//! [`Properties::safe_set`], so a failing accessor produces a diagnostic
//! property instead of an error.

use crate::properties::{keys, to_query, Properties};
use serde_json::Value;
use std::cell::RefCell;
use std::io::{self, Cursor, Read, Seek, SeekFrom};
use std::string::FromUtf8Error;

/// Error raised while reading a field from a request or response.
#[derive(thiserror::Error, Debug)]
pub enum ContextError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),

    #[error("body is not valid UTF-8: {0}")]
    Utf8(#[from] FromUtf8Error),

    #[error("request has no host to build an absolute URL from")]
    MissingHost,

    #[error("invalid header value: {0}")]
    InvalidHeader(String),

    #[error("{0} is not available")]
    Unavailable(String),
}

/// Read-only view of an incoming request.
pub trait HttpRequest {
    /// Absolute URL (scheme, host, path and query).
    fn url(&self) -> Result<String, ContextError>;

    fn method(&self) -> Result<String, ContextError>;
}

/// Readable, seekable response body.
pub trait BodyStream: Read + Seek {}

impl<T: Read + Seek + ?Sized> BodyStream for T {}

/// View of an outgoing response.
pub trait HttpResponse {
    fn status_code(&self) -> Result<u16, ContextError>;

    /// Headers in send order; a name may repeat.
    fn headers(&self) -> Result<Vec<(String, String)>, ContextError>;

    /// The body written so far. Readers must leave its position unchanged.
    fn body(&mut self) -> Result<&mut dyn BodyStream, ContextError>;
}

/// Request-scoped data used when the chain is not given it explicitly.
///
/// The response sits behind a [`RefCell`] because reading its body moves
/// the stream, while one `Ambient` may back several chains.
#[derive(Clone, Copy, Default)]
pub struct Ambient<'a> {
    pub request: Option<&'a dyn HttpRequest>,
    pub response: Option<&'a RefCell<dyn HttpResponse + 'a>>,
    /// Name of the principal the current operation runs as.
    pub identity: Option<&'a str>,
}

impl<'a> Ambient<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_request(mut self, request: &'a dyn HttpRequest) -> Self {
        self.request = Some(request);
        self
    }

    pub fn with_response(mut self, response: &'a RefCell<dyn HttpResponse + 'a>) -> Self {
        self.response = Some(response);
        self
    }

    pub fn with_identity(mut self, identity: &'a str) -> Self {
        self.identity = Some(identity);
        self
    }
}

/// Owned request description, usable as an ambient request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    pub url: String,
    pub method: String,
}

impl RequestContext {
    pub fn new(url: impl Into<String>, method: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method: method.into(),
        }
    }
}

impl HttpRequest for RequestContext {
    fn url(&self) -> Result<String, ContextError> {
        Ok(self.url.clone())
    }

    fn method(&self) -> Result<String, ContextError> {
        Ok(self.method.clone())
    }
}

/// Owned response with an in-memory body. Header names keep their case.
#[derive(Debug, Clone, Default)]
pub struct ResponseContext {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Cursor<Vec<u8>>,
}

impl ResponseContext {
    pub fn new(status: u16) -> Self {
        Self {
            status,
            ..Self::default()
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = Cursor::new(body.into());
        self
    }
}

impl HttpResponse for ResponseContext {
    fn status_code(&self) -> Result<u16, ContextError> {
        Ok(self.status)
    }

    fn headers(&self) -> Result<Vec<(String, String)>, ContextError> {
        Ok(self.headers.clone())
    }

    fn body(&mut self) -> Result<&mut dyn BodyStream, ContextError> {
        Ok(&mut self.body)
    }
}

#[cfg(feature = "http")]
impl<B> HttpRequest for http::Request<B> {
    /// Uses the URI when it is absolute, otherwise rebuilds it from the
    /// `Host` header the way a server sees it.
    fn url(&self) -> Result<String, ContextError> {
        let uri = self.uri();
        if uri.scheme().is_some() && uri.authority().is_some() {
            return Ok(uri.to_string());
        }

        let host = self
            .headers()
            .get(http::header::HOST)
            .ok_or(ContextError::MissingHost)?
            .to_str()
            .map_err(|e| ContextError::InvalidHeader(e.to_string()))?;
        let scheme = uri.scheme_str().unwrap_or("http");
        let path = uri.path_and_query().map(|p| p.as_str()).unwrap_or("/");
        Ok(format!("{}://{}{}", scheme, host, path))
    }

    fn method(&self) -> Result<String, ContextError> {
        Ok(http::Request::method(self).as_str().to_string())
    }
}

/// Header names come out lowercase, as `http` normalizes them.
#[cfg(feature = "http")]
impl<B: Read + Seek> HttpResponse for http::Response<B> {
    fn status_code(&self) -> Result<u16, ContextError> {
        Ok(self.status().as_u16())
    }

    fn headers(&self) -> Result<Vec<(String, String)>, ContextError> {
        http::Response::headers(self)
            .iter()
            .map(|(name, value)| {
                let value = value
                    .to_str()
                    .map_err(|e| ContextError::InvalidHeader(format!("{}: {}", name, e)))?;
                Ok((name.as_str().to_string(), value.to_string()))
            })
            .collect()
    }

    fn body(&mut self) -> Result<&mut dyn BodyStream, ContextError> {
        Ok(self.body_mut())
    }
}

pub(crate) fn extract_request(request: &dyn HttpRequest, properties: &mut Properties) {
    properties.safe_set(keys::URL, || request.url().map(Value::String));
    properties.safe_set(keys::REQUEST_METHOD, || request.method().map(Value::String));
}

pub(crate) fn extract_response(response: &mut dyn HttpResponse, properties: &mut Properties) {
    properties.safe_set(keys::STATUS_CODE, || response.status_code().map(Value::from));
    properties.safe_set(keys::RESPONSE_HEADERS, || {
        response
            .headers()
            .map(|headers| Value::String(headers_to_query(&headers)))
    });
    properties.safe_set(keys::RESPONSE_BODY, || read_body(response).map(Value::String));
}

/// Like [`extract_response`] for a shared response. A response that is
/// already borrowed elsewhere yields diagnostics for all three keys.
pub(crate) fn extract_shared_response(
    response: &RefCell<dyn HttpResponse + '_>,
    properties: &mut Properties,
) {
    match response.try_borrow_mut() {
        Ok(mut response) => extract_response(&mut *response, properties),
        Err(e) => {
            for key in [keys::STATUS_CODE, keys::RESPONSE_HEADERS, keys::RESPONSE_BODY] {
                properties.safe_set(key, || Err::<Value, _>(&e));
            }
        }
    }
}

/// Serialize headers as a query string. Repeated names (compared
/// case-insensitively) collapse into one comma-separated entry.
pub fn headers_to_query(headers: &[(String, String)]) -> String {
    let mut merged: Vec<(&str, String)> = Vec::new();
    for (name, value) in headers {
        match merged
            .iter_mut()
            .find(|(seen, _)| seen.eq_ignore_ascii_case(name))
        {
            Some((_, values)) => {
                values.push(',');
                values.push_str(value);
            }
            None => merged.push((name.as_str(), value.clone())),
        }
    }
    to_query(merged)
}

fn read_body(response: &mut dyn HttpResponse) -> Result<String, ContextError> {
    let guard = RewindGuard::new(response.body()?)?;
    guard.stream.seek(SeekFrom::Start(0))?;
    let mut buf = Vec::new();
    guard.stream.read_to_end(&mut buf)?;
    Ok(String::from_utf8(buf)?)
}

/// Puts a stream back where it was when the guard is dropped.
struct RewindGuard<'s> {
    stream: &'s mut dyn BodyStream,
    position: u64,
}

impl<'s> RewindGuard<'s> {
    fn new(stream: &'s mut dyn BodyStream) -> io::Result<Self> {
        let position = stream.stream_position()?;
        Ok(Self { stream, position })
    }
}

impl Drop for RewindGuard<'_> {
    fn drop(&mut self) {
        if let Err(e) = self.stream.seek(SeekFrom::Start(self.position)) {
            tracing::debug!(error = %e, "failed to restore response body position");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FailingResponse;

    impl HttpResponse for FailingResponse {
        fn status_code(&self) -> Result<u16, ContextError> {
            Ok(500)
        }

        fn headers(&self) -> Result<Vec<(String, String)>, ContextError> {
            Err(ContextError::Unavailable("headers".to_string()))
        }

        fn body(&mut self) -> Result<&mut dyn BodyStream, ContextError> {
            Err(ContextError::Unavailable("body".to_string()))
        }
    }

    #[test]
    fn repeated_headers_are_merged() {
        let headers = vec![
            ("Set-Cookie".to_string(), "a=1".to_string()),
            ("X-Id".to_string(), "7".to_string()),
            ("set-cookie".to_string(), "b=2".to_string()),
        ];
        assert_eq!(
            headers_to_query(&headers),
            "Set-Cookie=a%3D1%2Cb%3D2&X-Id=7"
        );
    }

    #[test]
    fn empty_headers_give_empty_query() {
        assert_eq!(headers_to_query(&[]), "");
    }

    #[test]
    fn body_read_restores_position() {
        let mut response = ResponseContext::new(200).with_body("hello world");
        response.body.set_position(5);

        let mut props = Properties::new();
        extract_response(&mut response, &mut props);

        assert_eq!(props.get_str(keys::RESPONSE_BODY), Some("hello world"));
        assert_eq!(response.body.position(), 5);

        let mut rest = String::new();
        response.body.read_to_string(&mut rest).unwrap();
        assert_eq!(rest, " world");
    }

    #[test]
    fn invalid_utf8_body_does_not_hide_other_fields() {
        let mut response = ResponseContext::new(502).with_body(vec![0xffu8, 0xfe]);
        let mut props = Properties::new();
        extract_response(&mut response, &mut props);

        assert_eq!(props.get(keys::STATUS_CODE), Some(&Value::from(502)));
        let body = props.get_str(keys::RESPONSE_BODY).unwrap();
        assert!(body.starts_with("Failed setting ResponseBody key in logger because"));
        assert_eq!(response.body.position(), 0);
    }

    #[test]
    fn each_field_fails_independently() {
        let mut props = Properties::new();
        extract_response(&mut FailingResponse, &mut props);

        assert_eq!(props.get(keys::STATUS_CODE), Some(&Value::from(500)));
        assert_eq!(
            props.get_str(keys::RESPONSE_HEADERS),
            Some("Failed setting ResponseHeaders key in logger because headers is not available")
        );
        assert_eq!(
            props.get_str(keys::RESPONSE_BODY),
            Some("Failed setting ResponseBody key in logger because body is not available")
        );
    }

    #[test]
    fn shared_response_is_read_through_the_cell() {
        let response = RefCell::new(ResponseContext::new(204).with_header("X-Id", "7"));
        let mut props = Properties::new();
        extract_shared_response(&response, &mut props);

        assert_eq!(props.get(keys::STATUS_CODE), Some(&Value::from(204)));
        assert_eq!(props.get_str(keys::RESPONSE_HEADERS), Some("X-Id=7"));
        assert_eq!(props.get_str(keys::RESPONSE_BODY), Some(""));
    }

    #[test]
    fn borrowed_shared_response_is_reported() {
        let response = RefCell::new(ResponseContext::new(204));
        let _held = response.borrow_mut();
        let mut props = Properties::new();
        extract_shared_response(&response, &mut props);

        let status = props.get_str(keys::STATUS_CODE).unwrap();
        assert!(status.starts_with("Failed setting StatusCode key in logger because"));
        assert_eq!(props.len(), 3);
    }

    #[cfg(feature = "http")]
    mod http_types {
        use super::*;

        #[test]
        fn absolute_uri_is_used_verbatim() {
            let request = http::Request::builder()
                .method("POST")
                .uri("https://api.example.com/orders?id=3")
                .body(())
                .unwrap();
            assert_eq!(
                HttpRequest::url(&request).unwrap(),
                "https://api.example.com/orders?id=3"
            );
            assert_eq!(HttpRequest::method(&request).unwrap(), "POST");
        }

        #[test]
        fn relative_uri_uses_host_header() {
            let request = http::Request::builder()
                .uri("/orders/3")
                .header("Host", "shop.example.com")
                .body(())
                .unwrap();
            assert_eq!(
                HttpRequest::url(&request).unwrap(),
                "http://shop.example.com/orders/3"
            );
        }

        #[test]
        fn relative_uri_without_host_is_reported() {
            let request = http::Request::builder().uri("/orders").body(()).unwrap();
            let mut props = Properties::new();
            extract_request(&request, &mut props);
            assert_eq!(
                props.get_str(keys::URL),
                Some("Failed setting Url key in logger because request has no host to build an absolute URL from")
            );
            assert_eq!(props.get_str(keys::REQUEST_METHOD), Some("GET"));
        }

        #[test]
        fn response_headers_are_lowercased() {
            let mut response = http::Response::builder()
                .status(404)
                .header("X-Test", "value")
                .body(Cursor::new(b"missing".to_vec()))
                .unwrap();
            let mut props = Properties::new();
            extract_response(&mut response, &mut props);

            assert_eq!(props.get(keys::STATUS_CODE), Some(&Value::from(404)));
            assert_eq!(props.get_str(keys::RESPONSE_HEADERS), Some("x-test=value"));
            assert_eq!(props.get_str(keys::RESPONSE_BODY), Some("missing"));
        }
    }
}
