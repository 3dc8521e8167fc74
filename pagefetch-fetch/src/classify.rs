//! Status code classification.

use reqwest::StatusCode;

use crate::error::FetchError;

/// Maps a response status to the error a caller sees.
///
/// Returns `None` for 200, the only status that yields a response. Every
/// other status, including other 2xx codes, is an error.
pub fn classify_status(status: StatusCode, url: &str) -> Option<FetchError> {
    let url = url.to_string();
    let err = match status.as_u16() {
        200 => return None,
        400 => FetchError::BadRequest {
            url,
            reason: "server rejected the request".to_string(),
            status: Some(400),
        },
        401 => FetchError::Unauthorized { url },
        403 => FetchError::Forbidden { url },
        404 => FetchError::NotFound { url },
        500 => FetchError::InternalServerError { url },
        504 => FetchError::GatewayTimeout { url },
        other => FetchError::Unknown { url, status: other },
    };
    Some(err)
}

/// Like [`classify_status`], as a `Result`.
pub fn check_status(status: StatusCode, url: &str) -> Result<(), FetchError> {
    match classify_status(status, url) {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    const URL: &str = "http://example.com/page";

    fn kind_for(code: u16) -> Option<ErrorKind> {
        classify_status(StatusCode::from_u16(code).unwrap(), URL).map(|e| e.kind())
    }

    #[test]
    fn test_ok_is_not_an_error() {
        assert!(kind_for(200).is_none());
        assert!(check_status(StatusCode::OK, URL).is_ok());
    }

    #[test]
    fn test_known_statuses() {
        let cases = [
            (400, ErrorKind::BadRequest),
            (401, ErrorKind::Unauthorized),
            (403, ErrorKind::Forbidden),
            (404, ErrorKind::NotFound),
            (500, ErrorKind::InternalServerError),
            (504, ErrorKind::GatewayTimeout),
        ];
        for (code, kind) in cases {
            assert_eq!(kind_for(code), Some(kind), "status {}", code);
        }
    }

    #[test]
    fn test_everything_else_is_unknown() {
        for code in [201, 204, 301, 302, 418, 429, 502, 503] {
            let err = classify_status(StatusCode::from_u16(code).unwrap(), URL).unwrap();
            assert_eq!(err.kind(), ErrorKind::Unknown, "status {}", code);
            assert_eq!(err.status(), Some(code));
        }
    }

    #[test]
    fn test_not_found_carries_url() {
        let err = classify_status(StatusCode::NOT_FOUND, URL).unwrap();
        assert_eq!(err.url(), Some(URL));
    }
}
