//! Integration tests for the request model.

use pagefetch_core::{CoreError, FetchRequest, FetcherType, HttpMethod};

#[test]
fn test_login_request_shape() {
    let req = FetchRequest::new("http://example.com/login")
        .with_form_data("user=a&pass=b")
        .with_fetcher_type(FetcherType::Direct);

    assert!(req.has_form_data());
    assert_eq!(req.effective_method(), HttpMethod::Post);
    assert_eq!(req.form_data.encode(), "user=a&pass=b");
}

#[test]
fn test_host_of_invalid_url() {
    let req = FetchRequest::new("not a url");
    assert!(matches!(req.host(), Err(CoreError::InvalidUrl { .. })));
}
