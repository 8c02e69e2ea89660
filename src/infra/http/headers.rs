use reqwest::RequestBuilder;

/// Generate a simple request id suitable for logging/correlation.
pub fn generate_request_id() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    format!("pplx-{}-{}", now.as_secs(), now.subsec_nanos())
}

/// Add standard headers to an outgoing request. Returns the updated builder and the request id used.
pub fn add_standard_headers(
    builder: RequestBuilder,
    request_id: Option<String>,
) -> (RequestBuilder, String) {
    let rid = request_id.unwrap_or_else(generate_request_id);
    let b = builder.header("x-request-id", rid.as_str()).header(
        reqwest::header::USER_AGENT,
        format!("perplexity-mcp/{}", env!("CARGO_PKG_VERSION")),
    );
    (b, rid)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_ids_are_prefixed() {
        assert!(generate_request_id().starts_with("pplx-"));
    }

    #[test]
    fn keeps_caller_supplied_request_id() {
        let client = reqwest::Client::new();
        let (builder, rid) = add_standard_headers(client.get("http://localhost/"), Some("abc".into()));
        assert_eq!(rid, "abc");
        let req = builder.build().unwrap();
        assert_eq!(req.headers()["x-request-id"], "abc");
        assert!(req.headers()[reqwest::header::USER_AGENT]
            .to_str()
            .unwrap()
            .starts_with("perplexity-mcp/"));
    }
}
