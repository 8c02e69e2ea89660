/// Build the process-wide outbound client. Timeouts stay at reqwest defaults
/// and nothing is retried; a failed call is reported once to the caller.
pub fn make_http_client() -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder().build()
}

#[cfg(test)]
mod tests {
    #[test]
    fn builds_default_client() {
        assert!(super::make_http_client().is_ok());
    }
}
