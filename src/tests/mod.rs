//! End-to-end tests: the full pipeline against a wiremock completion endpoint.
