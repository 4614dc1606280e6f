//! Base URL handling for the chat endpoint.

/// Strip trailing slashes so endpoint paths can be appended safely.
///
/// ```
/// use chatdesk::utils::url::normalize_base_url;
///
/// assert_eq!(normalize_base_url("http://localhost:8000/"), "http://localhost:8000");
/// assert_eq!(normalize_base_url("http://localhost:8000///"), "http://localhost:8000");
/// ```
pub fn normalize_base_url(base_url: &str) -> String {
    base_url.trim().trim_end_matches('/').to_string()
}

/// Join a base URL and an endpoint path with exactly one slash.
///
/// ```
/// use chatdesk::utils::url::construct_api_url;
///
/// assert_eq!(
///     construct_api_url("https://chat.example.com/", "/api/chat"),
///     "https://chat.example.com/api/chat"
/// );
/// ```
pub fn construct_api_url(base_url: &str, endpoint: &str) -> String {
    let normalized_base = normalize_base_url(base_url);
    let endpoint = endpoint.trim_start_matches('/');
    format!("{}/{}", normalized_base, endpoint)
}
