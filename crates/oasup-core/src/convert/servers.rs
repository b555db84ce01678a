//! Server list derived from `host`, `basePath` and `schemes`

use serde_json::{json, Value};

/// Build the `servers` array, or `None` when the source names no location
pub fn servers(host: Option<&str>, base_path: Option<&str>, schemes: &[String]) -> Option<Value> {
    let base_path = base_path.unwrap_or("").trim_end_matches('/');

    let urls: Vec<String> = match host {
        Some(host) if schemes.is_empty() => vec![format!("//{}{}", host, base_path)],
        Some(host) => schemes
            .iter()
            .map(|scheme| format!("{}://{}{}", scheme, host, base_path))
            .collect(),
        None if base_path.is_empty() => return None,
        None => vec![base_path.to_string()],
    };

    Some(Value::Array(urls.into_iter().map(|url| json!({"url": url})).collect()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schemes(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_one_server_per_scheme() {
        let both = schemes(&["http", "https"]);
        let servers = servers(Some("petstore.swagger.io"), Some("/v1"), &both).unwrap();
        assert_eq!(
            servers,
            json!([
                {"url": "http://petstore.swagger.io/v1"},
                {"url": "https://petstore.swagger.io/v1"}
            ])
        );
    }

    #[test]
    fn test_scheme_relative_without_schemes() {
        let servers = servers(Some("api.example.com"), Some("/"), &[]).unwrap();
        assert_eq!(servers, json!([{"url": "//api.example.com"}]));
    }

    #[test]
    fn test_base_path_only() {
        assert_eq!(servers(None, Some("/api/"), &[]).unwrap(), json!([{"url": "/api"}]));
        assert_eq!(servers(None, Some("/"), &[]), None);
        assert_eq!(servers(None, None, &[]), None);
    }
}
