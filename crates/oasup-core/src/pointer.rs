//! JSON pointer helpers (RFC 6901)

/// Escape a single reference token
pub fn escape(segment: &str) -> String {
    segment.replace('~', "~0").replace('/', "~1")
}

/// Unescape a single reference token
pub fn unescape(segment: &str) -> String {
    segment.replace("~1", "/").replace("~0", "~")
}

/// Append an unescaped segment to a pointer
pub fn join(base: &str, segment: &str) -> String {
    format!("{}/{}", base, escape(segment))
}

/// Split a pointer into unescaped segments
pub fn segments(pointer: &str) -> Vec<String> {
    if pointer.is_empty() {
        return Vec::new();
    }
    pointer
        .strip_prefix('/')
        .unwrap_or(pointer)
        .split('/')
        .map(unescape)
        .collect()
}

/// Extract the local pointer of an internal `$ref` (`#/a/b` -> `/a/b`)
pub fn local_ref(reference: &str) -> Option<&str> {
    reference.strip_prefix('#')
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_escape_path_keys() {
        assert_eq!(join("/paths", "/pets/{id}"), "/paths/~1pets~1{id}");
        assert_eq!(escape("a~b"), "a~0b");
    }

    #[test]
    fn test_segments() {
        assert_eq!(segments(""), Vec::<String>::new());
        assert_eq!(segments("/paths/~1pets/get"), vec!["paths", "/pets", "get"]);
        assert_eq!(segments("//a"), vec!["", "a"]);
        assert_eq!(segments("/"), vec![""]);
    }

    #[test]
    fn test_local_ref() {
        assert_eq!(local_ref("#/definitions/Pet"), Some("/definitions/Pet"));
        assert_eq!(local_ref("other.yaml#/Pet"), None);
    }

    proptest! {
        #[test]
        fn prop_escape_roundtrips(segment in "[a-z~/{}]{0,12}") {
            prop_assert_eq!(unescape(&escape(&segment)), segment.clone());
            let pointer = join("", &segment);
            prop_assert_eq!(segments(&pointer), vec![segment]);
        }
    }
}
