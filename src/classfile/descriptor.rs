//! Utilities to take method descriptors apart

/// Parse the argument types of a method descriptor such as
/// `(ILjava/lang/String;[J)V` into individual type descriptors.
/// Returns `None` when the descriptor is not well formed.
pub fn argument_types(desc: &str) -> Option<Vec<String>> {
    let inner = desc.strip_prefix('(')?;
    let end = inner.find(')')?;
    let (params, _) = inner.split_at(end);

    let mut types = Vec::new();
    let mut rest = params;
    while !rest.is_empty() {
        let (ty, remaining) = split_first_type(rest)?;
        types.push(ty.to_string());
        rest = remaining;
    }
    Some(types)
}

/// Return type descriptor of a method descriptor, e.g. `V` or
/// `Lorg/apache/felix/ipojo/ComponentInstance;`.
pub fn return_type(desc: &str) -> Option<&str> {
    let end = desc.find(')')?;
    let ret = &desc[end + 1..];
    // The tail must itself be a single well-formed type.
    match split_first_type(ret) {
        Some((ty, "")) if !ty.is_empty() => Some(ty),
        _ => None,
    }
}

/// True when the descriptor declares a `void` return.
pub fn returns_void(desc: &str) -> bool {
    return_type(desc) == Some("V")
}

/// Split one field type descriptor off the front of `s`.
fn split_first_type(s: &str) -> Option<(&str, &str)> {
    let bytes = s.as_bytes();
    let mut pos = 0;
    while pos < bytes.len() && bytes[pos] == b'[' {
        pos += 1;
    }
    match bytes.get(pos)? {
        b'B' | b'C' | b'D' | b'F' | b'I' | b'J' | b'S' | b'Z' | b'V' => {
            Some(s.split_at(pos + 1))
        }
        b'L' => {
            let semi = s[pos..].find(';')? + pos;
            Some(s.split_at(semi + 1))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_primitive_and_object_arguments() {
        let args = argument_types("(ILjava/lang/String;[J)V").expect("Failed to parse");
        assert_eq!(args, vec!["I", "Ljava/lang/String;", "[J"]);
    }

    #[test]
    fn empty_argument_list() {
        let args = argument_types("()Ljava/lang/Object;").expect("Failed to parse");
        assert!(args.is_empty());
    }

    #[test]
    fn nested_array_of_objects() {
        let args = argument_types("([[Ljava/util/Map;Z)V").expect("Failed to parse");
        assert_eq!(args, vec!["[[Ljava/util/Map;", "Z"]);
    }

    #[test]
    fn return_types() {
        assert_eq!(return_type("()V"), Some("V"));
        assert_eq!(return_type("(I)[B"), Some("[B"));
        assert_eq!(
            return_type("()Lorg/apache/felix/ipojo/ComponentInstance;"),
            Some("Lorg/apache/felix/ipojo/ComponentInstance;")
        );
        assert!(returns_void("(I)V"));
        assert!(!returns_void("()I"));
    }

    #[test]
    fn malformed_descriptors_are_rejected() {
        assert!(argument_types("missing paren").is_none());
        assert!(argument_types("(Q)V").is_none());
        assert!(argument_types("(Ljava/lang/String)V").is_none());
        assert!(return_type("(I)").is_none());
        assert!(return_type("(I)VV").is_none());
    }
}
