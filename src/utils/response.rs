use serde_json::{json, Value};

pub const SUCCESS: &str = "SUCCESS";

/// Success envelope: `{code, message, ...data}`. Extra fields from `data`
/// are merged into the top-level object so chart payloads stay flat.
pub fn success_object(message: &str, data: Value) -> Value {
    let mut body = json!({
        "code": SUCCESS,
        "message": message,
    });
    if let (Some(object), Some(extra)) = (body.as_object_mut(), data.as_object()) {
        for (key, value) in extra {
            object.insert(key.clone(), value.clone());
        }
    }
    body
}

/// Error envelope: `{code, message, errors}`.
pub fn error_object(code: &str, message: &str, errors: Value) -> Value {
    json!({
        "code": code,
        "message": message,
        "errors": errors,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_object_merges_data() {
        let body = success_object("Login success", json!({ "token": "abc" }));
        assert_eq!(body["code"], SUCCESS);
        assert_eq!(body["message"], "Login success");
        assert_eq!(body["token"], "abc");
    }

    #[test]
    fn test_success_object_without_data() {
        let body = success_object("ok", json!({}));
        assert_eq!(body.as_object().unwrap().len(), 2);
    }

    #[test]
    fn test_error_object_shape() {
        let body = error_object("NO_PERMISSION", "No permission", json!([]));
        assert_eq!(body["code"], "NO_PERMISSION");
        assert!(body["errors"].as_array().unwrap().is_empty());
    }
}
