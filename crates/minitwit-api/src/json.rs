use serde::de::DeserializeOwned;
use tracing::debug;

/// Decode a request body, falling back to an all-default value when the body
/// is empty or not valid JSON. Handlers then reject the empty fields through
/// their normal validation.
pub(crate) fn lenient<T: DeserializeOwned + Default>(body: &[u8]) -> T {
    if body.is_empty() {
        return T::default();
    }
    serde_json::from_slice(body).unwrap_or_else(|e| {
        debug!("Ignoring malformed JSON body: {}", e);
        T::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use minitwit_types::api::RegisterRequest;

    #[test]
    fn malformed_body_decodes_as_default() {
        let req: RegisterRequest = lenient(b"{not json");
        assert!(req.username.is_empty());
        assert!(req.pwd.is_empty());
    }

    #[test]
    fn password_alias_is_accepted() {
        let req: RegisterRequest =
            lenient(br#"{"username":"a","email":"a@b","password":"secret"}"#);
        assert_eq!(req.pwd, "secret");
    }
}
