use axum::http::HeaderName;
use headers::{Header, HeaderValue};

pub static X_API_KEY: HeaderName = HeaderName::from_static("x-api-key");

/// `X-API-Key: <key>`. Surrounding whitespace is dropped; an empty value does
/// not decode.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct ApiKey(pub String);

impl Header for ApiKey {
    fn name() -> &'static HeaderName {
        &X_API_KEY
    }

    fn decode<'i, I>(values: &mut I) -> Result<Self, headers::Error>
    where
        I: Iterator<Item = &'i HeaderValue>,
    {
        let value = values.next().ok_or_else(headers::Error::invalid)?;
        let key = value
            .to_str()
            .map_err(|_| headers::Error::invalid())?
            .trim();

        if key.is_empty() {
            return Err(headers::Error::invalid());
        }

        Ok(ApiKey(key.to_string()))
    }

    fn encode<E>(&self, values: &mut E)
    where
        E: Extend<HeaderValue>,
    {
        if let Ok(value) = HeaderValue::from_str(&self.0) {
            values.extend(std::iter::once(value));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_key_header_decode() {
        let header_value = HeaderValue::from_static("secret-123");
        let mut values = std::iter::once(&header_value);

        let key = ApiKey::decode(&mut values).unwrap();
        assert_eq!(key, ApiKey("secret-123".into()));
    }

    #[test]
    fn test_api_key_header_trims_whitespace() {
        let header_value = HeaderValue::from_static("  secret-123 ");
        let mut values = std::iter::once(&header_value);

        let key = ApiKey::decode(&mut values).unwrap();
        assert_eq!(key.0, "secret-123");
    }

    #[test]
    fn test_api_key_header_empty() {
        let header_value = HeaderValue::from_static("   ");
        let mut values = std::iter::once(&header_value);

        assert!(ApiKey::decode(&mut values).is_err());
    }

    #[test]
    fn test_api_key_header_missing() {
        let mut values = std::iter::empty::<&HeaderValue>();

        assert!(ApiKey::decode(&mut values).is_err());
    }

    #[test]
    fn test_api_key_header_name() {
        assert_eq!(ApiKey::name().as_str(), "x-api-key");
    }

    #[test]
    fn test_api_key_header_encode() {
        let key = ApiKey("secret-123".into());
        let mut values = Vec::new();
        key.encode(&mut values);

        assert_eq!(values.len(), 1);
        assert_eq!(values[0].to_str().unwrap(), "secret-123");
    }
}
