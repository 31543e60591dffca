use crate::error::{AppError, FieldError};
use axum::{extract::FromRequestParts, http::request::Parts};

const REPEATED_MESSAGE: &str = "Expected string, received array";
const INVALID_UTF8_MESSAGE: &str = "Must be valid UTF-8 text";

#[derive(Debug, Clone, PartialEq, Eq)]
enum RawValue {
    Text(String),
    InvalidUtf8,
}

/// Decoded query string that keeps every occurrence of every key
///
/// Values are percent-decoded strictly, so bytes that are not UTF-8 stay
/// visible to validation instead of turning into replacement characters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(String, RawValue)>,
}

fn decode_component(component: &str) -> Option<String> {
    let spaced = component.replace('+', " ");
    urlencoding::decode(&spaced).ok().map(|s| s.into_owned())
}

impl QueryParams {
    pub fn parse(query: Option<&str>) -> Self {
        let pairs = query
            .unwrap_or_default()
            .split('&')
            .filter(|pair| !pair.is_empty())
            .filter_map(|pair| {
                let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
                // Keys that do not decode cannot name a known parameter.
                let key = decode_component(key)?;
                let value = decode_component(value).map_or(RawValue::InvalidUtf8, RawValue::Text);
                Some((key, value))
            })
            .collect();

        Self { pairs }
    }

    /// The one value given for `field`, if any
    ///
    /// A repeated key or a value that is not UTF-8 is a field error.
    pub fn single(&self, field: &str) -> Result<Option<String>, FieldError> {
        let mut values = self.pairs.iter().filter(|(key, _)| key == field).map(|(_, v)| v);

        match (values.next(), values.next()) {
            (None, _) => Ok(None),
            (Some(_), Some(_)) => Err(FieldError::new(field, REPEATED_MESSAGE)),
            (Some(RawValue::InvalidUtf8), None) => Err(FieldError::new(field, INVALID_UTF8_MESSAGE)),
            (Some(RawValue::Text(value)), None) => Ok(Some(value.clone())),
        }
    }
}

/// Query parameters validated from the decoded query string
///
/// Every offending field is reported, not just the first.
pub trait ValidateQuery: Sized {
    fn validate(params: &QueryParams) -> Result<Self, Vec<FieldError>>;
}

/// Extractor that rejects with a field-level validation error before the
/// handler runs
#[derive(Debug, Clone)]
pub struct ValidatedQuery<T>(pub T);

impl<S, T> FromRequestParts<S> for ValidatedQuery<T>
where
    S: Send + Sync,
    T: ValidateQuery + Send,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let params = QueryParams::parse(parts.uri.query());
        T::validate(&params).map(ValidatedQuery).map_err(AppError::Validation)
    }
}
