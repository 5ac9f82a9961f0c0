use std::collections::BTreeMap;

use crate::error::RelayError;

/// Parameters resolved under one path, keyed by their path-relative name.
pub type ParameterMap = BTreeMap<String, String>;

pub const INPUT_BUCKET_PARAM: &str = "input-bucket-name";
pub const QUEUE_URL_PARAM: &str = "queue-url";
pub const OUTPUT_BUCKET_PARAM: &str = "output-bucket-name";
pub const QUEUE_ARN_PARAM: &str = "queue-arn";

pub const PRODUCER_REQUIRED_PARAMS: &[&str] = &[INPUT_BUCKET_PARAM, QUEUE_URL_PARAM];
pub const CONSUMER_REQUIRED_PARAMS: &[&str] = &[OUTPUT_BUCKET_PARAM];

/// Strips `path` from a fully qualified parameter name.
///
/// Returns `None` for names outside `path` and for the path itself.
pub fn relative_parameter_name(path: &str, name: &str) -> Option<String> {
    let relative = name.strip_prefix(path)?.trim_start_matches('/');
    if relative.is_empty() {
        return None;
    }
    Some(relative.to_string())
}

pub fn require_parameters(params: &ParameterMap, required: &[&str]) -> Result<(), RelayError> {
    match required.iter().find(|name| !params.contains_key(**name)) {
        Some(missing) => Err(RelayError::MissingRequiredParameter(missing.to_string())),
        None => Ok(()),
    }
}

pub fn required_parameter<'a>(params: &'a ParameterMap, name: &str) -> Result<&'a str, RelayError> {
    params
        .get(name)
        .map(String::as_str)
        .ok_or_else(|| RelayError::MissingRequiredParameter(name.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_names_drop_path_and_separator() {
        assert_eq!(
            relative_parameter_name("/path/to/parameter", "/path/to/parameter/my-test-parameter"),
            Some("my-test-parameter".to_string())
        );
        assert_eq!(
            relative_parameter_name("/app/", "/app/nested/queue-url"),
            Some("nested/queue-url".to_string())
        );
        assert_eq!(relative_parameter_name("/app", "/other/queue-url"), None);
        assert_eq!(relative_parameter_name("/app", "/app"), None);
    }

    #[test]
    fn require_reports_first_missing_name() {
        let params = ParameterMap::from([("input-bucket-name".to_string(), "b".to_string())]);
        assert_eq!(require_parameters(&params, &["input-bucket-name"]), Ok(()));
        assert_eq!(
            require_parameters(&params, PRODUCER_REQUIRED_PARAMS),
            Err(RelayError::MissingRequiredParameter("queue-url".to_string()))
        );

        let unrelated = ParameterMap::from([("blah".to_string(), "blah, blah, blah".to_string())]);
        assert!(require_parameters(&unrelated, &["my-test-parameter"]).is_err());
    }

    #[test]
    fn required_parameter_returns_value() {
        let params = ParameterMap::from([("queue-url".to_string(), "https://q".to_string())]);
        assert_eq!(required_parameter(&params, "queue-url"), Ok("https://q"));
        assert!(required_parameter(&params, "input-bucket-name").is_err());
    }
}
