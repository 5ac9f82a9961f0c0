use aws_sdk_ssm::error::{DisplayErrorContext, ProvideErrorMetadata};
use relay_core::gateway::{classify_service_error, GatewayTarget};
use relay_core::parameters::{relative_parameter_name, ParameterMap};
use relay_core::RelayError;
use tracing::debug;

use super::block_on;

pub const PARAMETER_PAGE_SIZE: i32 = 10;

/// One page of a by-path parameter listing, names still fully qualified.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParameterPage {
    pub parameters: Vec<(String, String)>,
    pub next_token: Option<String>,
}

pub trait ParameterStore {
    fn get_parameter(&self, path: &str) -> Result<String, RelayError>;

    fn get_parameters_by_path(
        &self,
        path: &str,
        next_token: Option<&str>,
    ) -> Result<ParameterPage, RelayError>;
}

/// Reads the single parameter stored at `path`.
pub fn resolve(store: &impl ParameterStore, path: &str) -> Result<String, RelayError> {
    store.get_parameter(path)
}

/// Reads every parameter under `path`, following continuation tokens, and
/// keys the result by path-relative name.
pub fn resolve_prefix(store: &impl ParameterStore, path: &str) -> Result<ParameterMap, RelayError> {
    let mut parameters = ParameterMap::new();
    let mut next_token: Option<String> = None;
    let mut pages = 0usize;

    loop {
        let page = store.get_parameters_by_path(path, next_token.as_deref())?;
        pages += 1;

        for (name, value) in page.parameters {
            if let Some(relative_name) = relative_parameter_name(path, &name) {
                parameters.insert(relative_name, value);
            }
        }

        match page.next_token {
            Some(token) if !token.is_empty() => next_token = Some(token),
            _ => break,
        }
    }

    debug!(
        param_path = path,
        pages,
        resolved = parameters.len(),
        "resolved parameters by path"
    );

    if parameters.is_empty() {
        return Err(RelayError::NotFound {
            path: path.to_string(),
        });
    }
    Ok(parameters)
}

#[derive(Clone)]
pub struct SsmParameterStore {
    ssm_client: aws_sdk_ssm::Client,
}

impl SsmParameterStore {
    pub fn new(aws_config: &aws_config::SdkConfig) -> Self {
        Self {
            ssm_client: aws_sdk_ssm::Client::new(aws_config),
        }
    }
}

impl ParameterStore for SsmParameterStore {
    fn get_parameter(&self, path: &str) -> Result<String, RelayError> {
        let client = self.ssm_client.clone();

        block_on(async move {
            let output = client
                .get_parameter()
                .name(path)
                .with_decryption(true)
                .send()
                .await
                .map_err(|error| {
                    classify_service_error(
                        GatewayTarget::Parameter { path },
                        error.code(),
                        &DisplayErrorContext(&error).to_string(),
                    )
                })?;

            output
                .parameter()
                .and_then(|parameter| parameter.value())
                .map(str::to_string)
                .ok_or_else(|| RelayError::NotFound {
                    path: path.to_string(),
                })
        })
    }

    fn get_parameters_by_path(
        &self,
        path: &str,
        next_token: Option<&str>,
    ) -> Result<ParameterPage, RelayError> {
        let client = self.ssm_client.clone();
        let next_token = next_token.map(str::to_string);

        block_on(async move {
            let output = client
                .get_parameters_by_path()
                .path(path)
                .recursive(true)
                .with_decryption(true)
                .max_results(PARAMETER_PAGE_SIZE)
                .set_next_token(next_token)
                .send()
                .await
                .map_err(|error| {
                    classify_service_error(
                        GatewayTarget::Parameter { path },
                        error.code(),
                        &DisplayErrorContext(&error).to_string(),
                    )
                })?;

            let parameters = output
                .parameters()
                .iter()
                .filter_map(|parameter| {
                    Some((
                        parameter.name()?.to_string(),
                        parameter.value()?.to_string(),
                    ))
                })
                .collect();

            Ok(ParameterPage {
                parameters,
                next_token: output.next_token().map(str::to_string),
            })
        })
    }
}
