//! High-level service facade turning request bodies into monthly commute responses.

use std::sync::Arc;

use tracing::{info, warn};

use crate::aggregator::{CommuteError, CommuteOptions, MonthlyCommutes};
use crate::api::{CommuteRequest, CommuteResponse};
use crate::model::Route;
use crate::ports::DurationPort;

#[derive(thiserror::Error, Debug)]
/// Errors reported to callers of the request/response boundary.
pub enum ApiError {
    /// The request body could not be parsed.
    #[error("Malformed request: {0}")]
    MalformedRequest(#[source] serde_json::Error),
    /// At least one route could not be resolved.
    #[error("Request failed: {0}")]
    RequestFailed(#[from] CommuteError),
    /// The response could not be encoded.
    #[error("Failed to serialize response: {0}")]
    Serialization(#[source] serde_json::Error),
}

/// Public entry point computing monthly commutes with a configured duration backend.
pub struct TransitCalcService {
    port: Arc<dyn DurationPort>,
    options: CommuteOptions,
}

impl TransitCalcService {
    /// Create a new service bound to the provided backend.
    #[must_use]
    pub fn new(port: Arc<dyn DurationPort>, options: CommuteOptions) -> Self {
        Self { port, options }
    }

    /// Options applied to every request.
    #[must_use]
    pub fn options(&self) -> &CommuteOptions {
        &self.options
    }

    /// Resolve and aggregate the given routes.
    ///
    /// # Errors
    ///
    /// Returns a [`CommuteError`] if any route cannot be resolved.
    pub async fn monthly_commutes(
        &self,
        routes: Vec<Route>,
    ) -> Result<MonthlyCommutes, CommuteError> {
        MonthlyCommutes::resolve(routes, self.port.as_ref(), &self.options).await
    }

    /// Answer a decoded request.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::RequestFailed`] if any destination cannot be resolved.
    pub async fn handle(&self, request: &CommuteRequest) -> Result<CommuteResponse, ApiError> {
        let commutes = self.monthly_commutes(request.routes()).await?;
        Ok(CommuteResponse::from(&commutes))
    }

    /// Answer a raw JSON request body with a JSON response body.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::MalformedRequest`] for unparseable bodies,
    /// [`ApiError::RequestFailed`] for unresolvable routes, and
    /// [`ApiError::Serialization`] if the response cannot be encoded.
    pub async fn handle_body(&self, body: &str) -> Result<String, ApiError> {
        let request: CommuteRequest = serde_json::from_str(body).map_err(|err| {
            warn!(error = %err, "failed to parse request body");
            ApiError::MalformedRequest(err)
        })?;
        info!(
            home = %request.home,
            destinations = request.destinations.len(),
            "commute request received"
        );

        let response = self.handle(&request).await?;
        serde_json::to_string(&response).map_err(ApiError::Serialization)
    }
}
