use actix_web::{http::StatusCode, web, HttpResponse};
use serde::Serialize;

use crate::analysis::{
    Estimator, EstimateParameters, HarvestEstimate, HistogramBin, ProjectedFruit, RangeBasis,
    ResultStatistics,
};
use crate::error::HarvestError;
use crate::models::ProjectionParams;
use crate::store::{MeasurementStore, StoreHealth};

use super::state::AppState;

// ---------------------------------------------------------------------------
// Envelopes
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    message: String,
}

#[derive(Debug, Serialize)]
struct Success<T: Serialize> {
    status: &'static str,
    data: T,
}

fn success<T: Serialize>(data: T) -> HttpResponse {
    HttpResponse::Ok().json(Success {
        status: "success",
        data,
    })
}

#[derive(Debug, Serialize)]
struct EstimateData {
    parameters: EstimateParameters,
    fruits: Vec<ProjectedFruit>,
    statistics: ResultStatistics,
    total_growth_per_fruit: f64,
    excluded_records: usize,
    filtered_out: usize,
}

impl From<HarvestEstimate> for EstimateData {
    fn from(e: HarvestEstimate) -> Self {
        Self {
            parameters: e.parameters,
            fruits: e.fruits,
            statistics: e.statistics,
            total_growth_per_fruit: e.total_growth_per_fruit,
            excluded_records: e.excluded_records,
            filtered_out: e.filtered_out,
        }
    }
}

#[derive(Debug, Serialize)]
struct HistogramData {
    parameters: EstimateParameters,
    histogram: Vec<HistogramBin>,
    statistics: ResultStatistics,
    range_basis: RangeBasis,
}

impl From<HarvestEstimate> for HistogramData {
    fn from(e: HarvestEstimate) -> Self {
        Self {
            parameters: e.parameters,
            histogram: e.histogram,
            statistics: e.statistics,
            range_basis: e.range_basis,
        }
    }
}

#[derive(Debug, Serialize)]
struct HealthData {
    status: &'static str,
    store: StoreHealth,
}

// ---------------------------------------------------------------------------
// Error wrapper
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub(crate) struct WebError(HarvestError);

impl From<HarvestError> for WebError {
    fn from(e: HarvestError) -> Self {
        WebError(e)
    }
}

impl std::fmt::Display for WebError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl actix_web::ResponseError for WebError {
    fn status_code(&self) -> StatusCode {
        match &self.0 {
            HarvestError::InvalidRequest { .. } | HarvestError::ParseError(_) => {
                StatusCode::BAD_REQUEST
            }
            HarvestError::NotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let error_type = match status {
            StatusCode::BAD_REQUEST => "Bad Request",
            StatusCode::NOT_FOUND => "Not Found",
            _ => "Internal Server Error",
        };
        if status.is_server_error() {
            tracing::error!(error = %self.0, "request failed");
        } else {
            tracing::warn!(error = %self.0, "request rejected");
        }
        HttpResponse::build(status).json(ErrorBody {
            error: error_type.to_string(),
            message: self.0.to_string(),
        })
    }
}

/// JSON extractor config that answers malformed bodies with the error envelope.
pub(crate) fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(1024 * 1024)
        .error_handler(|err, _req| {
            let body = ErrorBody {
                error: "Bad Request".to_string(),
                message: format!("Invalid JSON body: {err}"),
            };
            actix_web::error::InternalError::from_response(err, HttpResponse::BadRequest().json(body))
                .into()
        })
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

fn run_estimate(state: &AppState, params: ProjectionParams) -> Result<HarvestEstimate, HarvestError> {
    let request = params.into_request(state.default_bins)?;
    let records = state.store.records()?;
    Estimator::new(&records)
        .with_confidence(state.confidence)
        .estimate(&request)
}

pub async fn harvest_estimate(
    state: web::Data<AppState>,
    body: web::Json<ProjectionParams>,
) -> Result<HttpResponse, WebError> {
    let estimate = run_estimate(&state, body.into_inner())?;
    Ok(success(EstimateData::from(estimate)))
}

pub async fn harvest_histogram(
    state: web::Data<AppState>,
    body: web::Json<ProjectionParams>,
) -> Result<HttpResponse, WebError> {
    let estimate = run_estimate(&state, body.into_inner())?;
    Ok(success(HistogramData::from(estimate)))
}

pub async fn health(state: web::Data<AppState>) -> HttpResponse {
    let store = state.store.health();
    if store.reachable {
        success(HealthData {
            status: "healthy",
            store,
        })
    } else {
        HttpResponse::ServiceUnavailable().json(ErrorBody {
            error: "Service Unavailable".to_string(),
            message: format!("Measurement store {} is unreachable", store.source),
        })
    }
}
