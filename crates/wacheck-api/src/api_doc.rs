//! OpenAPI documentation, served at `/api/openapi.json` and rendered at `/docs`.

use utoipa::OpenApi;

use crate::error;
use crate::handlers;
use wacheck_core::models;

pub fn get_openapi_spec() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "wacheck API",
        version = "0.1.0",
        description = "Check whether phone numbers are registered on WhatsApp, look up carriers from prefix tables, and manage number lists."
    ),
    paths(
        // Session
        handlers::session::get_status,
        handlers::session::get_qr,
        handlers::session::restart,
        handlers::session::disconnect,
        // Checks
        handlers::check::check_number,
        handlers::check::check_bulk,
        handlers::image_proxy::image_proxy,
        // Dashboard tools
        handlers::carrier::lookup_carrier,
        handlers::carrier::lookup_carrier_bulk,
        handlers::lists::parse_list_file,
        handlers::export::export_results,
        handlers::files::split_file,
        handlers::files::prefix_lines,
        // Health
        handlers::health::health_check,
    ),
    components(schemas(
        error::ErrorResponse,
        models::SessionStatus,
        models::AccountInfo,
        models::StatusResponse,
        models::QrResponse,
        models::CheckOutcome,
        models::CheckResult,
        models::BusinessInfo,
        models::Product,
        models::CarrierResult,
        wacheck_core::ResultFilter,
        wacheck_core::file_tools::PrefixMode,
        handlers::session::RestartResponse,
        handlers::session::DisconnectResponse,
        handlers::check::CheckNumberRequest,
        handlers::check::BulkCheckRequest,
        handlers::check::CheckResponse,
        handlers::check::BulkCheckResponse,
        handlers::carrier::CarrierRequest,
        handlers::carrier::CarrierBulkRequest,
        handlers::carrier::CarrierResponse,
        handlers::carrier::CarrierBulkResponse,
        handlers::lists::ParsedList,
        handlers::lists::ParsedListResponse,
        handlers::export::ExportRequest,
        handlers::files::PrefixRequest,
        handlers::files::PrefixResponse,
        handlers::files::PrefixedContent,
        handlers::image_proxy::ImageProxyResponse,
        handlers::health::HealthCheckResponse,
    )),
    tags(
        (name = "session", description = "WhatsApp session lifecycle"),
        (name = "check", description = "Registration checks"),
        (name = "carrier", description = "Carrier lookup from prefix tables"),
        (name = "lists", description = "Number list parsing"),
        (name = "results", description = "Result export"),
        (name = "files", description = "List file tools"),
        (name = "health", description = "Health checks"),
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_check_endpoints() {
        let spec = get_openapi_spec();
        assert!(spec.paths.paths.contains_key("/api/check-whatsapp"));
        assert!(spec.paths.paths.contains_key("/api/check-whatsapp-bulk"));
        assert!(spec.paths.paths.contains_key("/api/files/split"));
    }
}
