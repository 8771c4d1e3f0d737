use actix_web::{web, HttpResponse, Responder};
use serde::Serialize;
use serde_json::json;
use std::collections::BTreeMap;

use crate::state::AppState;

#[derive(Serialize)]
struct HealthStatus {
    status: String,
    services: BTreeMap<String, ServiceStatus>,
    storage_backend: String,
    version: String,
}

#[derive(Serialize, Clone)]
struct ServiceStatus {
    status: String,
    details: Option<String>,
}

impl ServiceStatus {
    fn ok(details: String) -> Self {
        Self {
            status: "ok".to_string(),
            details: Some(details),
        }
    }

    fn error(details: String) -> Self {
        Self {
            status: "error".to_string(),
            details: Some(details),
        }
    }
}

/*
    /api/v1/health
*/
pub async fn health_check() -> impl Responder {
    HttpResponse::Ok().json(json!({ "status": "ok" }))
}

/*
    /api/v1/health/services
*/
pub async fn service_status(state: web::Data<AppState>) -> impl Responder {
    let config = &state.config;
    let mut services = BTreeMap::new();

    let storage = match state.store.ping().await {
        Ok(()) => ServiceStatus::ok(format!("{} store reachable", state.store.backend_name())),
        Err(e) => {
            log::error!("Storage health check failed: {}", e);
            ServiceStatus::error(format!("Failed to reach store: {}", e))
        }
    };
    services.insert("storage".to_string(), storage);

    let gemini = match (&config.gemini_api_key, &config.gcp_project_id) {
        (Some(key), _) => ServiceStatus::ok(format!("Developer API key configured ({})", mask(key))),
        (None, Some(project)) => ServiceStatus::ok(format!("Vertex AI project {}", project)),
        (None, None) => ServiceStatus::error("GEMINI_API_KEY or GCP_PROJECT_ID not configured".to_string()),
    };
    services.insert("gemini".to_string(), gemini);

    let maps = match &config.maps_api_key {
        Some(key) => ServiceStatus::ok(format!("Maps API key configured ({})", mask(key))),
        None => ServiceStatus::error("GOOGLE_MAPS_API_KEY not configured".to_string()),
    };
    services.insert("maps".to_string(), maps);

    let search = if state.search.is_configured() {
        ServiceStatus::ok("Programmable Search configured".to_string())
    } else {
        ServiceStatus::error(
            "Missing configuration: GOOGLE_CUSTOM_SEARCH_KEY, GOOGLE_CUSTOM_SEARCH_CX".to_string(),
        )
    };
    services.insert("search".to_string(), search);

    let bucket = match &config.generated_image_bucket {
        Some(bucket) => ServiceStatus::ok(format!("Generated images go to bucket '{}'", bucket)),
        None => ServiceStatus::error("GENERATED_IMAGE_BUCKET not configured".to_string()),
    };
    services.insert("cloud_storage".to_string(), bucket);

    let degraded = services.values().any(|service| service.status != "ok");
    HttpResponse::Ok().json(HealthStatus {
        status: if degraded { "degraded" } else { "ok" }.to_string(),
        services,
        storage_backend: state.store.backend_name().to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

fn mask(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() > 8 {
        let head: String = chars[..4].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{}***{}", head, tail)
    } else {
        "***".to_string()
    }
}
