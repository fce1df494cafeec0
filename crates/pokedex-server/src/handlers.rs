//! Request handlers for the species endpoints.

use std::sync::Arc;

use http::StatusCode;
use serde::Serialize;
use tracing::{error, warn};

use pokedex_core::{RequestContext, ServiceError, Species, SpeciesProvider};

use crate::health::health_response;
use crate::response::{
    json_data, json_error, HttpResponse, ERR_CODE_BAD_REQUEST, ERR_CODE_INTERNAL,
    ERR_CODE_NOT_FOUND,
};
use crate::router::Route;

/// Wire shape of a species in successful responses.
#[derive(Debug, Serialize)]
pub struct SpeciesDto {
    name: String,
    description: String,
    habitat: String,
    #[serde(rename = "isLegendary")]
    is_legendary: bool,
}

impl From<Species> for SpeciesDto {
    fn from(species: Species) -> Self {
        Self {
            // The fetch pipeline guarantees the flag is known by now.
            is_legendary: species.legendary.is_true(),
            name: species.name,
            description: species.description,
            habitat: species.habitat,
        }
    }
}

/// The handler set behind the route table.
///
/// Holds one provider per endpoint flavor; both are the same seam, so the
/// handlers cannot tell a plain pipeline from an enriching one.
pub struct PokedexApi {
    species: Arc<dyn SpeciesProvider>,
    translated: Arc<dyn SpeciesProvider>,
}

impl PokedexApi {
    /// Creates the handler set over the two pipelines.
    pub fn new(species: Arc<dyn SpeciesProvider>, translated: Arc<dyn SpeciesProvider>) -> Self {
        Self {
            species,
            translated,
        }
    }

    /// Dispatches a matched route to its handler.
    pub async fn dispatch(&self, ctx: &RequestContext, route: Route) -> HttpResponse {
        match route {
            Route::Health => health_response(),
            Route::Species { name } => {
                self.species_response(ctx, &name, self.species.as_ref()).await
            }
            Route::TranslatedSpecies { name } => {
                self.species_response(ctx, &name, self.translated.as_ref())
                    .await
            }
        }
    }

    async fn species_response(
        &self,
        ctx: &RequestContext,
        name: &str,
        provider: &dyn SpeciesProvider,
    ) -> HttpResponse {
        if name.is_empty() {
            return json_error(
                StatusCode::BAD_REQUEST,
                ctx.request_id(),
                ERR_CODE_BAD_REQUEST,
                "missing name parameter",
            );
        }

        match provider.get(ctx, name).await {
            Ok(species) => json_data(
                StatusCode::OK,
                ctx.request_id(),
                &SpeciesDto::from(species),
            ),
            Err(err) => error_to_response(ctx, &err),
        }
    }
}

/// The single point where the service error taxonomy becomes HTTP.
///
/// Clients get a stable generic message; the actual error goes to the logs
/// together with the request ID.
fn error_to_response(ctx: &RequestContext, err: &ServiceError) -> HttpResponse {
    let request_id = ctx.request_id();

    if err.is_not_found() {
        warn!(request_id = %request_id, error = %err, "resource not found");
        return json_error(
            StatusCode::NOT_FOUND,
            request_id,
            ERR_CODE_NOT_FOUND,
            "resource not found",
        );
    }

    // MissingData and Unavailable are indistinguishable to clients; the
    // distinction lives in the logs.
    error!(request_id = %request_id, error = %err, "request failed");
    json_error(
        StatusCode::INTERNAL_SERVER_ERROR,
        request_id,
        ERR_CODE_INTERNAL,
        "internal server error",
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::future::BoxFuture;
    use http_body_util::BodyExt;
    use pokedex_core::{Legendary, ServiceResult};
    use serde_json::Value;

    /// Provider backed by a plain function, enough for handler tests.
    struct StaticProvider(fn(&str) -> ServiceResult<Species>);

    impl SpeciesProvider for StaticProvider {
        fn get<'a>(
            &'a self,
            _ctx: &'a RequestContext,
            name: &'a str,
        ) -> BoxFuture<'a, ServiceResult<Species>> {
            let result = (self.0)(name);
            Box::pin(async move { result })
        }
    }

    fn mewtwo(_name: &str) -> ServiceResult<Species> {
        Ok(Species {
            name: "mewtwo".to_string(),
            description: "It was created by a scientist.".to_string(),
            habitat: "rare".to_string(),
            legendary: Legendary::True,
        })
    }

    fn not_found(name: &str) -> ServiceResult<Species> {
        Err(ServiceError::not_found(name))
    }

    fn missing_data(_name: &str) -> ServiceResult<Species> {
        Err(ServiceError::missing_data("legendary flag not reported"))
    }

    fn unavailable(_name: &str) -> ServiceResult<Species> {
        Err(ServiceError::unavailable("pokemon api answered with status 503"))
    }

    fn api(species: fn(&str) -> ServiceResult<Species>) -> PokedexApi {
        PokedexApi::new(
            Arc::new(StaticProvider(species)),
            Arc::new(StaticProvider(species)),
        )
    }

    async fn body_json(response: HttpResponse) -> Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_species_route_serves_dto() {
        let handlers = api(mewtwo);
        let ctx = RequestContext::new();

        let response = handlers
            .dispatch(
                &ctx,
                Route::Species {
                    name: "mewtwo".to_string(),
                },
            )
            .await;

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["data"]["name"], "mewtwo");
        assert_eq!(json["data"]["habitat"], "rare");
        assert_eq!(json["data"]["isLegendary"], true);
        assert_eq!(json["meta"]["request_id"], ctx.request_id().to_string());
    }

    #[tokio::test]
    async fn test_empty_name_is_bad_request() {
        let handlers = api(mewtwo);
        let ctx = RequestContext::new();

        let response = handlers
            .dispatch(
                &ctx,
                Route::TranslatedSpecies {
                    name: String::new(),
                },
            )
            .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "BAD_REQUEST");
        assert_eq!(json["error"]["message"], "missing name parameter");
    }

    #[tokio::test]
    async fn test_not_found_maps_to_404() {
        let handlers = api(not_found);
        let ctx = RequestContext::new();

        let response = handlers
            .dispatch(
                &ctx,
                Route::Species {
                    name: "agumon".to_string(),
                },
            )
            .await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "NOT_FOUND");
        assert_eq!(json["error"]["message"], "resource not found");
    }

    #[tokio::test]
    async fn test_missing_data_maps_to_500_with_generic_message() {
        let handlers = api(missing_data);
        let ctx = RequestContext::new();

        let response = handlers
            .dispatch(
                &ctx,
                Route::Species {
                    name: "ditto".to_string(),
                },
            )
            .await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "INTERNAL_ERROR");
        assert_eq!(json["error"]["message"], "internal server error");
        // The wire never leaks what actually went wrong.
        assert!(!json.to_string().contains("legendary flag"));
    }

    #[tokio::test]
    async fn test_unavailable_maps_to_500() {
        let handlers = api(unavailable);
        let ctx = RequestContext::new();

        let response = handlers
            .dispatch(
                &ctx,
                Route::Species {
                    name: "mewtwo".to_string(),
                },
            )
            .await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "INTERNAL_ERROR");
    }

    #[tokio::test]
    async fn test_health_route_bypasses_providers() {
        let handlers = api(unavailable);
        let ctx = RequestContext::new();

        let response = handlers.dispatch(&ctx, Route::Health).await;

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["status"], "ok");
    }
}
