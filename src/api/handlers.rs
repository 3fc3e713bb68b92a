use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde_json::{json, Value};

use crate::{
    error::{AppError, AppResult},
    middleware::request_id::RequestId,
    models::{
        RecommendationQuery, RecommendationResponse, RecommendedTitle, Title, TitleMetadata,
        TITLE_NOT_FOUND_WARNING,
    },
};

use super::AppState;

/// Health check endpoint
pub async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}

/// Distinct title names in catalogue order, for the title picker
pub async fn list_titles(State(state): State<AppState>) -> Json<Vec<String>> {
    let names = state
        .recommender
        .catalogue()
        .unique_names()
        .map(str::to_string)
        .collect();
    Json(names)
}

/// Catalogue entry for one title
pub async fn get_title(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> AppResult<Json<Title>> {
    let title = state.recommender.catalogue().get(&name)?;
    Ok(Json(title.clone()))
}

/// Display metadata for one title from the configured provider
pub async fn get_title_details(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> AppResult<Json<TitleMetadata>> {
    let title = state.recommender.catalogue().get(&name)?.clone();

    tracing::debug!(
        title = %title.display_name,
        provider = state.metadata.name(),
        "Fetching title metadata"
    );

    let metadata = state.metadata.fetch(&title).await?;
    Ok(Json(metadata))
}

/// Titles most similar to the requested one.
///
/// An unknown title is not an error: the response is empty and carries a warning.
pub async fn recommend(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Query(query): Query<RecommendationQuery>,
) -> AppResult<Json<RecommendationResponse>> {
    let k = query.k.unwrap_or(state.default_k).min(state.max_k);

    tracing::info!(
        request_id = %request_id,
        title = %query.title,
        k,
        "Processing recommendation request"
    );

    let recommender = state.recommender.clone();
    let title = query.title.clone();
    let ranked = tokio::task::spawn_blocking(move || recommender.recommend_scored(&title, k))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;

    let (recommendations, warning) = match ranked {
        Ok(scored) => (
            scored.into_iter().map(RecommendedTitle::from).collect(),
            None,
        ),
        Err(AppError::NotFound(_)) => {
            tracing::warn!(
                request_id = %request_id,
                title = %query.title,
                "Title not found in the dataset"
            );
            (Vec::new(), Some(TITLE_NOT_FOUND_WARNING.to_string()))
        }
        Err(e) => return Err(e),
    };

    tracing::info!(
        request_id = %request_id,
        returned = recommendations.len(),
        "Recommendation completed"
    );

    Ok(Json(RecommendationResponse {
        title: query.title,
        k,
        recommendations,
        warning,
    }))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum_test::TestServer;

    use super::*;
    use crate::{
        api::create_router,
        models::CastMember,
        services::{
            metadata::MockMetadataProvider, Catalogue, Recommender, ScanStrategy,
            SimilarityMatrix,
        },
    };

    fn recommender() -> Recommender {
        let catalogue = Catalogue::from_names(["Akira", "Ghost in the Shell", "Paprika"]);
        #[rustfmt::skip]
        let matrix = SimilarityMatrix::from_dense(3, vec![
            1.0, 0.8, 0.6,
            0.8, 1.0, 0.4,
            0.6, 0.4, 1.0,
        ])
        .unwrap();
        Recommender::new(Arc::new(catalogue), Arc::new(matrix), ScanStrategy::Sequential).unwrap()
    }

    #[tokio::test]
    async fn test_details_use_metadata_provider() {
        let mut provider = MockMetadataProvider::new();
        provider
            .expect_fetch()
            .withf(|title: &Title| title.display_name == "Paprika")
            .times(1)
            .returning(|title| {
                Ok(TitleMetadata {
                    title: title.display_name.clone(),
                    trailer_url: Some("https://www.youtube.com/watch?v=paprika".to_string()),
                    cast: vec![CastMember {
                        name: "Megumi Hayashibara".to_string(),
                        character: Some("Paprika".to_string()),
                        profile_url: None,
                    }],
                    ..Default::default()
                })
            });
        provider.expect_name().return_const("mock");

        let state = AppState::with_metadata(recommender(), Arc::new(provider));
        let server = TestServer::new(create_router(state)).unwrap();

        let response = server.get("/titles/Paprika/details").await;
        response.assert_status_ok();
        let metadata: TitleMetadata = response.json();
        assert_eq!(metadata.title, "Paprika");
        assert_eq!(metadata.cast.len(), 1);
        assert!(metadata.trailer_url.is_some());
    }

    #[tokio::test]
    async fn test_details_unknown_title_skips_provider() {
        let mut provider = MockMetadataProvider::new();
        provider.expect_fetch().times(0);
        provider.expect_name().return_const("mock");

        let state = AppState::with_metadata(recommender(), Arc::new(provider));
        let server = TestServer::new(create_router(state)).unwrap();

        let response = server.get("/titles/Perfect%20Blue/details").await;
        response.assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_k_capped_by_max_k() {
        let state = AppState::new(recommender()).with_limits(5, 1);
        let server = TestServer::new(create_router(state)).unwrap();

        let response = server
            .get("/recommendations")
            .add_query_param("title", "Akira")
            .add_query_param("k", 10)
            .await;
        response.assert_status_ok();
        let body: RecommendationResponse = response.json();
        assert_eq!(body.k, 1);
        assert_eq!(body.recommendations.len(), 1);
        assert_eq!(body.recommendations[0].display_name, "Ghost in the Shell");
    }
}
