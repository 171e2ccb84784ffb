use axum::Json;
use serde::Serialize;

use crate::localization::SUPPORTED_LANGUAGES;

#[derive(Debug, Serialize)]
pub(crate) struct LanguagesResponse {
    languages: Vec<&'static str>,
}

pub(crate) async fn supported() -> Json<LanguagesResponse> {
    Json(LanguagesResponse {
        languages: SUPPORTED_LANGUAGES.to_vec(),
    })
}
