use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateRequest {
    pub prompt: String,
}

/// Response body of the generation endpoint.
///
/// Success carries `video_url` and optionally a caption in `text`; failure carries an
/// optional human-readable `error`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl GenerateResponse {
    pub fn succeeded(text: impl Into<String>, video_url: impl Into<String>) -> Self {
        Self {
            success: true,
            text: Some(text.into()),
            video_url: Some(video_url.into()),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub message: String,
}

impl HealthResponse {
    pub fn is_ok(&self) -> bool {
        self.message.eq_ignore_ascii_case("ok")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_minimal_failure_body() {
        let body: GenerateResponse =
            serde_json::from_str(r#"{"success":false}"#).expect("decode");
        assert!(!body.success);
        assert!(body.error.is_none());
        assert!(body.video_url.is_none());
    }

    #[test]
    fn encodes_video_url_in_camel_case() {
        let body = GenerateResponse::succeeded("done", "https://cdn/x.mp4");
        let value = serde_json::to_value(&body).expect("encode");
        assert_eq!(value["videoUrl"], "https://cdn/x.mp4");
        assert!(value.get("error").is_none());
    }
}
