use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct CoreConfig {
    pub api_addr: String,
    pub model_path: PathBuf,
    pub metadata_path: PathBuf,
    pub examples_path: PathBuf,
    pub cors_origin: String,
}

impl CoreConfig {
    pub fn from_env() -> Self {
        let artifacts_dir = std::env::var("DIGITS_ARTIFACTS_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("artifacts"));

        let model_path = path_env("DIGITS_MODEL_PATH")
            .unwrap_or_else(|| artifacts_dir.join("model.json"));
        let metadata_path = path_env("DIGITS_METADATA_PATH")
            .unwrap_or_else(|| artifacts_dir.join("metadata.json"));
        let examples_path = path_env("DIGITS_EXAMPLES_PATH")
            .unwrap_or_else(|| artifacts_dir.join("example_payloads.json"));

        let api_addr =
            std::env::var("DIGITS_API_ADDR").unwrap_or_else(|_| "127.0.0.1:8000".to_string());
        let cors_origin = std::env::var("DIGITS_CORS_ORIGIN").unwrap_or_else(|_| "*".to_string());

        CoreConfig {
            api_addr,
            model_path,
            metadata_path,
            examples_path,
            cors_origin,
        }
    }
}

fn path_env(name: &str) -> Option<PathBuf> {
    std::env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
}
