use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub api_addr: String,
    pub model_path: PathBuf,
    pub persist_model: bool,
    pub n_trees: usize,
    pub max_depth: usize,
    pub seed: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        ServiceConfig {
            api_addr: "127.0.0.1:8080".to_string(),
            model_path: PathBuf::from("model.bin"),
            persist_model: true,
            n_trees: 100,
            max_depth: 8,
            seed: 42,
        }
    }
}

impl ServiceConfig {
    pub fn from_env() -> Self {
        let defaults = ServiceConfig::default();

        let api_addr = std::env::var("LOANSPHERE_API_ADDR")
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .unwrap_or(defaults.api_addr);

        let model_path = std::env::var("LOANSPHERE_MODEL_PATH")
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .map(PathBuf::from)
            .unwrap_or(defaults.model_path);

        let persist_model = parse_bool_env("LOANSPHERE_PERSIST_MODEL", defaults.persist_model);

        let n_trees = std::env::var("LOANSPHERE_TREES")
            .ok()
            .and_then(|value| value.parse::<usize>().ok())
            .map(clamp_n_trees)
            .unwrap_or(defaults.n_trees);

        let max_depth = std::env::var("LOANSPHERE_MAX_DEPTH")
            .ok()
            .and_then(|value| value.parse::<usize>().ok())
            .map(clamp_max_depth)
            .unwrap_or(defaults.max_depth);

        let seed = std::env::var("LOANSPHERE_SEED")
            .ok()
            .and_then(|value| value.parse::<u64>().ok())
            .unwrap_or(defaults.seed);

        ServiceConfig {
            api_addr,
            model_path,
            persist_model,
            n_trees,
            max_depth,
            seed,
        }
    }
}

fn parse_bool_env(key: &str, default: bool) -> bool {
    std::env::var(key)
        .ok()
        .map(|value| matches!(value.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(default)
}

fn clamp_n_trees(value: usize) -> usize {
    value.clamp(1, 1000)
}

fn clamp_max_depth(value: usize) -> usize {
    value.clamp(1, 64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tree_count_is_clamped() {
        assert_eq!(clamp_n_trees(0), 1);
        assert_eq!(clamp_n_trees(100), 100);
        assert_eq!(clamp_n_trees(50_000), 1000);
    }

    #[test]
    fn depth_is_clamped() {
        assert_eq!(clamp_max_depth(0), 1);
        assert_eq!(clamp_max_depth(8), 8);
        assert_eq!(clamp_max_depth(200), 64);
    }

    #[test]
    fn defaults_match_documented_values() {
        let config = ServiceConfig::default();
        assert_eq!(config.api_addr, "127.0.0.1:8080");
        assert_eq!(config.model_path, PathBuf::from("model.bin"));
        assert!(config.persist_model);
        assert_eq!(config.n_trees, 100);
        assert_eq!(config.max_depth, 8);
        assert_eq!(config.seed, 42);
    }
}
