use vigil_core::Config;

use crate::cli::AnalyzeArgs;

/// Command-line flags take precedence over the environment config.
pub fn apply_overrides(config: &mut Config, args: &AnalyzeArgs) {
    if let Some(seed) = args.seed {
        config.anomaly.seed = Some(seed);
    }
    if let Some(trees) = args.trees {
        config.anomaly.n_trees = trees.max(1);
    }
    if let Some(backend) = args.backend {
        config.anomaly.backend = backend;
    }
    if args.sequential {
        config.anomaly.parallel = false;
    }
    if let Some(secs) = args.timeout_secs.filter(|s| *s > 0) {
        config.runtime.timeout_secs = Some(secs);
    }
    if let Some(ref path) = args.scoring_config {
        config.scoring.config_path = Some(path.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{CliArgs, Command};
    use clap::Parser;
    use vigil_core::AnomalyBackend;

    fn analyze_args(argv: &[&str]) -> AnalyzeArgs {
        let mut full = vec!["vigil", "analyze"];
        full.extend_from_slice(argv);
        match CliArgs::try_parse_from(full).unwrap().command {
            Command::Analyze(a) => a,
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn flags_override_config() {
        let args = analyze_args(&[
            "ledger.csv",
            "--seed",
            "7",
            "--trees",
            "0",
            "--backend",
            "zscore",
            "--sequential",
            "--timeout-secs",
            "30",
            "--scoring-config",
            "custom.yml",
        ]);
        let mut config = Config::default();
        apply_overrides(&mut config, &args);

        assert_eq!(config.anomaly.seed, Some(7));
        assert_eq!(config.anomaly.n_trees, 1);
        assert_eq!(config.anomaly.backend, AnomalyBackend::ZScore);
        assert!(!config.anomaly.parallel);
        assert_eq!(config.runtime.timeout_secs, Some(30));
        assert_eq!(
            config.scoring.config_path.as_deref(),
            Some(std::path::Path::new("custom.yml"))
        );
    }

    #[test]
    fn absent_flags_keep_config() {
        let args = analyze_args(&["ledger.json", "--timeout-secs", "0"]);
        let mut config = Config::default();
        config.anomaly.n_trees = 64;
        config.runtime.timeout_secs = Some(5);
        apply_overrides(&mut config, &args);

        assert_eq!(config.anomaly.n_trees, 64);
        assert!(config.anomaly.parallel);
        assert_eq!(config.runtime.timeout_secs, Some(5));
    }

    #[test]
    fn unknown_backend_is_a_usage_error() {
        let res = CliArgs::try_parse_from(["vigil", "analyze", "x.csv", "--backend", "svm"]);
        assert!(res.is_err());
    }
}
