//! # Runtime Flow
//!
//! The runtime's pieces over a real validator: environment configuration,
//! the line session, and the Prometheus bridge.

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Arc;

    use crate::fixtures::{quorum_sources, IN_ALL, IN_ONE};
    use coupon_runtime::{run_lines, PrometheusRecorder, RuntimeConfig, INVALID_MESSAGE};
    use coupon_telemetry::{encode_metrics, register_metrics, SOURCE_ENTRIES};
    use coupon_validation::{CouponValidatorApi, StreamingQuorumValidator};

    fn config_for(locations: &[coupon_validation::SourceLocation]) -> RuntimeConfig {
        let mut vars: HashMap<&str, String> = HashMap::new();
        vars.insert("COUPON_FILE1_URL", locations[0].to_string());
        vars.insert("COUPON_FILE2_URL", locations[1].to_string());
        vars.insert("COUPON_FILE3_URL", locations[2].to_string());
        vars.insert("COUPON_EXPECTED_ENTRIES", "1000".to_string());
        vars.insert("COUPON_CACHE_CAPACITY", "32".to_string());

        RuntimeConfig::from_lookup(|key| vars.get(key).cloned()).unwrap()
    }

    #[tokio::test]
    async fn test_environment_drives_load() {
        let (_dir, locations) = quorum_sources().unwrap();
        let config = config_for(&locations);
        assert_eq!(config.sources, locations);

        let validator = StreamingQuorumValidator::streaming(&config.validator).unwrap();
        validator.load(&config.sources).await.unwrap();

        assert_eq!(validator.stats().cache_capacity, 32);
        assert!(validator.validate(IN_ALL).await);
    }

    #[tokio::test]
    async fn test_session_over_loaded_validator() {
        let (_dir, locations) = quorum_sources().unwrap();
        let config = config_for(&locations);
        let validator = StreamingQuorumValidator::streaming(&config.validator).unwrap();
        validator.load(&config.sources).await.unwrap();

        let input = format!("{IN_ALL}\n {IN_ONE}\n\nabc\nstats\n");
        let mut output = Vec::new();
        let written = run_lines(&validator, input.as_bytes(), &mut output)
            .await
            .unwrap();
        assert_eq!(written, 4);

        let responses: Vec<serde_json::Value> = String::from_utf8(output)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();

        assert_eq!(responses[0]["coupon"], IN_ALL);
        assert_eq!(responses[0]["valid"], true);
        assert!(responses[0].get("message").is_none());

        assert_eq!(responses[1]["coupon"], format!(" {IN_ONE}"));
        assert_eq!(responses[1]["valid"], false);
        assert_eq!(responses[1]["message"], INVALID_MESSAGE);

        assert_eq!(responses[2]["valid"], false);

        assert_eq!(responses[3]["source_count"], 3);
        assert_eq!(responses[3]["total_entries"], 9);
    }

    #[tokio::test]
    async fn test_recorder_exports_to_prometheus() {
        register_metrics().unwrap();
        let (_dir, locations) = quorum_sources().unwrap();
        let config = config_for(&locations);
        let validator = StreamingQuorumValidator::streaming(&config.validator)
            .unwrap()
            .with_recorder(Arc::new(PrometheusRecorder));

        validator.load(&config.sources).await.unwrap();
        assert!(validator.validate(IN_ALL).await);
        assert!(validator.validate(IN_ALL).await);

        assert_eq!(SOURCE_ENTRIES.with_label_values(&["0"]).get(), 3.0);
        let text = encode_metrics().unwrap();
        assert!(text.contains("coupon_validations_total"));
        assert!(text.contains("coupon_scans_total"));
        assert!(text.contains("coupon_load_duration_seconds"));

        // The validator's own counters track the same events
        let snapshot = validator.metrics();
        assert_eq!(snapshot.validations, 2);
        assert_eq!(snapshot.cache_hits, 1);
        assert!(snapshot.scans_found >= 2);
    }
}
