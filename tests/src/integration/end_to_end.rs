//! # End-to-End Validation
//!
//! Loads real sources through `StreamingQuorumValidator` and checks the
//! quorum rule across every tier: length gate, cache, filters and scans.

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use httpmock::prelude::*;

    use crate::fixtures::{
        gzip, lines, quorum_records, quorum_sources, test_config, write_source, IN_ALL,
        IN_FIRST_TWO, IN_LAST_TWO, IN_ONE,
    };
    use coupon_validation::{
        CouponValidatorApi, LoadError, SourceError, SourceLocation, StreamingQuorumValidator,
        Verdict,
    };

    fn validator() -> StreamingQuorumValidator {
        StreamingQuorumValidator::streaming(&test_config()).unwrap()
    }

    // =============================================================================
    // QUORUM OVER LOCAL FILES
    // =============================================================================

    #[tokio::test]
    async fn test_quorum_over_plain_and_gzip_files() {
        let (_dir, locations) = quorum_sources().unwrap();
        let validator = validator();
        validator.load(&locations).await.unwrap();

        assert!(validator.validate(IN_ALL).await);
        assert!(validator.validate(IN_FIRST_TWO).await);
        assert!(validator.validate(IN_LAST_TWO).await);
        assert!(!validator.validate(IN_ONE).await);
        assert!(!validator.validate("NOWHERE1").await);
        assert!(!validator.validate("SHORT").await);
        assert!(!validator.validate("MUCHTOOLONGCODE").await);
    }

    #[tokio::test]
    async fn test_input_is_normalized() {
        let (_dir, locations) = quorum_sources().unwrap();
        let validator = validator();
        validator.load(&locations).await.unwrap();

        assert!(validator.validate("  validabc\t").await);
        assert!(validator.validate("special9").await);
    }

    #[tokio::test]
    async fn test_record_whitespace_matches_input_whitespace() {
        let dir = tempfile::tempdir().unwrap();
        let locations = vec![
            write_source(dir.path(), "vt1.txt", &["VALIDABC\u{0B}"], false).unwrap(),
            write_source(dir.path(), "vt2.gz", &["\u{0B}validabc"], true).unwrap(),
            write_source(dir.path(), "vt3.txt", &["\u{0C}VALIDABC\r"], false).unwrap(),
        ];
        let validator = validator();
        validator.load(&locations).await.unwrap();

        assert!(matches!(
            validator.evaluate(IN_ALL).await,
            Verdict::Confirmed { confirmations, .. } if confirmations >= 2
        ));
    }

    #[tokio::test]
    async fn test_second_answer_comes_from_cache() {
        let (_dir, locations) = quorum_sources().unwrap();
        let validator = validator();
        validator.load(&locations).await.unwrap();

        assert!(matches!(
            validator.evaluate(IN_FIRST_TWO).await,
            Verdict::Confirmed { confirmations, failures: 0 } if confirmations >= 2
        ));
        assert_eq!(validator.evaluate(IN_FIRST_TWO).await, Verdict::Cached(true));
        assert_eq!(validator.stats().cache_size, 1);
    }

    #[tokio::test]
    async fn test_stats_after_load() {
        let (_dir, locations) = quorum_sources().unwrap();
        let validator = validator();
        assert_eq!(validator.stats().source_count, 0);

        validator.load(&locations).await.unwrap();

        let stats = validator.stats();
        assert_eq!(stats.source_count, 3);
        assert_eq!(stats.per_source_sizes, vec![3, 3, 3]);
        assert_eq!(stats.total_entries, 9);
        assert_eq!(stats.cache_capacity, 64);
    }

    #[tokio::test]
    async fn test_concurrent_callers_agree() {
        let (_dir, locations) = quorum_sources().unwrap();
        let validator = Arc::new(validator());
        validator.load(&locations).await.unwrap();

        let mut handles = Vec::new();
        for i in 0..24 {
            let validator = Arc::clone(&validator);
            handles.push(tokio::spawn(async move {
                let code = [IN_ALL, IN_ONE, IN_LAST_TWO][i % 3];
                (code, validator.validate(code).await)
            }));
        }

        for handle in handles {
            let (code, valid) = handle.await.unwrap();
            assert_eq!(valid, code != IN_ONE, "unexpected answer for {code}");
        }
        assert!(validator.stats().cache_size <= 3);
    }

    // =============================================================================
    // RELOAD
    // =============================================================================

    #[tokio::test]
    async fn test_reload_replaces_sources_and_forgets_answers() {
        let (dir, locations) = quorum_sources().unwrap();
        let validator = validator();
        validator.load(&locations).await.unwrap();
        assert!(validator.validate(IN_FIRST_TWO).await);

        // Second generation drops TESTCODE from source 1
        let [_, _, third] = quorum_records();
        let replaced = vec![
            locations[0].clone(),
            write_source(dir.path(), "next2.gz", &[IN_ALL, IN_LAST_TWO], true).unwrap(),
            write_source(dir.path(), "next3.gz", &third, true).unwrap(),
        ];
        validator.load(&replaced).await.unwrap();

        assert_eq!(validator.stats().cache_size, 0);
        assert!(!validator.validate(IN_FIRST_TWO).await);
        assert!(validator.validate(IN_ALL).await);
    }

    #[tokio::test]
    async fn test_failed_load_is_all_or_nothing() {
        let (dir, mut locations) = quorum_sources().unwrap();
        locations[2] = SourceLocation::local(dir.path().join("missing.gz"));
        let validator = validator();

        let result = validator.load(&locations).await;

        assert!(matches!(
            result,
            Err(LoadError::Source {
                index: 2,
                source: SourceError::Io(_),
                ..
            })
        ));
        assert!(!validator.is_loaded());
        assert!(!validator.validate(IN_ALL).await);
    }

    // =============================================================================
    // REMOTE SOURCES
    // =============================================================================

    #[tokio::test]
    async fn test_remote_and_local_sources_mixed() {
        let [first, second, third] = quorum_records();
        let server = MockServer::start_async().await;
        let first_mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/couponbase1.gz");
                then.status(200).body(gzip(&lines(&first)).unwrap());
            })
            .await;
        let second_mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/couponbase2");
                then.status(200).body(lines(&second));
            })
            .await;

        let dir = tempfile::tempdir().unwrap();
        let locations = vec![
            SourceLocation::Remote(server.url("/couponbase1.gz")),
            SourceLocation::Remote(server.url("/couponbase2")),
            write_source(dir.path(), "couponbase3.gz", &third, true).unwrap(),
        ];
        let validator = validator();
        validator.load(&locations).await.unwrap();
        first_mock.assert_async().await;
        second_mock.assert_async().await;

        // Source 0 and 1 both hold TESTCODE, so confirming it reads over HTTP
        assert!(validator.validate(IN_FIRST_TWO).await);
        assert!(!validator.validate(IN_ONE).await);
        assert!(first_mock.hits_async().await >= 2);
    }

    #[tokio::test]
    async fn test_remote_error_status_fails_load() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/broken.gz");
                then.status(500);
            })
            .await;

        let (_dir, mut locations) = quorum_sources().unwrap();
        locations[1] = SourceLocation::Remote(server.url("/broken.gz"));
        let validator = validator();

        let result = validator.load(&locations).await;

        assert!(matches!(
            result,
            Err(LoadError::Source {
                index: 1,
                source: SourceError::UnexpectedStatus { status: 500 },
                ..
            })
        ));
        assert_eq!(validator.stats().source_count, 0);
    }
}
