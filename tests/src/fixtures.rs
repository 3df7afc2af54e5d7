//! Source fixtures shared by integration tests and benchmarks.

use std::io::{self, Write};
use std::path::Path;
use std::time::Duration;

use flate2::write::GzEncoder;
use flate2::Compression;
use tempfile::TempDir;

use coupon_validation::{SourceLocation, ValidatorConfig, ValidatorConfigBuilder};

/// Present in all three sources
pub const IN_ALL: &str = "VALIDABC";
/// Present in sources 0 and 1
pub const IN_FIRST_TWO: &str = "TESTCODE";
/// Present in sources 1 and 2
pub const IN_LAST_TWO: &str = "SPECIAL9";
/// Present in source 0 only
pub const IN_ONE: &str = "COUPON01";

/// Records per source, in index order
pub fn quorum_records() -> [Vec<&'static str>; 3] {
    [
        vec![IN_ALL, IN_FIRST_TWO, IN_ONE],
        vec![IN_ALL, IN_FIRST_TWO, IN_LAST_TWO],
        vec![IN_ALL, IN_LAST_TWO, "COUPON03"],
    ]
}

pub fn gzip(data: &[u8]) -> io::Result<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data)?;
    encoder.finish()
}

/// Newline-joined records
pub fn lines(records: &[&str]) -> Vec<u8> {
    let mut out = records.join("\n").into_bytes();
    out.push(b'\n');
    out
}

/// Write `records` under `dir`, gzip-compressed when `compress` is set.
pub fn write_source(
    dir: &Path,
    name: &str,
    records: &[&str],
    compress: bool,
) -> io::Result<SourceLocation> {
    let path = dir.join(name);
    let data = if compress {
        gzip(&lines(records))?
    } else {
        lines(records)
    };
    std::fs::write(&path, data)?;
    Ok(SourceLocation::local(path))
}

/// The quorum fixture on disk: source 0 plain, sources 1 and 2 gzip.
pub fn quorum_sources() -> io::Result<(TempDir, Vec<SourceLocation>)> {
    let dir = tempfile::tempdir()?;
    let [first, second, third] = quorum_records();
    let locations = vec![
        write_source(dir.path(), "couponbase1.txt", &first, false)?,
        write_source(dir.path(), "couponbase2.gz", &second, true)?,
        write_source(dir.path(), "couponbase3.dat", &third, true)?,
    ];
    Ok((dir, locations))
}

/// Small filters and short timeouts for test-sized data
pub fn test_config() -> ValidatorConfig {
    ValidatorConfigBuilder::new()
        .cache_capacity(64)
        .expected_entries(1_000)
        .scan_timeout(Duration::from_secs(5))
        .load_timeout(Duration::from_secs(30))
        .http_timeout(Duration::from_secs(10))
        .build()
        .expect("test config is valid")
}
