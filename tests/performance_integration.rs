use diskspeed::bench::{CancelFlag, SequentialBenchmark};
use diskspeed::config::BenchmarkConfig;
use diskspeed::io;
use diskspeed::util::units::calculate_throughput_mbps;

#[test]
fn test_full_run_reports_consistent_throughput() {
    let temp_dir = tempfile::tempdir().unwrap();
    let mut config = BenchmarkConfig::new().with_target_dir(temp_dir.path());
    config.configure(Some(32), Some(4));
    let path = config.target_path.clone();

    let benchmark = SequentialBenchmark::new(config).unwrap();
    let report = benchmark.run().unwrap();

    assert_eq!(report.chunk_size, 32768);
    assert_eq!(report.file_size, 4 * 1024 * 1024);
    for phase in [report.write, report.read] {
        let expected = calculate_throughput_mbps(report.file_size, phase.elapsed);
        assert!((phase.throughput_mbps - expected).abs() < 1e-6);
        assert!(phase.throughput_mbps.is_finite());
        assert!(phase.throughput_mbps > 0.0);
    }

    let text = report.to_string();
    assert!(text.contains("Reading Speed: ~"));
    assert!(text.contains("Writing Time:"));

    io::clear(&path).unwrap();
    assert!(!path.exists());
}

#[test]
fn test_cancelled_run_leaves_no_file() {
    let temp_dir = tempfile::tempdir().unwrap();
    let config = BenchmarkConfig::new()
        .with_target_dir(temp_dir.path())
        .with_file_size(8 * 1024 * 1024)
        .with_sync(false);
    let path = config.target_path.clone();

    let cancel = CancelFlag::new();
    let benchmark = SequentialBenchmark::new(config)
        .unwrap()
        .with_cancel_flag(cancel.clone());
    cancel.cancel();

    assert!(benchmark.run().is_err());
    assert!(!path.exists());
    assert!(benchmark.clear().is_ok());
}
