mod common;

#[test]
fn test_generate_simple_csv() {
    let output_path = std::path::PathBuf::from("test_generated.csv");
    common::generate_ops_csv(&output_path, 5).expect("Failed to generate CSV");

    let content = std::fs::read_to_string(&output_path).expect("Failed to read file");
    // Header + 5 rows = 6 lines
    assert_eq!(content.lines().count(), 6);

    std::fs::remove_file(output_path).ok();
}

#[test]
fn test_generate_large_csv_distribution() {
    let output_path = std::path::PathBuf::from("test_dist_generated.csv");
    // Generate a small amount but enough to see multiple clients
    common::generate_large_ops_csv(&output_path, 1).expect("Failed to generate CSV");

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(&output_path)
        .expect("Failed to open CSV");

    let mut callers = std::collections::HashSet::new();
    for result in reader.records() {
        let record = result.expect("Failed to read record");
        assert_eq!(&record[0], "create");
        let caller = record[1].to_string();
        let id = u64::from_str_radix(caller.trim_start_matches("0x"), 16)
            .expect("Failed to parse caller address");
        assert!((1..=50).contains(&id));
        callers.insert(id);
    }

    // With 1MB of data (~25k rows), we should see most if not all 50 callers
    assert!(
        callers.len() > 1,
        "Should have seen more than one caller address"
    );
    assert!(
        callers.len() >= 40,
        "Should have seen most callers (at least 40/50)"
    );

    std::fs::remove_file(output_path).ok();
}
