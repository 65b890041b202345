use std::fs::File;
use std::io::Error;
use std::path::Path;

pub const OPS_HEADER: [&str; 7] = ["op", "caller", "project", "contractor", "amount", "outcome", "memo"];

pub fn generate_ops_csv(path: &Path, rows: usize) -> Result<(), Error> {
    let file = File::create(path)?;
    let mut wtr = csv::WriterBuilder::new().from_writer(file);

    wtr.write_record(OPS_HEADER)?;

    for i in 1..=rows {
        let caller = format!("0x{:x}", i);
        let contractor = format!("0x{:x}", i + 1000);
        wtr.write_record(["create", &caller, "", &contractor, "1.0", "", "job"])?;
    }

    wtr.flush()?;
    Ok(())
}

pub fn generate_large_ops_csv(path: &Path, size_mb: usize) -> Result<(), Error> {
    use rand::Rng;

    let file = File::create(path)?;
    let mut wtr = csv::WriterBuilder::new().from_writer(file);
    wtr.write_record(OPS_HEADER)?;

    let target_size = (size_mb * 1024 * 1024) as u64;
    let mut rng = rand::thread_rng();

    // Check size every 5000 rows to avoid syscall overhead
    loop {
        for _ in 0..5000 {
            let client: u64 = rng.gen_range(1..=50);
            let caller = format!("0x{:x}", client);
            let contractor = format!("0x{:x}", client + 1000);
            wtr.write_record(["create", &caller, "", &contractor, "1.0", "", "job"])?;
        }
        wtr.flush()?; // Flush to ensure file size is updated
        if std::fs::metadata(path)?.len() >= target_size {
            break;
        }
    }
    Ok(())
}
