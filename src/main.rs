use clap::error::ErrorKind;
use clap::Parser;
use log::{info, warn};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use apfs_recon::cli::Args;
use apfs_recon::error::{Result, ScanError};
use apfs_recon::report;
use apfs_recon::scan::resolve_scan_range;
use apfs_recon::{CancelFlag, DiskImage};

fn main() {
    env_logger::init();

    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            let code = match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
                _ => 1,
            };
            let _ = e.print();
            std::process::exit(code);
        }
    };

    if let Err(msg) = args.validate() {
        let err = ScanError::InvalidArgument(msg);
        eprintln!("Error: {}", err);
        std::process::exit(err.exit_code());
    }

    if let Err(e) = run(&args) {
        eprintln!("Error: {}", e);
        std::process::exit(e.exit_code());
    }
}

fn run(args: &Args) -> Result<()> {
    let cancel = CancelFlag::new();
    if let Err(e) = cancel.hook_interrupt() {
        // Without the hook, SIGINT kills the process instead of stopping
        // the walk; the scan itself still runs.
        warn!("could not install SIGINT handler: {}", e);
    }

    let disk = DiskImage::open(&args.image)?;
    info!(
        "opened {} ({} bytes, {} blocks)",
        disk.path(),
        disk.size(),
        disk.block_count()
    );

    // Resolved exactly once; both passes scan the identical range.
    let range = resolve_scan_range(&disk);

    if let Some(map_path) = &args.map_output {
        let mut out = BufWriter::new(create_output(map_path)?);
        report::write_map(&mut out, &disk, range, &cancel)?;
        out.flush()?;
        info!("block map written to {}", map_path.display());
    }

    let mut out = BufWriter::new(create_output(&args.dump_output)?);
    report::write_dump(&mut out, &disk, range, &cancel)?;
    out.flush()?;
    info!("structural dump written to {}", args.dump_output.display());

    if cancel.is_cancelled() {
        info!("scan interrupted, partial reports kept");
    }

    Ok(())
}

fn create_output(path: &Path) -> Result<File> {
    File::create(path).map_err(|e| ScanError::OutputOpen {
        path: path.display().to_string(),
        source: e,
    })
}
