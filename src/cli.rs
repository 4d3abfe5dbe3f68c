use clap::Parser;
use std::path::PathBuf;

/// apfs-recon - read-only APFS container block scanner
///
/// Walks a container image block by block, classifying each block and
/// writing a structural dump plus an optional compact block map.
#[derive(Parser, Debug, Clone)]
#[command(name = "apfs-recon")]
#[command(version = "0.1.0")]
#[command(about = "Read-only APFS container block scanner", long_about = None)]
pub struct Args {
    /// APFS container image or raw device to scan
    #[arg(value_name = "IMAGE")]
    pub image: PathBuf,

    /// Structural dump output file (always written)
    #[arg(value_name = "DUMP")]
    pub dump_output: PathBuf,

    /// Optional block map output file
    #[arg(value_name = "MAP")]
    pub map_output: Option<PathBuf>,
}

impl Args {
    /// Validate the arguments
    pub fn validate(&self) -> Result<(), String> {
        if self.image.as_os_str().is_empty() {
            return Err("image path cannot be empty".to_string());
        }

        if self.dump_output.as_os_str().is_empty() {
            return Err("dump output path cannot be empty".to_string());
        }

        // The scanner is read-only; writing a report over the image it is
        // scanning must be refused.
        if self.dump_output == self.image {
            return Err("dump output must not be the input image".to_string());
        }

        if let Some(map) = &self.map_output {
            if map == &self.image {
                return Err("map output must not be the input image".to_string());
            }
            if map == &self.dump_output {
                return Err(format!(
                    "map and dump outputs must differ (both are {})",
                    map.display()
                ));
            }
        }

        Ok(())
    }
}
