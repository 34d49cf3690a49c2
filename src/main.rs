use clap::{Parser, Subcommand};
use photo_submit::acquire::{Acquirer, FilePicker};
use photo_submit::config::{self, AppConfig};
use photo_submit::imaging::{ImageBackend, RustBackend, calculate_fit_dimensions, get_dimensions};
use photo_submit::output::{self, CheckResult, ConsoleNavigator, ConsoleNotifier};
use photo_submit::session::{
    AddOutcome, Collaborators, SessionError, SessionTimings, UploadSession,
};
use photo_submit::transform::Transformer;
use photo_submit::transport::HttpTransport;
use photo_submit::types::{ImageSource, SubmissionRecord};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "photo-submit")]
#[command(about = "Attach photos to a record and upload them in one request")]
#[command(long_about = "\
Attach photos to a record and upload them in one request

Every image is re-encoded as a JPEG no larger than the configured maximum
edge, then all of them are sent together with the record identifier as a
single multipart/form-data POST:

  barcodeNumber = <record>
  images        = <file>   (repeated)

The endpoint answers {\"isSuccess\": bool, \"message\": string}. A failed
upload is reported and never retried automatically.

Run 'photo-submit gen-config' to generate a documented config.toml.")]
#[command(version)]
struct Cli {
    /// Directory containing config.toml
    #[arg(long, default_value = ".", global = true)]
    config_dir: PathBuf,

    /// Directory for re-encoded upload files
    #[arg(long, default_value = ".photo-submit-temp", global = true)]
    work_dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Re-encode the given images and upload them against a record
    Submit {
        /// Record identifier, e.g. a scanned barcode
        #[arg(long)]
        barcode: String,

        /// Images to treat as camera captures
        #[arg(long = "camera", value_name = "PATH")]
        camera: Vec<PathBuf>,

        /// Images picked from the gallery
        #[arg(value_name = "PATH")]
        paths: Vec<PathBuf>,
    },
    /// Report how each image would be converted, without uploading
    Check {
        #[arg(value_name = "PATH", required = true)]
        paths: Vec<PathBuf>,
    },
    /// Print a stock config.toml with all options documented
    GenConfig,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    match cli.command {
        Command::Submit {
            barcode,
            camera,
            paths,
        } => {
            let config = config::load_config(&cli.config_dir)?;
            submit(&config, cli.work_dir, barcode, paths, camera).await?;
        }
        Command::Check { paths } => {
            let config = config::load_config(&cli.config_dir)?;
            let max_dimension = config.images.max_dimension;
            tokio::task::spawn_blocking(move || check(&paths, max_dimension)).await??;
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

async fn submit(
    config: &AppConfig,
    work_dir: PathBuf,
    barcode: String,
    gallery: Vec<PathBuf>,
    camera: Vec<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let record = SubmissionRecord::new(barcode).ok_or("--barcode must not be blank")?;
    let collaborators = Collaborators {
        transport: Arc::new(HttpTransport::new(&config.endpoint)?),
        notifier: Arc::new(ConsoleNotifier),
        navigator: Arc::new(ConsoleNavigator::default()),
    };
    let transformer = Transformer::new(
        Arc::new(RustBackend::new()),
        work_dir,
        config.images.constraints(),
    );
    let mut session = UploadSession::new(
        record,
        Acquirer::new(FilePicker::new(gallery, camera)),
        transformer,
        collaborators,
    )
    .with_timings(SessionTimings::from(&config.session));

    for source in [ImageSource::Gallery, ImageSource::Camera] {
        loop {
            match session.add_photo(source).await {
                Ok(AddOutcome::Added(_)) => {}
                Ok(AddOutcome::Cancelled) => break,
                // Already shown to the user; keep going with the rest.
                Err(SessionError::Acquire(_) | SessionError::Transform(_)) => {}
                Err(e) => return Err(e.into()),
            }
        }
    }

    output::print_batch(session.record(), session.batch());
    let result = session.submit().await;
    println!("{}", output::format_submit_result(&result));
    result?;
    Ok(())
}

/// Fails when any file cannot be uploaded.
fn check(paths: &[PathBuf], max_dimension: u32) -> Result<(), String> {
    let backend = RustBackend::new();
    println!("==> Checking {} files", paths.len());
    let mut rejected = 0;
    for (i, path) in paths.iter().enumerate() {
        let result = check_one(&backend, path, max_dimension);
        if matches!(result, CheckResult::Rejected(_)) {
            rejected += 1;
        }
        output::print_check_entry(i + 1, path, &result);
    }
    if rejected == 0 {
        println!("==> All images can be uploaded");
        Ok(())
    } else {
        Err(format!(
            "{} of {} files cannot be uploaded",
            rejected,
            paths.len()
        ))
    }
}

fn check_one(backend: &impl ImageBackend, path: &std::path::Path, max_dimension: u32) -> CheckResult {
    match get_dimensions(backend, path) {
        Ok(original) => CheckResult::Ready {
            original,
            upload: calculate_fit_dimensions((original.width, original.height), max_dimension)
                .into(),
        },
        Err(e) => CheckResult::Rejected(e.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageEncoder, RgbImage};
    use tempfile::TempDir;

    fn write_jpeg(path: &std::path::Path, width: u32, height: u32) {
        let img = RgbImage::new(width, height);
        let file = std::fs::File::create(path).unwrap();
        image::codecs::jpeg::JpegEncoder::new(std::io::BufWriter::new(file))
            .write_image(img.as_raw(), width, height, image::ExtendedColorType::Rgb8)
            .unwrap();
    }

    #[test]
    fn check_passes_when_every_file_decodes() {
        let tmp = TempDir::new().unwrap();
        let photo = tmp.path().join("dawn.jpg");
        write_jpeg(&photo, 64, 48);

        assert!(check(&[photo], 1280).is_ok());
    }

    #[test]
    fn check_fails_when_any_file_is_rejected() {
        let tmp = TempDir::new().unwrap();
        let photo = tmp.path().join("dawn.jpg");
        let notes = tmp.path().join("notes.jpg");
        write_jpeg(&photo, 64, 48);
        std::fs::write(&notes, b"not an image").unwrap();

        let err = check(&[photo, notes], 1280).unwrap_err();
        assert_eq!(err, "1 of 2 files cannot be uploaded");
    }

    #[test]
    fn long_help_describes_request_and_retry_policy() {
        use clap::CommandFactory;
        let help = Cli::command().render_long_help().to_string();
        assert!(help.contains("barcodeNumber = <record>"));
        assert!(help.contains("never retried automatically"));
        assert!(!help.contains("on the server"));
    }
}
