// KTP verification from the command line

use clap::Parser;
use ktpcheck::{
    models::{ClaimSet, EvaluationReport},
    utils::{KtpError, PipelineConfig},
    KtpValidator,
};
use log::{error, info};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "ktpcheck", about = "Check claimed identity details against a KTP photo")]
struct Args {
    /// Photo of the card (png, jpg, jpeg or bmp)
    #[arg(long)]
    image: PathBuf,

    #[arg(long, default_value = "")]
    name: String,

    /// Place and date of birth, e.g. "JAKARTA, 17-08-1985"
    #[arg(long, default_value = "")]
    place_dob: String,

    #[arg(long, default_value = "")]
    address: String,

    #[arg(long, default_value = "")]
    religion: String,

    #[arg(long, default_value = "")]
    blood_type: String,

    /// JSON configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory containing Tesseract traineddata files
    #[arg(long)]
    tessdata: Option<PathBuf>,

    /// OCR language tried before the fallback
    #[arg(long)]
    lang: Option<String>,

    /// Matched claims required for success
    #[arg(long)]
    threshold: Option<usize>,

    /// Print the full report as JSON
    #[arg(long)]
    json: bool,
}

fn load_config(args: &Args) -> Result<PipelineConfig, KtpError> {
    let mut config = match &args.config {
        Some(path) => PipelineConfig::from_file(path)?,
        None => PipelineConfig::default(),
    };
    if let Some(tessdata) = &args.tessdata {
        config.ocr.tessdata_path = Some(tessdata.clone());
    }
    if let Some(lang) = &args.lang {
        config.ocr.language = lang.clone();
    }
    if let Some(threshold) = args.threshold {
        config.verdict.match_threshold = threshold;
    }
    config.validate()?;
    Ok(config)
}

/// Upload checks done before any decoding: extension allow-list and size limit.
fn read_upload(path: &Path, config: &PipelineConfig) -> Result<(Vec<u8>, String), KtpError> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .unwrap_or_default();
    if !config.upload.is_allowed(&extension) {
        return Err(KtpError::UnsupportedFormat(format!(
            "{:?}: file must be PNG, JPG, JPEG or BMP",
            path
        )));
    }

    let size = std::fs::metadata(path)?.len();
    if size > config.upload.max_file_size {
        return Err(KtpError::IoError(format!(
            "{:?} is {} bytes, limit is {}",
            path, size, config.upload.max_file_size
        )));
    }

    let bytes = std::fs::read(path)?;
    info!("Read {} bytes from {:?}", bytes.len(), path);
    Ok((bytes, extension))
}

fn print_report(report: &EvaluationReport) {
    println!("\n===============================================");
    println!("          KTP VERIFICATION REPORT");
    println!("===============================================\n");

    println!("NIK:");
    if report.identifiers.is_empty() {
        println!("  (none found)");
    }
    for nik in &report.identifiers {
        println!("  {}", nik);
    }

    println!("\nEXTRACTED FIELDS:");
    for field in &report.extracted_fields.fields {
        println!("  {}: {}", field.label, field.display_value());
    }

    println!("\nCLAIM CHECKS:");
    for check in &report.matches.checks {
        println!("  {}: {:?} -> {}", check.label, check.claim, check.status);
    }

    println!(
        "\nMatched {} of {} (need {}): {}",
        report.verdict.matched,
        report.matches.checks.len(),
        report.verdict.threshold,
        if report.verdict.success {
            "SUCCESS"
        } else {
            "FAILED"
        }
    );
}

fn run(args: &Args) -> Result<EvaluationReport, KtpError> {
    let config = load_config(args)?;
    let (bytes, extension) = read_upload(&args.image, &config)?;
    let claims = ClaimSet::new(
        &args.name,
        &args.place_dob,
        &args.address,
        &args.religion,
        &args.blood_type,
    );

    KtpValidator::new(&config)?.evaluate(&bytes, &extension, &claims)
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    match run(&args) {
        Ok(report) => {
            if args.json {
                match serde_json::to_string_pretty(&report) {
                    Ok(json) => println!("{}", json),
                    Err(err) => {
                        error!("Failed to serialize report: {}", err);
                        return ExitCode::from(2);
                    }
                }
            } else {
                print_report(&report);
            }
            if report.verdict.success {
                ExitCode::SUCCESS
            } else {
                ExitCode::from(1)
            }
        }
        Err(err) => {
            error!("Error in evaluation ({}): {}", err.kind(), err);
            ExitCode::from(2)
        }
    }
}
