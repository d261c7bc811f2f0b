// Demo front-end for the KYC decision pipeline; all real integrations call
// the library directly with in-memory bytes

use clap::Parser;
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use vetter::models::{DecisionRecord, ImagePair};
use vetter::KycPipeline;

#[derive(Parser)]
#[command(
    name = "vetter",
    about = "Run the KYC decision pipeline over a document image and a selfie"
)]
struct Args {
    /// Path to the identity document image (PNG/JPEG)
    document: PathBuf,

    /// Path to the selfie image (PNG/JPEG)
    selfie: PathBuf,

    /// Applicant-supplied name, which overrides the OCR-derived name
    #[arg(long)]
    name: Option<String>,

    /// Print the decision record as JSON instead of the report
    #[arg(long)]
    json: bool,
}

fn print_report(record: &DecisionRecord) {
    println!("\n===============================================");
    println!("            KYC DECISION REPORT");
    println!("===============================================\n");

    println!("IDENTITY CLAIM:");
    println!("  Name: {}", record.name.as_deref().unwrap_or("Unknown"));
    println!(
        "  Date of Birth: {}",
        record.date_of_birth.as_deref().unwrap_or("Unknown")
    );

    println!("\nSIGNALS:");
    println!("  OCR characters: {}", record.ocr_text.trim().len());
    println!("  Face confidence: {}", format_signal(record.face_confidence));
    println!("  Liveness score: {}", format_signal(record.liveness_score));
    println!("  Blur severity: {}", format_signal(record.blur_severity));

    println!("\nDECISION:");
    println!("  Risk: {}", record.risk);
    for reason in &record.reasons {
        println!("  - {}", reason);
    }
    println!("  Suggested: {}", record.suggestion);
}

fn format_signal(value: Option<f64>) -> String {
    match value {
        Some(v) => v.to_string(),
        None => "n/a".to_string(),
    }
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();

    let document = match fs::read(&args.document) {
        Ok(bytes) => bytes,
        Err(e) => {
            eprintln!("Failed to read {}: {}", args.document.display(), e);
            return ExitCode::FAILURE;
        }
    };
    let selfie = match fs::read(&args.selfie) {
        Ok(bytes) => bytes,
        Err(e) => {
            eprintln!("Failed to read {}: {}", args.selfie.display(), e);
            return ExitCode::FAILURE;
        }
    };

    let pipeline = KycPipeline::new();
    let pair = ImagePair::new(document, selfie);
    let record = pipeline.process(&pair, args.name.as_deref());

    if args.json {
        match serde_json::to_string_pretty(&record) {
            Ok(rendered) => println!("{}", rendered),
            Err(e) => {
                eprintln!("Failed to serialize record: {}", e);
                return ExitCode::FAILURE;
            }
        }
    } else {
        print_report(&record);
    }

    ExitCode::SUCCESS
}
