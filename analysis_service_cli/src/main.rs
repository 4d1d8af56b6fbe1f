use analysis_service_cli::config::ServiceConfig;
use analysis_service_cli::error::UploadRejection;
use analysis_service_cli::presenter::{self, Strand};
use analysis_service_cli::tracker::JobTracker;
use analysis_service_cli::transport::HttpAnalysisService;
use analysis_service_cli::upload::{self, FileCandidate, UploadFile};
use analysis_service_cli::{utils, FileCategory};
use chrono::Utc;
use clap::Parser;
use colored::Colorize;
use dotenv::dotenv;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(author, version, about = "Upload FASTA, SAM or BAM files for analysis and show the results", long_about = None)]
struct Args {
    /// Files to upload (.fasta, .sam, .bam)
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Upload every file as its own job instead of treating them as one selection
    #[arg(short, long)]
    batch: bool,

    /// Base address of the analysis service (overrides ANALYSIS_SERVICE_URL)
    #[arg(short, long)]
    service_url: Option<String>,

    /// Write one read-length histogram SVG per BAM/SAM job into this directory
    #[arg(long)]
    histogram_dir: Option<PathBuf>,

    /// Save every job as JSON
    #[arg(short, long)]
    report: Option<PathBuf>,

    /// Print the colored sequence and reverse complement of FASTA jobs
    #[arg(long)]
    show_sequences: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1) .env and logging
    dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // 2) Service config, CLI flag wins over the environment
    let args = Args::parse();
    let mut config = ServiceConfig::from_env()?;
    if let Some(url) = &args.service_url {
        config = config.with_base_url(url)?;
    }
    let service = HttpAnalysisService::new(&config)?;
    log::info!("analysis service at {}", service.base_url());
    let tracker = Arc::new(JobTracker::new(Arc::new(service)));

    // 3) Upload: one selection, or one selection per file with --batch
    let selections: Vec<Vec<PathBuf>> = if args.batch {
        args.files.iter().map(|path| vec![path.clone()]).collect()
    } else {
        vec![args.files.clone()]
    };

    let mut resolutions = Vec::new();
    for selection in &selections {
        let path = match pick(selection).await {
            Ok(path) => path,
            Err(message) => {
                failure(&message);
                continue;
            }
        };
        let file = match UploadFile::from_path(path).await {
            Ok(file) => file,
            Err(e) => {
                failure(&format!("{}: {e}", path.display()));
                continue;
            }
        };
        let label = format!("{} (size: {})", file.file_name, upload::format_file_size(file.size()));
        match tracker.track(file).await {
            Ok(tracked) => {
                success(&format!("Uploaded File: {label} -> job {}", tracked.job_id));
                resolutions.push(tracked.resolution);
            }
            Err(e) => {
                log::warn!("{label}: {e}");
                failure(&e.user_message());
            }
        }
    }

    if tracker.is_empty() {
        eprintln!("{}", "No jobs were created.".yellow());
        return Ok(());
    }

    // 4) Wait for every result fetch
    for joined in futures::future::join_all(resolutions).await {
        if let Err(e) = joined {
            log::warn!("result task did not finish: {e}");
        }
    }
    let unsettled = tracker.pending();
    for job in &unsettled {
        failure(&format!("{}: still processing (job {})", job.file_name, job.id));
    }
    log::info!("{} of {} jobs settled", tracker.len() - unsettled.len(), tracker.len());

    // 5) Result tables
    let now = Utc::now();
    let fasta_jobs = tracker.list_by_category(FileCategory::Sequences);
    if !fasta_jobs.is_empty() {
        section(FileCategory::Sequences.label());
        print!("{}", presenter::render_sequence_table(&presenter::sequence_rows(&fasta_jobs), now));
    }
    let alignment_jobs = tracker.list_by_category(FileCategory::Alignments);
    if !alignment_jobs.is_empty() {
        section(FileCategory::Alignments.label());
        print!("{}", presenter::render_alignment_table(&presenter::alignment_rows(&alignment_jobs), now));
    }

    // 6) Colored sequences
    if args.show_sequences {
        for job in &fasta_jobs {
            for strand in [Strand::Forward, Strand::Reverse] {
                if let Some(detail) = presenter::sequence_detail(job, strand) {
                    println!("\n{} {}", format!("job {}", job.id).bold(), detail.title());
                    println!("{}", detail.to_ansi());
                }
            }
        }
    }

    // 7) Histograms
    if let Some(dir) = &args.histogram_dir {
        for job in &alignment_jobs {
            if let Some(chart) = presenter::histogram(job) {
                let path = dir.join(format!("job-{}-read-lengths.svg", job.id));
                utils::save_text(&chart.to_svg(), &path)?;
            }
        }
    }

    // 8) JSON report
    if let Some(path) = &args.report {
        utils::save_json(&tracker.jobs(), path)?;
    }

    Ok(())
}

/// Validates a selection the same way the upload widget does and returns its only file.
async fn pick(selection: &[PathBuf]) -> Result<&PathBuf, String> {
    let mut candidates = Vec::with_capacity(selection.len());
    for path in selection {
        let candidate = FileCandidate::from_path(path)
            .await
            .map_err(|e| format!("{}: {e}", path.display()))?;
        candidates.push(candidate);
    }
    upload::validate_selection(&candidates).map_err(|r| r.to_string())?;
    selection
        .first()
        .ok_or_else(|| UploadRejection::NoFile.to_string())
}

fn section(title: &str) {
    println!();
    println!("{} {}", title.bold().green(), "─".repeat(40).dimmed());
}

fn success(msg: &str) {
    eprintln!("  {} {}", "✓".green().bold(), msg);
}

fn failure(msg: &str) {
    eprintln!("  {} {}", "✗".red().bold(), msg.red());
}
