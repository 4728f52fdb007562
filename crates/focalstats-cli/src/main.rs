use std::path::PathBuf;

use clap::Parser;
use focalstats_core::Backend;
use indicatif::{ProgressBar, ProgressStyle};

#[derive(Parser)]
#[command(name = "focalstats", version, about = "Focal-length usage statistics for a folder of photos")]
struct Cli {
    /// Folder of photos (scanned recursively, reports are written into it)
    folder: PathBuf,

    /// exiftool executable
    #[arg(long, default_value = "exiftool")]
    exiftool: PathBuf,

    /// Metadata reader
    #[arg(long, value_enum, default_value_t = Backend::Exiftool)]
    backend: Backend,

    /// TrueType font for chart labels (defaults to a system font)
    #[arg(long)]
    font: Option<PathBuf>,

    /// Print the result summary as JSON on stdout
    #[arg(long)]
    json: bool,
}

/// Expand a leading `~` to the home directory.
fn expand_home(path: PathBuf) -> PathBuf {
    let Ok(rest) = path.strip_prefix("~") else {
        return path;
    };
    match dirs::home_dir() {
        Some(home) => home.join(rest),
        None => path,
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let t_total = std::time::Instant::now();

    let options = focalstats_core::AnalyzeOptions {
        folder: expand_home(cli.folder),
        exiftool: cli.exiftool,
        backend: cli.backend,
        font: cli.font,
    };

    let pb = ProgressBar::new(0);
    let started = std::sync::Once::new();
    let result = focalstats_core::analyze(&options, &|stage, current, total, _message| {
        if stage != "scan" {
            pb.finish_and_clear();
            return;
        }
        started.call_once(|| {
            pb.set_length(total);
            let width = total.to_string().len();
            if let Ok(style) = ProgressStyle::with_template(&format!(
                "[ {{pos:>{width}}} / {{len}} ] scanning..."
            )) {
                pb.set_style(style);
            }
        });
        pb.set_position(current);
    });
    pb.finish_and_clear();
    let result = result?;

    for warning in &result.warnings {
        log::debug!("{warning}");
    }

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    }

    eprintln!(
        "Scanned {} files, {} with focal data, {} skipped ({:.2}s)",
        result.files_found,
        result.files_with_focal,
        result.files_skipped,
        t_total.elapsed().as_secs_f64()
    );
    eprintln!(
        "Done!  • {}  • {}  • {}",
        focalstats_core::report::HISTOGRAM_CSV,
        focalstats_core::report::CAMERA_USAGE_CSV,
        focalstats_core::report::HISTOGRAM_PNG
    );

    Ok(())
}
