//! CLI binary for card2pdf.
//!
//! A thin shim over the library crate: six path flags fill the slots, one
//! run of the generate trigger writes the sheet.

use anyhow::{Context, Result};
use clap::Parser;
use card2pdf::{
    save_to_dir, CardSet, GenerateTrigger, GenerationProgressCallback, ProgressCallback,
    SheetConfig, Slot,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::HashMap;
use std::io;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: one bar over the six slots plus a log line per
/// slot. Slots finish out of order, so lines are keyed by slot.
struct CliProgressCallback {
    bar: ProgressBar,
    start_times: Mutex<HashMap<Slot, Instant>>,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  [{bar:30.green/238}] {pos}/{len} images  {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        let bar = ProgressBar::new(Slot::COUNT as u64);
        bar.set_style(style);
        bar.set_prefix("Preparing");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            start_times: Mutex::new(HashMap::new()),
        })
    }

    fn elapsed_secs(&self, slot: Slot) -> f64 {
        self.start_times
            .lock()
            .ok()
            .and_then(|mut t| t.remove(&slot))
            .map(|t| t.elapsed().as_secs_f64())
            .unwrap_or(0.0)
    }
}

impl GenerationProgressCallback for CliProgressCallback {
    fn on_generation_start(&self, total_slots: usize) {
        self.bar.set_length(total_slots as u64);
        self.bar.set_prefix("Converting");
    }

    fn on_slot_start(&self, slot: Slot) {
        if let Ok(mut times) = self.start_times.lock() {
            times.insert(slot, Instant::now());
        }
        self.bar.set_message(slot.label());
    }

    fn on_slot_complete(&self, slot: Slot, jpeg_len: usize) {
        let secs = self.elapsed_secs(slot);
        self.bar.println(format!(
            "  {} {:<24} {}  {}",
            green("✓"),
            slot.label(),
            dim(&format!("{:>8} bytes", jpeg_len)),
            dim(&format!("{secs:.1}s")),
        ));
        self.bar.inc(1);
    }

    fn on_slot_error(&self, slot: Slot, error: &str) {
        let secs = self.elapsed_secs(slot);
        let msg = if error.chars().count() > 80 {
            let cut: String = error.chars().take(79).collect();
            format!("{cut}\u{2026}")
        } else {
            error.to_string()
        };
        self.bar.println(format!(
            "  {} {:<24} {}  {}",
            red("✗"),
            slot.label(),
            red(&msg),
            dim(&format!("{secs:.1}s")),
        ));
    }

    fn on_generation_complete(&self, _total_slots: usize, _success_count: usize) {
        self.bar.finish_and_clear();
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Write ID-<date>-<epoch>.pdf into the current directory
  card2pdf \
    --student-front s_front.jpg   --student-back s_back.jpg \
    --guardian-front g_front.jpg  --guardian-back g_back.jpg \
    --guarantor-front t_front.png --guarantor-back t_back.png

  # Into another directory, smaller file
  card2pdf ... -o ~/Documents/ids --quality 75

  # Machine-readable summary on stdout
  card2pdf ... --json

LAYOUT:
  One A4 page, three rows (student, guardian, guarantor), back on the left
  and front on the right. Every image is converted to grayscale and
  stretched to 85.6 × 53.98 mm.
"#;

/// Compose six ID card images into one grayscale A4 PDF.
#[derive(Parser, Debug)]
#[command(
    name = "card2pdf",
    version,
    about = "Compose six ID card images into one grayscale A4 PDF",
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Student card, front side.
    #[arg(long, env = "CARD2PDF_STUDENT_FRONT")]
    student_front: Option<PathBuf>,

    /// Student card, back side.
    #[arg(long, env = "CARD2PDF_STUDENT_BACK")]
    student_back: Option<PathBuf>,

    /// Guardian card, front side.
    #[arg(long, env = "CARD2PDF_GUARDIAN_FRONT")]
    guardian_front: Option<PathBuf>,

    /// Guardian card, back side.
    #[arg(long, env = "CARD2PDF_GUARDIAN_BACK")]
    guardian_back: Option<PathBuf>,

    /// Guarantor card, front side.
    #[arg(long, env = "CARD2PDF_GUARANTOR_FRONT")]
    guarantor_front: Option<PathBuf>,

    /// Guarantor card, back side.
    #[arg(long, env = "CARD2PDF_GUARANTOR_BACK")]
    guarantor_back: Option<PathBuf>,

    /// Directory the PDF is written to.
    #[arg(short, long, env = "CARD2PDF_OUTPUT_DIR", default_value = ".")]
    output_dir: PathBuf,

    /// JPEG quality of the embedded images (1–100).
    #[arg(long, env = "CARD2PDF_QUALITY", default_value_t = 92,
          value_parser = clap::value_parser!(u8).range(1..=100))]
    quality: u8,

    /// Number of images converted at the same time (1–6).
    #[arg(short, long, env = "CARD2PDF_CONCURRENCY", default_value_t = 6)]
    concurrency: usize,

    /// Print a JSON summary (file name, placements, stats) on stdout.
    #[arg(long, env = "CARD2PDF_JSON")]
    json: bool,

    /// Disable progress bar.
    #[arg(long, env = "CARD2PDF_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "CARD2PDF_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "CARD2PDF_QUIET")]
    quiet: bool,
}

impl Cli {
    fn card_set(&self) -> CardSet {
        let mut cards = CardSet::new();
        for slot in Slot::ALL {
            let path = match slot {
                Slot::StudentFront => &self.student_front,
                Slot::StudentBack => &self.student_back,
                Slot::GuardianFront => &self.guardian_front,
                Slot::GuardianBack => &self.guardian_back,
                Slot::GuarantorFront => &self.guarantor_front,
                Slot::GuarantorBack => &self.guarantor_back,
            };
            if let Some(path) = path {
                cards.set(slot, path.clone());
            }
        }
        cards
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The progress bar replaces INFO-level logs unless --verbose is given.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Build config ─────────────────────────────────────────────────────
    let progress_cb: Option<ProgressCallback> = if show_progress {
        Some(CliProgressCallback::new() as Arc<dyn GenerationProgressCallback>)
    } else {
        None
    };

    let mut builder = SheetConfig::builder()
        .jpeg_quality(cli.quality)
        .concurrency(cli.concurrency);
    if let Some(cb) = progress_cb {
        builder = builder.progress_callback(cb);
    }
    let config = builder.build().context("Invalid configuration")?;

    // ── Run ──────────────────────────────────────────────────────────────
    let cards = cli.card_set();
    let trigger = GenerateTrigger::new();

    let sheet = match trigger.activate(&cards, &config).await {
        Ok(sheet) => sheet,
        Err(e) => {
            let message = trigger.status().unwrap_or_else(|| e.to_string());
            eprintln!("{} {}", red("✘"), message);
            std::process::exit(1);
        }
    };

    let path = save_to_dir(&sheet, &cli.output_dir)
        .await
        .context("Failed to save the PDF")?;

    if cli.json {
        let json = serde_json::to_string_pretty(&sheet).context("Failed to serialise output")?;
        println!("{json}");
    } else if !cli.quiet {
        eprintln!(
            "{}  {} images  {}ms  →  {}",
            green("✔"),
            Slot::COUNT,
            sheet.stats.total_duration_ms,
            bold(&path.display().to_string()),
        );
        eprintln!(
            "   {} bytes in  /  {} bytes PDF",
            dim(&sheet.stats.input_bytes.to_string()),
            dim(&sheet.stats.pdf_bytes.to_string()),
        );
    }

    Ok(())
}
