mod menu;
mod prompt;
mod settings;

use std::io;
use std::path::PathBuf;
use std::process;
use std::time::Duration;

use clap::Parser;

use video_edit_core::editing::infrastructure::stage_factory::create_stage_chain;
use video_edit_core::pipeline::edit_session::{
    EditSession, OutputTarget, SessionOutcome, SessionReport,
};
use video_edit_core::pipeline::pipeline_logger::StdoutPipelineLogger;
use video_edit_core::preview::domain::frame_preview::FramePreview;
use video_edit_core::preview::infrastructure::key_listener::KeyListener;
use video_edit_core::preview::infrastructure::null_preview::NullPreview;
use video_edit_core::preview::infrastructure::snapshot_preview::SnapshotPreview;
use video_edit_core::shared::constants::{CANCEL_KEY, SUPPORTED_CODECS};
use video_edit_core::video::infrastructure::ffmpeg_reader::FfmpegReader;
use video_edit_core::video::infrastructure::ffmpeg_writer::FfmpegWriter;
use video_edit_core::video::infrastructure::image_file_writer::ImageFileWriter;

use prompt::Prompter;
use settings::EditorSettings;

/// Interactive video editor: trim, rotate, resize, filter and caption a video.
///
/// Paths and edits are asked for on stdin. Flags only change how the
/// output is written and previewed.
#[derive(Parser, Debug)]
#[command(name = "video-edit", version)]
struct Cli {
    /// Do not write preview snapshots or listen for the cancel key.
    #[arg(long)]
    no_preview: bool,

    /// Where to write the preview snapshot (PNG).
    #[arg(long)]
    preview_path: Option<PathBuf>,

    /// Pause after each frame while previewing, in milliseconds.
    #[arg(long)]
    delay_ms: Option<u64>,

    /// Write the preview snapshot every N frames.
    #[arg(long)]
    snapshot_every: Option<usize>,

    /// Font file used for the text overlay.
    #[arg(long)]
    font: Option<PathBuf>,

    /// Output codec: mpeg4 or mjpeg.
    #[arg(long)]
    codec: Option<String>,

    /// Store the effective options as the new defaults.
    #[arg(long)]
    save_settings: bool,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

/// Errors returned from here exit with status 1. Anything that goes wrong
/// once editing has started is reported and exits with status 0.
fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let settings = apply_overrides(&cli, EditorSettings::load());
    validate(&settings)?;
    if cli.save_settings {
        let path = settings.save()?;
        log::info!("Settings saved to {}", path.display());
    }

    let stdin = io::stdin();
    let mut prompter = Prompter::new(stdin.lock(), io::stdout());
    let input = PathBuf::from(prompter.line("Enter the video file path: ")?.trim());
    let output = PathBuf::from(
        prompter
            .line("Enter the output file path (including .avi extension): ")?
            .trim(),
    );

    let mut session = EditSession::new(
        Box::new(FfmpegReader::new()),
        Box::new(StdoutPipelineLogger::default()),
    );
    session.open(&input)?;

    let request = menu::collect_request(&mut prompter)?;
    drop(prompter);

    let params = session.resolve(&request)?;
    let chain = match create_stage_chain(&params, settings.font_path.as_deref()) {
        Ok(chain) => chain,
        Err(e) => {
            session.abort();
            eprintln!("Error: {e}");
            return Ok(());
        }
    };

    let target = OutputTarget {
        path: output,
        codec: settings.codec.clone(),
    };
    match session.run(
        &chain,
        Box::new(FfmpegWriter::new()),
        build_preview(&settings),
        &target,
    ) {
        Ok(report) => print_report(&report),
        Err(e) => eprintln!("Error: {e}"),
    }
    Ok(())
}

fn apply_overrides(cli: &Cli, mut settings: EditorSettings) -> EditorSettings {
    if cli.no_preview {
        settings.preview_enabled = false;
    }
    if let Some(path) = &cli.preview_path {
        settings.preview_path = Some(path.clone());
    }
    if let Some(ms) = cli.delay_ms {
        settings.preview_delay_ms = ms;
    }
    if let Some(n) = cli.snapshot_every {
        settings.snapshot_every = n;
    }
    if let Some(font) = &cli.font {
        settings.font_path = Some(font.clone());
    }
    if let Some(codec) = &cli.codec {
        settings.codec = codec.to_lowercase();
    }
    settings
}

fn validate(settings: &EditorSettings) -> Result<(), Box<dyn std::error::Error>> {
    if !SUPPORTED_CODECS.contains(&settings.codec.as_str()) {
        return Err(format!(
            "Codec must be one of: {}, got '{}'",
            SUPPORTED_CODECS.join(", "),
            settings.codec
        )
        .into());
    }
    if settings.snapshot_every == 0 {
        return Err("Snapshot interval must be at least 1".into());
    }
    Ok(())
}

fn build_preview(settings: &EditorSettings) -> Box<dyn FramePreview> {
    if !settings.preview_enabled {
        return Box::new(NullPreview);
    }
    let path = settings.preview_path();
    println!(
        "Previewing frames in {} (type '{CANCEL_KEY}' and press Enter to stop).",
        path.display()
    );
    Box::new(
        SnapshotPreview::new(Box::new(ImageFileWriter::new()), path)
            .with_every(settings.snapshot_every)
            .with_delay(Duration::from_millis(settings.preview_delay_ms))
            .with_keys(KeyListener::stdin()),
    )
}

fn print_report(report: &SessionReport) {
    match report.outcome {
        SessionOutcome::Completed => {}
        SessionOutcome::Cancelled => println!("Video playback interrupted by user."),
        SessionOutcome::Interrupted => {
            if let Some(e) = &report.stream_error {
                eprintln!("Error: {e}");
            }
        }
    }
    let (w, h) = report.output_size;
    println!(
        "Wrote {} frames ({w}x{h}), skipped {}.",
        report.frames_written, report.frames_skipped
    );
    println!("Processed video saved to: {}", report.output_path.display());
}
