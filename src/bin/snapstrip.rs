use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use snapstrip::{
    BoothConfig, BoothError, BoothResult, CameraDevice, CaptureEvent, CaptureSession,
    CommandShareTarget, Compositor, Customizer, DirectoryShareTarget, FrameDirCamera, HexColor,
    Photo, Severity, ShareTarget, StepEvent, SystemClock, TestPatternCamera, UploadSelection,
    Wizard,
};

#[derive(Parser, Debug)]
#[command(name = "snapstrip", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Take three photos with a camera and build a strip.
    Capture(CaptureArgs),
    /// Build a strip from three existing image files.
    Upload(UploadArgs),
    /// Print the frame colors, background colors and sticker ids.
    Palette,
}

#[derive(Args, Debug)]
struct CaptureArgs {
    /// Directory of still images to replay as the camera feed (test pattern if omitted).
    #[arg(long)]
    frames: Option<PathBuf>,

    #[command(flatten)]
    strip: StripArgs,
}

#[derive(Args, Debug)]
struct UploadArgs {
    /// Image file to place on the strip; pass exactly three times.
    #[arg(long = "photo", required = true)]
    photos: Vec<PathBuf>,

    #[command(flatten)]
    strip: StripArgs,
}

#[derive(Args, Debug)]
struct StripArgs {
    /// Note written on the strip.
    #[arg(long, default_value = "")]
    note: String,

    /// Frame color (must be one of the frame palette entries).
    #[arg(long)]
    frame_color: Option<HexColor>,

    /// Background color (must be one of the background palette entries).
    #[arg(long)]
    background: Option<HexColor>,

    /// Sticker id to place, e.g. `sticker3`.
    #[arg(long)]
    sticker: Option<String>,

    /// Directory the strip PNG is downloaded into.
    #[arg(long, default_value = ".")]
    out: PathBuf,

    /// Share into this outbox directory.
    #[arg(long, conflicts_with = "share_cmd")]
    share_dir: Option<PathBuf>,

    /// Share by running this program with the PNG path.
    #[arg(long)]
    share_cmd: Option<String>,

    /// Booth configuration JSON.
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> ExitCode {
    init_logging();
    let cli = Cli::parse();
    let result = match cli.cmd {
        Command::Capture(args) => cmd_capture(args),
        Command::Upload(args) => cmd_upload(args),
        Command::Palette => {
            cmd_palette();
            Ok(())
        }
    };
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report(&err);
            ExitCode::FAILURE
        }
    }
}

fn init_logging() {
    use tracing_subscriber::{EnvFilter, fmt};

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber).ok();
}

fn report(err: &BoothError) {
    tracing::error!(error = %err, severity = ?err.severity(), "snapstrip failed");
    match err.severity() {
        Severity::Fatal => {
            eprintln!("error: {err}");
            eprintln!("the camera cannot be used; `snapstrip upload` takes existing photos");
        }
        Severity::Recoverable => eprintln!("please fix and retry: {err}"),
        Severity::Notice => eprintln!("notice: {err}"),
    }
}

fn load_config(path: Option<&PathBuf>) -> BoothResult<BoothConfig> {
    match path {
        Some(p) => BoothConfig::from_path(p),
        None => Ok(BoothConfig::default()),
    }
}

fn cmd_capture(args: CaptureArgs) -> BoothResult<()> {
    let cfg = load_config(args.strip.config.as_ref())?;
    let mut wizard = Wizard::new();
    wizard.apply(StepEvent::Started)?;

    let mut camera: Box<dyn CameraDevice> = match &args.frames {
        Some(dir) => Box::new(FrameDirCamera::new(dir)),
        None => Box::new(TestPatternCamera::default()),
    };
    tracing::info!(camera = camera.name(), "opening camera");
    let session = CaptureSession::open(camera.as_mut(), cfg.capture.clone())?;
    let mut clock = SystemClock::new();
    let photos = session.run(&mut clock, &mut print_capture_event)?;

    finish_strip(&mut wizard, photos, &args.strip, &cfg)
}

fn print_capture_event(at: Duration, event: &CaptureEvent) {
    match event {
        CaptureEvent::Countdown { value } if *value > 0 => eprintln!("{value}..."),
        CaptureEvent::PhotoTaken { index, .. } => eprintln!("photo {} taken", index + 1),
        _ => tracing::debug!(at_ms = at.as_millis() as u64, ?event, "capture"),
    }
}

fn cmd_upload(args: UploadArgs) -> BoothResult<()> {
    let cfg = load_config(args.strip.config.as_ref())?;
    let mut wizard = Wizard::new();
    wizard.apply(StepEvent::Started)?;

    let mut selection = UploadSelection::new();
    let added = selection.add_files(&args.photos)?;
    if added < args.photos.len() {
        tracing::warn!(
            given = args.photos.len(),
            kept = added,
            "extra photos ignored"
        );
    }
    let photos = selection.finish()?;

    finish_strip(&mut wizard, photos, &args.strip, &cfg)
}

fn finish_strip(
    wizard: &mut Wizard,
    photos: Vec<Photo>,
    strip: &StripArgs,
    cfg: &BoothConfig,
) -> BoothResult<()> {
    wizard.apply(StepEvent::PhotosCaptured(photos))?;
    wizard.apply(StepEvent::NoteSubmitted(strip.note.clone()))?;

    let mut customizer = Customizer::new();
    if let Some(c) = strip.frame_color {
        customizer.select_frame_color(c)?;
    }
    if let Some(c) = strip.background {
        customizer.select_background_color(c)?;
    }
    if let Some(id) = &strip.sticker {
        customizer.toggle_sticker(id)?;
    }
    let session = wizard.apply(StepEvent::Customized(customizer.submit()))?;

    let compositor = Compositor::from_config(cfg)?;
    let artifact = compositor.render(session)?;
    let path = artifact.save_to_dir(&strip.out)?;
    eprintln!("wrote {}", path.display());

    let target: Option<Box<dyn ShareTarget>> = match (&strip.share_dir, &strip.share_cmd) {
        (Some(dir), _) => Some(Box::new(DirectoryShareTarget::new(dir))),
        (None, Some(cmd)) => Some(Box::new(CommandShareTarget::new(cmd))),
        (None, None) => None,
    };
    if let Some(target) = target {
        match snapstrip::share(&artifact, Some(target.as_ref()), &cfg.export.share_title) {
            Ok(()) => eprintln!("shared via {}", target.name()),
            Err(err) if err.severity() == Severity::Notice => report(&err),
            Err(err) => return Err(err),
        }
    }
    Ok(())
}

fn cmd_palette() {
    println!("frame colors:");
    for (i, c) in snapstrip::FRAME_COLORS.iter().enumerate() {
        println!("  {i:>2} {c}");
    }
    println!("background colors:");
    for (i, c) in snapstrip::BACKGROUND_COLORS.iter().enumerate() {
        println!("  {i:>2} {c}");
    }
    println!("stickers:");
    for id in snapstrip::STICKER_IDS {
        println!("  {id}");
    }
}
