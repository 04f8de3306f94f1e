use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context as _;
use clap::{ArgAction, Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(name = "gifloom", version)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Assemble images into an animated GIF.
    Build(BuildArgs),
    /// List the built-in canvas size presets.
    Presets,
}

#[derive(Parser, Debug)]
struct BuildArgs {
    /// Settings JSON; command-line flags override its values.
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Canvas width (100-1920). Defaults to the first image's width.
    #[arg(long)]
    width: Option<u32>,

    /// Canvas height (100-1080). Defaults to the first image's height.
    #[arg(long)]
    height: Option<u32>,

    /// Global frame delay in milliseconds (50-5000).
    #[arg(long)]
    delay: Option<u32>,

    /// Per-frame delay override, `INDEX=MS` with a 0-based frame index.
    #[arg(long = "frame-delay", value_parser = parse_frame_delay)]
    frame_delay: Vec<(usize, u32)>,

    /// Looping: `infinite`, `none` or a loop count.
    #[arg(long)]
    repeat: Option<gifloom::Repeat>,

    /// Resampling quality.
    #[arg(long, value_enum)]
    smoothing: Option<SmoothingChoice>,

    /// Quantizer bucket precision.
    #[arg(long, value_enum)]
    palette: Option<PaletteChoice>,

    /// Composite and quantize frames on a rayon pool.
    #[arg(long)]
    parallel: bool,

    /// Output GIF path. Defaults to a timestamped name in the current directory.
    #[arg(long)]
    out: Option<PathBuf>,

    /// Input images in playback order.
    #[arg(required = true)]
    images: Vec<PathBuf>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum SmoothingChoice {
    Low,
    Medium,
    High,
}

impl From<SmoothingChoice> for gifloom::SmoothingQuality {
    fn from(c: SmoothingChoice) -> Self {
        match c {
            SmoothingChoice::Low => Self::Low,
            SmoothingChoice::Medium => Self::Medium,
            SmoothingChoice::High => Self::High,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum PaletteChoice {
    Rgb444,
    Rgb565,
}

impl From<PaletteChoice> for gifloom::PaletteFormat {
    fn from(c: PaletteChoice) -> Self {
        match c {
            PaletteChoice::Rgb444 => Self::Rgb444,
            PaletteChoice::Rgb565 => Self::Rgb565,
        }
    }
}

fn parse_frame_delay(s: &str) -> Result<(usize, u32), String> {
    let (index, ms) = s
        .split_once('=')
        .ok_or_else(|| format!("expected INDEX=MS, got '{s}'"))?;
    let index = index
        .trim()
        .parse::<usize>()
        .map_err(|e| format!("invalid frame index '{index}': {e}"))?;
    let ms = ms
        .trim()
        .parse::<u32>()
        .map_err(|e| format!("invalid delay '{ms}': {e}"))?;
    Ok((index, ms))
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.cmd {
        Command::Build(args) => cmd_build(args),
        Command::Presets => cmd_presets(),
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn load_settings(args: &BuildArgs) -> anyhow::Result<gifloom::GifSettings> {
    let mut settings = match &args.settings {
        Some(path) => gifloom::GifSettings::from_path(path)
            .with_context(|| format!("load settings '{}'", path.display()))?,
        None => gifloom::GifSettings::default(),
    };
    if let Some(ms) = args.delay {
        settings.global_delay_ms = ms;
    }
    if let Some(repeat) = args.repeat {
        settings.repeat = repeat;
    }
    if let Some(s) = args.smoothing {
        settings.canvas.smoothing_quality = s.into();
    }
    if let Some(p) = args.palette {
        settings.palette_format = p.into();
    }
    settings.auto_update = false;
    Ok(settings.validated())
}

fn cmd_build(args: BuildArgs) -> anyhow::Result<()> {
    let settings = load_settings(&args)?;
    let opts = gifloom::GenerateOpts {
        parallel: args.parallel,
        ..gifloom::GenerateOpts::default()
    };
    let workspace =
        gifloom::Workspace::with_options(settings, opts, gifloom::session::DEFAULT_DEBOUNCE_MS);

    for path in &args.images {
        if !path.is_file() {
            anyhow::bail!("input image '{}' does not exist", path.display());
        }
        workspace.add_frame(Arc::new(gifloom::FileSource::new(path)));
    }

    // A settings file's canvas wins over the first image's size; explicit flags win over both.
    workspace.wait_for_canvas_autosize();
    if args.settings.is_some() {
        workspace.set_canvas(settings.canvas);
    }
    if args.width.is_some() || args.height.is_some() {
        let canvas = workspace.settings().canvas;
        workspace.set_canvas(canvas.with_size(
            args.width.unwrap_or(canvas.width),
            args.height.unwrap_or(canvas.height),
        ));
    }

    let ids = workspace.frame_ids();
    for &(index, ms) in &args.frame_delay {
        let id = ids.get(index).with_context(|| {
            format!(
                "--frame-delay index {index} out of range for {} frames",
                ids.len()
            )
        })?;
        workspace.set_custom_delay(*id, ms);
    }

    let outcome = workspace.generate().context("generate gif")?;
    let Some(output) = outcome.output() else {
        anyhow::bail!("generation did not run: {outcome:?}");
    };

    let out = args
        .out
        .clone()
        .unwrap_or_else(|| PathBuf::from(&output.suggested_filename));
    write_output(&out, &output.bytes)?;

    eprintln!(
        "wrote {} ({} frames, {}x{})",
        out.display(),
        output.frame_count,
        output.width,
        output.height
    );
    Ok(())
}

fn write_output(out: &Path, bytes: &[u8]) -> anyhow::Result<()> {
    if let Some(parent) = out.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    std::fs::write(out, bytes).with_context(|| format!("write gif '{}'", out.display()))
}

fn cmd_presets() -> anyhow::Result<()> {
    for preset in gifloom::SIZE_PRESETS {
        println!("{}\t{}x{}", preset.label, preset.width, preset.height);
    }
    Ok(())
}
