use std::io::BufRead as _;
use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};
use sha2::Digest as _;
use signplate::{EncodedImage, Presentation, SignplateResult};

#[derive(Parser, Debug)]
#[command(name = "signplate", version)]
struct Cli {
    /// Log verbosity (repeat for more).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Stamp one caption onto an image.
    Render(RenderArgs),
    /// Read captions from stdin, one per line, refreshing a preview and a download file.
    Watch(WatchArgs),
    /// Print the family name and SHA-256 of a font file.
    Fonts(FontsArgs),
}

#[derive(Parser, Debug)]
struct StyleArgs {
    /// Source image (PNG, JPEG, WebP, ... or SVG).
    #[arg(long)]
    image: PathBuf,

    /// Font file for the caption; overrides `text.font_source` from the settings file.
    #[arg(long)]
    font: Option<PathBuf>,

    /// Settings JSON.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output format; overrides `image.format` from the settings file.
    #[arg(long, value_enum)]
    format: Option<FormatChoice>,

    /// Padding in pixels; overrides `image.padding` from the settings file.
    #[arg(long)]
    padding: Option<f32>,
}

#[derive(Parser, Debug)]
struct RenderArgs {
    #[command(flatten)]
    style: StyleArgs,

    /// Caption text.
    #[arg(long)]
    text: String,

    /// Output image path.
    #[arg(long)]
    out: PathBuf,

    /// Also write the output as a `data:` URI to this path.
    #[arg(long)]
    data_uri: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct WatchArgs {
    #[command(flatten)]
    style: StyleArgs,

    /// Preview image path, refreshed on every non-empty caption.
    #[arg(long)]
    preview: PathBuf,

    /// Download image path; removed when the caption becomes empty.
    #[arg(long)]
    download: PathBuf,

    /// Mirror the download as a `data:` URI at this path.
    #[arg(long)]
    data_uri: Option<PathBuf>,

    /// Handle input before the image finishes loading (those events are dropped).
    #[arg(long, default_value_t = false)]
    eager: bool,
}

#[derive(Parser, Debug)]
struct FontsArgs {
    /// Font file to inspect.
    #[arg(long)]
    font: PathBuf,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum FormatChoice {
    Jpeg,
    Png,
}

impl FormatChoice {
    fn mime(self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::Watch(args) => cmd_watch(args),
        Command::Fonts(args) => cmd_fonts(args),
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn settings_def(style: &StyleArgs) -> anyhow::Result<signplate::SettingsDef> {
    let mut def = match &style.config {
        Some(path) => signplate::SettingsDef::from_path(path)?,
        None => signplate::SettingsDef::default(),
    };
    if let Some(font) = &style.font {
        def.text.font_source = Some(font.clone());
    }
    if let Some(format) = style.format {
        def.image.format = Some(format.mime().to_owned());
    }
    if let Some(padding) = style.padding {
        def.image.padding = Some(padding);
    }
    Ok(def)
}

/// Single-file output: the preview and download are the same file.
struct OutputFile {
    path: PathBuf,
    data_uri: Option<PathBuf>,
}

impl Presentation for OutputFile {
    fn set_preview(&mut self, _artifact: &EncodedImage) -> SignplateResult<()> {
        Ok(())
    }

    fn set_download(&mut self, artifact: &EncodedImage) -> SignplateResult<()> {
        artifact.save(&self.path)?;
        if let Some(uri_path) = &self.data_uri {
            artifact.save_data_uri(uri_path)?;
        }
        Ok(())
    }

    fn clear_download(&mut self) -> SignplateResult<()> {
        Ok(())
    }
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let def = settings_def(&args.style)?;
    let image = signplate::load_source_image(&args.style.image)?;
    let mut session = signplate::SignSession::new(signplate::ImageLoad::ready(image), def);

    let mut out = OutputFile {
        path: args.out.clone(),
        data_uri: args.data_uri.clone(),
    };
    match session.handle_input(&args.text, &mut out)? {
        signplate::InputOutcome::Published { caption, .. } => {
            if caption != args.text {
                eprintln!("caption truncated to {caption:?}");
            }
            eprintln!("wrote {}", args.out.display());
            if let Some(uri) = &args.data_uri {
                eprintln!("wrote {}", uri.display());
            }
        }
        signplate::InputOutcome::Cleared => {
            eprintln!("caption is empty after fitting; nothing written");
        }
        signplate::InputOutcome::ImageNotReady => {
            anyhow::bail!("image was not ready after a blocking load (bug)");
        }
    }
    Ok(())
}

fn cmd_watch(args: WatchArgs) -> anyhow::Result<()> {
    let def = settings_def(&args.style)?;
    let load = signplate::ImageLoad::spawn(&args.style.image);
    let mut session = signplate::SignSession::new(load, def);
    if !args.eager {
        session
            .wait_for_image()
            .with_context(|| format!("load '{}'", args.style.image.display()))?;
    }

    let mut sinks = signplate::FilePresentation::new(&args.preview, &args.download);
    if let Some(uri) = &args.data_uri {
        sinks = sinks.with_data_uri(uri);
    }

    // The page fires one event on load, before anything is typed.
    report(session.handle_input("", &mut sinks)?, &args.download);

    let stdin = std::io::stdin();
    for line in stdin.lock().lines() {
        let line = line.context("read caption from stdin")?;
        report(session.handle_input(&line, &mut sinks)?, &args.download);
    }
    Ok(())
}

fn report(outcome: signplate::InputOutcome, download: &Path) {
    match outcome {
        signplate::InputOutcome::Published { caption, .. } => {
            eprintln!("{caption:?} -> {}", download.display());
        }
        signplate::InputOutcome::Cleared => eprintln!("cleared {}", download.display()),
        signplate::InputOutcome::ImageNotReady => eprintln!("image still loading; input dropped"),
    }
}

fn cmd_fonts(args: FontsArgs) -> anyhow::Result<()> {
    let bytes = std::fs::read(&args.font)
        .with_context(|| format!("read font '{}'", args.font.display()))?;
    let sha = sha256_hex(&bytes);
    let shaper =
        signplate::TextShaper::from_font_bytes(bytes, 32.0, signplate::ColorDef::default())?;

    println!("font_source: {}", args.font.display());
    println!("family:      {}", shaper.family_name());
    println!("sha256:      {sha}");
    Ok(())
}

fn sha256_hex(bytes: &[u8]) -> String {
    let digest = sha2::Sha256::digest(bytes);
    let mut out = String::with_capacity(digest.len() * 2);
    for b in digest {
        out.push_str(&format!("{:02x}", b));
    }
    out
}
