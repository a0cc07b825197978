use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use tmstyle_highlight::OUTPUT_SUFFIX;
use tmstyle_settings::ScopeSettings;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Printed when no theme is given. The process still exits with status 0.
const USAGE_MESSAGE: &str = "Please provide the .tmTheme file!";

#[derive(Parser)]
#[command(
    name = "tmtheme2css",
    about = "Convert a TextMate .tmTheme into a Pygments highlight stylesheet",
    author,
    version
)]
struct Cli {
    /// 要轉換的 TextMate 主題。 / TextMate theme to convert.
    #[arg(value_name = "THEME")]
    theme: Option<PathBuf>,

    /// 輸出樣式表，預設為主題旁的 `<THEME stem>-Highlight.css`。 / Destination stylesheet; defaults to `<THEME stem>-Highlight.css` next to the theme.
    #[arg(value_name = "OUTPUT")]
    output: Option<PathBuf>,
}

fn main() {
    init_tracing();
    if let Err(err) = run() {
        eprintln!("Error: {err:#}");
        std::process::exit(1);
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run() -> Result<()> {
    let Cli { theme, output } = Cli::parse();
    let Some(theme) = theme else {
        println!("{USAGE_MESSAGE}");
        return Ok(());
    };

    let theme = absolute_path(&theme)?;
    let output = match output {
        Some(path) => absolute_path(&path)?,
        None => default_output_path(&theme)?,
    };

    let settings = ScopeSettings::from_file(&theme)
        .with_context(|| format!("failed to read theme {}", theme.display()))?;
    let stylesheet = settings.to_stylesheet();

    let file = File::create(&output)
        .with_context(|| format!("failed to create {}", output.display()))?;
    stylesheet
        .write_to(BufWriter::new(file))
        .with_context(|| format!("failed to write {}", output.display()))?;

    info!(
        theme = %theme.display(),
        output = %output.display(),
        rules = stylesheet.rules().iter().filter(|rule| !rule.is_empty()).count(),
        "stylesheet written"
    );
    println!("Wrote {}", output.display());
    Ok(())
}

fn absolute_path(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(std::env::current_dir()
            .context("determine current directory")?
            .join(path))
    }
}

/// `<dir>/<stem>-Highlight.css` beside the theme file.
fn default_output_path(theme: &Path) -> Result<PathBuf> {
    let mut name = theme
        .file_stem()
        .ok_or_else(|| anyhow!("cannot derive an output name from {}", theme.display()))?
        .to_os_string();
    name.push(OUTPUT_SUFFIX);
    let directory = theme.parent().unwrap_or_else(|| Path::new(""));
    Ok(directory.join(name))
}
