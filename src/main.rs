//! CLI entry point for `cloudseed`.

use std::path::{Path, PathBuf};

use clap::{CommandFactory, Parser, Subcommand};

use cloudseed::builder::UserDataBuilder;
use cloudseed::filetype::FileType;

#[derive(Parser)]
#[command(
    name = "cloudseed",
    version,
    about = "Build cloud-init user-data MIME multipart documents"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose logging (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Assemble a user-data document from payload files
    Build {
        /// Boothook payload file (runs earliest during boot)
        #[arg(long, value_name = "FILE")]
        boothook: Option<PathBuf>,

        /// Include-URL-list payload file (one URL per line)
        #[arg(long, value_name = "FILE")]
        include_urls: Option<PathBuf>,

        /// Part-handler payload file (python code)
        #[arg(long, value_name = "FILE")]
        part_handler: Option<PathBuf>,

        /// Cloud-config payload file (#cloud-config YAML)
        #[arg(long, value_name = "FILE")]
        cloud_config: Option<PathBuf>,

        /// User shell script payload file (runs rc.local-late)
        #[arg(long, value_name = "FILE")]
        shell_script: Option<PathBuf>,

        /// Upstart job payload file (placed into /etc/init)
        #[arg(long, value_name = "FILE")]
        upstart_job: Option<PathBuf>,

        /// Charset label for part bodies (defaults to config, then utf-8)
        #[arg(long, value_name = "LABEL")]
        charset: Option<String>,

        /// Base64-encode the document for use as a launch parameter
        #[arg(long)]
        base64: bool,

        /// Explicit part order as a comma-separated category list
        /// (e.g. "shell-script,cloud-config")
        #[arg(long, value_name = "CATEGORIES", value_delimiter = ',')]
        order: Vec<String>,

        /// Write the document to a file instead of stdout
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
    /// List the supported payload categories
    Categories {
        #[arg(long)]
        json: bool,
    },
    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
    /// Generate a man page
    Manpage,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = cloudseed::config::load_config();

    // Configure logging: stderr + optional log file
    let log_level = match cli.verbose {
        0 => config.general.log_level.as_str(),
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    setup_logging(log_level, &config);

    match cli.command {
        Commands::Build {
            boothook,
            include_urls,
            part_handler,
            cloud_config,
            shell_script,
            upstart_job,
            charset,
            base64,
            order,
            output,
        } => {
            let payloads = [
                (FileType::CloudBoothook, boothook),
                (FileType::IncludeUrl, include_urls),
                (FileType::PartHandler, part_handler),
                (FileType::CloudConfig, cloud_config),
                (FileType::ShellScript, shell_script),
                (FileType::UpstartJob, upstart_job),
            ];
            let charset = charset.unwrap_or_else(|| config.output.charset.clone());
            let base64 = base64 || config.output.base64;
            cmd_build(&payloads, &charset, base64, &order, output.as_deref())
        }
        Commands::Categories { json } => cmd_categories(json),
        Commands::Completions { shell } => cmd_completions(shell),
        Commands::Manpage => cmd_manpage(),
    }
}

/// Set up tracing with stderr output and optional file logging.
fn setup_logging(level: &str, config: &cloudseed::config::Config) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    let stderr_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    // Try to set up file logging
    let log_dir = cloudseed::config::cache_dir(config);
    if std::fs::create_dir_all(&log_dir).is_ok() {
        let file_appender = tracing_appender::rolling::never(&log_dir, "cloudseed.log");
        let file_layer = tracing_subscriber::fmt::layer()
            .with_ansi(false)
            .with_writer(file_appender);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(stderr_layer)
            .with(file_layer)
            .init();
    } else {
        // Fall back to stderr only
        tracing_subscriber::registry()
            .with(env_filter)
            .with(stderr_layer)
            .init();
    }
}

/// Assemble the user-data document and write it out.
fn cmd_build(
    payloads: &[(FileType, Option<PathBuf>)],
    charset: &str,
    base64: bool,
    order: &[String],
    output: Option<&Path>,
) -> anyhow::Result<()> {
    let selected: Vec<(FileType, &Path)> = ordered_payloads(payloads, order)?;

    if selected.is_empty() {
        tracing::warn!("no payload files given; building an empty document");
    }

    let mut builder = UserDataBuilder::start_with_charset(charset)?;
    for (file_type, path) in &selected {
        tracing::info!(category = %file_type, path = %path.display(), "Adding part");
        builder.add_file_from_path(*file_type, path)?;
    }

    let document = if base64 {
        builder.build_base64()?
    } else {
        builder.build()?
    };

    match output {
        Some(path) => {
            std::fs::write(path, &document)?;
            eprintln!(
                "  Wrote {} part(s), {} bytes to {}",
                selected.len(),
                document.len(),
                path.display()
            );
        }
        None => print!("{document}"),
    }

    Ok(())
}

/// Resolve the part order: `--order` when given, otherwise the fixed
/// boot-relevant order the payload table is declared in.
fn ordered_payloads<'a>(
    payloads: &'a [(FileType, Option<PathBuf>)],
    order: &[String],
) -> anyhow::Result<Vec<(FileType, &'a Path)>> {
    if order.is_empty() {
        return Ok(payloads
            .iter()
            .filter_map(|(ft, path)| path.as_deref().map(|p| (*ft, p)))
            .collect());
    }

    let mut selected = Vec::with_capacity(order.len());
    for name in order {
        let file_type = FileType::from_name(name).ok_or_else(|| {
            anyhow::anyhow!(
                "Unknown category '{}'. Supported: {}",
                name,
                category_names().join(", ")
            )
        })?;
        let path = payloads
            .iter()
            .find(|(ft, _)| *ft == file_type)
            .and_then(|(_, p)| p.as_deref())
            .ok_or_else(|| anyhow::anyhow!("--order names '{}' but no payload file was given for it", name))?;
        selected.push((file_type, path));
    }

    // A supplied payload flag that --order leaves out would silently
    // shrink the document; treat it as a mistake.
    for (ft, path) in payloads {
        if path.is_some() && !selected.iter().any(|(sel, _)| sel == ft) {
            anyhow::bail!(
                "a {} payload was given but --order omits it; add it to --order or drop the flag",
                ft.name()
            );
        }
    }
    Ok(selected)
}

fn category_names() -> Vec<&'static str> {
    FileType::ALL.iter().map(|ft| ft.name()).collect()
}

/// Print the category registry as a table or as JSON.
fn cmd_categories(json: bool) -> anyhow::Result<()> {
    if json {
        let items: Vec<serde_json::Value> = FileType::ALL
            .iter()
            .map(|ft| {
                serde_json::json!({
                    "category": ft,
                    "mime_type": ft.mime_type(),
                    "mime_subtype": ft.mime_subtype(),
                    "file_name": ft.file_name(),
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&items)?);
        return Ok(());
    }

    println!();
    println!(
        "  {:<18} {:<22} {:<30}",
        "Category", "MIME type", "Part filename"
    );
    println!("  {}", "-".repeat(70));
    for ft in FileType::ALL {
        println!(
            "  {:<18} {:<22} {:<30}",
            ft.name(),
            ft.mime_type(),
            ft.file_name()
        );
    }
    println!();
    Ok(())
}

/// Generate shell completions and print to stdout.
fn cmd_completions(shell: clap_complete::Shell) -> anyhow::Result<()> {
    let mut cmd = Cli::command();
    clap_complete::generate(shell, &mut cmd, "cloudseed", &mut std::io::stdout());
    Ok(())
}

/// Generate a man page and print to stdout.
fn cmd_manpage() -> anyhow::Result<()> {
    let cmd = Cli::command();
    let man = clap_mangen::Man::new(cmd);
    let mut buf = Vec::new();
    man.render(&mut buf)?;
    std::io::Write::write_all(&mut std::io::stdout(), &buf)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload_table(
        cloud_config: Option<&str>,
        shell_script: Option<&str>,
    ) -> Vec<(FileType, Option<PathBuf>)> {
        vec![
            (FileType::CloudConfig, cloud_config.map(PathBuf::from)),
            (FileType::ShellScript, shell_script.map(PathBuf::from)),
        ]
    }

    #[test]
    fn test_ordered_payloads_default_order() {
        let payloads = payload_table(Some("cfg.yaml"), Some("run.sh"));
        let selected = ordered_payloads(&payloads, &[]).unwrap();
        assert_eq!(selected.len(), 2);
        assert_eq!(selected[0].0, FileType::CloudConfig);
        assert_eq!(selected[1].0, FileType::ShellScript);
    }

    #[test]
    fn test_ordered_payloads_explicit_order() {
        let payloads = payload_table(Some("cfg.yaml"), Some("run.sh"));
        let order = vec!["shell-script".to_string(), "cloud-config".to_string()];
        let selected = ordered_payloads(&payloads, &order).unwrap();
        assert_eq!(selected[0].0, FileType::ShellScript);
        assert_eq!(selected[1].0, FileType::CloudConfig);
    }

    #[test]
    fn test_ordered_payloads_unknown_category() {
        let payloads = payload_table(Some("cfg.yaml"), None);
        let order = vec!["cloud-confg".to_string()];
        let err = ordered_payloads(&payloads, &order).unwrap_err();
        assert!(err.to_string().contains("Unknown category"));
    }

    #[test]
    fn test_ordered_payloads_order_without_flag() {
        let payloads = payload_table(Some("cfg.yaml"), None);
        let order = vec!["shell-script".to_string()];
        let err = ordered_payloads(&payloads, &order).unwrap_err();
        assert!(err.to_string().contains("no payload file was given"));
    }

    #[test]
    fn test_ordered_payloads_rejects_omitted_flag() {
        // --order naming only one of two supplied payloads must not
        // silently drop the other from the document.
        let payloads = payload_table(Some("cfg.yaml"), Some("run.sh"));
        let order = vec!["cloud-config".to_string()];
        let err = ordered_payloads(&payloads, &order).unwrap_err();
        assert!(err.to_string().contains("--order omits it"));
    }
}
