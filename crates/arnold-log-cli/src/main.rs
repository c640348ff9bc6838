use anyhow::Context;
use arnold_log::ir::Diagnostic;
use arnold_log::{Group, LogParser};
use clap::{Parser, Subcommand};
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "arnoldlog")]
#[command(about = "Arnold render log statistics", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a render log and emit its statistics as JSON
    Parse {
        /// Path to the log file, or `-` to read stdin
        #[arg(value_name = "FILE")]
        path: PathBuf,

        /// Emit only one group (e.g. `memory_stats`)
        #[arg(long, value_name = "NAME")]
        group: Option<Group>,
    },
    /// List warnings and errors, one per line
    Diagnostics {
        /// Path to the log file, or `-` to read stdin
        #[arg(value_name = "FILE")]
        path: PathBuf,

        #[arg(long)]
        errors_only: bool,
    },
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let stdout = io::stdout();
    run(&cli.command, &mut stdout.lock())
}

fn run(command: &Commands, out: &mut impl Write) -> anyhow::Result<()> {
    match command {
        Commands::Parse { path, group } => {
            let parser = LogParser::new(read_log(path)?);
            let json = match group {
                Some(group) => serde_json::to_string_pretty(&parser.extract(*group))?,
                None => serde_json::to_string_pretty(&parser.summarize())?,
            };
            writeln!(out, "{}", json)?;
        }
        Commands::Diagnostics { path, errors_only } => {
            let parser = LogParser::new(read_log(path)?);
            let diagnostics = if *errors_only {
                parser.errors()
            } else {
                parser.diagnostics()
            };
            log::info!("{} diagnostics", diagnostics.len());
            for diagnostic in &diagnostics {
                writeln!(out, "{}", format_diagnostic(diagnostic))?;
            }
        }
    }
    Ok(())
}

/// Reads the whole log from `path`, or from stdin when `path` is `-`.
fn read_log(path: &Path) -> anyhow::Result<String> {
    let bytes = if path.as_os_str() == "-" {
        let mut buffer = Vec::new();
        io::stdin()
            .read_to_end(&mut buffer)
            .context("failed to read log from stdin")?;
        buffer
    } else {
        fs::read(path).with_context(|| format!("failed to read {}", path.display()))?
    };
    log::debug!("read {} bytes from {}", bytes.len(), path.display());
    String::from_utf8(bytes).with_context(|| format!("{} is not valid UTF-8", path.display()))
}

/// `SEVERITY [category] message`
fn format_diagnostic(diagnostic: &Diagnostic) -> String {
    format!(
        "{} [{}] {}",
        diagnostic.severity, diagnostic.category, diagnostic.message
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    const LOG: &str = "\
00:00:00   245MB         | rendering frame(s): 12
00:00:01   300MB WARNING | [texturesys] texture \"wood.tx\" not found
00:00:02   300MB ERROR | [ass] node \"ghost\" has no shader
00:00:09  1800MB         | peak CPU memory used    1800.50MB
";

    fn log_file(contents: &[u8]) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents).unwrap();
        file
    }

    fn run_to_string(command: Commands) -> anyhow::Result<String> {
        let mut out = Vec::new();
        run(&command, &mut out)?;
        Ok(String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_parse_emits_full_summary() {
        let file = log_file(LOG.as_bytes());
        let output = run_to_string(Commands::Parse {
            path: file.path().to_path_buf(),
            group: None,
        })
        .unwrap();

        let json: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(json["render_info"]["frame_number"], "12");
        assert_eq!(json["memory_stats"]["peak_CPU_memory_used"], 1800.5);
        assert_eq!(json["diagnostics"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_parse_single_group() {
        let file = log_file(LOG.as_bytes());
        let output = run_to_string(Commands::Parse {
            path: file.path().to_path_buf(),
            group: Some(Group::TextureStats),
        })
        .unwrap();

        let json: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(json["missing_textures"][0], "wood.tx");
        assert!(json.get("render_info").is_none());
    }

    #[test]
    fn test_parse_render_duration_group() {
        let cli =
            Cli::try_parse_from(["arnoldlog", "parse", "-", "--group", "render_duration"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Parse {
                group: Some(Group::RenderDuration),
                ..
            }
        ));

        let file = log_file(b"| render done in 1:00:30.000\n");
        let output = run_to_string(Commands::Parse {
            path: file.path().to_path_buf(),
            group: Some(Group::RenderDuration),
        })
        .unwrap();
        let json: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(json["seconds"], 3630.0);
        assert_eq!(json["display"], "1h 0m 30.00s");
    }

    #[test]
    fn test_diagnostics_lines() {
        let file = log_file(LOG.as_bytes());
        let output = run_to_string(Commands::Diagnostics {
            path: file.path().to_path_buf(),
            errors_only: false,
        })
        .unwrap();

        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("WARNING [texture] 00:00:01"));
        assert!(lines[1].starts_with("ERROR [shader] 00:00:02"));
    }

    #[test]
    fn test_diagnostics_errors_only() {
        let file = log_file(LOG.as_bytes());
        let output = run_to_string(Commands::Diagnostics {
            path: file.path().to_path_buf(),
            errors_only: true,
        })
        .unwrap();
        assert_eq!(output.lines().count(), 1);
    }

    #[test]
    fn test_missing_file_is_reported() {
        let err = run_to_string(Commands::Parse {
            path: PathBuf::from("/definitely/not/here.log"),
            group: None,
        })
        .unwrap_err();
        assert!(err.to_string().contains("failed to read"));
    }

    #[test]
    fn test_non_utf8_is_rejected() {
        let file = log_file(&[0x66, 0x6f, 0xff, 0xfe, 0x0a]);
        let err = run_to_string(Commands::Parse {
            path: file.path().to_path_buf(),
            group: None,
        })
        .unwrap_err();
        assert!(err.to_string().contains("not valid UTF-8"));
    }

    #[test]
    fn test_group_argument_parsing() {
        let cli = Cli::try_parse_from(["arnoldlog", "parse", "-", "--group", "ray_stats"]).unwrap();
        match cli.command {
            Commands::Parse { path, group } => {
                assert_eq!(path, PathBuf::from("-"));
                assert_eq!(group, Some(Group::RayStats));
            }
            Commands::Diagnostics { .. } => panic!("expected parse"),
        }

        assert!(Cli::try_parse_from(["arnoldlog", "parse", "x.log", "--group", "bogus"]).is_err());
    }
}
