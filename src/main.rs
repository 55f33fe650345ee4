//! share_table CLI - Read and write tables on Google Shared Drive by path.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use glob::glob;
use tracing_subscriber::EnvFilter;

use share_table::{
    Authenticator, DriveClient, FolderPath, ReadOptions, ReadSource, Table, TableClient,
    TableFormat,
};

/// CLI tool for tables on Google Shared Drive, addressed as drive/folder/file.
#[derive(Parser)]
#[command(name = "share_table")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to service account JSON credentials file. Falls back to the
    /// JSON in GOOGLE_DRIVE_CREDENTIALS.
    #[arg(long, env = "GOOGLE_APPLICATION_CREDENTIALS")]
    credentials: Option<PathBuf>,

    /// Log resolution steps.
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the ID of the file at a Drive path.
    Find {
        /// Drive path, e.g. TeamDrive/Reports/summary.xlsx.
        path: String,
    },

    /// Read a table and print it as CSV.
    Read {
        /// Drive path of the file.
        #[arg(conflicts_with = "url")]
        path: Option<String>,

        /// Spreadsheet or file URL instead of a path.
        #[arg(long)]
        url: Option<String>,

        /// Worksheet name (defaults to the first sheet).
        #[arg(long)]
        sheet: Option<String>,

        /// Save the CSV to this file instead of printing it.
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },

    /// Write a local CSV or XLSX table to a Drive path.
    Write {
        /// Local .csv or .xlsx file.
        local: PathBuf,

        /// Destination Drive path; its extension picks the stored format.
        path: String,

        /// Replace the file if it already exists.
        #[arg(long)]
        overwrite: bool,
    },

    /// Upload files to a Drive folder path.
    Upload {
        /// File patterns to upload (supports glob patterns like *.tar, file_{1,2,3}.txt).
        #[arg(required = true)]
        patterns: Vec<String>,

        /// Destination folder path, e.g. TeamDrive/archive/2023.
        #[arg(long, short = 't')]
        to: String,
    },

    /// Create a folder path, reusing folders that already exist.
    Mkdir {
        /// Folder path, e.g. TeamDrive/archive/2023.
        path: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let auth = match &cli.credentials {
        Some(path) => Authenticator::from_file(path)
            .with_context(|| format!("Failed to load credentials from {:?}", path))?,
        None => Authenticator::from_env().context("Failed to load credentials")?,
    };

    let client = TableClient::new(DriveClient::new(auth));

    match cli.command {
        Commands::Find { path } => {
            let file_id = client
                .find_file_id(&path)
                .await
                .with_context(|| format!("Failed to resolve path: {}", path))?;

            match file_id {
                Some(id) => println!("{}", id),
                None => anyhow::bail!("No file at {}", path),
            }
        }

        Commands::Read {
            path,
            url,
            sheet,
            output,
        } => {
            let source = ReadSource::from_parts(url, path)?;
            let options = ReadOptions {
                sheet,
                ..ReadOptions::default()
            };

            let table = client
                .read(source.clone(), &options)
                .await
                .with_context(|| format!("Failed to read {}", source))?;
            let csv = table.to_csv(b',')?;

            match output {
                Some(output) => {
                    std::fs::write(&output, csv)
                        .with_context(|| format!("Failed to write {:?}", output))?;
                    eprintln!("Saved {} rows to {:?}", table.rows().len(), output);
                }
                None => std::io::stdout().write_all(&csv)?,
            }
        }

        Commands::Write {
            local,
            path,
            overwrite,
        } => {
            let table = load_table(&local)?;
            let url = client
                .write(&table, &path, overwrite)
                .await
                .with_context(|| format!("Failed to write {}", path))?;
            println!("{}", url);
        }

        Commands::Upload { patterns, to } => {
            let folder = FolderPath::parse(&to)
                .with_context(|| format!("Invalid destination folder: {}", to))?;

            let locals = local_files(&patterns)?;
            if locals.is_empty() {
                anyhow::bail!("No local files match {}", patterns.join(" "));
            }

            println!("Uploading {} file(s) to {}...", locals.len(), to);

            // Each file is uploaded on its own; one failure does not stop the rest.
            let mut failed = 0;
            for (idx, local) in locals.iter().enumerate() {
                let filename = local.file_name().unwrap_or_default().to_string_lossy();
                let target = folder.join(&filename).to_string();
                print!("[{}/{}] {} -> {} ", idx + 1, locals.len(), filename, target);
                std::io::stdout().flush()?;

                match client.upload(local, &target).await {
                    Ok(url) => println!("OK ({})", url),
                    Err(e) => {
                        failed += 1;
                        println!("FAILED");
                        eprintln!("  {}", e);
                    }
                }
            }

            if failed > 0 {
                anyhow::bail!("{} of {} uploads failed", failed, locals.len());
            }
        }

        Commands::Mkdir { path } => {
            let folder_id = client
                .make_folders(&path)
                .await
                .with_context(|| format!("Failed to create folders: {}", path))?;

            match folder_id {
                Some(id) => println!("{}", id),
                None => println!("{} is a drive root; nothing to create", path),
            }
        }
    }

    Ok(())
}

/// Load a local .csv or .xlsx file into a table.
fn load_table(local: &std::path::Path) -> Result<Table> {
    let name = local.to_string_lossy();
    let format = TableFormat::from_path(&name)?;
    let bytes =
        std::fs::read(local).with_context(|| format!("Failed to read local file {:?}", local))?;

    let table = match format {
        TableFormat::Csv => Table::from_csv(&bytes, b',')?,
        TableFormat::Xlsx => Table::from_xlsx(&bytes, None)?,
    };
    Ok(table)
}

/// Local files named by the upload patterns, sorted and without duplicates.
///
/// Patterns go through brace expansion, then glob matching. A pattern that
/// matches nothing is still accepted when it names an existing file.
fn local_files(patterns: &[String]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for pattern in patterns.iter().flat_map(|p| expand_braces(p)) {
        let before = files.len();
        let entries =
            glob(&pattern).with_context(|| format!("Invalid glob pattern: {}", pattern))?;
        files.extend(entries.filter_map(|entry| entry.ok()).filter(|p| p.is_file()));

        if files.len() == before {
            let literal = PathBuf::from(&pattern);
            if literal.is_file() {
                files.push(literal);
            } else {
                tracing::warn!(pattern = %pattern, "no local files matched");
            }
        }
    }

    files.sort();
    files.dedup();
    Ok(files)
}

/// Expand `{a,b}` alternatives, e.g. `q{1,2}.csv` to `q1.csv` and `q2.csv`.
fn expand_braces(pattern: &str) -> Vec<String> {
    let Some((head, rest)) = pattern.split_once('{') else {
        return vec![pattern.to_string()];
    };
    let Some((choices, tail)) = rest.split_once('}') else {
        return vec![pattern.to_string()];
    };

    choices
        .split(',')
        .flat_map(|choice| expand_braces(&format!("{}{}{}", head, choice.trim(), tail)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_braces_simple() {
        let result = expand_braces("file_{1,2,3}.txt");
        assert_eq!(result, vec!["file_1.txt", "file_2.txt", "file_3.txt"]);
    }

    #[test]
    fn test_expand_braces_no_braces() {
        let result = expand_braces("report.csv");
        assert_eq!(result, vec!["report.csv"]);
    }

    #[test]
    fn test_expand_braces_nested() {
        let result = expand_braces("{a,b}_{1,2}.csv");
        assert_eq!(result, vec!["a_1.csv", "a_2.csv", "b_1.csv", "b_2.csv"]);
    }

    #[test]
    fn test_local_files_expands_and_dedups() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["q1.csv", "q2.csv", "notes.txt"] {
            std::fs::write(dir.path().join(name), "a\n1\n").unwrap();
        }
        let base = dir.path().display();

        let files = local_files(&[
            format!("{}/q{{1,2}}.csv", base),
            format!("{}/*.csv", base),
            format!("{}/missing.csv", base),
        ])
        .unwrap();

        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["q1.csv", "q2.csv"]);
    }

    #[test]
    fn test_load_table_rejects_unknown_extension() {
        assert!(load_table(std::path::Path::new("data.json")).is_err());
    }

    #[test]
    fn test_cli_read_path_and_url_conflict() {
        let parsed = Cli::try_parse_from([
            "share_table",
            "read",
            "TeamDrive/a.csv",
            "--url",
            "https://docs.google.com/file/d/x",
        ]);
        assert!(parsed.is_err());
    }
}
