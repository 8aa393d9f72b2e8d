//! chaos-cli - Command-line interface for the chaos utilities
//!
//! - Ranged, buffered file copies
//! - Charset-aware line listing
//! - Content comparison with or without line-ending sensitivity
//! - Quick HTTP probes
//! - Object storage uploads and deletes

use anyhow::{Context, Result};
use chaos_core::io::{
    charset_for_name, content_equals, content_equals_ignore_eol, copy_range, lines, CharReader, CopyParameters,
};
use chaos_core::{Config, HttpRequestClient};
use clap::{Parser, Subcommand};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

mod storage_handler;

/// chaos - stream, HTTP and object storage utilities
#[derive(Parser)]
#[command(name = "chaos")]
#[command(author, version, about = "Stream, HTTP and object storage utilities", long_about = None)]
struct Cli {
    /// Enable verbose output for debugging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Suppress all log output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// Configuration file to use instead of the defaults
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Copy a byte range of one file into another
    Copy {
        input: PathBuf,
        output: PathBuf,

        /// Bytes to skip before copying
        #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
        offset: i64,

        /// Bytes to copy, -1 for everything after the offset
        #[arg(long, default_value_t = -1, allow_hyphen_values = true)]
        length: i64,

        /// Working buffer size, e.g. 8192 or 64KiB
        #[arg(long)]
        buffer_size: Option<String>,
    },

    /// Print the lines of a text file
    Lines {
        file: PathBuf,

        /// Charset of the file (defaults to the configured charset)
        #[arg(long)]
        charset: Option<String>,
    },

    /// Compare the contents of two files; exits with 1 when they differ
    Compare {
        first: PathBuf,
        second: PathBuf,

        /// Treat \n, \r\n and \r line endings as equal
        #[arg(long)]
        ignore_eol: bool,
    },

    /// Probe a URL
    Http {
        #[command(subcommand)]
        command: HttpCommand,
    },

    /// Show the configuration
    Config {
        /// Print the configuration in effect: the --config file, or the defaults
        #[arg(long, conflicts_with = "path")]
        show: bool,

        /// Print where the default configuration file lives
        #[arg(long)]
        path: bool,
    },

    /// Upload to or delete from object storage (needs --config with a [storage] table)
    Storage {
        #[command(subcommand)]
        command: StorageCommand,
    },
}

#[derive(Subcommand)]
enum HttpCommand {
    /// Print the response status code
    Status { url: String },
    /// Print the response body
    Get { url: String },
    /// Print the round-trip time in milliseconds
    Ping { url: String },
}

#[derive(Subcommand)]
pub(crate) enum StorageCommand {
    /// Upload a file and print its stored metadata as JSON
    Upload {
        file: PathBuf,

        /// Object key
        #[arg(long)]
        key: String,

        #[arg(long)]
        content_type: Option<String>,
    },

    /// Delete one or more objects
    Delete {
        #[arg(required = true)]
        keys: Vec<String>,
    },
}

fn setup_logging(verbose: bool, quiet: bool) {
    if quiet {
        return;
    }

    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    match run() {
        Ok(code) => process::exit(code),
        Err(e) => {
            error!("Error: {:#}", e);
            process::exit(2);
        }
    }
}

/// Returns the process exit code
fn run() -> Result<i32> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Copy {
            input,
            output,
            offset,
            length,
            buffer_size,
        } => {
            let buffer_size = match buffer_size {
                Some(size) => usize::try_from(chaos_core::config::parse_size(&size)?)
                    .context("Buffer size does not fit in memory")?,
                None => config.io.buffer_size()?,
            };
            let params = CopyParameters::new(offset, length)
                .with_buffer_size(buffer_size)
                .with_skip_buffer_size(config.io.skip_buffer_size()?);
            params.validate()?;

            info!("Copying {:?} into {:?}", input, output);
            let mut reader =
                File::open(&input).with_context(|| format!("Failed to open {}", input.display()))?;
            let mut writer = BufWriter::new(
                File::create(&output).with_context(|| format!("Failed to create {}", output.display()))?,
            );
            let result = copy_range(&mut reader, &mut writer, params)
                .and_then(|copied| writer.flush().map(|_| copied).map_err(Into::into));
            drop(writer);

            // A failed copy leaves no partial output behind
            let copied = match result {
                Ok(copied) => copied,
                Err(e) => {
                    if let Err(remove_err) = fs::remove_file(&output) {
                        debug!("Failed to remove {:?}: {}", output, remove_err);
                    }
                    return Err(e.into());
                }
            };

            info!("Copied {} bytes", copied);
            println!("{}", copied);
        }

        Commands::Lines { file, charset } => {
            let charset = match charset {
                Some(name) => charset_for_name(&name)?,
                None => config.io.charset()?,
            };
            debug!("Decoding {:?} as {}", file, charset.name());

            let input = File::open(&file).with_context(|| format!("Failed to open {}", file.display()))?;
            let mut text = config.io.new_writer()?;
            let mut count = 0u64;
            for line in lines(input, Some(charset)) {
                let line = line?;
                text.append(Some(line.as_str())).append_char('\n');
                count += 1;
            }

            let stdout = std::io::stdout();
            let mut out = stdout.lock();
            out.write_all(text.snapshot().as_bytes())?;
            out.flush()?;
            info!("{} lines", count);
        }

        Commands::Compare {
            first,
            second,
            ignore_eol,
        } => {
            let mut a = File::open(&first).with_context(|| format!("Failed to open {}", first.display()))?;
            let mut b = File::open(&second).with_context(|| format!("Failed to open {}", second.display()))?;

            let equal = if ignore_eol {
                let charset = config.io.charset()?;
                content_equals_ignore_eol(&mut CharReader::new(a, charset), &mut CharReader::new(b, charset))?
            } else {
                content_equals(&mut a, &mut b)?
            };

            if equal {
                println!("Files are identical");
            } else {
                println!("Files differ");
                return Ok(1);
            }
        }

        Commands::Http { command } => {
            let client = HttpRequestClient::new(&config.http)?;
            match command {
                HttpCommand::Status { url } => println!("{}", client.status_code(&url)?),
                HttpCommand::Get { url } => println!("{}", client.get(&url)?),
                HttpCommand::Ping { url } => println!("{} ms", client.ping(&url)?.as_millis()),
            }
        }

        Commands::Config { show, path } => {
            if path {
                println!("{}", Config::config_path()?.display());
            } else if show {
                print!("{}", toml::to_string_pretty(&config)?);
            } else {
                print!("{}", Config::default_config_content());
            }
        }

        Commands::Storage { command } => {
            let path = cli
                .config
                .as_deref()
                .context("Storage commands need --config pointing at a file with a [storage] table")?;
            storage_handler::run(path, command)?;
        }
    }

    Ok(0)
}

/// The file given with `--config`, or built-in defaults without touching
/// the user's configuration directory
fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => {
            Config::load_from(path).with_context(|| format!("Failed to load config from {}", path.display()))
        }
        None => Ok(Config::default()),
    }
}
