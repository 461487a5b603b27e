use std::path::PathBuf;
use std::str::FromStr;

use clap::{Parser, Subcommand};
use home::home_dir;
use serde::Deserialize;
use tokio::fs::File;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::time::timeout;

use fs_roster::TRACK_FOLDER;
use geo_client::GeocodeClient;
use track_model::{PositionSample, StreamOptions, UserId};
use track_session::{Geocoder, NullPresenter, TrackerSession};

use crate::error::AppError;
use crate::presenter::TerminalPresenter;

mod error;
mod presenter;

#[derive(Parser, Debug)]
#[clap(name = "waytrack")]
#[clap(about = "Track registered users' live locations", long_about = None)]
struct Cli {
    /// Roster directory (defaults to ~/.waytrack)
    #[clap(long)]
    root: Option<PathBuf>,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Register a new user and make them active
    Register { name: String, email: String },

    /// Make an existing user active
    Select { id: String },

    /// Print the roster
    List,

    /// Print the active user
    Status,

    /// Feed position samples from a JSON-lines stream
    Watch {
        /// Read samples from a file instead of stdin
        #[clap(long)]
        input: Option<PathBuf>,
    },
}

/// One line of the watch stream: either a position sample or an error
/// event from the stream itself.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum StreamLine {
    Sample(PositionSample),
    Error { error: String },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), AppError> {
    env_logger::init();
    let cli = Cli::parse();
    let root = provide_root(cli.root)?;
    let geocoder = GeocodeClient::new()?;

    match cli.command {
        Command::Register { name, email } => {
            let mut presenter = TerminalPresenter;
            let mut session =
                TrackerSession::load(&root, geocoder, &mut NullPresenter)?;
            let id = session.register(&name, &email, &mut presenter)?;
            println!("New user id: {}", id);
        }
        Command::Select { id } => {
            let mut presenter = TerminalPresenter;
            let mut session =
                TrackerSession::load(&root, geocoder, &mut NullPresenter)?;
            let id = UserId::from_str(&id)?;
            if !session.select(&id, &mut presenter)? {
                eprintln!("Unknown user id: {}", id);
            }
        }
        Command::List => {
            let session =
                TrackerSession::load(&root, geocoder, &mut NullPresenter)?;
            for profile in session.registry().all() {
                println!("{} ({})", profile.name, profile.email);
                println!("  Last known: {}", profile.last_known_label());
                println!("  Id: {}", profile.id);
            }
        }
        Command::Status => {
            let session =
                TrackerSession::load(&root, geocoder, &mut NullPresenter)?;
            match session.active_profile() {
                Some(profile) => println!(
                    "Current active user: {} ({})",
                    profile.name, profile.email
                ),
                None => println!("Current active user: None"),
            }
        }
        Command::Watch { input } => {
            let mut presenter = TerminalPresenter;
            let mut session =
                TrackerSession::load(&root, geocoder, &mut presenter)?;
            match input {
                Some(path) => {
                    let reader = BufReader::new(File::open(path).await?);
                    // A file is replayed as fast as it parses; the stream
                    // timeout only applies to a live stdin feed.
                    watch(&mut session, &mut presenter, reader, None).await?;
                }
                None => {
                    let reader = BufReader::new(tokio::io::stdin());
                    let options = StreamOptions::default();
                    watch(&mut session, &mut presenter, reader, Some(options))
                        .await?;
                }
            }
        }
    }
    Ok(())
}

/// Consume a JSON-lines position stream until EOF, feeding every sample
/// through the session pipeline. Stream error lines and timeouts are
/// surfaced, never fatal.
async fn watch<G, R>(
    session: &mut TrackerSession<G>,
    presenter: &mut TerminalPresenter,
    reader: R,
    options: Option<StreamOptions>,
) -> Result<(), AppError>
where
    G: Geocoder,
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    loop {
        let next = match options {
            Some(options) => {
                match timeout(options.timeout, lines.next_line()).await {
                    Ok(next) => next,
                    Err(_) => {
                        session
                            .handle_stream_error("Timeout expired", presenter);
                        continue;
                    }
                }
            }
            None => lines.next_line().await,
        };

        let Some(line) = next? else {
            break;
        };
        if line.trim().is_empty() {
            continue;
        }

        match serde_json::from_str::<StreamLine>(&line) {
            Ok(StreamLine::Sample(sample)) => {
                session.handle_sample(sample, presenter).await?;
            }
            Ok(StreamLine::Error { error }) => {
                session.handle_stream_error(&error, presenter);
            }
            Err(err) => {
                log::warn!("skipping malformed stream line: {}", err);
            }
        }
    }
    Ok(())
}

fn provide_root(root: Option<PathBuf>) -> Result<PathBuf, AppError> {
    match root {
        Some(path) => Ok(path),
        None => home_dir()
            .map(|home| home.join(TRACK_FOLDER))
            .ok_or(AppError::HomeDirNotFound),
    }
}
