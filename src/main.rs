use std::{error::Error, path::PathBuf, process::ExitCode};

use clap::{Parser, Subcommand};
use tube_info::{
    api::YouTubeClient,
    catalog::{EntityKind, ExportSelection},
    config::{self, Config},
    export::FileExt,
    ids,
    report::{self, ReportOptions},
};

#[derive(Parser, Debug)]
#[command(name = "tube-info", version)]
#[command(about = "Exports video/playlist data from YouTube to JSON/CSV file")]
struct Args {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Manage your YouTube API key
    Key {
        #[command(subcommand)]
        action: KeyAction,
    },
    /// Show or edit the configuration
    Config(ConfigArgs),
    /// Export playlist metadata by id or URL
    Playlist {
        /// Playlist id or a URL with a `list` parameter
        id_or_url: String,
        #[command(flatten)]
        export: ExportArgs,
        /// Keep private and deleted videos in the report
        #[arg(long)]
        include_private: bool,
    },
    /// Export video metadata by id or URL
    Video {
        /// Video id or URL
        id_or_url: String,
        #[command(flatten)]
        export: ExportArgs,
    },
}

#[derive(Subcommand, Debug)]
enum KeyAction {
    /// Print the current key
    Show,
    /// Store a new key
    Set { key: String },
    /// Remove the stored key
    Remove,
}

#[derive(clap::Args, Debug)]
struct ExportArgs {
    /// Comma separated fields to export, defaults to the configured selection
    #[arg(short, long, value_delimiter = ',', value_parser = field_name)]
    fields: Vec<String>,
    /// Output format
    #[arg(short, long)]
    ext: Option<FileExt>,
    /// Folder the report is written to
    #[arg(short = 'o', long)]
    folder: Option<PathBuf>,
}

#[derive(clap::Args, Debug)]
struct ConfigArgs {
    /// Print the path of the config file
    #[arg(short, long)]
    path: bool,
    /// Reset all configuration to defaults
    #[arg(short, long)]
    reset: bool,
    /// Default playlist fields, comma separated
    #[arg(long, value_delimiter = ',', value_parser = field_name)]
    playlist_fields: Vec<String>,
    /// Default video fields, comma separated
    #[arg(long, value_delimiter = ',', value_parser = field_name)]
    video_fields: Vec<String>,
    /// Default output format
    #[arg(long)]
    ext: Option<FileExt>,
    /// Default output folder
    #[arg(long)]
    folder: Option<PathBuf>,
    /// Skip private or deleted playlist videos by default
    #[arg(long)]
    skip_private: Option<bool>,
}

// Allows `--fields "title, url"`.
fn field_name(s: &str) -> Result<String, String> {
    Ok(s.trim().to_string())
}

fn selection(
    config: &Config,
    kind: EntityKind,
    fields: &[String],
) -> Result<ExportSelection, Box<dyn Error>> {
    if fields.is_empty() {
        Ok(config.default_selection(kind)?)
    } else {
        Ok(ExportSelection::new(kind, fields)?)
    }
}

fn report_options(config: &Config, export: &ExportArgs) -> ReportOptions {
    let mut options = ReportOptions::from_config(config);
    if let Some(ext) = export.ext {
        options.file_ext = ext;
    }
    if let Some(folder) = &export.folder {
        options.folder = folder.clone();
    }
    options
}

fn key_command(mut config: Config, action: KeyAction) -> Result<(), Box<dyn Error>> {
    match action {
        KeyAction::Show if config.api_key.is_empty() => {
            println!("No YouTube API key set, add one with `tube-info key set <KEY>`");
        }
        KeyAction::Show => println!("Current YouTube API key: {}", config.api_key),
        KeyAction::Set { key } => {
            config::validate_api_key(&key)?;
            config.api_key = key.trim().to_string();
            config.save()?;
            println!("Saved the API key");
        }
        KeyAction::Remove => {
            config.api_key.clear();
            config.save()?;
            println!("Removed the API key");
        }
    }
    Ok(())
}

fn config_command(mut config: Config, args: ConfigArgs) -> Result<(), Box<dyn Error>> {
    if args.path {
        println!("{}", config::default_path()?.display());
        return Ok(());
    }

    if args.reset {
        config.reset();
        let path = config.save()?;
        println!("Reset configuration at {}", path.display());
        return Ok(());
    }

    let mut changed = false;
    if !args.playlist_fields.is_empty() {
        let sel = ExportSelection::new(EntityKind::PlaylistItem, &args.playlist_fields)?;
        config.set_default_selection(&sel);
        changed = true;
    }
    if !args.video_fields.is_empty() {
        let sel = ExportSelection::new(EntityKind::Video, &args.video_fields)?;
        config.set_default_selection(&sel);
        changed = true;
    }
    if let Some(ext) = args.ext {
        config.file_ext = ext;
        changed = true;
    }
    if let Some(folder) = args.folder {
        config.folder_path = folder;
        changed = true;
    }
    if let Some(skip) = args.skip_private {
        config.skip_private_or_deleted = skip;
        changed = true;
    }

    if changed {
        let path = config.save()?;
        println!("Saved configuration to {}", path.display());
    } else {
        println!("{}", serde_json::to_string_pretty(&config)?);
    }

    Ok(())
}

async fn run(args: Args) -> Result<(), Box<dyn Error>> {
    let config = Config::load()?;

    match args.command {
        Command::Key { action } => key_command(config, action),
        Command::Config(config_args) => config_command(config, config_args),
        Command::Playlist {
            id_or_url,
            export,
            include_private,
        } => {
            let playlist_id = ids::playlist_id(&id_or_url)?;
            let selection = selection(&config, EntityKind::PlaylistItem, &export.fields)?;
            let mut options = report_options(&config, &export);
            if include_private {
                options.suppress_private_or_deleted = false;
            }

            let client = YouTubeClient::new(&config.api_key, &config.api_base_url)?;
            println!("Fetching playlist {}", playlist_id);
            let path = report::export_playlist(&client, &playlist_id, &selection, &options).await?;
            println!("Exported to {}", path.display());
            Ok(())
        }
        Command::Video { id_or_url, export } => {
            let video_id = ids::video_id(&id_or_url)?;
            let selection = selection(&config, EntityKind::Video, &export.fields)?;
            let options = report_options(&config, &export);

            let client = YouTubeClient::new(&config.api_key, &config.api_base_url)?;
            println!("Fetching video {}", video_id);
            let path = report::export_video(&client, &video_id, &selection, &options).await?;
            println!("Exported to {}", path.display());
            Ok(())
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let filter = if args.verbose {
        "warn,tube_info=debug"
    } else {
        "warn"
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter)).init();

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}
