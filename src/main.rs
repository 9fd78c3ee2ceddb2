// Entrypoint for the smoke harness.
// - Resolves settings, builds one API client and dispatches the subcommand.
// - With no subcommand the interactive menu is started.

use anyhow::Result;
use clap::{Parser, Subcommand};
use image_api_smoke::api::{ApiClient, CreateImage, DeleteImage, ImagePath};
use image_api_smoke::config::Config;
use image_api_smoke::{logging, smoke, ui};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "image-api-smoke")]
#[command(version)]
#[command(about = "Smoke-test requests against the image resize API", long_about = None)]
struct Cli {
    /// API base URL (overrides IMAGE_API_URL and the config file)
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "warn", global = true)]
    log_level: String,

    /// Enable JSON logging
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run create then get, optionally followed by delete
    Smoke {
        /// Delete the image after fetching it
        #[arg(long)]
        with_delete: bool,
    },

    /// POST /image
    Create {
        #[arg(long)]
        user_id: Option<String>,

        /// Resize an image the server already stores
        #[arg(long, conflicts_with = "image")]
        image_id: Option<String>,

        /// Upload this file instead of referencing an image id
        #[arg(long)]
        image: Option<PathBuf>,

        #[arg(long)]
        height: Option<u32>,

        #[arg(long)]
        width: Option<u32>,
    },

    /// DELETE /image
    Delete {
        #[arg(long)]
        user_id: Option<String>,

        #[arg(long)]
        image_id: Option<String>,

        #[arg(long)]
        subimage_id: Option<String>,

        /// Delete all of the user's data instead of one image
        #[arg(long, conflicts_with_all = ["image_id", "subimage_id"])]
        all: bool,
    },

    /// GET /image/{user_id}/[{image_id}/[{subimage_id}/]]
    Get {
        #[arg(long)]
        user_id: Option<String>,

        #[arg(long)]
        image_id: Option<String>,

        #[arg(long)]
        subimage_id: Option<String>,

        /// List the user's images instead of one image's resizes
        #[arg(long, conflicts_with_all = ["image_id", "subimage_id"])]
        list: bool,

        /// Write the body to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Interactive menu (default)
    Menu,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_logging(&cli.log_level, cli.json_logs);

    let config = Config::load(cli.base_url)?;
    let api = ApiClient::new(&config.base_url)?;
    tracing::debug!(base_url = api.base_url(), user_id = %config.user_id, "settings resolved");

    match cli.command.unwrap_or(Commands::Menu) {
        Commands::Smoke { with_delete } => {
            let mut out = std::io::stdout().lock();
            smoke::run_sequence(&api, &config, &smoke::steps(with_delete), &mut out)?;
        }
        Commands::Create {
            user_id,
            image_id,
            image,
            height,
            width,
        } => {
            let user_id = user_id.unwrap_or(config.user_id);
            let height = height.unwrap_or(config.height);
            let width = width.unwrap_or(config.width);
            let req = match image {
                Some(path) => CreateImage::from_file(&user_id, &path, height, width)?,
                None => {
                    let image_id = image_id.unwrap_or(config.image_id);
                    CreateImage::from_image_id(&user_id, &image_id, height, width)
                }
            };
            println!("{}", api.create(&req)?.text());
        }
        Commands::Delete {
            user_id,
            image_id,
            subimage_id,
            all,
        } => {
            let req = DeleteImage {
                user_id: user_id.unwrap_or(config.user_id),
                image_id: if all {
                    None
                } else {
                    Some(image_id.unwrap_or(config.image_id))
                },
                subimage_id,
            };
            println!("{}", api.delete(&req)?.text());
        }
        Commands::Get {
            user_id,
            image_id,
            subimage_id,
            list,
            output,
        } => {
            let user_id = user_id.unwrap_or(config.user_id);
            let image_id = if list {
                None
            } else {
                Some(image_id.unwrap_or(config.image_id))
            };
            let target =
                ImagePath::from_parts(&user_id, image_id.as_deref(), subimage_id.as_deref())?;
            let res = api.get(&target)?;
            match output {
                Some(path) => res.write_to(&path)?,
                None => println!("{}", res.text()),
            }
        }
        Commands::Menu => ui::main_menu(api, config)?,
    }
    Ok(())
}
