// UI layer: an interactive menu using `dialoguer`. Prompts are pre-filled
// from the loaded settings so pressing Enter reproduces the smoke fixtures.

use crate::api::{ApiClient, ApiResponse, CreateImage, DeleteImage, ImagePath};
use crate::config::{Config, BASE_URL_ENV};
use crate::smoke;
use anyhow::Result;
use dialoguer::{Confirm, Input, Select};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main interactive menu. Runs a select loop until the user chooses "Exit".
/// Request failures are printed and the loop continues.
pub fn main_menu(api: ApiClient, mut config: Config) -> Result<()> {
    loop {
        let items = vec![
            "Create resize",
            "Delete",
            "Get",
            "Run smoke sequence",
            "Save settings",
            "Exit",
        ];
        let selection = Select::new().items(&items).default(0).interact()?;
        match selection {
            0 => handle_create(&api, &mut config)?,
            1 => handle_delete(&api, &config)?,
            2 => handle_get(&api, &config)?,
            3 => {
                let with_delete = Confirm::new()
                    .with_prompt("Delete the image afterwards?")
                    .default(false)
                    .interact()?;
                let pb = spinner("Running smoke sequence...")?;
                let result = smoke::run_sequence(
                    &api,
                    &config,
                    &smoke::steps(with_delete),
                    &mut std::io::stdout(),
                );
                pb.finish_and_clear();
                if let Err(e) = result {
                    println!("Smoke run failed: {:#}", e);
                }
            }
            4 => match config.save() {
                Ok(path) if config.base_url_overridden() => println!(
                    "Settings saved to {} (base URL {} comes from {} or --base-url and was not saved)",
                    path.display(),
                    config.base_url,
                    BASE_URL_ENV
                ),
                Ok(path) => println!("Settings saved to {}", path.display()),
                Err(e) => println!("Saving settings failed: {:#}", e),
            },
            5 => break,
            _ => {}
        }
    }
    Ok(())
}

/// Collect create fields, either referencing a stored image or uploading a file.
fn handle_create(api: &ApiClient, config: &mut Config) -> Result<()> {
    let user_id: String = Input::new()
        .with_prompt("User id")
        .default(config.user_id.clone())
        .interact_text()?;
    let sources = vec!["Existing image id", "Upload a file"];
    let source = Select::new().items(&sources).default(0).interact()?;
    let image_id: Option<String> = match source {
        0 => Some(
            Input::new()
                .with_prompt("Image id")
                .default(config.image_id.clone())
                .interact_text()?,
        ),
        _ => None,
    };
    let height: u32 = Input::new()
        .with_prompt("Height")
        .default(config.height)
        .interact_text()?;
    let width: u32 = Input::new()
        .with_prompt("Width")
        .default(config.width)
        .interact_text()?;

    let req = match image_id {
        Some(image_id) => {
            let req = CreateImage::from_image_id(&user_id, &image_id, height, width);
            config.image_id = image_id;
            req
        }
        None => {
            let path: String = Input::new().with_prompt("Image file path").interact_text()?;
            match upload_or_report(&user_id, Path::new(&path), height, width) {
                Some(req) => req,
                None => return Ok(()),
            }
        }
    };
    config.user_id = user_id;
    config.height = height;
    config.width = width;

    let pb = spinner("Creating...")?;
    let result = api.create(&req);
    pb.finish_and_clear();
    report("Create", result);
    Ok(())
}

fn handle_delete(api: &ApiClient, config: &Config) -> Result<()> {
    let user_id: String = Input::new()
        .with_prompt("User id")
        .default(config.user_id.clone())
        .interact_text()?;
    let scopes = vec!["One image", "One resize of an image", "All user data"];
    let scope = Select::new().items(&scopes).default(0).interact()?;
    let (image_id, subimage_id) = match scope {
        0 => (Some(prompt_image_id(config)?), None),
        1 => (Some(prompt_image_id(config)?), Some(prompt_subimage_id()?)),
        _ => {
            let sure = Confirm::new()
                .with_prompt(format!("Delete every image of user '{}'?", user_id))
                .default(false)
                .interact()?;
            if !sure {
                return Ok(());
            }
            (None, None)
        }
    };

    let req = DeleteImage {
        user_id,
        image_id,
        subimage_id,
    };
    let pb = spinner("Deleting...")?;
    let result = api.delete(&req);
    pb.finish_and_clear();
    report("Delete", result);
    Ok(())
}

fn handle_get(api: &ApiClient, config: &Config) -> Result<()> {
    let user_id: String = Input::new()
        .with_prompt("User id")
        .default(config.user_id.clone())
        .interact_text()?;
    let scopes = vec!["Resizes of an image", "One resize (image data)", "User's images"];
    let scope = Select::new().items(&scopes).default(0).interact()?;
    let (image_id, subimage_id) = match scope {
        0 => (Some(prompt_image_id(config)?), None),
        1 => (Some(prompt_image_id(config)?), Some(prompt_subimage_id()?)),
        _ => (None, None),
    };
    let target = ImagePath::from_parts(&user_id, image_id.as_deref(), subimage_id.as_deref())?;

    // subimage bodies are image data, not text
    let output = if matches!(target, ImagePath::Subimage(..)) {
        let path: String = Input::new()
            .with_prompt("Save image to")
            .default("subimage.gif".into())
            .interact_text()?;
        Some(PathBuf::from(path))
    } else {
        None
    };

    let pb = spinner("Fetching...")?;
    let result = api.get(&target);
    pb.finish_and_clear();
    match (result, output) {
        (Ok(res), Some(path)) => match res.write_to(&path) {
            Ok(()) => println!("Wrote {} bytes to {}", res.body.len(), path.display()),
            Err(e) => println!("Get failed: {:#}", e),
        },
        (result, None) => report("Get", result),
        (Err(e), Some(_)) => println!("Get failed: {:#}", e),
    }
    Ok(())
}

fn prompt_image_id(config: &Config) -> Result<String> {
    Ok(Input::new()
        .with_prompt("Image id")
        .default(config.image_id.clone())
        .interact_text()?)
}

fn prompt_subimage_id() -> Result<String> {
    Ok(Input::new().with_prompt("Subimage id").interact_text()?)
}

/// Build an upload request, printing the failure instead of returning it so
/// a bad path does not end the menu.
fn upload_or_report(user_id: &str, path: &Path, height: u32, width: u32) -> Option<CreateImage> {
    match CreateImage::from_file(user_id, path, height, width) {
        Ok(req) => Some(req),
        Err(e) => {
            println!("Create failed: {:#}", e);
            None
        }
    }
}

fn report(op: &str, result: Result<ApiResponse>) {
    match result {
        Ok(res) => println!("{}", res.text()),
        Err(e) => println!("{} failed: {:#}", op, e),
    }
}

fn spinner(msg: &'static str) -> Result<ProgressBar> {
    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::with_template("{spinner} {msg}")?);
    pb.set_message(msg);
    pb.enable_steady_tick(Duration::from_millis(100));
    Ok(pb)
}
