// sluice/src/commands/bi.rs
//
// USE CASE: one BI session per invocation. Sign in, run a single action,
// always sign out.

use anyhow::{Context, bail};
use comfy_table::{ContentArrangement, Table, presets::ASCII_MARKDOWN};
use std::path::{Path, PathBuf};

use sluice_core::infrastructure::bi::BiClient;
use sluice_core::infrastructure::config::{BiSettings, load_config};

use crate::cli::{BiAction, BiServer};

pub async fn execute(
    config: Option<PathBuf>,
    server: BiServer,
    action: BiAction,
) -> anyhow::Result<()> {
    let settings = resolve_settings(config.as_deref(), server)?;
    let mut client = BiClient::from_settings(&settings);

    client.login().await?;
    println!("🔑 Signed in to {}", settings.server_url);

    let outcome = run(&client, action).await;
    if let Err(e) = client.logout().await {
        eprintln!("⚠️  Sign out failed: {}", e);
    }
    outcome
}

async fn run(client: &BiClient, action: BiAction) -> anyhow::Result<()> {
    match action {
        BiAction::Projects => {
            let projects = client.list_projects().await?;
            print_table(projects.iter().map(|p| (p.id.as_str(), p.name.as_str())));
        }
        BiAction::Project { name } => match client.set_project(&name).await? {
            Some(id) => println!("{}", id),
            None => bail!("Project '{}' not found", name),
        },
        BiAction::Workbooks => {
            let workbooks = client.list_workbooks().await?;
            print_table(workbooks.iter().map(|w| (w.id.as_str(), w.name.as_str())));
        }
        BiAction::Views { workbook_id } => {
            let views = client.list_views(&workbook_id).await?;
            print_table(views.iter().map(|v| (v.id.as_str(), v.name.as_str())));
        }
        BiAction::Image { view_id, out } => {
            let path = client.download_view_image(&view_id, &out).await?;
            println!("🖼️  Saved {}", path.display());
        }
        BiAction::Dataset { view_id, out } => {
            let path = client.download_view_dataset_csv(&view_id, &out).await?;
            println!("📄 Saved {}", path.display());
        }
    }
    Ok(())
}

fn print_table<'a>(rows: impl Iterator<Item = (&'a str, &'a str)>) {
    let mut t = Table::new();
    t.load_preset(ASCII_MARKDOWN);
    t.set_content_arrangement(ContentArrangement::Dynamic);
    t.set_header(vec!["Id", "Name"]);
    for (id, name) in rows {
        t.add_row(vec![id, name]);
    }
    println!("{}", t);
}

/// Flags win over the `bi` section of the config file, which is only read
/// when a flag is missing.
fn resolve_settings(config: Option<&Path>, server: BiServer) -> anyhow::Result<BiSettings> {
    if let BiServer {
        server: Some(server_url),
        username: Some(username),
        password: Some(password),
    } = server
    {
        return Ok(BiSettings {
            server_url,
            username,
            password,
        });
    }

    let cwd = std::env::current_dir().context("Cannot resolve current directory")?;
    let file = load_config(config, &cwd)
        .context("BI server settings are incomplete and no configuration file could be loaded")?;
    let Some(base) = file.bi else {
        bail!("No 'bi' section in the configuration file; pass --server and --username");
    };

    Ok(BiSettings {
        server_url: server.server.unwrap_or(base.server_url),
        username: server.username.unwrap_or(base.username),
        password: server.password.unwrap_or(base.password),
    })
}
