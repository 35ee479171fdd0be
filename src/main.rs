#![deny(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

use anyhow::{Context, Result};
use clap::Parser;
use mapty::cli::{self, Cmd};
use mapty::collaborators::{FixedPosition, TerminalRenderer, summary_line};
use mapty::form::FormInput;
use mapty::storage::{KeyValueStore, MemoryStore, SqliteStore, WORKOUTS_KEY};
use mapty::{Error, Session, WorkoutId, dlog, utils};
use std::io::{self, Stdout};

type AppSession = Session<Box<dyn KeyValueStore>, TerminalRenderer<Stdout>>;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    utils::init_logging(cli.verbose, cli.quiet);

    let store: Box<dyn KeyValueStore> = if cli.ephemeral {
        dlog!("mode=ephemeral");
        Box::new(MemoryStore::new())
    } else {
        let store = SqliteStore::open(&cli.store)
            .with_context(|| format!("opening store: {}", cli.store.display()))?;
        Box::new(store)
    };

    let mut locator = FixedPosition(cli.position);
    let cmd = cli.cmd.unwrap_or(Cmd::List);

    if matches!(cmd, Cmd::Export) {
        let raw = store
            .get(WORKOUTS_KEY)
            .context("reading stored workouts")?
            .unwrap_or_else(|| "[]".to_string());
        println!("{raw}");
        return Ok(());
    }

    // Only `list` shows the start-up replay; other commands print their own result.
    let mut renderer = TerminalRenderer::new(io::stdout());
    renderer.set_muted(!matches!(cmd, Cmd::List));
    let mut session: AppSession =
        Session::start(store, renderer, &mut locator).context("starting session")?;
    session.renderer_mut().set_muted(false);

    match cmd {
        Cmd::Add {
            kind,
            at,
            distance,
            duration,
            cadence,
            elevation,
        } => {
            dlog!("mode=add kind={kind} at={at}");
            session.on_map_clicked(at).map_err(map_hint)?;

            let mut form = FormInput {
                kind,
                distance,
                duration,
                cadence,
                elevation,
            };
            let w = session.submit_form(&mut form).context("adding workout")?;
            tracing::info!(id = %w.id(), "saved");
        }
        Cmd::List | Cmd::Export => {}
        Cmd::Show { id } => {
            let id = WorkoutId::from(id.as_str());
            let w = session.on_list_item_clicked(&id).map_err(map_hint)?;
            println!("{}", summary_line(w));
        }
        Cmd::Reset => {
            let (store, renderer) = session.reset_all().context("resetting workouts")?;
            println!("All workouts deleted.");
            Session::start(store, renderer, &mut locator).context("restarting session")?;
        }
    }

    Ok(())
}

fn map_hint(e: Error) -> anyhow::Error {
    match e {
        Error::MapNotLoaded => anyhow::anyhow!(
            "the map is not loaded; pass --position LAT,LNG (or set MAPTY_POSITION)"
        ),
        other => other.into(),
    }
}
