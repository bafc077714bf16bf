use anyhow::{Context, Result};
use env_logger::{Builder, Env, Target};
use espmodem_panel::{
    Event, ModemDeviceClient, Panel,
    config::PanelConfig,
    console::{HELP, Input, parse_line, render_notifications, render_state},
    http_client::Gateway,
    notification::{NotificationTiming, Notifier},
    settings::SettingsDraft,
};
use log::{debug, error, info};
use std::{collections::HashSet, io::Write};
use tokio::io::{AsyncBufReadExt, BufReader};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    log_panics::init();

    let mut builder = if cfg!(debug_assertions) {
        Builder::from_env(Env::default().default_filter_or("debug"))
    } else {
        Builder::from_env(Env::default().default_filter_or("info"))
    };

    builder.format(|f, record| match record.level() {
        log::Level::Error => {
            eprintln!("{}", record.args());
            Ok(())
        }
        _ => {
            writeln!(f, "{}", record.args())
        }
    });

    builder.target(Target::Stdout).init();

    info!("module version: {}", env!("CARGO_PKG_VERSION"));

    if let Err(e) = run().await {
        error!("{e:#}");
        std::process::exit(1);
    }

    debug!("good bye");
}

async fn run() -> Result<()> {
    let config = PanelConfig::load()?;
    info!(
        "device at {} (timeout {:?})",
        config.base_url, config.request_timeout
    );

    let gateway = Gateway::new(config.base_url.clone(), config.request_timeout);
    let notifier = Notifier::new(config.notification_base_top, NotificationTiming::default());
    let mut panel = Panel::new(ModemDeviceClient::new(gateway), notifier.clone())
        .with_request_timeout(config.request_timeout);

    let mut notifications = notifier.subscribe();
    let notification_printer = tokio::spawn(async move {
        let mut printed = HashSet::new();
        while notifications.changed().await.is_ok() {
            let current = notifications.borrow_and_update().clone();
            let fresh: Vec<_> = current
                .iter()
                .filter(|n| printed.insert(n.id))
                .cloned()
                .collect();
            printed.retain(|id| current.iter().any(|n| n.id == *id));
            if !fresh.is_empty() {
                println!("{}", render_notifications(&fresh));
            }
        }
    });

    let mut view = panel.subscribe();
    let busy_printer = tokio::spawn(async move {
        let mut was_loading = false;
        while view.changed().await.is_ok() {
            let loading = view.borrow_and_update().loading;
            if loading && !was_loading {
                println!("busy...");
            }
            was_loading = loading;
        }
    });

    panel.handle(Event::Mount).await;
    print!("{}", render_state(panel.state()));
    println!("type 'help' for commands");

    let mut draft = SettingsDraft::default();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await.context("failed to read stdin")? {
        let input = match parse_line(&line) {
            Ok(Some(input)) => input,
            Ok(None) => continue,
            Err(e) => {
                eprintln!("{e:#}");
                continue;
            }
        };

        let event = match input {
            Input::Show => {
                print!("{}", render_state(panel.state()));
                continue;
            }
            Input::Help => {
                println!("{HELP}");
                continue;
            }
            Input::Quit => break,
            Input::Command(command) => Event::CommandButton(command),
            Input::Confirm(action) => {
                let pending = panel.state().confirmation.as_ref().map(|c| c.action);
                match action.or(pending) {
                    Some(action) => Event::ConfirmationConfirm(action),
                    None => {
                        eprintln!("nothing to confirm");
                        continue;
                    }
                }
            }
            Input::Cancel => Event::ConfirmationCancel,
            Input::OpenSettings => Event::OpenSettings,
            Input::Set(field, value) => {
                if panel.state().is_settings_dialog_open() {
                    draft.set(field, value);
                    println!("  {field}: {}", draft.get(field));
                } else {
                    eprintln!("open the settings dialog first");
                }
                continue;
            }
            Input::Save => Event::SettingsDialogSave(draft.clone()),
            Input::Close => Event::SettingsDialogCancel,
        };

        panel.handle(event).await;

        if let Some(dialog) = &panel.state().settings_dialog {
            draft = dialog.draft.clone();
        }
        print!("{}", render_state(panel.state()));
    }

    busy_printer.abort();
    notification_printer.abort();
    Ok(())
}
