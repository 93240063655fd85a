use std::io::Write;
use std::time::Instant;

use bubbles::{BubbleManager, WidgetConfig, console, event};
use tokio::io::{AsyncBufReadExt, BufReader};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let config = WidgetConfig::from_env();
    let mut manager = BubbleManager::new(&config);
    tracing::info!(
        container_id = %config.container_id,
        eviction_secs = config.eviction_delay.as_secs(),
        "bubbles ready"
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut emitted = None;
    emit(&manager, &mut emitted);

    loop {
        tokio::select! {
            line = lines.next_line() => match line {
                Ok(Some(line)) => handle_line(&mut manager, &line),
                Ok(None) => break,
                Err(err) => {
                    tracing::error!(%err, "stdin read failed");
                    break;
                }
            },
            () = sleep_until(manager.next_eviction()) => {
                manager.evict_expired(Instant::now());
            }
        }
        emit(&manager, &mut emitted);
    }

    tracing::info!("stdin closed, shutting down");
}

/// Route one stdin line: JSON envelopes go to the dispatcher, anything else
/// is a console command.
fn handle_line(manager: &mut BubbleManager, line: &str) {
    let line = line.trim();
    if line.is_empty() {
        return;
    }

    if line.starts_with('{') {
        match event::parse_input(line) {
            Ok(input) => event::apply(manager, input),
            Err(err) => tracing::warn!(%err, "host input rejected"),
        }
    } else if cfg!(debug_assertions) {
        match console::parse_command(line) {
            Ok(command) => console::run(manager, command),
            Err(err) => tracing::warn!(%err, "console command rejected"),
        }
    } else {
        tracing::warn!("console commands are only available in debug builds");
    }
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(tokio::time::Instant::from_std(deadline)).await,
        None => std::future::pending().await,
    }
}

/// Write the surface to stdout when its revision moved.
fn emit(manager: &BubbleManager, emitted: &mut Option<u64>) {
    let revision = manager.surface().revision();
    if *emitted == Some(revision) {
        return;
    }
    let line = single_line(&manager.surface().to_html());
    let mut out = std::io::stdout().lock();
    if let Err(err) = writeln!(out, "{line}").and_then(|()| out.flush()) {
        tracing::error!(%err, "stdout write failed");
        return;
    }
    *emitted = Some(revision);
}

/// Encode line breaks as character references so one surface is one line.
fn single_line(html: &str) -> String {
    html.replace('\r', "&#13;").replace('\n', "&#10;")
}

#[cfg(test)]
#[path = "main_test.rs"]
mod tests;
