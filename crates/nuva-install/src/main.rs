mod logging;
mod settings;

use std::process::ExitCode;

use log::{debug, warn};
use nuva_core::{InstallError, InstallProgress, Installer};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

fn describe(event: &InstallProgress) -> Option<String> {
    match event {
        InstallProgress::PlatformResolved { platform, .. } => {
            Some(format!("installing nuva for {platform}"))
        }
        InstallProgress::VersionResolved(version) => {
            Some(format!("downloading nuva version: {version}"))
        }
        InstallProgress::Downloading { url } => Some(url.clone()),
        InstallProgress::Downloaded { .. } => Some("successfully downloaded zip file".to_string()),
        InstallProgress::Extracting => None,
    }
}

fn failure_line(err: &InstallError) -> String {
    format!("error: {err}")
}

#[tokio::main]
async fn main() -> ExitCode {
    let (config, source) = settings::load();
    logging::init_logging(config.debug_logging, config.max_log_size_bytes);
    source.log();

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling install");
            on_interrupt.cancel();
        }
    });

    let (tx, mut rx) = mpsc::channel(8);
    let printer = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            if let Some(line) = describe(&event) {
                println!("{line}");
            }
        }
    });

    let result = Installer::new(config).run(&cancel, &tx).await;
    drop(tx);
    let _ = printer.await;

    match result {
        Ok(report) => {
            println!("{}", report.completion_message());
            ExitCode::SUCCESS
        }
        Err(err) => {
            debug!("Install failed: {err:?}");
            eprintln!("{}", failure_line(&err));
            ExitCode::FAILURE
        }
    }
}
