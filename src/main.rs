// INS Bridge - Main Entry Point
// Copyright (C) 2024 - INS record bridge
// Licensed under AGPL v3

use clap::Parser;
use ins_bridge::composer::Composer;
use ins_bridge::config::Config;
use ins_bridge::output::{CsvOutput, JsonLinesOutput, OutputHandler};
use ins_bridge::reader::{open_input, ReadError};
use tokio::signal;
use tracing::{debug, error, info, warn};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command-line arguments
    let config = Config::parse();

    init_logging(config.verbose);

    let settings = config.settings();
    info!("Starting INS bridge");
    info!(
        "Axis convention: {:?}, time reference: {:?}, frame: {}",
        settings.axis_convention, settings.time_reference, settings.frame_id
    );

    let mut outputs: Vec<Box<dyn OutputHandler>> = Vec::new();

    match &config.output {
        Some(path) => {
            info!("Writing records to {}", path);
            outputs.push(Box::new(JsonLinesOutput::create(path)?));
        }
        None => outputs.push(Box::new(JsonLinesOutput::stdout())),
    }

    if let Some(path) = &config.csv_odometry {
        if !settings.odom_enable {
            warn!("--csv-odometry without --odom-enable: the CSV file will stay empty");
        }
        info!("Writing CSV odometry to {}", path);
        match CsvOutput::new(path) {
            Ok(csv_out) => outputs.push(Box::new(csv_out)),
            Err(e) => error!("Failed to open CSV output file {}: {}", path, e),
        }
    }

    let mut reader = match open_input(config.input.as_deref()).await {
        Ok(reader) => reader,
        Err(e) => {
            error!("Unable to open input: {}", e);
            return Err(e.into());
        }
    };
    info!("Reading device logs from {}", config.input.as_deref().unwrap_or("stdin"));

    let mut composer = Composer::new(settings);
    let mut processed: u64 = 0;
    let mut rejected: u64 = 0;

    loop {
        tokio::select! {
            next = reader.next_record() => {
                match next {
                    Ok(Some(record)) => {
                        let composed = composer.process(&record);
                        debug!(
                            "{} at device time {:?}: {} records, {} transforms",
                            record.name(),
                            record.time_stamp(),
                            composed.records.len(),
                            composed.transforms.len()
                        );
                        for output in outputs.iter_mut() {
                            output.handle(&composed);
                        }
                        processed += 1;
                    }
                    Ok(None) => {
                        info!("End of input");
                        break;
                    }
                    Err(ReadError::Io(e)) => {
                        error!("Input read failed: {}", e);
                        break;
                    }
                    Err(e) => {
                        warn!("Skipping record: {}", e);
                        rejected += 1;
                    }
                }
            }
            result = signal::ctrl_c() => {
                match result {
                    Ok(()) => info!("Received shutdown signal (Ctrl+C)"),
                    Err(err) => error!("Unable to listen for shutdown signal: {}", err),
                }
                break;
            }
        }
    }

    for output in outputs.iter_mut() {
        output.flush();
    }

    info!(
        "Stopped after {} lines: {} records composed, {} rejected, origin {}",
        reader.line_number(),
        processed,
        rejected,
        if composer.projector().is_initialized() { "latched" } else { "not latched" }
    );

    Ok(())
}

/// Initialize logging subsystem
fn init_logging(verbose: bool) {
    use tracing_subscriber::fmt::format::FmtSpan;

    // Records go to stdout by default, keep logs on stderr
    let subscriber = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_level(true)
        .with_span_events(if verbose {
            FmtSpan::ENTER | FmtSpan::CLOSE
        } else {
            FmtSpan::NONE
        });

    if verbose {
        subscriber
            .with_max_level(tracing::Level::DEBUG)
            .init();
        info!("Verbose logging enabled (DEBUG level)");
    } else {
        subscriber
            .with_max_level(tracing::Level::INFO)
            .init();
    }
}
