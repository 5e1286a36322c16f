//
// Copyright (c) The ocprobe Contributors
//
// SPDX-License-Identifier: MIT
//

mod config;

use clap::{App, Arg};
use config::{Config, LoggingFileRotation, LoggingFmtStyle};
use ocprobe_conformance::{Runner, redistribution};
use ocprobe_gnmi::{GnmiClient, Target};
use ocprobe_otg::OtgClient;
use ocprobe_session::TestSession;
use tracing::level_filters::LevelFilter;
use tracing::{error, info, warn};
use tracing_appender::rolling;
use tracing_subscriber::Layer;
use tracing_subscriber::prelude::*;

fn init_tracing(config: &config::Logging) {
    // Enable logging to a file.
    let file = config.file.enabled.then(|| {
        let file_appender = match config.file.rotation {
            LoggingFileRotation::Never => {
                rolling::never(&config.file.dir, &config.file.name)
            }
            LoggingFileRotation::Hourly => {
                rolling::hourly(&config.file.dir, &config.file.name)
            }
            LoggingFileRotation::Daily => {
                rolling::daily(&config.file.dir, &config.file.name)
            }
        };

        let log_level_filter = LevelFilter::from_level(tracing::Level::TRACE);
        let layer = tracing_subscriber::fmt::layer()
            .with_writer(file_appender)
            .with_target(false)
            .with_thread_ids(config.file.fmt.show_thread_id)
            .with_file(config.file.fmt.show_source)
            .with_line_number(config.file.fmt.show_source)
            .with_ansi(config.file.fmt.colors);
        let layer = match config.file.fmt.style {
            LoggingFmtStyle::Compact => layer.compact().boxed(),
            LoggingFmtStyle::Full => layer.boxed(),
            LoggingFmtStyle::Json => layer.json().boxed(),
            LoggingFmtStyle::Pretty => layer.pretty().boxed(),
        };
        layer.with_filter(log_level_filter)
    });

    // Enable logging to stdout.
    let stdout = config.stdout.enabled.then(|| {
        let log_level_filter = LevelFilter::from_level(tracing::Level::TRACE);
        let layer = tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_thread_ids(config.stdout.fmt.show_thread_id)
            .with_file(config.stdout.fmt.show_source)
            .with_line_number(config.stdout.fmt.show_source)
            .with_ansi(config.stdout.fmt.colors);
        let layer = match config.stdout.fmt.style {
            LoggingFmtStyle::Compact => layer.compact().boxed(),
            LoggingFmtStyle::Full => layer.boxed(),
            LoggingFmtStyle::Json => layer.json().boxed(),
            LoggingFmtStyle::Pretty => layer.pretty().boxed(),
        };
        layer.with_filter(log_level_filter)
    });

    let env_filter = tracing_subscriber::EnvFilter::builder()
        .with_default_directive("ocprobe=debug".parse().unwrap())
        .from_env_lossy();
    tracing_subscriber::registry()
        .with(env_filter)
        .with(file)
        .with(stdout)
        .init();
}

// ===== main =====

fn main() {
    // Parse command-line parameters.
    let matches = App::new("OpenConfig static route redistribution test")
        .version(env!("CARGO_PKG_VERSION"))
        .arg(
            Arg::with_name("config")
                .short("c")
                .long("config")
                .value_name("file")
                .help("Specify an alternative configuration file."),
        )
        .get_matches();

    // Read configuration file.
    let config_file = matches.value_of("config");
    let config = Config::load(config_file);

    // Initialize tracing.
    init_tracing(&config.logging);

    // Connect to the device under test.
    let options = config.dut.connect_options();
    let mut dut = match GnmiClient::connect(&config.dut.address, &options) {
        Ok(dut) => dut,
        Err(error) => {
            error.log();
            std::process::exit(1);
        }
    };
    match dut.capabilities() {
        Ok(capabilities) if !capabilities.json_ietf => {
            warn!("DUT doesn't advertise the JSON_IETF encoding");
        }
        Ok(capabilities) => {
            info!(version = %capabilities.version, "connected to DUT");
        }
        Err(error) => {
            error.log();
            std::process::exit(1);
        }
    }

    // Connect to the traffic generator.
    let options = config.ate.client_options();
    let ate = match OtgClient::new(&config.ate.address, &options) {
        Ok(ate) => ate,
        Err(error) => {
            error.log();
            std::process::exit(1);
        }
    };

    // Run the test.
    let settings = config.timers.settings();
    let mut session =
        TestSession::new(dut, ate, config.testbed, config.deviations)
            .with_isis();
    let mut runner = Runner::new();
    redistribution::run(&mut runner, &mut session, &settings);

    let report = runner.finish();
    print!("{report}");
    if report.failed() {
        error!("test failed");
        std::process::exit(1);
    }

    info!("test passed");
}
