//
// Copyright (c) The ocprobe Contributors
//
// SPDX-License-Identifier: MIT
//

#![allow(clippy::derivable_impls)]

use std::time::Duration;

use ocprobe_conformance::Settings;
use ocprobe_gnmi::{ConnectOptions, TlsOptions};
use ocprobe_otg::ClientOptions;
use ocprobe_session::{Deviations, Testbed};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub dut: Dut,
    pub ate: Ate,
    pub testbed: Testbed,
    pub deviations: Deviations,
    pub timers: Timers,
    pub logging: Logging,
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Dut {
    pub address: String,
    // RPC timeout, in seconds.
    pub timeout: u64,
    pub tls: Tls,
    pub credentials: Option<Credentials>,
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Tls {
    pub enabled: bool,
    pub ca_certificate: Option<String>,
    pub domain_name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Ate {
    pub address: String,
    // Request timeout, in seconds.
    pub timeout: u64,
    pub insecure: bool,
}

// Durations of the test phases, in seconds.
#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Timers {
    pub traffic_duration: u64,
    pub loss_timeout: u64,
    pub adjacency_timeout: u64,
    pub arp_timeout: u64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Logging {
    pub file: LoggingFile,
    pub stdout: LoggingStdout,
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingFile {
    pub enabled: bool,
    pub dir: String,
    pub name: String,
    pub rotation: LoggingFileRotation,
    #[serde(flatten)]
    pub fmt: LoggingFmt,
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingStdout {
    pub enabled: bool,
    #[serde(flatten)]
    pub fmt: LoggingFmt,
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingFmt {
    pub style: LoggingFmtStyle,
    pub colors: bool,
    pub show_thread_id: bool,
    pub show_source: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoggingFileRotation {
    #[default]
    Never,
    Hourly,
    Daily,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoggingFmtStyle {
    Compact,
    Full,
    Json,
    Pretty,
}

// ===== impl Config =====

impl Config {
    const DFLT_FILEPATH: &'static str = "/etc/ocprobe.toml";

    pub(crate) fn load(config_file: Option<&str>) -> Config {
        let config_file = config_file.unwrap_or(Config::DFLT_FILEPATH);

        match std::fs::read_to_string(config_file) {
            Ok(config_str) => toml::from_str(&config_str)
                .expect("Failed to parse configuration file"),
            Err(err) => {
                eprintln!("Failed to load configuration file: {err}");
                eprintln!("Falling back to default configuration...");
                Config::default()
            }
        }
    }
}

impl Default for Config {
    fn default() -> Config {
        Config {
            dut: Default::default(),
            ate: Default::default(),
            testbed: Default::default(),
            deviations: Default::default(),
            timers: Default::default(),
            logging: Default::default(),
        }
    }
}

// ===== impl Dut =====

impl Dut {
    pub(crate) fn connect_options(&self) -> ConnectOptions {
        ConnectOptions {
            tls: self.tls.enabled.then(|| TlsOptions {
                ca_certificate: self.tls.ca_certificate.clone(),
                domain_name: self.tls.domain_name.clone(),
            }),
            credentials: self.credentials.as_ref().map(|credentials| {
                ocprobe_gnmi::Credentials {
                    username: credentials.username.clone(),
                    password: credentials.password.clone(),
                }
            }),
            timeout: Some(Duration::from_secs(self.timeout)),
        }
    }
}

impl Default for Dut {
    fn default() -> Dut {
        Dut {
            address: "http://[::1]:10161".to_owned(),
            timeout: 30,
            tls: Default::default(),
            credentials: None,
        }
    }
}

// ===== impl Tls =====

impl Default for Tls {
    fn default() -> Tls {
        Tls {
            enabled: false,
            ca_certificate: None,
            domain_name: None,
        }
    }
}

// ===== impl Ate =====

impl Ate {
    pub(crate) fn client_options(&self) -> ClientOptions {
        ClientOptions {
            timeout: Some(Duration::from_secs(self.timeout)),
            insecure: self.insecure,
        }
    }
}

impl Default for Ate {
    fn default() -> Ate {
        Ate {
            address: "https://localhost:8443".to_owned(),
            timeout: 60,
            insecure: true,
        }
    }
}

// ===== impl Timers =====

impl Timers {
    pub(crate) fn settings(&self) -> Settings {
        Settings {
            traffic_duration: Duration::from_secs(self.traffic_duration),
            loss_timeout: Duration::from_secs(self.loss_timeout),
            adjacency_timeout: Duration::from_secs(self.adjacency_timeout),
            arp_timeout: Duration::from_secs(self.arp_timeout),
        }
    }
}

impl Default for Timers {
    fn default() -> Timers {
        let settings = Settings::default();
        Timers {
            traffic_duration: settings.traffic_duration.as_secs(),
            loss_timeout: settings.loss_timeout.as_secs(),
            adjacency_timeout: settings.adjacency_timeout.as_secs(),
            arp_timeout: settings.arp_timeout.as_secs(),
        }
    }
}

// ===== impl LoggingFile =====

impl Default for LoggingFile {
    fn default() -> LoggingFile {
        LoggingFile {
            enabled: false,
            dir: "/var/log".to_owned(),
            name: "ocprobe.log".to_owned(),
            rotation: Default::default(),
            fmt: Default::default(),
        }
    }
}

// ===== impl LoggingStdout =====

impl Default for LoggingStdout {
    fn default() -> LoggingStdout {
        LoggingStdout {
            enabled: true,
            fmt: Default::default(),
        }
    }
}

// ===== impl LoggingFmt =====

impl Default for LoggingFmt {
    fn default() -> LoggingFmt {
        LoggingFmt {
            style: LoggingFmtStyle::Full,
            colors: false,
            show_thread_id: false,
            show_source: false,
        }
    }
}

// ===== unit tests =====

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse() {
        let config: Config = toml::from_str(
            r#"
            [dut]
            address = "https://dut.example.net:9339"
            tls = { enabled = true, domain_name = "dut.example.net" }
            credentials = { username = "admin", password = "admin" }

            [testbed]
            dut_port1 = "Ethernet1"
            dut_port2 = "Ethernet2"

            [deviations]
            skip_setting_disable_metric_propagation = true

            [timers]
            traffic_duration = 10

            [logging.stdout]
            style = "compact"
            "#,
        )
        .unwrap();

        let options = config.dut.connect_options();
        let tls = options.tls.unwrap();
        assert_eq!(tls.domain_name.as_deref(), Some("dut.example.net"));
        assert_eq!(options.credentials.unwrap().username, "admin");
        assert_eq!(config.testbed.dut_port2, "Ethernet2");
        assert!(config.deviations.skip_setting_disable_metric_propagation);
        assert_eq!(config.deviations.isis_instance_name, "DEFAULT");

        let settings = config.timers.settings();
        assert_eq!(settings.traffic_duration, Duration::from_secs(10));
        assert_eq!(settings.loss_timeout, Duration::from_secs(20));
        assert!(matches!(
            config.logging.stdout.fmt.style,
            LoggingFmtStyle::Compact
        ));
        assert!(!config.logging.file.enabled);
    }

    #[test]
    fn unknown_field() {
        assert!(toml::from_str::<Config>("[ate]\nport = 1").is_err());
    }
}
