use super::{AppBox, Config, Heartbeat, Logs, Shutdown};
use crate::signal::SignalKind;
use std::time::Duration;

/// Creates a new test configuration.
pub fn new_test_config() -> Config {
    Config {
        app: AppBox {
            env: super::TEST.to_string(),
            name: Some("applife-test".to_string()),
            version: Some("v0.0.1".to_string()),
            logs: Some(Logs {
                level: Some("debug".to_string()),
            }),
            shutdown: Some(Shutdown {
                close_signals: Some(vec![SignalKind::Interrupt, SignalKind::Terminate]),
                timeout: Some(Duration::from_secs(5)),
            }),
            heartbeat: Some(Heartbeat {
                enabled: true,
                interval: Some(Duration::from_millis(10)),
            }),
        },
    }
}
