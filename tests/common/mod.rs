//! Shared fixtures for the integration tests

#![allow(dead_code)]

use std::sync::Arc;

use planscape::{BuildingDef, Definitions, PathDef, Scene};

/// Registry used across the integration tests
pub fn sample_defs() -> Arc<Definitions> {
    Arc::new(Definitions::new(
        vec![PathDef::new("Belt", 1.0), PathDef::new("Pipe", 2.0)],
        vec![
            BuildingDef::new("Splitter", 4.0, 4.0),
            BuildingDef::new("Merger", 4.0, 4.0),
            BuildingDef::new("Constructor", 8.0, 6.0),
        ],
    ))
}

pub fn empty_scene() -> Scene {
    init_tracing();
    Scene::new(sample_defs())
}

/// Route `tracing` output through the test harness, honoring `RUST_LOG`
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Run `f` under a scoped subscriber and return everything it logged
pub fn capture_logs(f: impl FnOnce()) -> String {
    let buf = CapturedLogs::default();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .with_ansi(false)
        .with_writer(buf.clone())
        .finish();
    tracing::subscriber::with_default(subscriber, f);
    buf.contents()
}

#[derive(Clone, Default)]
struct CapturedLogs(std::sync::Arc<std::sync::Mutex<Vec<u8>>>);

impl CapturedLogs {
    fn contents(&self) -> String {
        let bytes = self.0.lock().map(|b| b.clone()).unwrap_or_default();
        String::from_utf8_lossy(&bytes).into_owned()
    }
}

impl std::io::Write for CapturedLogs {
    fn write(&mut self, data: &[u8]) -> std::io::Result<usize> {
        if let Ok(mut b) = self.0.lock() {
            b.extend_from_slice(data);
        }
        Ok(data.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for CapturedLogs {
    type Writer = CapturedLogs;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}
