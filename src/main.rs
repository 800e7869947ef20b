use history_tail::{BashPlugin, BatchStatus, EventSlot, FieldEntry, PluginInfo, Registrar};
use std::env;
use std::process;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

const BATCH_SLOTS: usize = 32;

/// Logs what the plugin declares; this binary is its only host.
struct LoggingRegistrar;

impl Registrar for LoggingRegistrar {
    fn register_extractor(&mut self, info: &PluginInfo, fields: &[FieldEntry]) {
        for field in fields {
            info!(plugin = info.name, field = field.name, "registered field");
        }
    }

    fn register_source(&mut self, info: &PluginInfo) {
        info!(plugin = info.name, source = info.event_source, "registered event source");
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = env::args().collect();
    if args.len() > 2 {
        eprintln!("Usage: {} [config-json]", args[0]);
        process::exit(1);
    }
    let config_text = args.get(1).map(String::as_str).unwrap_or("");

    let plugin = match BashPlugin::init(config_text) {
        Ok(plugin) => plugin,
        Err(e) => {
            error!(error = %e, "invalid configuration");
            process::exit(1);
        }
    };
    plugin.register(&mut LoggingRegistrar);

    let mut producer = match plugin.open("").await {
        Ok(producer) => producer,
        Err(e) => {
            error!(error = %e, "cannot start capture");
            process::exit(1);
        }
    };

    info!(path = %producer.path().display(), "watching for new commands");

    let mut slots = EventSlot::batch(BATCH_SLOTS);
    loop {
        let result = producer.next_batch(&mut slots).await;

        for slot in &slots[..result.filled] {
            println!("{}", String::from_utf8_lossy(slot.as_bytes()));
        }

        if let BatchStatus::Failed(e) = result.status {
            error!(error = %e, "capture stopped");
            producer.close();
            process::exit(1);
        }
    }
}
