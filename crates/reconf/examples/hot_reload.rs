//! Hot reload example polling a TOML file.
//!
//! A periodic trigger checks the file every second; `get()` picks up the
//! new content on the next access.
//!
//! # Running
//!
//! ```bash
//! cargo run --example hot_reload --features toml
//!
//! # In another terminal, modify the config
//! echo 'port = 9090' > /tmp/reconf_example.toml
//! ```

use std::fs;
use std::io::Write;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use reconf::reloading::{
    PeriodicReloadingTrigger, ReloadingConfig, ReloadingControl, ReloadingEvent,
};

#[derive(Debug, Clone)]
struct Config {
    port: u16,
    host: String,
    debug: bool,
}

fn parse(path: &std::path::Path) -> Result<Config, reconf::Error> {
    let content = fs::read_to_string(path)?;
    let table: toml::Table = toml::from_str(&content)
        .map_err(|e| reconf::Error::load_with(format!("invalid TOML in {}", path.display()), e))?;

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let port = table
        .get("port")
        .and_then(toml::Value::as_integer)
        .unwrap_or(8080) as u16;
    let host = table
        .get("host")
        .and_then(|v| v.as_str())
        .unwrap_or("localhost")
        .to_string();
    let debug = table
        .get("debug")
        .and_then(toml::Value::as_bool)
        .unwrap_or(false);

    Ok(Config { port, host, debug })
}

fn main() -> reconf::Result<()> {
    let config_path = std::env::temp_dir().join("reconf_example.toml");
    {
        let mut file = fs::File::create(&config_path).map_err(reconf::Error::from)?;
        writeln!(file, "port = 8080").map_err(reconf::Error::from)?;
        writeln!(file, "host = \"localhost\"").map_err(reconf::Error::from)?;
    }

    println!("Config file: {}", config_path.display());
    println!("Modify this file to see hot reload in action!\n");

    let path = config_path.clone();
    let config = ReloadingConfig::<Config>::builder()
        .file(&config_path)
        .refresh_delay(Duration::from_millis(500))
        .on_change(|change| {
            println!("\n[RELOAD] Configuration changed ({})", change.trigger);
            println!("  Old: {:?}", change.old);
            println!("  New: {:?}", change.new);
        })
        .on_error(|err| {
            eprintln!("\n[ERROR] Config reload failed: {err}");
            eprintln!("  Previous config is still active");
        })
        .build(move || parse(&path))?;

    config
        .controller()
        .add_listener(Arc::new(|_: &ReloadingEvent<'_>| println!("[TRIGGER] Change detected")));

    let trigger = PeriodicReloadingTrigger::builder(config.controller().clone())
        .period(Duration::from_secs(1))
        .build()?;
    trigger.start()?;

    println!("Initial configuration:");
    println!("  {:?}", config.get());
    println!("\nPolling for changes (press Ctrl+C to exit)...\n");

    let mut last_epoch = config.epoch();
    loop {
        thread::sleep(Duration::from_secs(2));

        let current = config.get();
        if config.has_changed_since(last_epoch) {
            last_epoch = config.epoch();
            println!(
                "[POLL] Serving {}:{} (debug: {})",
                current.host, current.port, current.debug
            );
        }
    }
}
