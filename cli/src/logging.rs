use tracing_subscriber::EnvFilter;

/// Install the stderr subscriber. `-v` raises the level to debug, `-vv` to trace.
pub fn init(level: &str, verbose: u8) {
    let level = match verbose {
        0 => level,
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_new(format!("warn,bmi={level},bmi_core={level}"))
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
