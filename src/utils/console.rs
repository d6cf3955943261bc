// src/utils/console.rs

//! Banner and summary helpers layered on the `log` facade.
//!
//! Everything here logs at info level, so `RUST_LOG` filtering applies
//! uniformly.

/// Log a header framed by rule lines.
pub fn header(title: &str) {
    let border = "═".repeat(60);
    log::info!("{}", border);
    log::info!("  {}", title);
    log::info!("{}", border);
}

/// Log a step in a multi-step process.
pub fn step(step_num: usize, total: usize, message: &str) {
    log::info!("[STEP {}/{}] {}", step_num, total, message);
}

/// Log a sub-item (indented).
pub fn sub_item(message: &str) {
    log::info!("    {}", message);
}

/// Log a titled list of key/value pairs.
pub fn summary(title: &str, items: &[(&str, String)]) {
    log::info!("[SUMMARY] {}", title);
    for (key, value) in items {
        log::info!("    {}: {}", key, value);
    }
}

/// Render a yes/no flag the way the summaries print it.
pub fn flag(value: bool) -> &'static str {
    if value { "yes" } else { "no" }
}
