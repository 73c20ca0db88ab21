//! Startup banner and URL display

use super::config::{AppConfig, is_all_interfaces, redact_uri};
use super::constants::APP_NAME;

// Label column width
const W: usize = 10;

/// Format a URL as a clickable terminal hyperlink if supported
fn terminal_link(url: &str) -> String {
    if supports_hyperlinks::on(supports_hyperlinks::Stream::Stdout) {
        format!("\x1b]8;;{}\x07\x1b[36m{}\x1b[0m\x1b]8;;\x07", url, url)
    } else {
        format!("\x1b[36m{}\x1b[0m", url)
    }
}

/// Host shown in URLs; wildcard binds display as localhost
fn display_host(host: &str) -> &str {
    if is_all_interfaces(host) {
        "localhost"
    } else {
        host
    }
}

/// Print the startup banner with URLs and the active store
pub fn print_banner(config: &AppConfig, store_backend: &str) {
    let host = config.server.host.as_str();
    let port = config.server.port;

    println!();
    println!(
        "  \x1b[1m\x1b[36m{}\x1b[0m \x1b[90mv{}\x1b[0m",
        APP_NAME,
        env!("CARGO_PKG_VERSION")
    );
    println!();

    let api_url = format!("http://{}:{}/api/v1", display_host(host), port);
    println!(
        "  \x1b[32m➜\x1b[0m  \x1b[1m{:<W$}\x1b[0m {}",
        "API:",
        terminal_link(&api_url)
    );

    if host == "127.0.0.1" || host == "localhost" {
        println!(
            "  \x1b[90m➜  {:<W$} use --host 0.0.0.0 to expose\x1b[0m",
            "Network:"
        );
    } else if is_all_interfaces(host) {
        if let Ok(interfaces) = local_ip_address::list_afinet_netifas() {
            for (_, ip) in interfaces
                .iter()
                .filter(|(_, ip)| ip.is_ipv4() && !ip.is_loopback())
            {
                let network_url = format!("http://{}:{}/api/v1", ip, port);
                println!(
                    "  \x1b[32m➜\x1b[0m  \x1b[1m{:<W$}\x1b[0m {}",
                    "Network:",
                    terminal_link(&network_url)
                );
            }
        }
    }

    let store = match config.database.mongo {
        Some(ref mongo) if store_backend == "mongo" => {
            format!("{} ({}/{})", redact_uri(&mongo.uri), mongo.database, mongo.collection)
        }
        _ => store_backend.to_string(),
    };
    println!("  \x1b[90m➜  {:<W$} {}\x1b[0m", "Store:", store);

    println!();
}
