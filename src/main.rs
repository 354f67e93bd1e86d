//! Jobtrack
//!
//! Desktop front end for tracking job applications, companies, contacts
//! and interviews.
//!
//! This is the main entry point for the Dioxus Desktop application.

use tracing_subscriber::{EnvFilter, FmtSubscriber};

fn main() {
    // Initialize logging; RUST_LOG overrides the default level
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .pretty()
        .init();

    tracing::debug!("Logging initialized");

    // Print startup banner
    println!();
    println!("╔═══════════════════════════════════════════════════════════╗");
    println!("║                                                           ║");
    println!("║   📨 Jobtrack v{:<43}║", jobtrack_ui::VERSION);
    println!("║   Applications, companies, contacts and interviews       ║");
    println!("║                                                           ║");
    println!("╚═══════════════════════════════════════════════════════════╝");
    println!();

    // Launch the Dioxus desktop application
    jobtrack_ui::launch();
}
