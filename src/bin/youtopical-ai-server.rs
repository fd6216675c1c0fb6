//! youtopical AI server binary

use anyhow::Context;
use tracing_subscriber::EnvFilter;
use youtopical::{server, Answerer};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .with_level(true)
        .init();

    println!("youtopical AI service");
    println!("   Version: {}", env!("CARGO_PKG_VERSION"));
    println!();

    let port = port_from(std::env::var("PORT").ok().as_deref())?;

    let answerer = Answerer::from_env();

    match answerer.active_provider() {
        Some(provider) => println!(
            "✓ AI provider: {} ({}, {})",
            provider.name, provider.model, provider.cost_description
        ),
        None => {
            eprintln!("⚠️  No AI provider configured; /ai/ask will return 503");
            eprintln!("   Set GROQ_API_KEY, OPENROUTER_API_KEY, TOGETHER_API_KEY or OPENAI_API_KEY");
        }
    }

    println!("✓ Starting HTTP server on port {}...", port);
    println!();

    server::run_server(answerer, port).await?;

    Ok(())
}

const DEFAULT_PORT: u16 = 8081;

/// Port to bind: `PORT` when set, 8081 otherwise
fn port_from(raw: Option<&str>) -> anyhow::Result<u16> {
    match raw {
        Some(raw) => raw
            .trim()
            .parse::<u16>()
            .with_context(|| format!("PORT must be a port number (0-65535), got {:?}", raw)),
        None => Ok(DEFAULT_PORT),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_port_defaults_and_trims() {
        assert_eq!(port_from(None).unwrap(), 8081);
        assert_eq!(port_from(Some(" 9000 ")).unwrap(), 9000);
    }

    #[test]
    fn test_bad_port_names_the_variable() {
        let err = port_from(Some("80a")).unwrap_err();
        let message = format!("{:#}", err);
        assert!(message.contains("PORT"));
        assert!(message.contains("\"80a\""));
        assert!(port_from(Some("70000")).is_err());
    }
}
