use tracing::{error, info};
use tralbum::{
    common::{AnyResult, logger},
    configs::Config,
    sources::SourceManager,
};

#[tokio::main]
async fn main() -> AnyResult<()> {
    let config = Config::load()?;
    logger::init(&config);

    let identifiers: Vec<String> = std::env::args().skip(1).collect();
    if identifiers.is_empty() {
        eprintln!("usage: tralbum <url>...");
        std::process::exit(2);
    }

    let manager = SourceManager::new(&config);
    info!("Sources: {}", manager.source_names().join(", "));

    for identifier in &identifiers {
        let result = manager.load(identifier).await;
        match serde_json::to_string_pretty(&result) {
            Ok(json) => println!("{}", json),
            Err(e) => error!("Could not serialize result for {}: {}", identifier, e),
        }
    }

    manager.shutdown();
    Ok(())
}
