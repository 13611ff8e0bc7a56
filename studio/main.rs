/// ferrite-leaf Studio
///
/// Browser front end for the tomato-leaf disease classifier. Served by a
/// synchronous tiny_http server; no JavaScript frameworks required.
///
/// Run with:
///   cargo run --bin studio --release -- --artifacts artifacts
/// Then open http://127.0.0.1:7878
///
/// Tabs:
///   1. Classify   : upload a leaf photo and get the predicted disease
///   2. Performance: filtered per-class metrics and confusion matrix

mod state;
mod render;
mod routes;
mod handlers;
mod util;

use std::path::PathBuf;

use clap::Parser;
use tiny_http::Server;
use tracing::{info, warn};

use ferrite_leaf::utils::init_tracing;
use ferrite_leaf::{DirectoryStore, HistogramExtractor, ModelRepository};

use state::{FlashMessage, StudioState};

#[derive(Parser)]
#[command(name = "studio", about = "Interactive tomato-leaf disease classifier")]
struct Args {
    /// Address to listen on.
    #[arg(long, env = "FERRITE_LEAF_ADDR", default_value = "127.0.0.1:7878")]
    addr: String,

    /// Directory holding model.json, label_encoder.json, x_test.json and y_test.json.
    #[arg(long, env = "FERRITE_LEAF_ARTIFACTS", default_value = "artifacts")]
    artifacts: PathBuf,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();
    let args = Args::parse();

    let extractor  = HistogramExtractor::default();
    let repository = ModelRepository::new(DirectoryStore::new(&args.artifacts), *extractor.config());
    let mut state  = StudioState::new(repository, extractor);

    // Warm the cache; a failure is shown on the first page and retried on use.
    if let Err(e) = state.repository.load() {
        warn!(artifacts = %args.artifacts.display(), "model artifacts unavailable: {}", e);
        state.flash = Some(FlashMessage::warning(format!("Model artifacts could not be loaded: {}", e)));
    }

    let server = Server::http(&args.addr)
        .map_err(|e| format!("failed to bind {}: {}", args.addr, e))?;

    println!("╔══════════════════════════════════════════════╗");
    println!("║          ferrite-leaf Studio                 ║");
    println!("╠══════════════════════════════════════════════╣");
    println!("║  Open in your browser:                       ║");
    println!("║  http://{:<37}║", args.addr);
    println!("╠══════════════════════════════════════════════╣");
    println!("║  Tabs: Classify > Performance                ║");
    println!("╚══════════════════════════════════════════════╝");
    info!(addr = %args.addr, "studio listening");

    for request in server.incoming_requests() {
        routes::dispatch(request, &mut state);
    }
    Ok(())
}
