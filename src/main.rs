use loom_mcp::config::Config;
use loom_mcp::services::logger::init_tracing;

#[tokio::main]
async fn main() {
    init_tracing();
    if let Err(err) = loom_mcp::mcp::server::run_stdio(Config::from_env()).await {
        eprintln!("loom-mcp: {}", err);
        std::process::exit(1);
    }
}
