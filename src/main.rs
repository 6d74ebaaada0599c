#[tokio::main]
async fn main() {
    if let Err(e) = pharmastore::start_server().await {
        log::error!("Fatal: {e}");
        std::process::exit(1);
    }
}
