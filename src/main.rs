#[tokio::main]
async fn main() {
    if let Err(e) = silverline::run().await {
        eprintln!("silverline: {e}");
        std::process::exit(1);
    }
}
