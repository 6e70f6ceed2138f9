use appointment_store::run;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("appointment-store failed: {}", e);
        std::process::exit(1);
    }
}
