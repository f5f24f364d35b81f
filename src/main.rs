#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    campus_events::run().await;
}
