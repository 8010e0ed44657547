//! Beyond House Backend - binary entry point
//! Delegates to the library for all app logic.

#[tokio::main]
async fn main() {
    beyond_house_backend::run().await;
}
