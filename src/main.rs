#[actix_web::main]
async fn main() -> std::io::Result<()> {
    rxpad_server::run().await
}
