#[actix_web::main]
async fn main() -> std::io::Result<()> {
    attest_letter_server::run().await
}
