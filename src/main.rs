use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    server_installer_lib::run().await
}
