use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    lite_launcher_lib::run().await
}
