//! Streams a one-turn conversation with the gateway model.

#[macro_use]
extern crate tracing;

use std::env;
use std::io::Write as _;
use std::process::ExitCode;

use quickstart_model::{ModelMessage, ModelRequest};
use quickstart_todo_agent::core::ModelClient;
use quickstart_todo_agent::{AppConfig, chat_model, gateway_transport};
use tracing_subscriber::EnvFilter;

const SYSTEM_PROMPT: &str = "You are a helpful assistant.";
const DEFAULT_PROMPT: &str = "Introduce yourself in one sentence.";

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    if let Err(err) = dotenvy::dotenv() {
        debug!(".env not loaded: {err}");
    }
    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            error!("{err}");
            return ExitCode::FAILURE;
        }
    };
    let transport = match gateway_transport(&config) {
        Ok(transport) => transport,
        Err(err) => {
            error!("invalid gateway headers: {err}");
            return ExitCode::FAILURE;
        }
    };

    let args: Vec<String> = env::args().skip(1).collect();
    let prompt = if args.is_empty() {
        DEFAULT_PROMPT.to_owned()
    } else {
        args.join(" ")
    };

    let client = ModelClient::new(chat_model(&config, transport, None));
    let req = ModelRequest {
        messages: vec![
            ModelMessage::System(SYSTEM_PROMPT.to_owned()),
            ModelMessage::User(prompt),
        ],
        tools: vec![],
    };
    let resp = client
        .send_request(req, |delta| {
            let mut stdout = std::io::stdout().lock();
            stdout
                .write_all(delta.as_bytes())
                .and_then(|_| stdout.flush())
                .ok();
        })
        .await;
    println!();

    match resp {
        Ok(resp) => {
            debug!("finished: {:?}", resp.finish_reason);
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!("chat failed ({}): {err}", err.kind());
            ExitCode::FAILURE
        }
    }
}
