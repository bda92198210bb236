//! Runs the TODO agent chain once and logs the tool results.

#[macro_use]
extern crate tracing;

use std::error::Error;
use std::process::ExitCode;

use quickstart_model::ModelMessage;
use quickstart_todo_agent::{
    AppConfig, chat_model, gateway_transport, todo_chain, todo_tools,
};
use tracing_subscriber::EnvFilter;

const PROMPT: &str = "Add a TODO for learning the chain framework, and search \
                      for the repository URL of cloudwego/eino";

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(_) => ExitCode::FAILURE,
    }
}

// Failures are logged by the step that hit them.
async fn run() -> Result<(), Box<dyn Error>> {
    info!("[step 1] loading .env");
    match dotenvy::dotenv() {
        Ok(path) => info!("[step 1] loaded {}", path.display()),
        Err(err) => warn!("[step 1] .env not loaded: {err}"),
    }

    info!("[step 2] reading configuration");
    let config = AppConfig::from_env()
        .inspect_err(|err| error!("[step 2] failed: {err}"))?;
    info!("[step 2] using model `{}` at {}", config.model_name, config.api_url);

    info!("[step 3] creating the gateway transport");
    let transport = gateway_transport(&config)
        .inspect_err(|err| error!("[step 3] failed: {err}"))?;
    info!("[step 3] injecting {} headers", transport.headers().len());

    info!("[step 4] creating the chat model");
    let model = chat_model(&config, transport, Some(0.7));
    info!("[step 4] chat model created");

    info!("[step 5] creating the tools node");
    // The search engine must not see the gateway credentials.
    let tools = todo_tools(reqwest::Client::new());
    info!("[step 5] tools node created with {} tools", tools.len());

    info!("[step 6] compiling the chain");
    let chain = todo_chain(model, tools)
        .inspect_err(|err| error!("[step 6] failed: {err}"))?;
    for (idx, tool) in chain.tools().iter().enumerate() {
        info!("[step 6] tool {}: {}", idx + 1, tool.name);
    }
    info!("[step 6] chain compiled");

    info!("[step 7] invoking the chain");
    let output = chain
        .invoke(vec![ModelMessage::User(PROMPT.to_owned())])
        .await
        .inspect_err(|err| error!("[step 7] failed: {err}"))?;
    info!("[step 7] chain finished with {} messages", output.len());

    for (idx, msg) in output.iter().enumerate() {
        info!("message {idx}: {}: {}", msg.role(), msg.content());
    }
    Ok(())
}
