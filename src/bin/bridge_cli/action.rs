use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use whatsapp_bridge::{
    config::AppConfig,
    webhook::whatsapp::{client::WhatsAppClient, schemas::WhatsAppMessageResponse, security},
};

#[derive(Args, Debug, Clone)]
pub struct SendTextArgs {
    /// Recipient's WhatsApp ID (phone number with country code)
    #[arg(short, long)]
    to: String,
    #[arg(short, long)]
    body: String,
}

#[derive(Args, Debug, Clone)]
pub struct SendTemplateArgs {
    #[arg(short, long)]
    to: String,
    /// Name of an approved template
    #[arg(short, long)]
    name: String,
    #[arg(short, long, default_value = "en_US")]
    lang: String,
    /// Body parameters, in order
    #[arg(short, long = "param")]
    params: Vec<String>,
}

#[derive(Args, Debug, Clone)]
pub struct HelloWorldArgs {
    #[arg(short, long)]
    to: String,
}

#[derive(Args, Debug, Clone)]
pub struct SignArgs {
    /// App secret; defaults to FACEBOOK_APP_SECRET
    #[arg(short, long)]
    secret: Option<String>,
    /// File holding the exact request body
    #[arg(short, long)]
    file: String,
}

#[derive(Subcommand, Clone, Debug)]
pub enum Action {
    SendText(SendTextArgs),
    SendTemplate(SendTemplateArgs),
    HelloWorld(HelloWorldArgs),
    /// Prints the X-Hub-Signature-256 value for a payload file
    Sign(SignArgs),
}

/// Local helper for the WhatsApp webhook bridge
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct AppArgs {
    #[command(subcommand)]
    pub action: Action,
}

impl AppArgs {
    pub async fn run(&self) -> anyhow::Result<()> {
        let app_config = AppConfig::load()?;

        match &self.action {
            Action::SendText(SendTextArgs { to, body }) => {
                let client = WhatsAppClient::new(&app_config)?;
                let response = client.send_text_message(to, body).await?;

                print_response(&response)
            }
            Action::SendTemplate(SendTemplateArgs {
                to,
                name,
                lang,
                params,
            }) => {
                let client = WhatsAppClient::new(&app_config)?;
                let response = if params.is_empty() {
                    client.send_template_message(to, name, lang, vec![]).await?
                } else {
                    client
                        .send_template_with_body_params(to, name, lang, params)
                        .await?
                };

                print_response(&response)
            }
            Action::HelloWorld(HelloWorldArgs { to }) => {
                let client = WhatsAppClient::new(&app_config)?;
                let response = client.send_hello_world_template(to).await?;

                print_response(&response)
            }
            Action::Sign(SignArgs { secret, file }) => {
                let secret = secret.as_deref().unwrap_or(&app_config.app_secret);
                anyhow::ensure!(
                    !secret.is_empty(),
                    "an app secret is required, pass --secret or set FACEBOOK_APP_SECRET"
                );

                let payload =
                    std::fs::read(file).with_context(|| format!("failed to read {file}"))?;
                println!("{}", security::compute_signature(&payload, secret));

                Ok(())
            }
        }
    }
}

fn print_response(response: &WhatsAppMessageResponse) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(response)?);

    Ok(())
}
