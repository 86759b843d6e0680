use std::path::Path;

use config::{Config, Environment, File};
use serde::Deserialize;

use crate::error::Result;
use crate::mailer::MailerConfig;
use crate::notify::ColorPolicy;
use crate::parser::MatcherKind;

pub const ENV_PREFIX: &str = "REPORT_MAILER";
pub const DEFAULT_CONFIG_FILE: &str = "report_mailer.toml";

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub sender_name: String,
    pub sender_address: String,
    pub password: Option<String>,
    pub smtp_host: String,
    pub smtp_port: u16,
    pub verify_command: Vec<String>,
    pub render_command: Vec<String>,
    pub pass_color: String,
    pub fail_color: String,
    pub code_language: String,
    pub listing_matcher: MatcherKind,
}

/// Values given on the command line; they win over file and environment.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub sender_address: Option<String>,
    pub password: Option<String>,
    pub listing_matcher: Option<String>,
}

impl Settings {
    /// defaults → optional TOML file → `REPORT_MAILER_*` env → CLI overrides.
    pub fn load(file: Option<&Path>, overrides: Overrides) -> Result<Self> {
        let file_source = match file {
            Some(path) => File::from(path).required(true),
            None => File::with_name(DEFAULT_CONFIG_FILE).required(false),
        };
        let settings = Config::builder()
            .set_default("sender_name", "Codecheck Grader")?
            .set_default("sender_address", "grader@localhost")?
            .set_default("smtp_host", "smtp.gmail.com")?
            .set_default("smtp_port", 465)?
            .set_default("verify_command", vec!["jarsigner", "-verify"])?
            .set_default("render_command", vec!["open", "-W", "-a", "MacDown"])?
            .set_default("pass_color", "green")?
            .set_default("fail_color", "red")?
            .set_default("code_language", "java")?
            .set_default("listing_matcher", "state-machine")?
            .add_source(file_source)
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .try_parsing(true)
                    .list_separator(" ")
                    .with_list_parse_key("verify_command")
                    .with_list_parse_key("render_command"),
            )
            .set_override_option("sender_address", overrides.sender_address)?
            .set_override_option("password", overrides.password)?
            .set_override_option("listing_matcher", overrides.listing_matcher)?
            .build()?;
        Ok(settings.try_deserialize()?)
    }

    pub fn mailer(&self) -> MailerConfig {
        MailerConfig {
            sender_name: self.sender_name.clone(),
            sender_address: self.sender_address.clone(),
            password: self.password.clone(),
            smtp_host: self.smtp_host.clone(),
            smtp_port: self.smtp_port,
        }
    }

    pub fn colors(&self) -> ColorPolicy {
        ColorPolicy {
            pass: self.pass_color.clone(),
            fail: self.fail_color.clone(),
        }
    }
}
