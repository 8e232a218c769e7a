use std::path::PathBuf;

use clap::Parser;

use crate::config::ConfigFile;

/// Browse eClass assignments and hide the ones you are done with
#[derive(Parser, Debug, Default)]
#[command(name = "assignments")]
#[command(about = "Browse eClass assignments and hide the ones you are done with")]
pub struct Args {
    /// Configuration file (default: <config dir>/eclass-utils/assignments.toml)
    #[arg(long, short)]
    pub config: Option<PathBuf>,

    /// eClass username, overriding [credentials]
    #[arg(long, short)]
    pub username: Option<String>,

    /// eClass domain, overriding [credentials]
    #[arg(long, short)]
    pub domain: Option<String>,

    /// JSON assignment endpoint (an adapter in front of eClass), overriding [options]
    #[arg(long)]
    pub source_url: Option<String>,

    /// Also load built-in sample assignments
    #[arg(long)]
    pub demo: bool,

    /// Start with expired assignments shown
    #[arg(long, short = 'e')]
    pub include_expired: bool,
}

impl Args {
    /// Apply command-line overrides to the loaded file, for this session only.
    pub fn apply(&self, config: &mut ConfigFile) {
        if let Some(username) = &self.username {
            config.credentials.username = Some(username.clone());
        }
        if let Some(domain) = &self.domain {
            config.credentials.domain = Some(domain.clone());
        }
        if let Some(url) = &self.source_url {
            config.options.source_url = Some(url.clone());
        }
        config.options.demo |= self.demo;
        config.options.include_expired |= self.include_expired;
    }
}
