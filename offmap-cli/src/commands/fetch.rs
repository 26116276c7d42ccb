//! Route a single request through the cache.

use clap::Args;
use offmap::router::ResourceRequest;
use std::path::PathBuf;

use crate::error::CliError;
use crate::runner::{CliRunner, GlobalOptions};

#[derive(Debug, Args)]
pub struct FetchArgs {
    /// URL to request
    pub url: String,

    /// Write the response body to this file
    #[arg(long, short)]
    pub output: Option<PathBuf>,

    /// Treat the network as unreachable
    #[arg(long)]
    pub offline: bool,
}

pub fn run(options: &GlobalOptions, args: FetchArgs) -> Result<(), CliError> {
    let runner = CliRunner::new(options)?;
    runner.log_startup("fetch");
    let service = runner.create_service()?;

    service.connectivity().set_online(!args.offline);

    let outcome = runner.block_on(service.route(&ResourceRequest::get(args.url.as_str())));

    println!("Status:  {}", outcome.status());
    println!("Source:  {}", outcome.source());
    if let Some(content_type) = outcome.content_type() {
        println!("Type:    {}", content_type);
    }
    println!("Size:    {} bytes", outcome.body().len());

    if !outcome.is_success() {
        return Err(CliError::Unavailable {
            url: args.url,
            status: outcome.status(),
        });
    }

    if let Some(path) = args.output {
        runner.save(&path, outcome.body())?;
        println!("Saved:   {}", path.display());
    }
    Ok(())
}
