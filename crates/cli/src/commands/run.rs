use clap::Args;
use envlift_config::{ConfigResolver, EnvProvider};
use envlift_core::{ConfigOption, Error, Result};
use envlift_env::{
    execute_command, merge_environment, ApiSecretsSource, FallbackCache, FetchOptions,
    SecretFetcher,
};
use envlift_utils::RetryPolicy;
use std::path::PathBuf;

use crate::context::Context;

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Discard the command's stdout and stderr
    #[arg(long)]
    pub silent: bool,

    /// Project to fetch secrets from
    #[arg(short, long)]
    pub project: Option<String>,

    /// Config (environment) to fetch secrets from
    #[arg(short, long)]
    pub config: Option<String>,

    /// Write secrets here after each fetch, and read them from here when the service is unavailable
    #[arg(long, value_name = "FILE")]
    pub fallback: Option<PathBuf>,

    /// Never update the fallback file
    #[arg(long, requires = "fallback")]
    pub fallback_readonly: bool,

    /// Read secrets only from the fallback file, without contacting the service
    #[arg(long, requires = "fallback")]
    pub fallback_only: bool,

    /// Command to run, followed by its arguments
    #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true, value_name = "COMMAND")]
    pub command: Vec<String>,
}

pub async fn execute(ctx: &Context, args: RunArgs) -> Result<()> {
    let (command, command_args) = args
        .command
        .split_first()
        .ok_or_else(|| Error::configuration("no command given"))?;

    let fallback = args.fallback.clone().map(FallbackCache::new).transpose()?;
    let scope = ctx.scope()?;
    let store = ctx.load_store()?;

    let mut flags = ctx.flags();
    flags.set_opt(ConfigOption::Project, args.project.clone());
    flags.set_opt(ConfigOption::Config, args.config.clone());
    let resolver = ConfigResolver::new(flags, EnvProvider::from_process(), &store);

    let options = FetchOptions {
        fallback,
        fallback_readonly: args.fallback_readonly,
        fallback_only: args.fallback_only,
    };
    let fetcher = SecretFetcher::new(ApiSecretsSource::new(ctx.timeout(), RetryPolicy::default()));
    let fetched = fetcher.fetch(&resolver, &scope, &options).await?;

    tracing::debug!(count = fetched.secrets.len(), origin = ?fetched.origin, "fetched secrets");

    let env = merge_environment(std::env::vars_os(), &fetched.secrets);
    let code = execute_command(command, command_args, &env, !args.silent)?;
    if code != 0 {
        return Err(Error::command_execution(
            command.as_str(),
            command_args.to_vec(),
            "command exited unsuccessfully",
            Some(code),
        ));
    }
    Ok(())
}
