use clap::Subcommand;
use envlift_core::Result;

use crate::context::Context;

pub mod configure;
pub mod run;

use self::configure::ConfigureCommands;
use self::run::RunArgs;

#[derive(Subcommand)]
pub enum Commands {
    /// Run a command with secrets injected into its environment
    Run(RunArgs),

    /// View the config file
    Configure {
        /// Print the options of every scope
        #[arg(long)]
        all: bool,

        #[command(subcommand)]
        command: Option<ConfigureCommands>,
    },
}

impl Commands {
    pub async fn execute(self, ctx: &Context) -> Result<()> {
        match self {
            Commands::Run(args) => run::execute(ctx, args).await,
            Commands::Configure {
                command: Some(command),
                ..
            } => command.execute(ctx),
            Commands::Configure { all, command: None } => configure::show(ctx, all),
        }
    }
}
