use clap::Subcommand;
use envlift_config::{
    mask_secret, ConfigResolver, ConfigStore, EnvProvider, Scope, ScopeChainProvider,
    ValueProvider,
};
use envlift_core::{ConfigOption, Error, Result};

use crate::context::Context;
use crate::formatters::print_table;

#[derive(Subcommand)]
pub enum ConfigureCommands {
    /// View active configuration utilizing all config sources
    ///
    /// Flags (--token=123) win over environment variables (ENVLIFT_TOKEN=123),
    /// which win over the config file.
    Debug,

    /// Get the value of one or more options in the config file
    Get {
        /// Print only the values, one per line, in the order given
        #[arg(long)]
        plain: bool,

        #[arg(required = true, value_name = "OPTION")]
        options: Vec<String>,
    },

    /// Set the value of one or more options in the config file
    ///
    /// Either `set OPTION VALUE` or `set OPTION=VALUE...`
    Set {
        /// Don't print the new config
        #[arg(long)]
        silent: bool,

        #[arg(required = true, value_name = "OPTION=VALUE")]
        args: Vec<String>,
    },

    /// Unset the value of one or more options in the config file
    Unset {
        /// Don't print the new config
        #[arg(long)]
        silent: bool,

        #[arg(required = true, value_name = "OPTION")]
        options: Vec<String>,
    },
}

impl ConfigureCommands {
    pub fn execute(self, ctx: &Context) -> Result<()> {
        match self {
            ConfigureCommands::Debug => debug(ctx),
            ConfigureCommands::Get { plain, options } => get(ctx, &options, plain),
            ConfigureCommands::Set { silent, args } => set(ctx, &args, silent),
            ConfigureCommands::Unset { silent, options } => unset(ctx, &options, silent),
        }
    }
}

/// Print stored options visible from the scope, or every stored scope
pub fn show(ctx: &Context, all: bool) -> Result<()> {
    let store = ctx.load_store()?;

    if all {
        let rows: Vec<Vec<String>> = store
            .all()
            .iter()
            .flat_map(|(scope, options)| {
                options
                    .iter()
                    .map(move |(name, value)| vec![name.clone(), display_value(name, value), scope.clone()])
            })
            .collect();
        return table(&["name", "value", "scope"], &rows);
    }

    print_scope(&store, &ctx.scope()?)
}

fn debug(ctx: &Context) -> Result<()> {
    let store = ctx.load_store()?;
    let scope = ctx.scope()?;
    let resolver = ConfigResolver::new(ctx.flags(), EnvProvider::from_process(), &store);

    let rows: Vec<Vec<String>> = resolver
        .resolve_all(&scope)?
        .into_iter()
        .filter_map(|(option, resolved)| resolved.map(|r| (option, r)))
        .map(|(option, resolved)| {
            vec![
                option.to_string(),
                display_value(option.as_str(), &resolved.value),
                resolved.source.to_string(),
            ]
        })
        .collect();
    table(&["name", "value", "source"], &rows)
}

fn get(ctx: &Context, names: &[String], plain: bool) -> Result<()> {
    let options = names
        .iter()
        .map(|name| name.parse::<ConfigOption>())
        .collect::<Result<Vec<_>>>()?;

    let store = ctx.load_store()?;
    let scope = ctx.scope()?;
    let chain = ScopeChainProvider::new(&store);

    let mut rows = Vec::with_capacity(options.len());
    for option in options {
        let (value, source) = match chain.lookup(option, &scope)? {
            Some(resolved) => (resolved.value, resolved.source.to_string()),
            None => (String::new(), String::new()),
        };
        rows.push(vec![option.to_string(), value, source]);
    }

    if plain {
        let values: Vec<&str> = rows.iter().map(|row| row[1].as_str()).collect();
        println!("{}", values.join("\n"));
        return Ok(());
    }
    table(&["name", "value", "scope"], &rows)
}

fn set(ctx: &Context, args: &[String], silent: bool) -> Result<()> {
    let pairs = parse_set_args(args)?;
    let scope = ctx.write_scope()?;
    let mut store = ctx.load_store()?;
    store.set(&scope, &pairs)?;

    if silent {
        return Ok(());
    }
    print_scope(&store, &scope)
}

fn unset(ctx: &Context, names: &[String], silent: bool) -> Result<()> {
    let scope = ctx.write_scope()?;
    let mut store = ctx.load_store()?;
    store.unset(&scope, names)?;

    if silent {
        return Ok(());
    }
    print_scope(&store, &scope)
}

/// `OPTION VALUE`, or one or more `OPTION=VALUE`
fn parse_set_args(args: &[String]) -> Result<Vec<(String, String)>> {
    match args {
        [] => Err(Error::configuration("no options given to set")),
        [name] if !name.contains('=') => Err(Error::configuration(format!(
            "missing value for option '{name}'"
        ))),
        [name, value] if !name.contains('=') => Ok(vec![(name.clone(), value.clone())]),
        [first, ..] if !first.contains('=') => Err(Error::configuration(
            "too many arguments. To set multiple options, use the format option=value",
        )),
        _ => args
            .iter()
            .map(|arg| {
                arg.split_once('=')
                    .filter(|(name, _)| !name.is_empty())
                    .map(|(name, value)| (name.to_string(), value.to_string()))
                    .ok_or_else(|| {
                        Error::configuration(format!(
                            "invalid argument '{arg}': expected option=value"
                        ))
                    })
            })
            .collect(),
    }
}

/// Options visible from `scope`, each with the scope that defines it
fn print_scope(store: &ConfigStore, scope: &Scope) -> Result<()> {
    table(&["name", "value", "scope"], &scope_rows(store, scope)?)
}

fn scope_rows(store: &ConfigStore, scope: &Scope) -> Result<Vec<Vec<String>>> {
    let chain = ScopeChainProvider::new(store);
    let mut rows = Vec::new();
    for option in ConfigOption::ALL {
        if let Some(resolved) = chain.lookup(option, scope)? {
            rows.push(vec![
                option.to_string(),
                display_value(option.as_str(), &resolved.value),
                resolved.source.to_string(),
            ]);
        }
    }
    Ok(rows)
}

/// Tokens are shown with all but the last four characters hidden
fn display_value(name: &str, value: &str) -> String {
    if name == ConfigOption::Token.as_str() {
        mask_secret(value)
    } else {
        value.to_string()
    }
}

fn table(headers: &[&str], rows: &[Vec<String>]) -> Result<()> {
    print_table(headers, rows).map_err(|e| Error::file_system("<stdout>", "write output", e))
}
