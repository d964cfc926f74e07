use clap::{Parser, Subcommand};
use std::io::{self, BufRead, Read, Write};
use std::path::PathBuf;

use textfn::api::{PlaygroundApi, PlaygroundClient};
use textfn::catalog::Catalog;
use textfn::definition::FunctionDescriptor;
use textfn::form::{self, FunctionForm};

#[derive(Parser)]
#[command(name = "textfn")]
#[command(about = "textfn CLI: run text functions on a playground server", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show version
    Version,

    /// Create the configuration directory and a default config file.
    Init {
        /// Config file path (default: TEXTFN_CONFIG_PATH or ~/.textfn/config.json)
        #[arg(long, short, value_name = "PATH")]
        config: Option<PathBuf>,
    },

    /// Show whether the server has a model key and list its functions with their input mode.
    Status {
        #[command(flatten)]
        server: ServerArgs,
    },

    /// Show a function's description and how it takes input.
    Describe {
        /// Function name as listed by `status`.
        name: String,

        #[command(flatten)]
        server: ServerArgs,
    },

    /// Run a function. Keyword functions take --arg, unary functions take --input or --stdin;
    /// no-argument functions ignore both.
    Run {
        /// Function name as listed by `status`.
        name: String,

        /// Keyword argument (repeatable).
        #[arg(long = "arg", short = 'a', value_name = "KEY=VALUE", value_parser = parse_key_value)]
        args: Vec<(String, String)>,

        /// Text input for unary functions.
        #[arg(long, conflicts_with = "stdin")]
        input: Option<String>,

        /// Read the unary input from stdin.
        #[arg(long)]
        stdin: bool,

        /// Prompt for required keyword arguments that are still empty.
        #[arg(long, short)]
        interactive: bool,

        #[command(flatten)]
        server: ServerArgs,
    },

    /// Show one page of the inference log (newest first).
    Logs {
        /// Page number, starting at 1 (default from config).
        #[arg(long, short)]
        page: Option<u32>,

        #[command(flatten)]
        server: ServerArgs,
    },

    /// Delete an inference log entry.
    DeleteLog {
        /// Entry id as shown by `logs`.
        id: String,

        #[command(flatten)]
        server: ServerArgs,
    },
}

#[derive(clap::Args)]
struct ServerArgs {
    /// Config file path (default: TEXTFN_CONFIG_PATH or ~/.textfn/config.json)
    #[arg(long, short, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Playground server URL (overrides TEXTFN_BASE_URL and config)
    #[arg(long, value_name = "URL")]
    base_url: Option<String>,
}

fn parse_key_value(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got {:?}", s))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("empty argument name in {:?}", s));
    }
    Ok((key.to_string(), value.to_string()))
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    let result = match cli.command {
        Some(Commands::Version) => {
            println!("textfn {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        Some(Commands::Init { config }) => run_init(config),
        Some(Commands::Status { server }) => run_status(server).await,
        Some(Commands::Describe { name, server }) => run_describe(name, server).await,
        Some(Commands::Run {
            name,
            args,
            input,
            stdin,
            interactive,
            server,
        }) => {
            run_function(RunArgs {
                name,
                args,
                input,
                stdin,
                interactive,
                server,
            })
            .await
        }
        Some(Commands::Logs { page, server }) => run_logs(page, server).await,
        Some(Commands::DeleteLog { id, server }) => run_delete_log(id, server).await,
        None => {
            println!("Run with --help for usage");
            Ok(())
        }
    };

    if let Err(e) = result {
        log::error!("{:#}", e);
        std::process::exit(1);
    }
}

fn run_init(config_path: Option<PathBuf>) -> anyhow::Result<()> {
    let path = config_path.unwrap_or_else(textfn::config::default_config_path);
    let _dir = textfn::init::init_config_dir(&path)?;
    println!("initialized configuration at {}", path.display());
    Ok(())
}

fn connect(server: &ServerArgs) -> anyhow::Result<(textfn::config::Config, PlaygroundClient)> {
    let (config, _) = textfn::config::load_config(server.config.clone())?;
    let client = textfn::config::client_from_config(&config, server.base_url.clone())?;
    Ok((config, client))
}

async fn fetch_catalog(client: &PlaygroundClient) -> anyhow::Result<Catalog> {
    let catalog = Catalog::fetch(client).await?;
    if !catalog.has_key() {
        log::warn!("the playground server has no model API key configured; inference will fail");
    }
    Ok(catalog)
}

fn find_function<'a>(catalog: &'a Catalog, name: &str) -> anyhow::Result<&'a FunctionDescriptor> {
    catalog
        .find(name)
        .ok_or_else(|| anyhow::anyhow!("unknown function {:?}; run `textfn status` to list functions", name))
}

fn mode_label(descriptor: &FunctionDescriptor) -> String {
    match form::resolve(descriptor) {
        Ok(mode) => mode.label().to_string(),
        Err(_) => format!("misconfigured ({})", descriptor.input_config.input_type),
    }
}

async fn run_status(server: ServerArgs) -> anyhow::Result<()> {
    let (_, client) = connect(&server)?;
    let catalog = fetch_catalog(&client).await?;
    println!("server: {}", client.base_url());
    println!("api key: {}", if catalog.has_key() { "configured" } else { "missing" });
    if catalog.is_empty() {
        println!("no functions");
        return Ok(());
    }
    let width = catalog.functions().iter().map(|f| f.name.len()).max().unwrap_or(0);
    for f in catalog.functions() {
        println!("{:width$}  {}", f.name, mode_label(f), width = width);
    }
    Ok(())
}

async fn run_describe(name: String, server: ServerArgs) -> anyhow::Result<()> {
    let (_, client) = connect(&server)?;
    let catalog = fetch_catalog(&client).await?;
    let f = find_function(&catalog, &name)?;
    println!("{}", f.name);
    if !f.description.is_empty() {
        println!();
        println!("{}", f.description.trim());
        println!();
    }
    println!("input: {}", mode_label(f));
    match form::resolve(f) {
        Ok(form::FormMode::Keyword {
            required_args,
            allow_none,
        }) => {
            if required_args.is_empty() {
                println!("required arguments: none");
            } else {
                println!("required arguments: {}", required_args.join(", "));
            }
            println!("empty input allowed: {}", allow_none);
        }
        Ok(form::FormMode::Unary { allow_none }) => {
            println!("empty input allowed: {}", allow_none);
        }
        Ok(form::FormMode::NoArgs) => {}
        Err(e) => println!("{}", e),
    }
    Ok(())
}

struct RunArgs {
    name: String,
    args: Vec<(String, String)>,
    input: Option<String>,
    stdin: bool,
    interactive: bool,
    server: ServerArgs,
}

async fn run_function(run: RunArgs) -> anyhow::Result<()> {
    let (_, client) = connect(&run.server)?;
    let catalog = fetch_catalog(&client).await?;
    let descriptor = find_function(&catalog, &run.name)?;
    let mut form = FunctionForm::for_descriptor(descriptor)?;

    match &mut form {
        FunctionForm::NoArgs => {
            if !run.args.is_empty() || run.input.is_some() || run.stdin {
                log::warn!("{} takes no input; ignoring provided input", descriptor.name);
            }
        }
        FunctionForm::Keyword(editor) => {
            if run.input.is_some() || run.stdin {
                log::warn!("{} takes keyword arguments; ignoring --input/--stdin", descriptor.name);
            }
            for (key, value) in &run.args {
                editor.update_value(key, value.as_str());
            }
            if run.interactive {
                prompt_missing(editor)?;
            }
        }
        FunctionForm::Unary(editor) => {
            if !run.args.is_empty() {
                log::warn!("{} takes a single text input; ignoring --arg", descriptor.name);
            }
            if run.stdin {
                let mut text = String::new();
                io::stdin().read_to_string(&mut text)?;
                editor.set_value(text);
            } else if let Some(text) = run.input {
                editor.set_value(text);
            }
        }
    }

    let result = textfn::submission::submit(&client, &descriptor.name, &form).await?;
    let output = result.render();
    if output.is_empty() {
        log::debug!("{} returned no output", descriptor.name);
    } else {
        println!("{}", output);
    }
    Ok(())
}

/// Ask on stdin for each required argument that is still empty. EOF stops prompting.
fn prompt_missing(editor: &mut textfn::form::KeywordEditor) -> anyhow::Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    for name in editor.missing_required() {
        write!(stdout, "{} = ", name)?;
        stdout.flush()?;
        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        editor.update_value(&name, line.trim_end_matches(['\r', '\n']));
    }
    Ok(())
}

async fn run_logs(page: Option<u32>, server: ServerArgs) -> anyhow::Result<()> {
    let (config, client) = connect(&server)?;
    let page = page.unwrap_or(config.logs.page).max(1);
    let listing = client.list_logs(page).await?;
    if listing.entries.is_empty() {
        println!("no log entries on page {}", page);
        return Ok(());
    }
    for (i, entry) in listing.entries.iter().enumerate() {
        println!("{}. Function: {}  [{}]", i + 1, entry.fn_name, entry.entry_id);
        println!("time: {}", textfn::logs::format_entry_time(entry));
        println!("--- input ---");
        println!("{}", textfn::logs::display_data_item(entry.input_data.as_ref()));
        println!("--- output ---");
        println!("{}", textfn::logs::display_data_item(entry.output_data.as_ref()));
        println!();
    }
    Ok(())
}

async fn run_delete_log(id: String, server: ServerArgs) -> anyhow::Result<()> {
    let (_, client) = connect(&server)?;
    client.delete_log(&id).await?;
    println!("deleted {}", id);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_value_parsing() {
        assert_eq!(
            parse_key_value("topic=cats and dogs"),
            Ok(("topic".to_string(), "cats and dogs".to_string()))
        );
        assert_eq!(parse_key_value("eq=a=b"), Ok(("eq".to_string(), "a=b".to_string())));
        assert_eq!(parse_key_value("empty="), Ok(("empty".to_string(), String::new())));
        assert!(parse_key_value("novalue").is_err());
        assert!(parse_key_value("=x").is_err());
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn run_collects_repeated_args() {
        let cli = Cli::try_parse_from([
            "textfn", "run", "essay", "--arg", "topic=cats", "-a", "tone=dry", "--base-url", "http://x",
        ])
        .unwrap();
        match cli.command {
            Some(Commands::Run { name, args, server, .. }) => {
                assert_eq!(name, "essay");
                assert_eq!(args.len(), 2);
                assert_eq!(server.base_url.as_deref(), Some("http://x"));
            }
            _ => panic!("expected run"),
        }
    }
}
