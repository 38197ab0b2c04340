use agentspec_cli::{convert, inspect, load, ConvertOptions, Format};
use agentspec_components::builtin_schema;
use agentspec_core::{AgentSpecVersion, FieldCasing};
use anyhow::{Context, Result};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use std::io::Read;
use std::path::{Path, PathBuf};

fn cli() -> Command {
    let input = Arg::new("input")
        .required(true)
        .value_parser(value_parser!(PathBuf))
        .help("Document to read, or '-' for stdin");
    let from = Arg::new("from")
        .long("from")
        .value_parser(value_parser!(Format))
        .help("Input encoding (json or yaml); guessed from the extension when omitted");

    Command::new("agentspec")
        .version(agentspec_cli::VERSION)
        .about("Convert and inspect Agent Spec documents")
        .arg_required_else_help(true)
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Log every serialized component"),
        )
        .subcommand(
            Command::new("convert")
                .about("Re-emit a document in another encoding, casing or version")
                .arg(input.clone())
                .arg(from.clone())
                .arg(
                    Arg::new("to")
                        .long("to")
                        .default_value("json")
                        .value_parser(value_parser!(Format))
                        .help("Output encoding (json or yaml)"),
                )
                .arg(
                    Arg::new("agentspec-version")
                        .long("agentspec-version")
                        .value_parser(value_parser!(AgentSpecVersion))
                        .help("Target version; latest when omitted"),
                )
                .arg(
                    Arg::new("camel-case")
                        .long("camel-case")
                        .action(ArgAction::SetTrue)
                        .help("Write field names in camelCase"),
                )
                .arg(
                    Arg::new("indent")
                        .long("indent")
                        .value_parser(value_parser!(usize))
                        .help("Pretty-print JSON with this many spaces"),
                )
                .arg(
                    Arg::new("output")
                        .long("output")
                        .short('o')
                        .value_parser(value_parser!(PathBuf))
                        .help("Write to a file instead of stdout"),
                ),
        )
        .subcommand(
            Command::new("inspect")
                .about("Summarize a document's component graph")
                .arg(input)
                .arg(from),
        )
}

fn init_logging(verbose: bool) -> Result<()> {
    let level = if verbose { "debug" } else { "warn" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(level))
        .context("failed to create log filter")?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
    Ok(())
}

fn read_input(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("failed to read stdin")?;
        return Ok(text);
    }
    std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

fn input_format(args: &ArgMatches, path: &Path) -> Format {
    args.get_one::<Format>("from")
        .copied()
        .unwrap_or_else(|| Format::from_path(path))
}

fn run_convert(args: &ArgMatches) -> Result<()> {
    let Some(path) = args.get_one::<PathBuf>("input") else {
        anyhow::bail!("missing input");
    };
    let options = ConvertOptions {
        from: input_format(args, path),
        to: args.get_one::<Format>("to").copied().unwrap_or_default(),
        version: args.get_one::<AgentSpecVersion>("agentspec-version").copied(),
        casing: if args.get_flag("camel-case") {
            FieldCasing::CamelCase
        } else {
            FieldCasing::SnakeCase
        },
        indent: args.get_one::<usize>("indent").copied(),
    };

    let text = read_input(path)?;
    let output = convert(&text, &options, builtin_schema()?)?;

    match args.get_one::<PathBuf>("output") {
        Some(target) => std::fs::write(target, output)
            .with_context(|| format!("failed to write {}", target.display()))?,
        None => println!("{output}"),
    }
    Ok(())
}

fn run_inspect(args: &ArgMatches) -> Result<()> {
    let Some(path) = args.get_one::<PathBuf>("input") else {
        anyhow::bail!("missing input");
    };
    let text = read_input(path)?;
    let root = load(&text, input_format(args, path), builtin_schema()?)?;
    println!("{}", inspect(&root));
    Ok(())
}

fn main() -> Result<()> {
    let matches = cli().get_matches();
    init_logging(matches.get_flag("verbose"))?;

    match matches.subcommand() {
        Some(("convert", args)) => run_convert(args),
        Some(("inspect", args)) => run_inspect(args),
        _ => {
            cli().print_help()?;
            Ok(())
        }
    }
}
