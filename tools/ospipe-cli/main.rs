use clap::{Parser, Subcommand, ValueEnum};
use osmpipe::prelude::*;
use std::path::PathBuf;
use std::sync::Arc;

/// Command-line companion for osmpipe: validate, inspect and convert
/// pipeline command files without the graphical editor.
#[derive(Parser)]
#[command(name = "ospipe-cli", version, about)]
struct Cli {
    /// Path to the function catalog definition (JSON)
    #[arg(long, global = true, default_value = "catalog.json")]
    catalog: PathBuf,

    #[command(subcommand)]
    command: Command,
}

/// A CLI-facing mirror of the supported text formats for clap to parse.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum FormatCli {
    Bash,
    Cmd,
}

impl From<FormatCli> for TextFormat {
    fn from(value: FormatCli) -> Self {
        match value {
            FormatCli::Bash => TextFormat::Bash,
            FormatCli::Cmd => TextFormat::Cmd,
        }
    }
}

impl From<FormatCli> for FileType {
    fn from(value: FormatCli) -> Self {
        match value {
            FormatCli::Bash => FileType::Bash,
            FormatCli::Cmd => FileType::Cmd,
        }
    }
}

#[derive(Subcommand)]
enum Command {
    /// Parse a pipeline file and report whether it is valid
    Validate {
        file: PathBuf,
        #[arg(long, value_enum, default_value = "bash")]
        format: FormatCli,
    },
    /// Print the functions of a pipeline file in serialization order
    Show {
        file: PathBuf,
        #[arg(long, value_enum, default_value = "bash")]
        format: FormatCli,
    },
    /// Convert a pipeline file from one text format to another
    Convert {
        input: PathBuf,
        output: PathBuf,
        #[arg(long, value_enum, default_value = "bash")]
        from: FormatCli,
        #[arg(long, value_enum, default_value = "cmd")]
        to: FormatCli,
    },
}

fn load_pipeline(
    catalog: &Arc<Catalog>,
    file: &PathBuf,
    format: FormatCli,
) -> Result<Pipeline> {
    let parsers = ParserFactory::new();
    let text = std::fs::read_to_string(file)?;
    let parser = parsers.parser(format.into())?;
    Ok(parser.parse_string(&text, catalog)?)
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let definitions = std::fs::read_to_string(&cli.catalog)?;
    let catalog = Arc::new(Catalog::from_json(&definitions)?);

    match cli.command {
        Command::Validate { file, format } => {
            let pipeline = load_pipeline(&catalog, &file, format)?;
            println!(
                "{}: valid pipeline with {} function(s) and {} connector(s)",
                file.display(),
                pipeline.len(),
                pipeline.connectors().len()
            );
        }
        Command::Show { file, format } => {
            let pipeline = load_pipeline(&catalog, &file, format)?;
            for (index, id) in pipeline.ordered_sequence().into_iter().enumerate() {
                if let Some(function) = pipeline.function(id) {
                    println!("{:>3}  {}", index + 1, function.type_id());
                    for (slot, binding) in function.bindings().iter().enumerate() {
                        if let Some(value) = binding.value() {
                            if let Some(name) = pipeline
                                .function_type_of(id)
                                .ok()
                                .and_then(|t| t.parameters.get(slot))
                                .map(|p| p.name.as_str())
                            {
                                println!("       --{name} {value}");
                            }
                        }
                    }
                }
            }
        }
        Command::Convert {
            input,
            output,
            from,
            to,
        } => {
            let pipeline = load_pipeline(&catalog, &input, from)?;
            let parsers = ParserFactory::new();
            let rendered = parsers.parser(to.into())?.parse_pipeline(&pipeline);
            std::fs::write(&output, rendered + "\n")?;
            println!("wrote {}", output.display());
        }
    }
    Ok(())
}
