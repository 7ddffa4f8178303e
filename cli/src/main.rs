//! stmtledger CLI - bank statement ledger extraction tool

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use colored::Colorize;

use stmtledger::render::{self, JsonFormat};
use stmtledger::{BecuPatterns, Completion, GrammarRegistry, Statement, StatementParser};

#[derive(Parser)]
#[command(name = "stmtledger")]
#[command(version)]
#[command(about = "Extract ledger entries from bank statement grids", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the ledger journal
    Ledger {
        #[command(flatten)]
        parse: ParseArgs,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Print statement metadata and ledger as JSON
    Json {
        #[command(flatten)]
        parse: ParseArgs,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Output compact JSON
        #[arg(long)]
        compact: bool,

        /// Dump every section, the tree and the graph instead of the ledger
        #[arg(long)]
        sections: bool,
    },

    /// Print the section tree with extracted fields
    Tree {
        #[command(flatten)]
        parse: ParseArgs,
    },

    /// Show a summary of a parsed statement
    Info {
        #[command(flatten)]
        parse: ParseArgs,
    },

    /// List available grammars
    Grammars,

    /// Show version information
    Version,
}

#[derive(Args)]
struct ParseArgs {
    /// Input grid JSON file (tabula `output_format='json'`)
    #[arg(value_name = "FILE")]
    input: PathBuf,

    /// Statement grammar
    #[arg(short, long, default_value = stmtledger::DEFAULT_GRAMMAR, env = "STMTLEDGER_GRAMMAR")]
    grammar: String,

    /// Log and skip malformed lines instead of failing
    #[arg(long)]
    lenient: bool,

    /// Year for MM/DD dates when the statement period has none
    #[arg(long, value_name = "YEAR")]
    year: Option<i32>,

    /// JSON file overriding the boundary patterns
    #[arg(long, value_name = "FILE")]
    patterns: Option<PathBuf>,
}

impl ParseArgs {
    fn parser(&self) -> Result<StatementParser, Box<dyn std::error::Error>> {
        let mut parser = StatementParser::new().with_grammar(&self.grammar);
        if let Some(path) = &self.patterns {
            let json = fs::read_to_string(path)?;
            let patterns: BecuPatterns = serde_json::from_str(&json)
                .map_err(|e| format!("Invalid patterns file {}: {}", path.display(), e))?;
            parser = parser.with_patterns(patterns);
        }
        if self.lenient {
            parser = parser.lenient();
        }
        if let Some(year) = self.year {
            parser = parser.with_statement_year(year);
        }
        Ok(parser)
    }

    fn parse(&self) -> Result<Statement, Box<dyn std::error::Error>> {
        log::debug!("parsing {} with grammar {}", self.input.display(), self.grammar);
        let statement = self.parser()?.parse_file(&self.input)?;
        if statement.completion() == Completion::Stalled {
            eprintln!(
                "{}: walk stalled in {} at {}",
                "Warning".yellow().bold(),
                statement.last_state(),
                statement.position()
            );
        }
        Ok(statement)
    }
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Ledger { parse, output } => cmd_ledger(&parse, output.as_deref()),
        Commands::Json {
            parse,
            output,
            compact,
            sections,
        } => cmd_json(&parse, output.as_deref(), compact, sections),
        Commands::Tree { parse } => cmd_tree(&parse),
        Commands::Info { parse } => cmd_info(&parse),
        Commands::Grammars => {
            cmd_grammars();
            Ok(())
        }
        Commands::Version => {
            cmd_version();
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn write_or_print(output: Option<&Path>, content: &str) -> std::io::Result<()> {
    if let Some(path) = output {
        fs::write(path, content)?;
        println!("{} {}", "Saved to".green(), path.display());
    } else {
        print!("{}", content);
        if !content.ends_with('\n') {
            println!();
        }
    }
    Ok(())
}

fn cmd_ledger(parse: &ParseArgs, output: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let statement = parse.parse()?;
    let journal = render::to_ledger_text(&statement);
    write_or_print(output, &journal)?;
    Ok(())
}

fn cmd_json(
    parse: &ParseArgs,
    output: Option<&Path>,
    compact: bool,
    sections: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let statement = parse.parse()?;

    let format = if compact {
        JsonFormat::Compact
    } else {
        JsonFormat::Pretty
    };

    let json = if sections {
        render::grammar_to_json(statement.grammar(), format)?
    } else {
        render::to_json(&statement, format)?
    };
    write_or_print(output, &json)?;
    Ok(())
}

fn cmd_tree(parse: &ParseArgs) -> Result<(), Box<dyn std::error::Error>> {
    let statement = parse.parse()?;
    print!("{}", render::to_tree_text(statement.grammar()));
    Ok(())
}

fn cmd_info(parse: &ParseArgs) -> Result<(), Box<dyn std::error::Error>> {
    let statement = parse.parse()?;

    println!("{}", "Statement Information".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    println!("{}: {}", "File".bold(), parse.input.display());
    println!("{}: {}", "Grammar".bold(), statement.grammar().name);
    if let Some(organization) = statement.organization() {
        println!("{}: {}", "Organization".bold(), organization);
    }
    if let Some(period) = statement.period() {
        println!("{}: {} - {}", "Period".bold(), period.start, period.stop);
    }
    println!(
        "{}: {:?} in {} at {}",
        "Finished".bold(),
        statement.completion(),
        statement.last_state(),
        statement.position()
    );

    println!();
    println!("{}", "Ledger Statistics".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    println!("{}: {}", "Summary lines".bold(), statement.summary_lines().len());
    println!("{}: {}", "Entries".bold(), statement.entries().len());
    for direction in [
        stmtledger::Direction::Deposit,
        stmtledger::Direction::Withdrawal,
        stmtledger::Direction::Check,
    ] {
        let count = statement.entries_by_direction(direction).count();
        if count > 0 {
            println!("  {} {}: {}", "├─".dimmed(), direction, count);
        }
    }
    println!("{}: {}", "Net amount".bold(), statement.net_amount());

    Ok(())
}

fn cmd_grammars() {
    let registry = GrammarRegistry::with_defaults();
    for name in registry.names() {
        println!("{}", name);
    }
}

fn cmd_version() {
    println!("{} {}", "stmtledger".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("Bank statement ledger extraction tool");
}
