//! Koala CLI
//!
//! Parse an HTML document and print the tree, the re-serialized markup, the
//! token stream, or the parse errors.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use koala_common::source::read_source;
use koala_common::warning::clear_warnings;
use koala_html::{ParseError, ParseOptions};
use owo_colors::OwoColorize;

/// What to print for the parsed input.
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
enum Output {
    /// Canonical tree dump, one node per line
    #[default]
    Dump,
    /// Serialized HTML
    Html,
    /// Tokenizer output, one token per line
    Tokens,
    /// Parse errors, one per line
    Errors,
}

/// Koala HTML5 parser inspector
#[derive(Parser, Debug)]
#[command(name = "koala")]
#[command(author, version, about, long_about = None)]
#[command(after_help = r#"EXAMPLES:
    # Print the tree for a file
    koala dump ./index.html

    # Parse inline HTML
    koala --html '<p>Hello<b>world'

    # Re-serialize a table cell fragment
    koala html --fragment td --html '<b>x</b>'

    # Show parse errors as they are found
    koala errors --verbose ./broken.html
"#)]
struct Cli {
    /// What to print
    #[arg(value_enum, default_value_t = Output::Dump)]
    output: Output,

    /// Path to the HTML file
    #[arg(value_name = "FILE", conflicts_with = "html", required_unless_present = "html")]
    path: Option<PathBuf>,

    /// Parse an HTML string directly instead of a file
    #[arg(long, value_name = "STRING")]
    html: Option<String>,

    /// Parse as if scripting were enabled (affects noscript)
    #[arg(long)]
    scripting: bool,

    /// Parse as a fragment inside this context element ("td", "svg svg", ...)
    #[arg(long, value_name = "CONTEXT")]
    fragment: Option<String>,

    /// Echo every parse error to stderr as it is found
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    /// Load the input text from `--html` or the file argument.
    fn source(&self) -> Result<String> {
        if let Some(ref html) = self.html {
            return Ok(html.clone());
        }
        let Some(ref path) = self.path else {
            anyhow::bail!("a file path or --html is required");
        };
        read_source(path).with_context(|| format!("could not load {}", path.display()))
    }

    fn options(&self) -> ParseOptions {
        let options = ParseOptions::new()
            .with_scripting(self.scripting)
            .with_diagnostics(self.verbose);
        match self.fragment {
            Some(ref context) => options.with_fragment_context(context),
            None => options,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let input = cli.source()?;
    clear_warnings();

    if cli.output == Output::Tokens {
        let (tokens, errors) = koala_html::tokenize(&input);
        for token in &tokens {
            println!("{token}");
        }
        report_error_count(&errors);
        return Ok(());
    }

    let (document, errors) = koala_html::parse_with_options(&input, &cli.options());
    match cli.output {
        Output::Dump => print!("{}", document.dump()),
        Output::Html => println!("{}", document.to_html()),
        Output::Errors => {
            for error in &errors {
                println!("{error}");
            }
        }
        Output::Tokens => {}
    }
    if cli.output != Output::Errors {
        report_error_count(&errors);
    }
    Ok(())
}

/// Summarize the parse errors on stderr so stdout stays machine-readable.
fn report_error_count(errors: &[ParseError]) {
    if errors.is_empty() {
        return;
    }
    let noun = if errors.len() == 1 { "error" } else { "errors" };
    eprintln!("{}", format!("{} parse {noun}", errors.len()).yellow());
}
