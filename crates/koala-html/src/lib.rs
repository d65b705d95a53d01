//! HTML tokenizer and parser for the Koala browser.
//!
//! # Scope
//!
//! This crate implements:
//! - **Input preprocessing** ([WHATWG § 13.2.3.5](https://html.spec.whatwg.org/multipage/parsing.html#preprocessing-the-input-stream))
//!   - CR / CRLF normalization, control character and noncharacter errors
//!
//! - **HTML Tokenizer** ([WHATWG § 13.2.5](https://html.spec.whatwg.org/multipage/parsing.html#tokenization))
//!   - All data, RCDATA, RAWTEXT, script data, PLAINTEXT, tag, attribute,
//!     comment, DOCTYPE and CDATA states
//!   - Named and numeric character references
//!
//! - **HTML Parser / Tree Builder** ([WHATWG § 13.2.6](https://html.spec.whatwg.org/multipage/parsing.html#tree-construction))
//!   - All 23 insertion modes
//!   - The adoption agency algorithm and foster parenting
//!   - Templates, SVG and MathML foreign content
//!   - Quirks mode detection
//!   - Fragment parsing ([§ 13.4](https://html.spec.whatwg.org/multipage/parsing.html#parsing-html-fragments))
//!
//! # Not Implemented
//!
//! - Encoding sniffing (input is UTF-8 text)
//! - Script execution; the scripting flag only changes how `noscript` parses
//!
//! # Example
//!
//! ```
//! let document = koala_html::parse("<p>Hello<b>world");
//! assert!(document.dump().contains("<b>"));
//! ```

/// Parse errors shared by the tokenizer and the tree builder.
pub mod error;
/// HTML parser and tree construction.
pub mod parser;
/// HTML tokenizer for converting input into tokens.
pub mod tokenizer;

pub use error::{ParseError, ParseErrorKind};
pub use koala_dom::Document;
pub use parser::{HTMLParser, InsertionMode};
pub use tokenizer::{Attribute, HTMLTokenizer, Token, TokenizerState};

/// Options for a single parse.
///
/// ```
/// use koala_html::ParseOptions;
///
/// let options = ParseOptions::new().with_scripting(true);
/// let (document, _errors) = koala_html::parse_with_options("<noscript><p>", &options);
/// assert!(document.dump().contains("\"<p>\""));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseOptions {
    scripting: bool,
    diagnostics: bool,
    fragment_context: Option<String>,
}

impl ParseOptions {
    /// Options for an ordinary document parse: scripting disabled, no
    /// diagnostics.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            scripting: false,
            diagnostics: false,
            fragment_context: None,
        }
    }

    /// [§ 13.2.4.5](https://html.spec.whatwg.org/multipage/parsing.html#scripting-flag)
    ///
    /// Parse as if scripting were enabled for the document.
    #[must_use]
    pub const fn with_scripting(mut self, enabled: bool) -> Self {
        self.scripting = enabled;
        self
    }

    /// Echo every parse error to stderr as it is recorded.
    #[must_use]
    pub const fn with_diagnostics(mut self, enabled: bool) -> Self {
        self.diagnostics = enabled;
        self
    }

    /// Parse the input as the contents of the given context element. See
    /// [`HTMLParser::with_fragment_context`] for the context syntax.
    #[must_use]
    pub fn with_fragment_context(mut self, context: &str) -> Self {
        self.fragment_context = Some(context.to_string());
        self
    }

    /// Whether scripting is enabled.
    #[must_use]
    pub const fn scripting(&self) -> bool {
        self.scripting
    }

    /// Whether diagnostics are enabled.
    #[must_use]
    pub const fn diagnostics(&self) -> bool {
        self.diagnostics
    }

    /// The fragment context, if this is a fragment parse.
    #[must_use]
    pub fn fragment_context(&self) -> Option<&str> {
        self.fragment_context.as_deref()
    }
}

/// Parse a complete HTML document, discarding parse errors.
#[must_use]
pub fn parse(input: &str) -> Document {
    parse_with_errors(input).0
}

/// Parse a complete HTML document and return every parse error in the order
/// it was detected.
#[must_use]
pub fn parse_with_errors(input: &str) -> (Document, Vec<ParseError>) {
    parse_with_options(input, &ParseOptions::new())
}

/// Parse a complete HTML document with the scripting flag enabled.
#[must_use]
pub fn parse_with_scripting(input: &str) -> Document {
    parse_with_options(input, &ParseOptions::new().with_scripting(true)).0
}

/// Parse with explicit [`ParseOptions`].
#[must_use]
pub fn parse_with_options(input: &str, options: &ParseOptions) -> (Document, Vec<ParseError>) {
    let mut parser = HTMLParser::new(input)
        .with_scripting(options.scripting)
        .with_diagnostics(options.diagnostics);
    if let Some(context) = options.fragment_context() {
        parser = parser.with_fragment_context(context);
    }
    parser.run()
}

/// [§ 13.4 Parsing HTML fragments](https://html.spec.whatwg.org/multipage/parsing.html#parsing-html-fragments)
///
/// Parse `input` as the contents of a `context` element. The returned
/// document holds the parsed nodes under a single `html` element.
#[must_use]
pub fn parse_fragment(input: &str, context: &str) -> (Document, Vec<ParseError>) {
    parse_with_options(input, &ParseOptions::new().with_fragment_context(context))
}

/// Run the tokenizer alone, in the data state, and collect every token up
/// to and including the end-of-file token.
#[must_use]
pub fn tokenize(input: &str) -> (Vec<Token>, Vec<ParseError>) {
    let mut tokenizer = HTMLTokenizer::new(input);
    let tokens = std::iter::from_fn(|| tokenizer.next_token()).collect();
    (tokens, tokenizer.take_errors())
}
