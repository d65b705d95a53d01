use core::fmt;

/// An attribute on a start tag token.
///
/// Per [§ 13.2.5 Tokenization](https://html.spec.whatwg.org/multipage/parsing.html#tokenization):
/// "a list of attributes, each of which has a name and a value"
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    /// "each of which has a name"
    pub name: String,
    /// "and a value"
    pub value: String,
}

impl Attribute {
    /// Create a new attribute with the given name and value.
    #[must_use]
    pub const fn new(name: String, value: String) -> Self {
        Self { name, value }
    }
}

/// [§ 13.2.5 Tokenization](https://html.spec.whatwg.org/multipage/parsing.html#tokenization)
///
/// "The output of the tokenization step is a series of zero or more of the following
/// tokens: DOCTYPE, start tag, end tag, comment, character, end-of-file."
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// "DOCTYPE tokens have a name, a public identifier, a system identifier,
    /// and a force-quirks flag. When a DOCTYPE token is created, its name,
    /// public identifier, and system identifier must be marked as missing
    /// (which is a distinct state from the empty string), and the force-quirks
    /// flag must be set to off (its other state is on)."
    Doctype {
        /// "a name"
        name: Option<String>,
        /// "a public identifier"
        public_identifier: Option<String>,
        /// "a system identifier"
        system_identifier: Option<String>,
        /// "a force-quirks flag"
        force_quirks: bool,
    },

    /// "Start and end tag tokens have a tag name, a self-closing flag, and a
    /// list of attributes, each of which has a name and a value."
    StartTag {
        /// "a tag name"
        name: String,
        /// "a self-closing flag"
        self_closing: bool,
        /// "a list of attributes"
        attributes: Vec<Attribute>,
    },

    /// End tag token. Attributes and the self-closing flag are parse errors on
    /// end tags and are dropped before the token is emitted.
    EndTag {
        /// "a tag name"
        name: String,
    },

    /// "Comment and character tokens have data."
    Comment {
        /// "data"
        data: String,
    },

    /// "Comment and character tokens have data."
    Character {
        /// "data"
        data: char,
    },

    /// End-of-file token signals the end of input.
    EndOfFile,
}

impl Token {
    /// "When a DOCTYPE token is created, its name, public identifier, and system
    /// identifier must be marked as missing (which is a distinct state from the
    /// empty string), and the force-quirks flag must be set to off."
    #[must_use]
    pub const fn new_doctype() -> Self {
        Self::Doctype {
            name: None,
            public_identifier: None,
            system_identifier: None,
            force_quirks: false,
        }
    }

    /// Create a new comment token with empty data.
    #[must_use]
    pub const fn new_comment() -> Self {
        Self::Comment {
            data: String::new(),
        }
    }

    /// Create a character token with the given character.
    #[must_use]
    pub const fn new_character(c: char) -> Self {
        Self::Character { data: c }
    }

    /// Create a start tag token with no attributes.
    #[must_use]
    pub fn new_start_tag(name: &str) -> Self {
        Self::StartTag {
            name: name.to_string(),
            self_closing: false,
            attributes: Vec::new(),
        }
    }

    /// Create an end tag token.
    #[must_use]
    pub fn new_end_tag(name: &str) -> Self {
        Self::EndTag {
            name: name.to_string(),
        }
    }

    /// Returns true if this is an end-of-file token.
    #[must_use]
    pub const fn is_eof(&self) -> bool {
        matches!(self, Self::EndOfFile)
    }

    /// Returns true if this is a start tag with the given name.
    #[must_use]
    pub fn is_start_tag(&self, tag: &str) -> bool {
        matches!(self, Self::StartTag { name, .. } if name == tag)
    }

    /// Returns true if this is an end tag with the given name.
    #[must_use]
    pub fn is_end_tag(&self, tag: &str) -> bool {
        matches!(self, Self::EndTag { name } if name == tag)
    }

    /// The tag name of a start or end tag token.
    #[must_use]
    pub fn tag_name(&self) -> Option<&str> {
        match self {
            Self::StartTag { name, .. } | Self::EndTag { name } => Some(name),
            _ => None,
        }
    }

    /// The attributes of a start tag token; empty for every other token.
    #[must_use]
    pub fn attributes(&self) -> &[Attribute] {
        match self {
            Self::StartTag { attributes, .. } => attributes,
            _ => &[],
        }
    }

    /// Look up an attribute on a start tag token.
    #[must_use]
    pub fn attribute(&self, attr: &str) -> Option<&str> {
        match self {
            Self::StartTag { attributes, .. } => attributes
                .iter()
                .find(|a| a.name == attr)
                .map(|a| a.value.as_str()),
            _ => None,
        }
    }

    /// [§ 13.2.5.55 DOCTYPE name state](https://html.spec.whatwg.org/multipage/parsing.html#doctype-name-state)
    ///
    /// "Append the current input character to the current DOCTYPE token's name."
    pub fn append_to_doctype_name(&mut self, c: char) {
        if let Self::Doctype { name, .. } = self {
            name.get_or_insert_with(String::new).push(c);
        }
    }

    /// [§ 13.2.5.58 After DOCTYPE public keyword state](https://html.spec.whatwg.org/multipage/parsing.html#after-doctype-public-keyword-state)
    ///
    /// "Set the current DOCTYPE token's public identifier to the empty string (not missing)"
    pub fn start_public_identifier(&mut self) {
        if let Self::Doctype {
            public_identifier, ..
        } = self
        {
            *public_identifier = Some(String::new());
        }
    }

    /// "Append the current input character to the current DOCTYPE token's public identifier."
    pub fn append_to_public_identifier(&mut self, c: char) {
        if let Self::Doctype {
            public_identifier: Some(id),
            ..
        } = self
        {
            id.push(c);
        }
    }

    /// "Set the current DOCTYPE token's system identifier to the empty string (not missing)"
    pub fn start_system_identifier(&mut self) {
        if let Self::Doctype {
            system_identifier, ..
        } = self
        {
            *system_identifier = Some(String::new());
        }
    }

    /// "Append the current input character to the current DOCTYPE token's system identifier."
    pub fn append_to_system_identifier(&mut self, c: char) {
        if let Self::Doctype {
            system_identifier: Some(id),
            ..
        } = self
        {
            id.push(c);
        }
    }

    /// [§ 13.2.5.54 Before DOCTYPE name state](https://html.spec.whatwg.org/multipage/parsing.html#before-doctype-name-state)
    ///
    /// "Set the current DOCTYPE token's force-quirks flag to on."
    pub const fn set_force_quirks(&mut self) {
        if let Self::Doctype { force_quirks, .. } = self {
            *force_quirks = true;
        }
    }

    /// [§ 13.2.5.45 Comment state](https://html.spec.whatwg.org/multipage/parsing.html#comment-state)
    ///
    /// "Append the current input character to the comment token's data."
    pub fn append_to_comment(&mut self, c: char) {
        if let Self::Comment { data } = self {
            data.push(c);
        }
    }

    /// Append a string to the comment token's data.
    pub fn append_str_to_comment(&mut self, s: &str) {
        if let Self::Comment { data } = self {
            data.push_str(s);
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Doctype {
                name,
                public_identifier,
                system_identifier,
                force_quirks,
            } => {
                write!(f, "Doctype(")?;
                match name {
                    Some(n) => write!(f, "{n}, ")?,
                    None => write!(f, "None, ")?,
                }
                for id in [public_identifier, system_identifier] {
                    match id {
                        Some(id) => write!(f, "\"{id}\", ")?,
                        None => write!(f, "None, ")?,
                    }
                }
                write!(f, "{force_quirks})")
            }
            Self::StartTag {
                name,
                self_closing,
                attributes,
            } => {
                write!(f, "StartTag({name}, [")?;
                for (i, attr) in attributes.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}=\"{}\"", attr.name, attr.value)?;
                }
                write!(f, "], {self_closing})")
            }
            Self::EndTag { name } => write!(f, "EndTag({name})"),
            Self::Comment { data } => write!(f, "Comment({data})"),
            Self::Character { data } => write!(f, "Character({data:?})"),
            Self::EndOfFile => write!(f, "EOF"),
        }
    }
}

/// Whether the tag under construction is a start or an end tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TagKind {
    Start,
    End,
}

/// The tag token under construction.
///
/// End tags collect attributes like start tags do; they are only dropped
/// when the token is emitted, so duplicate detection behaves the same for both.
#[derive(Debug, Clone)]
pub(crate) struct Tag {
    pub(crate) kind: TagKind,
    pub(crate) name: String,
    pub(crate) self_closing: bool,
    pub(crate) attributes: Vec<Attribute>,
    /// The current attribute duplicates an earlier one. It keeps collecting its
    /// value and is removed once the next attribute starts or the tag is emitted.
    discard_current: bool,
}

impl Tag {
    /// "When a start or end tag token is created, its self-closing flag must be
    /// unset (its other state is that it be set), and its attributes list must
    /// be empty."
    pub(crate) const fn new(kind: TagKind) -> Self {
        Self {
            kind,
            name: String::new(),
            self_closing: false,
            attributes: Vec::new(),
            discard_current: false,
        }
    }

    /// [§ 13.2.5.32 Before attribute name state](https://html.spec.whatwg.org/multipage/parsing.html#before-attribute-name-state)
    ///
    /// "Start a new attribute in the current tag token."
    pub(crate) fn start_new_attribute(&mut self) {
        self.remove_discarded_attribute();
        self.attributes
            .push(Attribute::new(String::new(), String::new()));
    }

    /// "Append the current input character to the current attribute's name."
    pub(crate) fn append_to_attribute_name(&mut self, c: char) {
        if let Some(attr) = self.attributes.last_mut() {
            attr.name.push(c);
        }
    }

    /// "Append the current input character to the current attribute's value."
    pub(crate) fn append_to_attribute_value(&mut self, c: char) {
        if let Some(attr) = self.attributes.last_mut() {
            attr.value.push(c);
        }
    }

    /// [§ 13.2.5.33 Attribute name state](https://html.spec.whatwg.org/multipage/parsing.html#attribute-name-state)
    ///
    /// "...if there is already an attribute on the token with the exact same name,
    /// then this is a duplicate-attribute parse error and the new attribute must be
    /// removed from the token."
    ///
    /// Marks the current attribute for removal and returns true if it
    /// duplicates an earlier one.
    pub(crate) fn check_duplicate_attribute(&mut self) -> bool {
        let Some((current, earlier)) = self.attributes.split_last() else {
            return false;
        };
        self.discard_current = earlier.iter().any(|attr| attr.name == current.name);
        self.discard_current
    }

    fn remove_discarded_attribute(&mut self) {
        if self.discard_current {
            let _ = self.attributes.pop();
            self.discard_current = false;
        }
    }

    /// Convert into the token that is emitted.
    pub(crate) fn into_token(mut self) -> Token {
        self.remove_discarded_attribute();
        match self.kind {
            TagKind::Start => Token::StartTag {
                name: self.name,
                self_closing: self.self_closing,
                attributes: self.attributes,
            },
            TagKind::End => Token::EndTag { name: self.name },
        }
    }
}
