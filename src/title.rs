//! Title extraction from rendered post HTML.
//!
//! A post's title is the visible text of the first top-level element of its
//! rendered HTML, which for a typical post is the leading `# Heading`. The
//! HTML is never built into a tree: a small tokenizer streams tag, text, and
//! reference events, and [`extract_title`] runs a depth counter over them.
//!
//! ```text
//! <h1>Tom &amp; Jerry</h1><p>body</p>   →   "Tom &amp; Jerry"
//! <p>See <em>this</em></p>               →   "See this"
//! plain text, no tags                   →   ""
//! ```
//!
//! Entity and character references are kept in their source form so the
//! title can be dropped back into HTML unchanged.

/// A single lexical event in an HTML fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token<'a> {
    /// `<name ...>`
    Start(&'a str),
    /// `</name>`
    End(&'a str),
    /// `<name ... />`
    SelfClosing(&'a str),
    /// Character data between tags.
    Text(&'a str),
    /// `&name;` or `&#NN;`, exactly as written.
    Reference(&'a str),
}

/// Elements whose content is raw text up to the matching close tag.
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

/// Streaming tokenizer over an HTML fragment.
///
/// Comments, doctypes, and processing instructions are consumed silently. A
/// `<` that does not open valid markup is reported as text. An unterminated
/// tag at the end of input is dropped.
pub struct Tokenizer<'a> {
    html: &'a str,
    pos: usize,
    raw_text: Option<&'a str>,
}

impl<'a> Tokenizer<'a> {
    pub fn new(html: &'a str) -> Self {
        Self {
            html,
            pos: 0,
            raw_text: None,
        }
    }
}

impl<'a> Iterator for Tokenizer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Token<'a>> {
        loop {
            let rest = &self.html[self.pos..];
            if rest.is_empty() {
                return None;
            }

            if let Some(element) = self.raw_text.take() {
                let end = find_close_tag(rest, element).unwrap_or(rest.len());
                if end > 0 {
                    self.pos += end;
                    return Some(Token::Text(&rest[..end]));
                }
            }

            if rest.starts_with('<') {
                match markup(rest) {
                    Some((Some(token), len)) => {
                        self.pos += len;
                        if let Token::Start(name) = token {
                            if RAW_TEXT_ELEMENTS.iter().any(|e| e.eq_ignore_ascii_case(name)) {
                                self.raw_text = Some(name);
                            }
                        }
                        return Some(token);
                    }
                    Some((None, len)) => {
                        self.pos += len;
                        continue;
                    }
                    None => {
                        self.pos += 1;
                        return Some(Token::Text(&rest[..1]));
                    }
                }
            }

            if rest.starts_with('&') {
                let len = reference_len(rest).unwrap_or(1);
                self.pos += len;
                return Some(match len {
                    1 => Token::Text(&rest[..1]),
                    _ => Token::Reference(&rest[..len]),
                });
            }

            let end = rest.find(['<', '&']).unwrap_or(rest.len());
            self.pos += end;
            return Some(Token::Text(&rest[..end]));
        }
    }
}

/// Parse markup at the start of `rest` (which begins with `<`).
///
/// Returns the token (or `None` for ignorable markup such as comments) and the
/// number of bytes consumed, or `None` altogether when the `<` does not open
/// markup.
fn markup(rest: &str) -> Option<(Option<Token<'_>>, usize)> {
    if rest.starts_with("<!--") {
        let end = rest[4..].find("-->").map(|i| i + 7).unwrap_or(rest.len());
        return Some((None, end));
    }
    if rest.starts_with("<!") || rest.starts_with("<?") {
        let end = rest.find('>').map(|i| i + 1).unwrap_or(rest.len());
        return Some((None, end));
    }

    let (closing, name_start) = match rest.as_bytes().get(1) {
        Some(b'/') => (true, 2),
        _ => (false, 1),
    };
    let name_len = tag_name_len(&rest[name_start..]);
    if name_len == 0 {
        return None;
    }
    let name = &rest[name_start..name_start + name_len];

    let Some(close) = find_tag_end(&rest[name_start + name_len..]) else {
        return Some((None, rest.len()));
    };
    let end = name_start + name_len + close + 1;

    let token = if closing {
        Token::End(name)
    } else if rest[..end - 1].trim_end().ends_with('/') {
        Token::SelfClosing(name)
    } else {
        Token::Start(name)
    };
    Some((Some(token), end))
}

/// Length of a tag name: an ASCII letter followed by letters, digits, `-`, `:`.
fn tag_name_len(s: &str) -> usize {
    let mut chars = s.char_indices();
    match chars.next() {
        Some((_, c)) if c.is_ascii_alphabetic() => {}
        _ => return 0,
    }
    chars
        .find(|(_, c)| !(c.is_ascii_alphanumeric() || *c == '-' || *c == ':'))
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

/// Offset of the `>` closing a tag, skipping over quoted attribute values.
fn find_tag_end(attrs: &str) -> Option<usize> {
    let mut quote = None;
    for (i, c) in attrs.char_indices() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, '>') => return Some(i),
            (None, _) => {}
        }
    }
    None
}

/// Length of an entity (`&amp;`) or character (`&#38;`, `&#x26;`) reference.
fn reference_len(rest: &str) -> Option<usize> {
    let body = &rest[1..];
    let name_len = match body.strip_prefix('#') {
        Some(num) => {
            let (prefix, digits) = match num.strip_prefix(['x', 'X']) {
                Some(hex) => (2, hex.find(|c: char| !c.is_ascii_hexdigit()).unwrap_or(hex.len())),
                None => (1, num.find(|c: char| !c.is_ascii_digit()).unwrap_or(num.len())),
            };
            if digits == 0 {
                return None;
            }
            prefix + digits
        }
        None => tag_name_len(body),
    };
    if name_len == 0 {
        return None;
    }
    body[name_len..].starts_with(';').then_some(name_len + 2)
}

/// Find the start of `</element` (case-insensitive) in raw text.
fn find_close_tag(rest: &str, element: &str) -> Option<usize> {
    let mut from = 0;
    while let Some(i) = rest[from..].find("</") {
        let at = from + i;
        let name = &rest[at + 2..];
        if name.len() >= element.len()
            && name.is_char_boundary(element.len())
            && name[..element.len()].eq_ignore_ascii_case(element)
        {
            return Some(at);
        }
        from = at + 2;
    }
    None
}

/// Where the extractor is relative to the first top-level element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    BeforeFirstTag,
    Inside { depth: usize },
    Done,
}

/// Extract the visible text of the first top-level element.
///
/// Text is accumulated from the first start tag until the end tag that brings
/// the nesting depth back to zero. Text outside that element is ignored, and
/// input with no tags yields an empty string. If the first tag is
/// self-closing the title is empty.
pub fn extract_title(html: &str) -> String {
    let mut title = String::new();
    let mut state = State::BeforeFirstTag;

    for token in Tokenizer::new(html) {
        state = match (state, token) {
            (State::Done, _) => break,
            (State::BeforeFirstTag, Token::Start(_)) => State::Inside { depth: 1 },
            (State::BeforeFirstTag, Token::SelfClosing(_)) => State::Done,
            (State::BeforeFirstTag, _) => State::BeforeFirstTag,
            (State::Inside { depth }, Token::Start(_)) => State::Inside { depth: depth + 1 },
            (State::Inside { depth }, Token::End(_)) if depth <= 1 => State::Done,
            (State::Inside { depth }, Token::End(_)) => State::Inside { depth: depth - 1 },
            (inside, Token::Text(text) | Token::Reference(text)) => {
                title.push_str(text);
                inside
            }
            (inside, Token::SelfClosing(_)) => inside,
        };
    }

    title
}
