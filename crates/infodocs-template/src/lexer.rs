/// A lexical unit of a template.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Token<'a> {
    Text(&'a str),
    Tag(Tag<'a>),
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Tag<'a> {
    Var(&'a str),
    If(&'a str),
    Else,
    EndIf,
    Each(&'a str),
    EndEach,
    /// Anything else between braces: empty tags, unknown block helpers.
    Unknown(&'a str),
}

pub(crate) fn tokenize(source: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut rest = source;

    while let Some(open) = rest.find("{{") {
        let Some(len) = rest[open + 2..].find("}}") else {
            break;
        };
        let close = open + 2 + len;

        // `{{ a {{b}}`: the innermost opening brace pair owns the tag.
        let open = match rest[open + 2..close].rfind("{{") {
            Some(inner) => open + 2 + inner,
            None => open,
        };

        if open > 0 {
            tokens.push(Token::Text(&rest[..open]));
        }
        tokens.push(Token::Tag(classify(rest[open + 2..close].trim())));
        rest = &rest[close + 2..];
    }

    if !rest.is_empty() {
        tokens.push(Token::Text(rest));
    }
    tokens
}

fn classify(inner: &str) -> Tag<'_> {
    if let Some(path) = block_argument(inner, "#if") {
        return Tag::If(path);
    }
    if let Some(path) = block_argument(inner, "#each") {
        return Tag::Each(path);
    }
    match inner {
        "else" => Tag::Else,
        "/if" => Tag::EndIf,
        "/each" => Tag::EndEach,
        "" => Tag::Unknown(inner),
        _ if inner.starts_with(['#', '/']) => Tag::Unknown(inner),
        _ => Tag::Var(inner),
    }
}

/// `#if  spa.name` -> `spa.name`. The keyword must be followed by whitespace
/// and a non-empty argument.
fn block_argument<'a>(inner: &'a str, keyword: &str) -> Option<&'a str> {
    let rest = inner.strip_prefix(keyword)?;
    if !rest.starts_with(char::is_whitespace) {
        return None;
    }
    let path = rest.trim();
    (!path.is_empty()).then_some(path)
}
