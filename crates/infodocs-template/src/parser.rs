use crate::lexer::{Tag, Token};

/// A node of a parsed template.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Text(String),
    Var(String),
    If {
        path: String,
        then: Vec<Node>,
        otherwise: Vec<Node>,
    },
    Each {
        path: String,
        body: Vec<Node>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Block {
    If { seen_else: bool },
    Each,
}

/// Why a run of nodes stopped.
#[derive(Debug, Clone, Copy, PartialEq)]
enum End {
    Else,
    EndIf,
    EndEach,
    /// A closer for an enclosing block; left unconsumed for that block.
    Unwind,
    Eof,
}

pub(crate) fn parse(tokens: Vec<Token<'_>>) -> Vec<Node> {
    let mut parser = Parser {
        tokens,
        pos: 0,
        open: Vec::new(),
    };
    // With no block open, every closer is stray and the run ends at EOF.
    let (nodes, _) = parser.parse_run();
    merge_text(nodes)
}

struct Parser<'a> {
    tokens: Vec<Token<'a>>,
    pos: usize,
    open: Vec<Block>,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<&Token<'a>> {
        self.tokens.get(self.pos)
    }

    fn skip_stray(&mut self) {
        if let Some(Token::Tag(tag)) = self.peek() {
            tracing::warn!(tag = ?tag, "dropping unbalanced template directive");
        }
        self.pos += 1;
    }

    /// Parse nodes until a tag that ends the innermost open block (consumed)
    /// or one that belongs to an outer block (not consumed).
    fn parse_run(&mut self) -> (Vec<Node>, End) {
        let mut nodes = Vec::new();

        while let Some(token) = self.peek().cloned() {
            let tag = match token {
                Token::Text(text) => {
                    nodes.push(Node::Text(text.to_string()));
                    self.pos += 1;
                    continue;
                }
                Token::Tag(tag) => tag,
            };

            match tag {
                Tag::Var(path) => {
                    self.pos += 1;
                    nodes.push(Node::Var(path.to_string()));
                }
                Tag::If(path) => {
                    self.pos += 1;
                    nodes.extend(self.parse_if(path));
                }
                Tag::Each(path) => {
                    self.pos += 1;
                    nodes.extend(self.parse_each(path));
                }
                Tag::Else => match self.open.last() {
                    Some(Block::If { seen_else: false }) => {
                        self.pos += 1;
                        return (nodes, End::Else);
                    }
                    _ => self.skip_stray(),
                },
                Tag::EndIf => match self.closes(|b| matches!(b, Block::If { .. })) {
                    Some(true) => {
                        self.pos += 1;
                        return (nodes, End::EndIf);
                    }
                    Some(false) => return (nodes, End::Unwind),
                    None => self.skip_stray(),
                },
                Tag::EndEach => match self.closes(|b| matches!(b, Block::Each)) {
                    Some(true) => {
                        self.pos += 1;
                        return (nodes, End::EndEach);
                    }
                    Some(false) => return (nodes, End::Unwind),
                    None => self.skip_stray(),
                },
                Tag::Unknown(inner) => {
                    tracing::debug!(tag = inner, "dropping unknown template directive");
                    self.pos += 1;
                }
            }
        }

        (nodes, End::Eof)
    }

    /// `Some(true)` if the innermost open block matches, `Some(false)` if an
    /// outer one does, `None` if no open block matches.
    fn closes(&self, matches: impl Fn(&Block) -> bool) -> Option<bool> {
        let index = self.open.iter().rposition(matches)?;
        Some(index + 1 == self.open.len())
    }

    fn parse_if(&mut self, path: &str) -> Vec<Node> {
        self.open.push(Block::If { seen_else: false });
        let (then, mut end) = self.parse_run();

        let mut otherwise = Vec::new();
        if end == End::Else {
            if let Some(block) = self.open.last_mut() {
                *block = Block::If { seen_else: true };
            }
            let (nodes, next) = self.parse_run();
            otherwise = nodes;
            end = next;
        }
        self.open.pop();

        if end == End::EndIf {
            vec![Node::If {
                path: path.to_string(),
                then,
                otherwise,
            }]
        } else {
            tracing::warn!(path, "dropping unclosed {{{{#if}}}} directive");
            then.into_iter().chain(otherwise).collect()
        }
    }

    fn parse_each(&mut self, path: &str) -> Vec<Node> {
        self.open.push(Block::Each);
        let (body, end) = self.parse_run();
        self.open.pop();

        if end == End::EndEach {
            vec![Node::Each {
                path: path.to_string(),
                body,
            }]
        } else {
            tracing::warn!(path, "dropping unclosed {{{{#each}}}} directive");
            body
        }
    }
}

/// Join adjacent text nodes left behind by dropped tags.
fn merge_text(nodes: Vec<Node>) -> Vec<Node> {
    let mut merged: Vec<Node> = Vec::with_capacity(nodes.len());
    for node in nodes {
        let node = match node {
            Node::If {
                path,
                then,
                otherwise,
            } => Node::If {
                path,
                then: merge_text(then),
                otherwise: merge_text(otherwise),
            },
            Node::Each { path, body } => Node::Each {
                path,
                body: merge_text(body),
            },
            other => other,
        };
        match (merged.last_mut(), node) {
            (Some(Node::Text(prev)), Node::Text(text)) => prev.push_str(&text),
            (_, node) => merged.push(node),
        }
    }
    merged
}
