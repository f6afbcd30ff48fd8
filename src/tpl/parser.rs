use crate::error::{Result, TemplateError};
use crate::tpl::ast::{Block, For, If, Node, Out, Template};
use crate::tpl::lexer::{Token, TokenKind, tokenize};

/// Supplies template sources by name, e.g. for `{% extends %}`.
pub trait Loader {
    fn load(&self, name: &str) -> Result<String>;
}

const IF_STOPS: &[&str] = &["else", "endif"];
const ELSE_STOPS: &[&str] = &["endif"];
const BLOCK_STOPS: &[&str] = &["endblock"];
const FOR_STOPS: &[&str] = &["endfor"];
const TERMINATORS: &[&str] = &["else", "endif", "endblock", "endfor"];

/// Loads, tokenizes and parses `name` together with its whole `extends` chain.
pub fn compile(loader: &dyn Loader, name: &str) -> Result<Template> {
    compile_chain(loader, name, &mut Vec::new())
}

/// Parses an already tokenized template. Parents named by `extends` are
/// loaded through `loader`.
pub fn parse(
    loader: &dyn Loader,
    name: &str,
    source: &str,
    tokens: Vec<Token>,
) -> Result<Template> {
    let mut chain = vec![name.to_string()];
    Parser::new(loader, name, source, tokens, &mut chain).parse()
}

fn compile_chain(loader: &dyn Loader, name: &str, chain: &mut Vec<String>) -> Result<Template> {
    let source = loader.load(name)?;
    let tokens = tokenize(&source);
    chain.push(name.to_string());
    let result = Parser::new(loader, name, &source, tokens, chain).parse();
    chain.pop();
    result
}

struct Parser<'a> {
    loader: &'a dyn Loader,
    name: &'a str,
    source: &'a str,
    tokens: std::vec::IntoIter<Token>,
    /// Templates currently being compiled, outermost first.
    chain: &'a mut Vec<String>,
    parent: Option<Box<Template>>,
}

impl<'a> Parser<'a> {
    fn new(
        loader: &'a dyn Loader,
        name: &'a str,
        source: &'a str,
        tokens: Vec<Token>,
        chain: &'a mut Vec<String>,
    ) -> Self {
        Self {
            loader,
            name,
            source,
            tokens: tokens.into_iter(),
            chain,
            parent: None,
        }
    }

    fn parse(mut self) -> Result<Template> {
        let mut nodes = Vec::new();
        self.parse_nodes(&mut nodes, &[], None)?;
        Ok(Template {
            name: self.name.to_string(),
            nodes,
            parent: self.parent,
        })
    }

    /// Parses nodes into `target` until a directive from `stops` is consumed,
    /// returning that keyword. `opener` is the directive that opened the
    /// scope; running out of tokens inside it is an error.
    fn parse_nodes(
        &mut self,
        target: &mut Vec<Node>,
        stops: &[&'static str],
        opener: Option<(&str, usize)>,
    ) -> Result<Option<&'static str>> {
        while let Some(token) = self.tokens.next() {
            let offset = token.span.start;
            let (keyword, args) = match token.kind {
                TokenKind::Text(text) => {
                    target.push(Node::Text(text));
                    continue;
                }
                TokenKind::Output(expr) => {
                    target.push(Node::Out(Out { expr, offset }));
                    continue;
                }
                TokenKind::Directive { keyword, args } => (keyword, args),
            };

            if let Some(stop) = stops.iter().find(|s| **s == keyword) {
                return Ok(Some(*stop));
            }

            match keyword.as_str() {
                "extends" => self.parse_extends(&args, offset)?,
                "block" => {
                    let block = self.parse_block(&args, offset)?;
                    target.push(Node::Block(block));
                }
                "if" => {
                    let node = self.parse_if(args, offset)?;
                    target.push(Node::If(node));
                }
                "for" => {
                    let node = self.parse_for(args, offset)?;
                    target.push(Node::For(node));
                }
                kw if TERMINATORS.iter().any(|t| *t == kw) => {
                    return Err(TemplateError::parse(
                        self.name,
                        format!("unexpected `{}`", kw),
                        offset,
                    ));
                }
                // unknown directives render as literal text
                _ => target.push(Node::Text(self.source[token.span.range()].to_string())),
            }
        }

        match opener {
            Some((keyword, offset)) => Err(TemplateError::UnterminatedBlock {
                template: self.name.to_string(),
                keyword: keyword.to_string(),
                offset,
            }),
            None => Ok(None),
        }
    }

    fn parse_extends(&mut self, args: &str, offset: usize) -> Result<()> {
        let file = unquote(args);
        if file.is_empty() {
            return Err(TemplateError::parse(
                self.name,
                "`extends` requires a template path",
                offset,
            ));
        }
        if let Some(parent) = &self.parent {
            return Err(TemplateError::parse(
                self.name,
                format!("template already extends `{}`", parent.name),
                offset,
            ));
        }
        if self.chain.iter().any(|n| n == file) {
            let mut cycle = self.chain.join(" -> ");
            cycle.push_str(" -> ");
            cycle.push_str(file);
            return Err(TemplateError::parse(
                self.name,
                format!("circular inheritance: {}", cycle),
                offset,
            ));
        }
        let parent = compile_chain(self.loader, file, self.chain)?;
        self.parent = Some(Box::new(parent));
        Ok(())
    }

    fn parse_block(&mut self, args: &str, offset: usize) -> Result<Block> {
        let name = args.split_whitespace().next().map(unquote).unwrap_or_default();
        if name.is_empty() {
            return Err(TemplateError::parse(self.name, "`block` requires a name", offset));
        }
        let mut block = Block {
            name: name.to_string(),
            nodes: Vec::new(),
        };
        self.parse_nodes(&mut block.nodes, BLOCK_STOPS, Some(("block", offset)))?;
        Ok(block)
    }

    fn parse_if(&mut self, test: String, offset: usize) -> Result<If> {
        if test.is_empty() {
            return Err(TemplateError::parse(self.name, "`if` requires a condition", offset));
        }
        let mut node = If {
            test,
            offset,
            then_nodes: Vec::new(),
            else_nodes: None,
        };
        let stop = self.parse_nodes(&mut node.then_nodes, IF_STOPS, Some(("if", offset)))?;
        if stop == Some("else") {
            let mut else_nodes = Vec::new();
            self.parse_nodes(&mut else_nodes, ELSE_STOPS, Some(("if", offset)))?;
            node.else_nodes = Some(else_nodes);
        }
        Ok(node)
    }

    fn parse_for(&mut self, header: String, offset: usize) -> Result<For> {
        if header.is_empty() {
            return Err(TemplateError::parse(self.name, "`for` requires a loop header", offset));
        }
        let mut node = For {
            header,
            offset,
            body: Vec::new(),
        };
        self.parse_nodes(&mut node.body, FOR_STOPS, Some(("for", offset)))?;
        Ok(node)
    }
}

fn unquote(s: &str) -> &str {
    let s = s.trim();
    for q in ['"', '\''] {
        if let Some(inner) = s.strip_prefix(q).and_then(|r| r.strip_suffix(q)) {
            return inner;
        }
    }
    s
}
