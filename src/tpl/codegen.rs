use crate::error::{Result, TemplateError};
use crate::tpl::ast::{Block, Node, Template};
use crate::tpl::expr::{ExprError, compile, parse_expr, parse_loop_header};
use crate::tpl::program::{FIXME, Instr, Program};
use chrono::Utc;
use std::collections::HashMap;

/// Compiles a parsed template, with its inheritance chain, into a program.
pub fn generate(template: &Template) -> Result<Program> {
    let mut generator = Generator { instrs: Vec::new() };
    for (owner, item) in resolve(template) {
        match item {
            Item::Node(node) => generator.node(owner, node)?,
            Item::Override(block) => generator.nodes(owner, &block.nodes)?,
        }
    }
    Ok(Program {
        name: template.name.clone(),
        sources: template.chain().into_iter().map(String::from).collect(),
        compiled_at: Utc::now(),
        instrs: generator.instrs,
    })
}

/// A resolved top-level item: a node of some template in the chain, or a
/// block body that replaced a parent block.
#[derive(Clone, Copy)]
enum Item<'t> {
    Node(&'t Node),
    Override(&'t Block),
}

/// Top-level items to emit, each paired with the template it came from.
///
/// The parent is resolved first, so a block overridden anywhere down the
/// chain replaces the one from the root layout. Blocks without a same-named
/// top-level block in the resolved parent are dropped, as is any other
/// top-level content of an extending template.
fn resolve(template: &Template) -> Vec<(&str, Item<'_>)> {
    let Some(parent) = &template.parent else {
        return template
            .nodes
            .iter()
            .map(|n| (template.name.as_str(), Item::Node(n)))
            .collect();
    };

    // a later block of the same name wins
    let overrides: HashMap<&str, &Block> =
        template.blocks().map(|b| (b.name.as_str(), b)).collect();

    resolve(parent)
        .into_iter()
        .map(|(owner, item)| {
            let name = match item {
                Item::Node(Node::Block(b)) | Item::Override(b) => b.name.as_str(),
                Item::Node(_) => return (owner, item),
            };
            match overrides.get(name) {
                Some(child) => (template.name.as_str(), Item::Override(child)),
                None => (owner, item),
            }
        })
        .collect()
}

struct Generator {
    instrs: Vec<Instr>,
}

impl Generator {
    fn node(&mut self, owner: &str, node: &Node) -> Result<()> {
        match node {
            Node::Text(text) => {
                self.push(Instr::Text(text.clone()));
            }

            Node::Out(out) => {
                let expr = parse_expr(&out.expr).map_err(|e| expr_error(owner, e, out.offset))?;
                self.push(Instr::Emit(compile(&expr)));
            }

            Node::Block(block) => self.nodes(owner, &block.nodes)?,

            Node::If(node) => {
                let cond =
                    parse_expr(&node.test).map_err(|e| expr_error(owner, e, node.offset))?;
                let j = self.push(Instr::JumpIfFalse(compile(&cond), FIXME));
                self.nodes(owner, &node.then_nodes)?;
                match &node.else_nodes {
                    Some(else_nodes) => {
                        let j2 = self.push(Instr::Jump(FIXME));
                        self.update_jump(j);
                        self.nodes(owner, else_nodes)?;
                        self.update_jump(j2);
                    }
                    None => self.update_jump(j),
                }
            }

            Node::For(node) => {
                let header = parse_loop_header(&node.header)
                    .map_err(|e| expr_error(owner, e, node.offset))?;
                self.push(Instr::LoopStart {
                    vars: header.vars,
                    iterable: compile(&header.iterable),
                });
                let j = self.push(Instr::Iterate(FIXME));
                self.nodes(owner, &node.body)?;
                self.push(Instr::Jump(j));
                self.update_jump(j);
            }
        }
        Ok(())
    }

    fn nodes(&mut self, owner: &str, nodes: &[Node]) -> Result<()> {
        for node in nodes {
            self.node(owner, node)?;
        }
        Ok(())
    }

    fn update_jump(&mut self, i: usize) {
        let n = self.instrs.len();
        if let Instr::Jump(j) | Instr::JumpIfFalse(_, j) | Instr::Iterate(j) = &mut self.instrs[i] {
            *j = n;
        }
    }

    fn push(&mut self, instr: Instr) -> usize {
        let i = self.instrs.len();
        self.instrs.push(instr);
        i
    }
}

fn expr_error(template: &str, err: ExprError, offset: usize) -> TemplateError {
    TemplateError::Expression {
        template: template.to_string(),
        message: err.to_string(),
        offset,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tpl::ast::{If, Out};
    use crate::tpl::program::Op;

    fn text(s: &str) -> Node {
        Node::Text(s.to_string())
    }

    fn block(name: &str, nodes: Vec<Node>) -> Node {
        Node::Block(Block {
            name: name.to_string(),
            nodes,
        })
    }

    fn template(name: &str, nodes: Vec<Node>, parent: Option<Template>) -> Template {
        Template {
            name: name.to_string(),
            nodes,
            parent: parent.map(Box::new),
        }
    }

    fn texts(program: &Program) -> String {
        program
            .instrs
            .iter()
            .filter_map(|i| match i {
                Instr::Text(t) => Some(t.as_str()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_if_else_jumps() {
        let t = template(
            "t",
            vec![Node::If(If {
                test: "x".to_string(),
                offset: 0,
                then_nodes: vec![text("A")],
                else_nodes: Some(vec![text("B")]),
            })],
            None,
        );
        let program = generate(&t).unwrap();
        assert_eq!(
            program.instrs,
            vec![
                Instr::JumpIfFalse(vec![Op::Load("x".to_string())], 3),
                Instr::Text("A".to_string()),
                Instr::Jump(4),
                Instr::Text("B".to_string()),
            ]
        );
    }

    #[test]
    fn test_child_overrides_parent_block() {
        let parent = template(
            "base",
            vec![text("<"), block("title", vec![text("P")]), text(">")],
            None,
        );
        let child = template(
            "child",
            vec![
                text("ignored"),
                block("title", vec![text("C")]),
                block("unknown", vec![text("U")]),
            ],
            Some(parent.clone()),
        );
        assert_eq!(texts(&generate(&child).unwrap()), "<C>");
        assert_eq!(texts(&generate(&parent).unwrap()), "<P>");
        assert_eq!(generate(&child).unwrap().sources, vec!["child", "base"]);
    }

    #[test]
    fn test_three_level_chain() {
        let root = template(
            "root",
            vec![block("title", vec![text("R")]), text("|"), block("body", vec![text("r")])],
            None,
        );
        let mid = template("mid", vec![block("body", vec![text("m")])], Some(root));
        let leaf = template("leaf", vec![block("title", vec![text("L")])], Some(mid));
        assert_eq!(texts(&generate(&leaf).unwrap()), "L|m");
    }

    #[test]
    fn test_expression_error_names_owner() {
        let parent = template(
            "base",
            vec![Node::Out(Out {
                expr: "a ==".to_string(),
                offset: 7,
            })],
            None,
        );
        let child = template("child", vec![], Some(parent));
        match generate(&child) {
            Err(TemplateError::Expression { template, offset, .. }) => {
                assert_eq!(template, "base");
                assert_eq!(offset, 7);
            }
            other => panic!("Expected Expression error, got {:?}", other),
        }
    }

    #[test]
    fn test_later_duplicate_override_wins() {
        let parent = template("base", vec![text("<"), block("title", vec![]), text(">")], None);
        let child = template(
            "child",
            vec![block("title", vec![text("C1")]), block("title", vec![text("C2")])],
            Some(parent),
        );
        assert_eq!(texts(&generate(&child).unwrap()), "<C2>");
    }

    #[test]
    fn test_large_expression_survives_json() {
        let expr = vec!["a"; 300].join(" + ") + " or not (b and c)";
        let t = template("t", vec![Node::Out(Out { expr, offset: 0 })], None);
        let program = generate(&t).unwrap();
        let json = serde_json::to_string(&program).unwrap();
        let decoded: Program = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, program);
    }
}
