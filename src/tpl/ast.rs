/// Root of one parsed template file.
#[derive(Debug, Clone, Default)]
pub struct Template {
    pub name: String,
    pub nodes: Vec<Node>,
    /// Set by `{% extends %}`; always a fully parsed template.
    pub parent: Option<Box<Template>>,
}

impl Template {
    /// Names of this template and every ancestor, nearest first.
    pub fn chain(&self) -> Vec<&str> {
        let mut names = vec![self.name.as_str()];
        let mut current = self.parent.as_deref();
        while let Some(t) = current {
            names.push(t.name.as_str());
            current = t.parent.as_deref();
        }
        names
    }

    /// Top-level blocks of this template, in document order.
    pub fn blocks(&self) -> impl Iterator<Item = &Block> {
        self.nodes.iter().filter_map(|n| match n {
            Node::Block(b) => Some(b),
            _ => None,
        })
    }
}

#[derive(Debug, Clone)]
pub enum Node {
    Text(String),
    Out(Out),
    Block(Block),
    If(If),
    For(For),
}

#[derive(Debug, Clone)]
pub struct Out {
    pub expr: String,
    pub offset: usize,
}

#[derive(Debug, Clone)]
pub struct Block {
    pub name: String,
    pub nodes: Vec<Node>,
}

#[derive(Debug, Clone)]
pub struct If {
    pub test: String,
    pub offset: usize,
    pub then_nodes: Vec<Node>,
    pub else_nodes: Option<Vec<Node>>,
}

#[derive(Debug, Clone)]
pub struct For {
    pub header: String,
    pub offset: usize,
    pub body: Vec<Node>,
}
