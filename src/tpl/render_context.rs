use crate::value::Value;

/// Variable scope used while executing a program: loop locals shadow the
/// root context.
pub struct Context<'a> {
    root: &'a Value,
    locals: Vec<(String, Value)>,
}

impl<'a> Context<'a> {
    pub fn new(root: &'a Value) -> Self {
        Self {
            root,
            locals: Vec::new(),
        }
    }

    pub fn push(&mut self, key: &str, value: Value) {
        self.locals.push((key.to_string(), value));
    }

    pub fn pop(&mut self) {
        self.locals.pop();
    }

    pub fn lookup(&self, key: &str) -> Option<&Value> {
        // 优先查找局部变量（栈结构，从后往前查以支持遮蔽）
        if let Some((_, v)) = self.locals.iter().rev().find(|(k, _)| k == key) {
            return Some(v);
        }

        if let Value::Map(m) = self.root {
            return m.get(key);
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_simple() {
        let root: Value = [("a", 1)].into_iter().collect();
        let ctx = Context::new(&root);

        assert_eq!(ctx.lookup("a"), Some(&Value::I64(1)));
        assert_eq!(ctx.lookup("b"), None);
    }

    #[test]
    fn test_lookup_locals_shadowing() {
        let root: Value = [("a", 1)].into_iter().collect();
        let mut ctx = Context::new(&root);

        ctx.push("a", Value::I64(2));
        ctx.push("a", Value::I64(3));
        assert_eq!(ctx.lookup("a"), Some(&Value::I64(3)));

        ctx.pop();
        assert_eq!(ctx.lookup("a"), Some(&Value::I64(2)));
        ctx.pop();
        assert_eq!(ctx.lookup("a"), Some(&Value::I64(1)));
    }

    #[test]
    fn test_lookup_non_map_root() {
        let root = Value::Null;
        let ctx = Context::new(&root);
        assert_eq!(ctx.lookup("a"), None);
    }
}
