use crate::error::{Result, TemplateError};
use crate::tpl::expr::eval;
use crate::tpl::program::{Instr, Program};
use crate::tpl::render_context::Context;
use crate::value::Value;
use std::fmt::Write;

struct LoopState<'p> {
    vars: &'p [String],
    items: std::vec::IntoIter<Vec<Value>>,
    bound: bool,
}

/// Runs `program` against the context `root`, returning the rendered text.
pub(crate) fn execute(program: &Program, root: &Value) -> Result<String> {
    let err = |message: String| TemplateError::render(&program.name, message);

    let mut ctx = Context::new(root);
    let mut out = String::new();
    let mut loops: Vec<LoopState> = Vec::new();
    let mut pc = 0;

    while let Some(instr) = program.instrs.get(pc) {
        match instr {
            Instr::Text(text) => out.push_str(text),

            Instr::Emit(expr) => {
                let value = eval(expr, &ctx).map_err(err)?;
                write!(out, "{}", value)
                    .map_err(|_| err(format!("cannot format {}", value.type_name())))?;
            }

            Instr::JumpIfFalse(expr, j) => {
                if !eval(expr, &ctx).map_err(err)?.is_truthy() {
                    pc = *j;
                    continue;
                }
            }

            Instr::Jump(j) => {
                pc = *j;
                continue;
            }

            Instr::LoopStart { vars, iterable } => {
                let iterable = eval(iterable, &ctx).map_err(err)?;
                let items = loop_items(&iterable, vars.len()).map_err(err)?;
                loops.push(LoopState {
                    vars,
                    items: items.into_iter(),
                    bound: false,
                });
            }

            Instr::Iterate(j) => {
                let state = loops
                    .last_mut()
                    .ok_or_else(|| err("`Iterate` outside of a loop".to_string()))?;
                if state.bound {
                    for _ in state.vars {
                        ctx.pop();
                    }
                }
                match state.items.next() {
                    Some(values) => {
                        for (var, value) in state.vars.iter().zip(values) {
                            ctx.push(var, value);
                        }
                        state.bound = true;
                    }
                    None => {
                        loops.pop();
                        pc = *j;
                        continue;
                    }
                }
            }
        }
        pc += 1;
    }

    Ok(out)
}

/// Materializes the bindings for each iteration: one value per loop variable.
fn loop_items(iterable: &Value, width: usize) -> std::result::Result<Vec<Vec<Value>>, String> {
    let pair = width > 1;
    Ok(match iterable {
        Value::Null => Vec::new(),
        Value::List(items) => items
            .iter()
            .enumerate()
            .map(|(i, v)| if pair { vec![Value::from(i), v.clone()] } else { vec![v.clone()] })
            .collect(),
        Value::Map(m) => m
            .iter()
            .map(|(k, v)| {
                let key = Value::Str(k.clone());
                if pair { vec![key, v.clone()] } else { vec![key] }
            })
            .collect(),
        Value::Str(s) => s
            .chars()
            .enumerate()
            .map(|(i, c)| {
                let c = Value::Str(c.to_string());
                if pair { vec![Value::from(i), c] } else { vec![c] }
            })
            .collect(),
        other => return Err(format!("cannot iterate over {}", other.type_name())),
    })
}
