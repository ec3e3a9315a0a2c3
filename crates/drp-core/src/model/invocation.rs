//! Invocación estructurada de una herramienta externa.
//!
//! Programa + lista de argumentos. Nunca pasa por un shell: cada elemento de
//! `args` llega tal cual a `argv` del proceso hijo, así que valores con
//! espacios o comillas no necesitan escaparse.
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CommandInvocation {
    pub program: String,
    pub args: Vec<String>,
}

impl CommandInvocation {
    pub fn new(program: impl Into<String>) -> Self {
        Self { program: program.into(),
               args: Vec::new() }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, A>(mut self, args: I) -> Self
        where I: IntoIterator<Item = A>,
              A: Into<String>
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }
}

/// Representación legible para logs (no apta para pasar a un shell).
impl fmt::Display for CommandInvocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for a in &self.args {
            if a.is_empty() || a.contains(char::is_whitespace) {
                write!(f, " {a:?}")?;
            } else {
                write!(f, " {a}")?;
            }
        }
        Ok(())
    }
}
