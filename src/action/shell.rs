// src/action/shell.rs

use anyhow::Result;

use super::ActionContext;
use crate::exec::tool::ToolInvocation;

/// Run a command line through the platform shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellAction {
    pub cmd: String,
}

impl ShellAction {
    pub fn new(cmd: impl Into<String>) -> Self {
        Self { cmd: cmd.into() }
    }

    pub fn invocation(&self, ctx: &ActionContext) -> ToolInvocation {
        if cfg!(windows) {
            ToolInvocation::new("cmd", &ctx.root).arg("/C").arg(&self.cmd)
        } else {
            ToolInvocation::new("sh", &ctx.root).arg("-c").arg(&self.cmd)
        }
    }

    pub async fn execute(&self, ctx: &ActionContext) -> Result<()> {
        ctx.run_tool(self.invocation(ctx)).await
    }
}
