use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use taskdag::exec::{ToolInvocation, ToolOutput, ToolRunner};
use taskdag::fs::mock::MockFileSystem;

type Effect = Arc<dyn Fn(&ToolInvocation) + Send + Sync>;

/// A tool runner that records every invocation and answers from a script.
///
/// - Invocations whose program matches an entry in `failing` return that
///   output; everything else succeeds.
/// - Optional per-program side effects (e.g. "the compiler writes files
///   into output/") run before the result is returned.
#[derive(Clone, Default)]
pub struct RecordingToolRunner {
    calls: Arc<Mutex<Vec<ToolInvocation>>>,
    failing: Arc<Mutex<HashMap<String, ToolOutput>>>,
    effects: Arc<Mutex<HashMap<String, Effect>>>,
}

impl RecordingToolRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every run of `program` fail with `output`.
    pub fn fail_program(&self, program: &str, output: ToolOutput) {
        self.failing
            .lock()
            .unwrap()
            .insert(program.to_string(), output);
    }

    /// Make runs whose last argument equals `arg` fail (e.g. one file of a
    /// validation pass). Keyed as `program arg`.
    pub fn fail_on_arg(&self, program: &str, arg: &str, output: ToolOutput) {
        self.failing
            .lock()
            .unwrap()
            .insert(format!("{program} {arg}"), output);
    }

    pub fn on_program<F>(&self, program: &str, effect: F)
    where
        F: Fn(&ToolInvocation) + Send + Sync + 'static,
    {
        self.effects
            .lock()
            .unwrap()
            .insert(program.to_string(), Arc::new(effect));
    }

    /// Side effect writing `files` into `fs` whenever `program` runs.
    pub fn writes_files(&self, program: &str, fs: &MockFileSystem, files: &[&str]) {
        let fs = fs.clone();
        let files: Vec<String> = files.iter().map(|f| f.to_string()).collect();
        self.on_program(program, move |_| {
            for f in &files {
                fs.add_file(f, b"// generated".to_vec());
            }
        });
    }

    pub fn calls(&self) -> Vec<ToolInvocation> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_to(&self, program: &str) -> Vec<ToolInvocation> {
        self.calls()
            .into_iter()
            .filter(|c| c.program == program)
            .collect()
    }
}

impl ToolRunner for RecordingToolRunner {
    fn invoke(
        &self,
        invocation: ToolInvocation,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<ToolOutput>> + Send + '_>> {
        Box::pin(async move {
            self.calls.lock().unwrap().push(invocation.clone());

            let effect = self.effects.lock().unwrap().get(&invocation.program).cloned();
            if let Some(effect) = effect {
                effect(&invocation);
            }

            let failing = self.failing.lock().unwrap();
            let by_arg = invocation
                .args
                .last()
                .and_then(|arg| failing.get(&format!("{} {arg}", invocation.program)));
            let output = by_arg
                .or_else(|| failing.get(&invocation.program))
                .cloned()
                .unwrap_or_else(ToolOutput::success);

            Ok(output)
        })
    }
}
