//! Host-side compilation gate.
//!
//! Compiled languages go through one bounded compiler invocation before any
//! sandbox is started, so a broken submission is rejected cheaply with the
//! compiler's own diagnostic. Expected failures (bad code, missing public
//! class, compiler timeout) are reported as a non-exceptional
//! [`CompileArtifact::Failed`]; only host faults (cannot write the source,
//! cannot spawn the compiler) are errors.

use std::path::PathBuf;
use std::sync::OnceLock;
use std::time::Duration;

use regex::Regex;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::debug;

use crate::config::get_config;
use crate::error::{JudgeError, Result};
use crate::models::Language;
use crate::workspace::SessionWorkspace;

/// Compiler variant, selected by [`Compiler::for_language`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compiler {
    /// c / cpp: platform toolchain producing a native binary.
    Native { language: Language },
    /// java: `javac` into a session-scoped class directory.
    Bytecode,
    /// python: no build step, the source file is the artifact.
    Interpreted,
}

/// Everything needed to reproduce the exact command that runs the program.
/// Self-contained on purpose: no variant reads session state that was set
/// somewhere else.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invocation {
    Binary {
        path: PathBuf,
    },
    JavaClass {
        class_name: String,
        class_dir: PathBuf,
    },
    Script {
        interpreter: String,
        path: PathBuf,
    },
}

impl Invocation {
    /// Reconstruct the argv that executes this artifact.
    pub fn build_command(&self) -> Vec<String> {
        match self {
            Invocation::Binary { path } => vec![path.display().to_string()],
            Invocation::JavaClass {
                class_name,
                class_dir,
            } => vec![
                "java".to_string(),
                "-cp".to_string(),
                class_dir.display().to_string(),
                class_name.clone(),
            ],
            Invocation::Script { interpreter, path } => {
                vec![interpreter.clone(), path.display().to_string()]
            }
        }
    }
}

/// Outcome of one compile attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompileArtifact {
    Compiled { invocation: Invocation },
    Failed { diagnostic: String },
}

impl CompileArtifact {
    pub fn is_success(&self) -> bool {
        matches!(self, CompileArtifact::Compiled { .. })
    }
}

impl Compiler {
    /// Select the compiler variant for a language.
    pub fn for_language(language: Language) -> Self {
        match language {
            Language::C | Language::Cpp => Compiler::Native { language },
            Language::Java => Compiler::Bytecode,
            Language::Python => Compiler::Interpreted,
        }
    }

    /// Compile `code` inside the session workspace.
    pub async fn compile(&self, code: &str, workspace: &SessionWorkspace) -> Result<CompileArtifact> {
        match self {
            Compiler::Native { language } => compile_native(*language, code, workspace).await,
            Compiler::Bytecode => compile_java(code, workspace).await,
            Compiler::Interpreted => {
                let path = workspace
                    .path()
                    .join(format!("{}.py", workspace.session_id()));
                tokio::fs::write(&path, code).await?;
                Ok(CompileArtifact::Compiled {
                    invocation: Invocation::Script {
                        interpreter: "python3".to_string(),
                        path,
                    },
                })
            }
        }
    }
}

async fn compile_native(
    language: Language,
    code: &str,
    workspace: &SessionWorkspace,
) -> Result<CompileArtifact> {
    let extension = match language {
        Language::C => "c",
        _ => "cpp",
    };
    let compiler = match language {
        Language::C => "gcc",
        _ => "g++",
    };

    let source = workspace
        .path()
        .join(format!("{}.{extension}", workspace.session_id()));
    let binary = workspace
        .path()
        .join(format!("{}.out", workspace.session_id()));
    tokio::fs::write(&source, code).await?;

    let mut command = Command::new(compiler);
    command.arg(&source).arg("-o").arg(&binary);
    debug!("compiling {language} submission with {compiler}");

    let timeout_secs = get_config().compile_timeout_secs;
    match run_bounded(&mut command, Duration::from_secs(timeout_secs)).await? {
        None => Ok(CompileArtifact::Failed {
            diagnostic: format!("{compiler} timed out after {timeout_secs}s"),
        }),
        Some(output) if output.status.success() => Ok(CompileArtifact::Compiled {
            invocation: Invocation::Binary { path: binary },
        }),
        Some(output) => Ok(CompileArtifact::Failed {
            diagnostic: String::from_utf8_lossy(&output.stderr).into_owned(),
        }),
    }
}

async fn compile_java(code: &str, workspace: &SessionWorkspace) -> Result<CompileArtifact> {
    let class_name = match extract_public_class(code) {
        Some(name) => name,
        None => {
            return Ok(CompileArtifact::Failed {
                diagnostic: "no public class found".to_string(),
            })
        }
    };

    let source = workspace.path().join(format!("{class_name}.java"));
    let class_dir = workspace.path().join("classes");
    tokio::fs::create_dir_all(&class_dir).await?;
    tokio::fs::write(&source, code).await?;

    let mut command = Command::new("javac");
    command.arg("-d").arg(&class_dir).arg(&source);
    debug!("compiling java submission, public class {class_name}");

    let timeout_secs = get_config().compile_timeout_secs;
    match run_bounded(&mut command, Duration::from_secs(timeout_secs)).await? {
        None => Ok(CompileArtifact::Failed {
            diagnostic: format!("javac timed out after {timeout_secs}s"),
        }),
        Some(output) if output.status.success() => Ok(CompileArtifact::Compiled {
            // The artifact bundles the class name and its directory so the
            // run command can be rebuilt from the artifact alone.
            invocation: Invocation::JavaClass {
                class_name,
                class_dir,
            },
        }),
        Some(output) => Ok(CompileArtifact::Failed {
            diagnostic: String::from_utf8_lossy(&output.stderr).into_owned(),
        }),
    }
}

/// Run a compiler invocation under a hard timeout. `None` means the limit
/// expired; the child is killed and reaped by the runtime.
async fn run_bounded(
    command: &mut Command,
    limit: Duration,
) -> Result<Option<std::process::Output>> {
    command.kill_on_drop(true);
    match timeout(limit, command.output()).await {
        Ok(output) => {
            let output = output.map_err(|e| JudgeError::CompilerSpawn(e.to_string()))?;
            Ok(Some(output))
        }
        Err(_) => Ok(None),
    }
}

/// Scan for the `public class <Name>` declaration.
fn extract_public_class(code: &str) -> Option<String> {
    static PUBLIC_CLASS: OnceLock<Option<Regex>> = OnceLock::new();
    let pattern = PUBLIC_CLASS.get_or_init(|| Regex::new(r"public\s+class\s+(\w+)").ok());
    let captures = pattern.as_ref()?.captures(code)?;
    Some(captures[1].to_string())
}
