//! Agent invocation: shell-style command tokenization and blocking spawn.

use std::path::Path;
use std::process::Command;

use anyhow::{anyhow, bail, Context, Result};

/// Tokenization failures. The tokenizer is deliberately strict: quotes must
/// be terminated and a command cannot end mid-escape.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum TokenizeError {
    #[error("unterminated single quote")]
    UnterminatedSingleQuote,

    #[error("unterminated double quote")]
    UnterminatedDoubleQuote,

    #[error("trailing backslash")]
    TrailingBackslash,
}

/// Split a command line into tokens with shell-style quoting.
///
/// Supported: single quotes (everything literal), double quotes with
/// backslash escapes for `"`, `\`, `$`, backtick, and newline, and unquoted
/// backslash escaping the next character. Backslash-newline is a line
/// continuation in both unquoted and double-quoted context. No variable
/// expansion, no globbing.
pub fn tokenize_command(input: &str) -> Result<Vec<String>, TokenizeError> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    // Distinguishes an empty pending token ('' or "") from no token at all.
    let mut has_token = false;
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            ' ' | '\t' | '\n' => {
                if has_token {
                    tokens.push(std::mem::take(&mut current));
                    has_token = false;
                }
            }
            '\'' => {
                has_token = true;
                loop {
                    match chars.next() {
                        Some('\'') => break,
                        Some(inner) => current.push(inner),
                        None => return Err(TokenizeError::UnterminatedSingleQuote),
                    }
                }
            }
            '"' => {
                has_token = true;
                loop {
                    match chars.next() {
                        Some('"') => break,
                        Some('\\') => match chars.next() {
                            // Only these escapes are recognized inside double
                            // quotes; otherwise the backslash is literal.
                            Some(escaped @ ('"' | '\\' | '$' | '`')) => current.push(escaped),
                            Some('\n') => {}
                            Some(other) => {
                                current.push('\\');
                                current.push(other);
                            }
                            None => return Err(TokenizeError::UnterminatedDoubleQuote),
                        },
                        Some(inner) => current.push(inner),
                        None => return Err(TokenizeError::UnterminatedDoubleQuote),
                    }
                }
            }
            '\\' => match chars.next() {
                Some('\n') => {}
                Some(escaped) => {
                    has_token = true;
                    current.push(escaped);
                }
                None => return Err(TokenizeError::TrailingBackslash),
            },
            _ => {
                has_token = true;
                current.push(c);
            }
        }
    }

    if has_token {
        tokens.push(current);
    }
    Ok(tokens)
}

/// Invoke the agent command inside `project_root`, inheriting the standard
/// streams for real-time output, and block until it exits.
///
/// A non-zero exit is returned as an error naming the code — but callers
/// must not treat it as authoritative: the session result file is the source
/// of truth for the attempt's outcome.
pub fn run_agent(agent_command: &str, project_root: &Path) -> Result<()> {
    let tokens = tokenize_command(agent_command.trim())
        .map_err(|err| anyhow!("tokenize agent command {agent_command:?}: {err}"))?;
    let Some((program, args)) = tokens.split_first() else {
        bail!("agent command must not be empty or whitespace");
    };

    let status = Command::new(program)
        .args(args)
        .current_dir(project_root)
        .status()
        .with_context(|| format!("start agent {program:?}"))?;

    if !status.success() {
        match status.code() {
            Some(code) => bail!("agent exited with code {code}"),
            None => bail!("agent terminated by signal"),
        }
    }
    Ok(())
}
