//! The external language model as a synchronous text-in/text-out port.
//!
//! Nothing in the core assumes a transport. The shipped implementations are
//! a subprocess command (prompt piped to stdin) and an interactive
//! copy/paste loop; tests substitute a fixed stub.

use anyhow::{anyhow, Context, Result};
use std::cell::RefCell;
use std::io::{BufRead, BufReader, Stdin, Stdout, Write};
use std::process::{Command, Stdio};
use std::time::Instant;

/// Synchronous oracle: one prompt in, one response out.
pub trait Oracle {
    fn complete(&self, prompt: &str) -> Result<String>;
}

/// Split an oracle response into its lines, dropping the trailing empty
/// segment so `"a\nb\n"` and `"a\nb"` both yield two lines.
pub fn response_lines(response: &str) -> Vec<String> {
    response.lines().map(str::to_string).collect()
}

/// Oracle backed by an external LM command. The command line is split with
/// shell quoting rules; the prompt is written to the child's stdin and the
/// response read from its stdout.
pub struct CommandOracle {
    command: String,
}

impl CommandOracle {
    pub fn new(command: String) -> Self {
        Self { command }
    }
}

impl Oracle for CommandOracle {
    fn complete(&self, prompt: &str) -> Result<String> {
        let args = shell_words::split(&self.command)
            .with_context(|| format!("parse LM command: {}", self.command))?;
        if args.is_empty() {
            return Err(anyhow!("LM command is empty"));
        }

        let start = Instant::now();
        let mut child = Command::new(&args[0])
            .args(&args[1..])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .with_context(|| format!("spawn LM command: {}", args[0]))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(prompt.as_bytes())
                .context("write prompt to LM stdin")?;
        }

        let output = child.wait_with_output().context("wait for LM command")?;
        let elapsed_ms = start.elapsed().as_millis();
        tracing::info!(
            elapsed_ms,
            prompt_bytes = prompt.len(),
            response_bytes = output.stdout.len(),
            "lm invoke complete"
        );

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(anyhow!(
                "LM command failed with status {}: {}",
                output.status,
                stderr.trim()
            ));
        }
        String::from_utf8(output.stdout).context("decode LM stdout as UTF-8")
    }
}

/// Oracle for the manual workflow: the prompt is printed for the user to
/// carry to the model themselves, and the annotated output is pasted back,
/// terminated by a blank line (or end of input).
pub struct PastedOracle<R, W> {
    input: RefCell<R>,
    output: RefCell<W>,
}

impl<R: BufRead, W: Write> PastedOracle<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self {
            input: RefCell::new(input),
            output: RefCell::new(output),
        }
    }

    #[cfg(test)]
    fn into_output(self) -> W {
        self.output.into_inner()
    }
}

impl<R: BufRead, W: Write> Oracle for PastedOracle<R, W> {
    fn complete(&self, prompt: &str) -> Result<String> {
        {
            let mut output = self.output.borrow_mut();
            writeln!(output, "{prompt}").context("print prompt")?;
            writeln!(output, "Copy the above and paste it to your language model.")
                .context("print prompt")?;
            writeln!(
                output,
                "Now paste the model output here (finish with an empty line):"
            )
            .context("print prompt")?;
            output.flush().context("flush prompt")?;
        }

        let mut input = self.input.borrow_mut();
        let mut response = String::new();
        loop {
            let mut line = String::new();
            let read = input.read_line(&mut line).context("read pasted response")?;
            let trimmed = line.trim_end_matches(['\n', '\r']);
            if read == 0 || trimmed.is_empty() {
                break;
            }
            response.push_str(trimmed);
            response.push('\n');
        }
        Ok(response)
    }
}

/// Build a paste-driven oracle over process stdin/stdout.
pub fn stdio_oracle() -> PastedOracle<BufReader<Stdin>, Stdout> {
    PastedOracle::new(BufReader::new(std::io::stdin()), std::io::stdout())
}
