use std::process::Command;

use crate::error::{GpuError, Result};

/// Run an external tool and return its stdout.
///
/// Fails without spawning anything when the tool is not on `PATH`.
pub fn run_command(program: &str, args: &[&str]) -> Result<String> {
    let path = which::which(program)
        .map_err(|e| GpuError::command(format!("{} not found: {}", program, e)))?;

    let output = Command::new(path)
        .args(args)
        .output()
        .map_err(|e| GpuError::command(format!("Failed to run {}: {}", program, e)))?;

    if !output.status.success() {
        return Err(GpuError::command(format!(
            "{} exited with {}: {}",
            program,
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        )));
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_program_is_an_error() {
        let result = run_command("gpuscope-definitely-not-installed", &[]);
        assert!(matches!(result, Err(GpuError::Command(_))));
    }
}
