//! Verification of the external tools the download depends on

use std::process::{Command, Stdio};

use crate::config::DownloadConfig;
use crate::error::AppError;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ToolVersion {
    pub program: String,
    pub version: String,
}

pub trait DependencyCheck: Send + Sync {
    fn verify(&self) -> Result<Vec<ToolVersion>, AppError>;
}

#[derive(Clone, Debug)]
struct Tool {
    program: String,
    version_flag: &'static str,
}

/// Checks that the downloader and the transcoder can be executed
#[derive(Clone, Debug)]
pub struct SystemDependencyCheck {
    tools: Vec<Tool>,
}

impl SystemDependencyCheck {
    pub fn new(config: &DownloadConfig) -> Self {
        Self {
            tools: vec![
                Tool { program: config.program.clone(), version_flag: "--version" },
                Tool { program: config.transcoder.clone(), version_flag: "-version" },
            ],
        }
    }
}

impl DependencyCheck for SystemDependencyCheck {
    fn verify(&self) -> Result<Vec<ToolVersion>, AppError> {
        self.tools.iter().map(probe).collect()
    }
}

fn probe(tool: &Tool) -> Result<ToolVersion, AppError> {
    let output = Command::new(&tool.program)
        .arg(tool.version_flag)
        .stdin(Stdio::null())
        .output()
        .map_err(|e| {
            AppError::DependencyInstall(format!("{} is not available: {}", tool.program, e))
        })?;

    if !output.status.success() {
        return Err(AppError::DependencyInstall(format!(
            "{} {} exited with {}",
            tool.program, tool.version_flag, output.status
        )));
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    let version = stdout.lines().next().unwrap_or("unknown").trim().to_string();
    tracing::info!(program = %tool.program, %version, "Tool verified");

    Ok(ToolVersion { program: tool.program.clone(), version })
}
