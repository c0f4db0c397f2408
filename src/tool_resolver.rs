//! # Tool Path Resolver
//!
//! Finds the `ffmpeg` and `ffprobe` binaries:
//! - Explicit override via `FFMPEG_PATH` / `FFPROBE_PATH`
//! - A bundled tools directory via `VIDEO_TOOLS_DIR`
//! - System `PATH`

use std::env;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::error::VideoToolsError;

/// Tools this crate drives
pub const REQUIRED_TOOLS: [&str; 2] = ["ffmpeg", "ffprobe"];

/// Tool path resolver for system and bundled installs
#[derive(Debug, Clone)]
pub struct ToolPathResolver {
    tools_dir: Option<PathBuf>,
}

impl ToolPathResolver {
    pub fn new() -> Self {
        let tools_dir = env::var_os("VIDEO_TOOLS_DIR")
            .map(PathBuf::from)
            .filter(|dir| dir.is_dir());
        debug!("Bundled tools directory: {:?}", tools_dir);
        Self { tools_dir }
    }

    /// Resolver that only looks in `tools_dir` and the system PATH
    pub fn with_tools_dir(tools_dir: impl Into<PathBuf>) -> Self {
        Self {
            tools_dir: Some(tools_dir.into()),
        }
    }

    /// Resolve the path to a specific tool
    pub fn resolve_tool(&self, tool_name: &str) -> Option<PathBuf> {
        let override_var = format!("{}_PATH", tool_name.to_uppercase());
        if let Some(path) = env::var_os(&override_var).map(PathBuf::from) {
            if path.is_file() {
                debug!("Using {} from {}: {:?}", tool_name, override_var, path);
                return Some(path);
            }
            warn!("{} points to a missing file: {:?}", override_var, path);
        }

        if let Some(ref tools_dir) = self.tools_dir {
            let bundled = tools_dir.join(Self::executable_name(tool_name));
            if bundled.is_file() {
                debug!("Using bundled tool: {} -> {:?}", tool_name, bundled);
                return Some(bundled);
            }
        }

        self.find_in_system_path(tool_name)
    }

    /// Resolved path, or the bare name so the OS reports the spawn error
    pub fn command_for(&self, tool_name: &str) -> PathBuf {
        self.resolve_tool(tool_name)
            .unwrap_or_else(|| PathBuf::from(Self::executable_name(tool_name)))
    }

    fn executable_name(tool_name: &str) -> String {
        if cfg!(windows) {
            format!("{}.exe", tool_name)
        } else {
            tool_name.to_string()
        }
    }

    /// Find tool in system PATH
    fn find_in_system_path(&self, tool_name: &str) -> Option<PathBuf> {
        let executable = Self::executable_name(tool_name);
        let path_var = env::var_os("PATH")?;
        env::split_paths(&path_var)
            .map(|dir| dir.join(&executable))
            .find(|path| path.is_file())
    }

    /// Check if a tool is available and provide installation instructions if not
    pub fn check_tool_with_instructions(&self, tool_name: &str) -> Result<PathBuf, VideoToolsError> {
        self.resolve_tool(tool_name)
            .ok_or_else(|| missing_dependency(tool_name))
    }

    /// Get a report of tool availability
    pub fn tools_report(&self) -> String {
        let mut report = String::from("Tool availability:\n");
        if let Some(ref dir) = self.tools_dir {
            report.push_str(&format!("Bundled tools dir: {}\n", dir.display()));
        }
        for tool in REQUIRED_TOOLS {
            match self.check_tool_with_instructions(tool) {
                Ok(path) => report.push_str(&format!("  ✅ {} -> {}\n", tool, path.display())),
                Err(err) => report.push_str(&format!("  ❌ {}\n", err)),
            }
        }
        report
    }
}

impl Default for ToolPathResolver {
    fn default() -> Self {
        Self::new()
    }
}

/// `MissingDependency` error carrying install instructions for `tool_name`
pub fn missing_dependency(tool_name: &str) -> VideoToolsError {
    VideoToolsError::MissingDependency(format!(
        "'{}' not found in PATH (install with: {})",
        tool_name,
        install_instructions(tool_name)
    ))
}

fn install_instructions(tool_name: &str) -> &'static str {
    match tool_name {
        "ffmpeg" | "ffprobe" if cfg!(target_os = "macos") => "brew install ffmpeg",
        "ffmpeg" | "ffprobe" if cfg!(windows) => "winget install ffmpeg",
        "ffmpeg" | "ffprobe" => "sudo apt-get install ffmpeg",
        _ => "your package manager",
    }
}

/// True if `path` looks like it came from [`ToolPathResolver::command_for`]'s fallback
pub fn is_bare_name(path: &Path) -> bool {
    path.parent().map_or(true, |p| p.as_os_str().is_empty())
}
