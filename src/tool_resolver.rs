//! # Tool Path Resolver
//!
//! Finds the external WebP encoders (`cwebp`, `gif2webp`):
//! - in the directory named by `IMGBATCH_TOOLS_DIR`, when set
//! - otherwise on the system `PATH`

use std::env;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Environment variable pointing at a directory of bundled tools
pub const TOOLS_DIR_ENV: &str = "IMGBATCH_TOOLS_DIR";

/// Tool path resolver
#[derive(Debug, Clone, Default)]
pub struct ToolPathResolver {
    /// Directory checked before `PATH`
    tools_dir: Option<PathBuf>,
}

impl ToolPathResolver {
    /// Create a resolver honouring `IMGBATCH_TOOLS_DIR`
    pub fn new() -> Self {
        let tools_dir = env::var_os(TOOLS_DIR_ENV)
            .map(PathBuf::from)
            .filter(|dir| {
                let exists = dir.is_dir();
                if !exists {
                    warn!("{} points to a missing directory: {:?}", TOOLS_DIR_ENV, dir);
                }
                exists
            });
        Self { tools_dir }
    }

    /// Create a resolver with an explicit tools directory
    pub fn with_tools_dir(tools_dir: impl Into<PathBuf>) -> Self {
        Self {
            tools_dir: Some(tools_dir.into()),
        }
    }

    /// Resolve the path to a specific tool
    pub fn resolve_tool(&self, tool_name: &str) -> Option<PathBuf> {
        if let Some(ref tools_dir) = self.tools_dir {
            let bundled = tools_dir.join(executable_name(tool_name));
            if bundled.is_file() {
                debug!("Using bundled tool: {} -> {:?}", tool_name, bundled);
                return Some(bundled);
            }
        }

        let found = self.find_in_system_path(tool_name);
        match found {
            Some(ref path) => debug!("Using system tool: {} -> {:?}", tool_name, path),
            None => debug!("Tool not found: {}", tool_name),
        }
        found
    }

    /// Find tool in system PATH
    fn find_in_system_path(&self, tool_name: &str) -> Option<PathBuf> {
        let tool_with_ext = executable_name(tool_name);
        env::split_paths(&env::var_os("PATH")?)
            .map(|dir| dir.join(&tool_with_ext))
            .find(|path| path.is_file())
    }

    /// Check if a specific tool is available
    pub fn is_tool_available(&self, tool_name: &str) -> bool {
        self.resolve_tool(tool_name).is_some()
    }

    /// Check if a tool is available and provide installation instructions if not
    pub fn check_tool_with_instructions(&self, tool_name: &str) -> Result<PathBuf, String> {
        self.resolve_tool(tool_name).ok_or_else(|| {
            format!(
                "Tool '{}' not found in {} or PATH. To install, run:\n  {}",
                tool_name,
                TOOLS_DIR_ENV,
                install_instructions(tool_name)
            )
        })
    }
}

fn executable_name(tool_name: &str) -> String {
    if cfg!(windows) && Path::new(tool_name).extension().is_none() {
        format!("{}.exe", tool_name)
    } else {
        tool_name.to_string()
    }
}

/// Get installation instructions for a tool
fn install_instructions(tool_name: &str) -> String {
    match tool_name {
        "cwebp" | "gif2webp" | "dwebp" => {
            if cfg!(target_os = "macos") {
                "brew install webp".to_string()
            } else {
                "sudo apt-get install webp".to_string()
            }
        }
        _ => format!("sudo apt-get install {}", tool_name),
    }
}
