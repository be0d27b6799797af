//! Configuration loading from memlens.toml
//!
//! Memlens configuration can be specified in a `memlens.toml` file in the project root.
//! The configuration is automatically discovered by walking up from the current directory.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Memlens configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct MemlensConfig {
    /// Compiler configuration
    #[serde(default)]
    pub toolchain: ToolchainConfig,
    /// Timed execution configuration
    #[serde(default)]
    pub execution: ExecutionConfig,
    /// Instrumentation tool configuration
    #[serde(default)]
    pub instrumentation: InstrumentationConfig,
    /// Comparison configuration
    #[serde(default)]
    pub compare: CompareConfig,
    /// Output configuration
    #[serde(default)]
    pub output: OutputConfig,
    /// CI/CD configuration
    #[serde(default)]
    pub ci: CiConfig,
}

/// Compiler used by the build stage
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolchainConfig {
    /// Compiler program
    #[serde(default = "default_compiler")]
    pub compiler: String,
    /// Arguments inserted before `-g <source> -o <output>`
    #[serde(default)]
    pub extra_args: Vec<String>,
    /// Compile timeout (e.g., "60s")
    #[serde(default = "default_compile_timeout")]
    pub timeout: String,
}

impl Default for ToolchainConfig {
    fn default() -> Self {
        Self {
            compiler: default_compiler(),
            extra_args: Vec::new(),
            timeout: default_compile_timeout(),
        }
    }
}

fn default_compiler() -> String {
    "gcc".to_string()
}
fn default_compile_timeout() -> String {
    "60s".to_string()
}

/// Timed run of the compiled program
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionConfig {
    /// Timeout for one run of the program (e.g., "30s")
    #[serde(default = "default_execution_timeout")]
    pub timeout: String,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            timeout: default_execution_timeout(),
        }
    }
}

fn default_execution_timeout() -> String {
    "30s".to_string()
}

/// Instrumentation tool used for the diagnostic run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstrumentationConfig {
    /// Tool program
    #[serde(default = "default_tool")]
    pub tool: String,
    /// Arguments inserted before `--leak-check=full <program>`
    #[serde(default)]
    pub extra_args: Vec<String>,
    /// Instrumented run timeout (e.g., "120s")
    #[serde(default = "default_instrumentation_timeout")]
    pub timeout: String,
}

impl Default for InstrumentationConfig {
    fn default() -> Self {
        Self {
            tool: default_tool(),
            extra_args: Vec::new(),
            timeout: default_instrumentation_timeout(),
        }
    }
}

fn default_tool() -> String {
    "valgrind".to_string()
}
fn default_instrumentation_timeout() -> String {
    "120s".to_string()
}

/// Comparison configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompareConfig {
    /// Run the older and newer pipelines concurrently
    #[serde(default = "default_parallel")]
    pub parallel: bool,
}

impl Default for CompareConfig {
    fn default() -> Self {
        Self {
            parallel: default_parallel(),
        }
    }
}

fn default_parallel() -> bool {
    true
}

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Default output format: "human" or "json"
    #[serde(default = "default_format")]
    pub format: String,
    /// Directory under which per-request workspaces are created (system temp dir if unset)
    #[serde(default)]
    pub work_dir: Option<PathBuf>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: default_format(),
            work_dir: None,
        }
    }
}

fn default_format() -> String {
    "human".to_string()
}

/// CI/CD configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CiConfig {
    /// Exit 1 when an analysis reports any error
    #[serde(default)]
    pub fail_on_errors: bool,
    /// Exit 1 when a comparison reports new errors
    #[serde(default = "default_fail_on_new_errors")]
    pub fail_on_new_errors: bool,
}

impl Default for CiConfig {
    fn default() -> Self {
        Self {
            fail_on_errors: false,
            fail_on_new_errors: default_fail_on_new_errors(),
        }
    }
}

fn default_fail_on_new_errors() -> bool {
    true
}

impl MemlensConfig {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Try to discover and load configuration by walking up from current directory
    pub fn discover() -> Option<Self> {
        let mut dir = std::env::current_dir().ok()?;
        loop {
            let config_path = dir.join("memlens.toml");
            if config_path.exists() {
                return Self::load(&config_path).ok();
            }
            if !dir.pop() {
                break;
            }
        }
        None
    }

    /// Generate a default configuration as TOML string
    pub fn default_toml() -> String {
        r#"# Memlens Configuration

[toolchain]
# Compiler invoked as: <compiler> [extra_args] -g <source> -o <output>
compiler = "gcc"
extra_args = []
# Compile timeout
timeout = "60s"

[execution]
# Timeout for the timed run of the compiled program
timeout = "30s"

[instrumentation]
# Tool invoked as: <tool> [extra_args] --leak-check=full <program>
tool = "valgrind"
extra_args = []
# Timeout for the instrumented run
timeout = "120s"

[compare]
# Analyze both sources concurrently
parallel = true

[output]
# Default output format: human, json
format = "human"
# Parent directory for per-request workspaces (uncomment to enable)
# work_dir = "target/memlens"

[ci]
# Fail when an analysis reports any error
fail_on_errors = false
# Fail when a comparison reports errors absent from the older source
fail_on_new_errors = true
"#
        .to_string()
    }

    /// Parse duration string (e.g., "3s", "500ms", "2m") to nanoseconds
    pub fn parse_duration(s: &str) -> anyhow::Result<u64> {
        let s = s.trim();
        if s.is_empty() {
            return Err(anyhow::anyhow!("Empty duration string"));
        }

        let (num_part, unit_part) = s
            .char_indices()
            .find(|(_, c)| c.is_alphabetic())
            .map(|(i, _)| s.split_at(i))
            .unwrap_or((s, "s"));

        let value: f64 = num_part
            .trim()
            .parse()
            .map_err(|_| anyhow::anyhow!("Invalid duration number: {}", num_part))?;
        if value < 0.0 {
            return Err(anyhow::anyhow!("Negative duration: {}", s));
        }

        let multiplier: u64 = match unit_part.to_lowercase().as_str() {
            "ns" => 1,
            "us" | "µs" => 1_000,
            "ms" => 1_000_000,
            "s" | "" => 1_000_000_000,
            "m" | "min" => 60_000_000_000,
            _ => return Err(anyhow::anyhow!("Unknown duration unit: {}", unit_part)),
        };

        Ok((value * multiplier as f64) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = MemlensConfig::default();
        assert_eq!(config.toolchain.compiler, "gcc");
        assert_eq!(config.instrumentation.tool, "valgrind");
        assert_eq!(config.execution.timeout, "30s");
        assert!(config.compare.parallel);
        assert!(!config.ci.fail_on_errors);
        assert!(config.ci.fail_on_new_errors);
    }

    #[test]
    fn test_parse_duration() {
        assert_eq!(MemlensConfig::parse_duration("3s").unwrap(), 3_000_000_000);
        assert_eq!(MemlensConfig::parse_duration("500ms").unwrap(), 500_000_000);
        assert_eq!(MemlensConfig::parse_duration("100us").unwrap(), 100_000);
        assert_eq!(MemlensConfig::parse_duration("1000ns").unwrap(), 1000);
        assert_eq!(MemlensConfig::parse_duration("2m").unwrap(), 120_000_000_000);
        assert_eq!(MemlensConfig::parse_duration("2min").unwrap(), 120_000_000_000);
        assert_eq!(MemlensConfig::parse_duration("1.5s").unwrap(), 1_500_000_000);
        assert_eq!(MemlensConfig::parse_duration("7").unwrap(), 7_000_000_000);
        assert!(MemlensConfig::parse_duration("").is_err());
        assert!(MemlensConfig::parse_duration("5h").is_err());
        assert!(MemlensConfig::parse_duration("-1s").is_err());
    }

    #[test]
    fn test_parse_toml() {
        let toml_str = r#"
            [toolchain]
            compiler = "clang"
            extra_args = ["-O0"]

            [instrumentation]
            timeout = "5m"
        "#;

        let config: MemlensConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.toolchain.compiler, "clang");
        assert_eq!(config.toolchain.extra_args, vec!["-O0"]);
        assert_eq!(config.instrumentation.timeout, "5m");
        // Defaults should still apply
        assert_eq!(config.instrumentation.tool, "valgrind");
        assert_eq!(config.output.format, "human");
        assert_eq!(config.output.work_dir, None);
    }

    #[test]
    fn test_default_toml_parses() {
        let default_toml = MemlensConfig::default_toml();
        let config: MemlensConfig = toml::from_str(&default_toml).unwrap();
        assert_eq!(config.toolchain.timeout, "60s");
        assert_eq!(config.instrumentation.timeout, "120s");
        assert!(config.ci.fail_on_new_errors);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("memlens.toml");
        std::fs::write(&path, "[ci]\nfail_on_errors = true\n").unwrap();

        let config = MemlensConfig::load(&path).unwrap();
        assert!(config.ci.fail_on_errors);
        assert!(MemlensConfig::load(dir.path().join("missing.toml")).is_err());
    }
}
