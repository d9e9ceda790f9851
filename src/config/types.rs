use std::path::Path;

use serde::{Deserialize, Serialize};

/// One declared check: a program, its arguments, and an optional display name.
///
/// In YAML a check may be written as a command line (`"mypy {src}"`), as an
/// argument list (`["mypy", "{src}"]`), or as a map with `name` and `run`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawCheck", into = "RawCheck")]
pub struct CheckSpec {
    pub name: Option<String>,
    pub program: String,
    pub args: Vec<String>,
}

impl CheckSpec {
    /// Build a check from a shell-style command line.
    pub fn parse(line: &str) -> Result<Self, String> {
        let argv = shell_words::split(line).map_err(|e| format!("invalid command `{line}`: {e}"))?;
        Self::from_argv(None, argv)
    }

    pub fn named(name: &str, line: &str) -> Result<Self, String> {
        let mut check = Self::parse(line)?;
        check.name = Some(name.to_string());
        Ok(check)
    }

    fn from_argv(name: Option<String>, argv: Vec<String>) -> Result<Self, String> {
        let mut argv = argv.into_iter();
        let program = match argv.next() {
            Some(p) if !p.trim().is_empty() => p,
            _ => return Err("check command is empty".to_string()),
        };
        Ok(Self {
            name,
            program,
            args: argv.collect(),
        })
    }

    /// Name used in logs and failure messages: the explicit name, or the
    /// program's file name.
    pub fn display_name(&self) -> String {
        if let Some(name) = &self.name {
            return name.clone();
        }
        Path::new(&self.program)
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| self.program.clone())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum RawCommand {
    Line(String),
    Argv(Vec<String>),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum RawCheck {
    Command(RawCommand),
    Named {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
        run: RawCommand,
    },
}

impl TryFrom<RawCheck> for CheckSpec {
    type Error = String;

    fn try_from(raw: RawCheck) -> Result<Self, Self::Error> {
        let (name, command) = match raw {
            RawCheck::Command(command) => (None, command),
            RawCheck::Named { name, run } => (name, run),
        };
        match command {
            RawCommand::Line(line) => {
                let mut check = CheckSpec::parse(&line)?;
                check.name = name;
                Ok(check)
            }
            RawCommand::Argv(argv) => CheckSpec::from_argv(name, argv),
        }
    }
}

impl From<CheckSpec> for RawCheck {
    fn from(check: CheckSpec) -> Self {
        let mut argv = Vec::with_capacity(check.args.len() + 1);
        argv.push(check.program);
        argv.extend(check.args);
        RawCheck::Named {
            name: check.name,
            run: RawCommand::Argv(argv),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Source directory, substituted for `{src}`.
    pub src_dir: String,
    /// Tests directory, substituted for `{tests}`.
    pub tests_dir: String,
    pub verbose: bool,
    /// Per-check timeout in seconds. Unbounded when absent.
    pub timeout: Option<u64>,
    pub checks: Vec<CheckSpec>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            src_dir: "src".to_string(),
            tests_dir: "tests".to_string(),
            verbose: false,
            timeout: None,
            checks: default_checks(),
        }
    }
}

/// Dependency consistency, type check, lint, format check, dependency audit,
/// security scan.
pub fn default_checks() -> Vec<CheckSpec> {
    const DEFAULTS: [(&str, &[&str]); 6] = [
        ("poetry", &["poetry", "check"]),
        ("mypy", &["poetry", "run", "mypy", "--ignore-missing-imports", "{src}"]),
        ("flake8", &["poetry", "run", "flake8", "{src}", "{tests}"]),
        ("black", &["poetry", "run", "black", "--check", "{src}", "{tests}"]),
        ("safety", &["poetry", "run", "safety", "check"]),
        ("bandit", &["poetry", "run", "bandit", "-r", "{src}"]),
    ];

    DEFAULTS
        .iter()
        .map(|(name, argv)| CheckSpec {
            name: Some(name.to_string()),
            program: argv[0].to_string(),
            args: argv[1..].iter().map(|a| a.to_string()).collect(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_checks_keep_declared_order() {
        let names: Vec<_> = default_checks().iter().map(|c| c.display_name()).collect();
        assert_eq!(
            names,
            ["poetry", "mypy", "flake8", "black", "safety", "bandit"]
        );
    }

    #[test]
    fn default_checks_run_through_poetry() {
        let checks = default_checks();
        assert_eq!(checks.len(), 6);
        assert!(checks.iter().all(|c| c.program == "poetry"));
        assert_eq!(checks[0].args, vec!["check"]);
        assert_eq!(checks[5].args, vec!["run", "bandit", "-r", "{src}"]);
    }

    #[test]
    fn parse_splits_quoted_arguments() {
        let check = CheckSpec::parse("sh -c 'exit 3'").unwrap();
        assert_eq!(check.program, "sh");
        assert_eq!(check.args, vec!["-c", "exit 3"]);
        assert_eq!(check.name, None);
    }

    #[test]
    fn parse_rejects_empty_and_unbalanced_lines() {
        assert!(CheckSpec::parse("").is_err());
        assert!(CheckSpec::parse("   ").is_err());
        assert!(CheckSpec::parse("echo 'oops").is_err());
    }

    #[test]
    fn display_name_falls_back_to_program_file_name() {
        let check = CheckSpec::parse("/usr/bin/mypy src").unwrap();
        assert_eq!(check.display_name(), "mypy");
    }

    #[test]
    fn deserializes_all_entry_forms() {
        let yaml = r#"
checks:
  - "mypy --strict {src}"
  - ["black", "--check", "{src}"]
  - name: audit
    run: safety check
  - name: scan
    run: ["bandit", "-r", "{src}"]
"#;
        let cfg: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(cfg.checks.len(), 4);
        assert_eq!(cfg.checks[0].program, "mypy");
        assert_eq!(cfg.checks[0].args, vec!["--strict", "{src}"]);
        assert_eq!(cfg.checks[1].args, vec!["--check", "{src}"]);
        assert_eq!(cfg.checks[2].display_name(), "audit");
        assert_eq!(cfg.checks[2].program, "safety");
        assert_eq!(cfg.checks[3].display_name(), "scan");
        assert_eq!(cfg.src_dir, "src");
    }

    #[test]
    fn missing_checks_key_uses_defaults() {
        let cfg: Config = serde_yaml::from_str("src_dir: portray\n").unwrap();
        assert_eq!(cfg.src_dir, "portray");
        assert_eq!(cfg.checks, default_checks());
    }

    #[test]
    fn explicit_empty_check_list_is_kept() {
        let cfg: Config = serde_yaml::from_str("checks: []\n").unwrap();
        assert!(cfg.checks.is_empty());
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(serde_yaml::from_str::<Config>("jobs: 4\n").is_err());
    }

    #[test]
    fn empty_check_entry_is_rejected() {
        assert!(serde_yaml::from_str::<Config>("checks: [\"\"]\n").is_err());
        assert!(serde_yaml::from_str::<Config>("checks: [[]]\n").is_err());
    }

    #[test]
    fn serialized_config_reads_back() {
        let cfg = Config::default();
        let yaml = serde_yaml::to_string(&cfg).unwrap();
        let back: Config = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(back.checks, cfg.checks);
    }
}
