//! Secret reference resolver.
//!
//! Account values in `config.toml` (tokens, passwords) can use special
//! prefixes to reference secrets stored outside the file:
//!
//! - `pass::path/in/store`: runs `pass show path/in/store`, returns first line
//! - `env::VAR_NAME`: reads `$VAR_NAME` from the environment
//! - anything else: returned as-is (plain text)

/// A config value, split by its prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecretRef<'a> {
    /// `pass::path`
    Pass(&'a str),
    /// `env::VAR`
    Env(&'a str),
    /// The value itself.
    Plain(&'a str),
}

impl<'a> SecretRef<'a> {
    pub fn parse(value: &'a str) -> Self {
        if let Some(path) = value.strip_prefix("pass::") {
            Self::Pass(path)
        } else if let Some(var) = value.strip_prefix("env::") {
            Self::Env(var)
        } else {
            Self::Plain(value)
        }
    }

    /// True when the secret lives outside the config file.
    pub fn is_reference(&self) -> bool {
        !matches!(self, Self::Plain(_))
    }

    pub fn resolve(&self) -> Result<String, String> {
        match *self {
            Self::Pass(path) => resolve_pass(path),
            Self::Env(var) => resolve_env(var),
            Self::Plain(value) => Ok(value.to_string()),
        }
    }
}

/// Resolves a value that may contain a secret reference prefix.
pub fn resolve(value: &str) -> Result<String, String> {
    SecretRef::parse(value).resolve()
}

/// Hides a plain-text secret for display; references are shown as written.
pub fn redact(value: &str) -> String {
    match SecretRef::parse(value) {
        SecretRef::Plain("") => String::new(),
        SecretRef::Plain(_) => "***".to_string(),
        _ => value.to_string(),
    }
}

/// Runs `pass show <path>` and returns the first line of stdout.
fn resolve_pass(path: &str) -> Result<String, String> {
    let output = std::process::Command::new("pass")
        .arg("show")
        .arg(path)
        .output()
        .map_err(|e| format!("failed to run `pass show {}`: {}", path, e))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(format!(
            "`pass show {}` failed (exit {}): {}",
            path,
            output.status,
            stderr.trim()
        ));
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    stdout
        .lines()
        .next()
        .map(|s| s.to_string())
        .ok_or_else(|| format!("`pass show {}` produced no output", path))
}

/// Reads an environment variable.
fn resolve_env(var: &str) -> Result<String, String> {
    std::env::var(var).map_err(|_| format!("environment variable `{}` is not set", var))
}
