use std::{env, iter::Peekable, path::PathBuf, str::Chars};

use crate::error::{PathError, PathResult};

/// Returns the user's home directory.
///
/// Reads `HOME`, falling back to the filesystem root when it is unset.
pub fn home_dir() -> PathBuf {
    env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("/"))
}

/// Returns the user's config directory following the XDG Base Directory Specification.
///
/// This checks the `XDG_CONFIG_HOME` environment variable and defaults to `$HOME/.config`.
///
/// # Example
///
/// ```
/// use vitrine_utils::path::xdg_config_home;
///
/// let config = xdg_config_home();
/// println!("Config dir is {:#?}", config);
/// ```
pub fn xdg_config_home() -> PathBuf {
    env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".config"))
}

/// Resolves a path string that may contain environment variables.
///
/// Expands `$VAR` and `${VAR}`, resolves a leading `~` to the home directory, and
/// converts relative paths to absolute ones based on the current working directory.
///
/// # Errors
///
/// * [`PathError::Empty`] if the path is empty
/// * [`PathError::CurrentDir`] if the current directory cannot be determined
/// * [`PathError::MissingEnvVar`] if a referenced variable is undefined
/// * [`PathError::UnclosedVariable`] if a `${` is never closed
pub fn resolve_path(path: &str) -> PathResult<PathBuf> {
    let path = path.trim();

    if path.is_empty() {
        return Err(PathError::Empty);
    }

    let path_buf = PathBuf::from(expand_variables(path)?);

    if path_buf.is_absolute() {
        Ok(path_buf)
    } else {
        env::current_dir()
            .map(|cwd| cwd.join(path_buf))
            .map_err(|err| PathError::CurrentDir { source: err })
    }
}

fn expand_variables(path: &str) -> PathResult<String> {
    let mut result = String::with_capacity(path.len());
    let mut chars = path.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '$' => {
                if chars.peek() == Some(&'{') {
                    chars.next();
                    let var_name = consume_until(&mut chars, '}')?;
                    expand_env_var(&var_name, &mut result, path)?;
                } else {
                    let var_name = consume_var_name(&mut chars);
                    if var_name.is_empty() {
                        result.push('$');
                    } else {
                        expand_env_var(&var_name, &mut result, path)?;
                    }
                }
            }
            '~' if result.is_empty() => result.push_str(&home_dir().to_string_lossy()),
            _ => result.push(c),
        }
    }

    Ok(result)
}

fn consume_until(chars: &mut Peekable<Chars>, delimiter: char) -> PathResult<String> {
    let mut var_name = String::new();

    for c in chars.by_ref() {
        if c == delimiter {
            return Ok(var_name);
        }
        var_name.push(c);
    }

    Err(PathError::UnclosedVariable {
        input: format!("${{{var_name}"),
    })
}

fn consume_var_name(chars: &mut Peekable<Chars>) -> String {
    let mut var_name = String::new();

    while let Some(c) = chars.next_if(|c| c.is_alphanumeric() || *c == '_') {
        var_name.push(c);
    }

    var_name
}

fn expand_env_var(var_name: &str, result: &mut String, original: &str) -> PathResult<()> {
    match var_name {
        "HOME" => result.push_str(&home_dir().to_string_lossy()),
        "XDG_CONFIG_HOME" => result.push_str(&xdg_config_home().to_string_lossy()),
        _ => {
            let value = env::var(var_name).map_err(|_| {
                PathError::MissingEnvVar {
                    var: var_name.to_string(),
                    input: original.to_string(),
                }
            })?;
            result.push_str(&value);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use serial_test::serial;

    use super::*;

    #[test]
    fn test_resolve_path_absolute() {
        assert_eq!(
            resolve_path("/etc/vitrine/config.toml").unwrap(),
            PathBuf::from("/etc/vitrine/config.toml")
        );
    }

    #[test]
    fn test_resolve_path_empty() {
        assert!(matches!(resolve_path("   "), Err(PathError::Empty)));
    }

    #[test]
    fn test_resolve_path_relative_is_made_absolute() {
        let resolved = resolve_path("config.toml").unwrap();
        assert!(resolved.is_absolute());
        assert!(resolved.ends_with("config.toml"));
    }

    #[test]
    #[serial]
    fn test_resolve_path_env_vars() {
        env::set_var("VITRINE_TEST_DIR", "/srv/vitrine");
        assert_eq!(
            resolve_path("$VITRINE_TEST_DIR/a").unwrap(),
            PathBuf::from("/srv/vitrine/a")
        );
        assert_eq!(
            resolve_path("${VITRINE_TEST_DIR}/b").unwrap(),
            PathBuf::from("/srv/vitrine/b")
        );
        env::remove_var("VITRINE_TEST_DIR");
    }

    #[test]
    #[serial]
    fn test_resolve_path_missing_var() {
        env::remove_var("VITRINE_SURELY_UNSET");
        assert!(matches!(
            resolve_path("$VITRINE_SURELY_UNSET/x"),
            Err(PathError::MissingEnvVar { .. })
        ));
    }

    #[test]
    fn test_resolve_path_unclosed_variable() {
        assert!(matches!(
            resolve_path("${HOME/x"),
            Err(PathError::UnclosedVariable { .. })
        ));
    }

    #[test]
    #[serial]
    fn test_xdg_config_home_override() {
        let old = env::var("XDG_CONFIG_HOME").ok();
        env::set_var("XDG_CONFIG_HOME", "/tmp/xdg-config");
        assert_eq!(xdg_config_home(), PathBuf::from("/tmp/xdg-config"));
        match old {
            Some(v) => env::set_var("XDG_CONFIG_HOME", v),
            None => env::remove_var("XDG_CONFIG_HOME"),
        }
    }
}
