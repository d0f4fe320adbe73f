//! Command templates with desktop-entry style field codes
//!
//! A template such as `xdg-open %f` is tokenised once, without a shell, and
//! expanded into an argument vector per launch.

use super::LaunchError;
use std::ffi::{OsStr, OsString};

/// One argument of a parsed template
#[derive(Debug, Clone, PartialEq, Eq)]
struct Arg {
    text: String,
    /// Quoted arguments are passed through verbatim, field codes included
    quoted: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandTemplate {
    source: String,
    args: Vec<Arg>,
}

impl CommandTemplate {
    /// Tokenise `command`
    ///
    /// Arguments are separated by unquoted whitespace. Double quotes group, and
    /// inside them a backslash escapes `"`, `` ` ``, `$` and `\`.
    pub fn parse(command: &str) -> Result<Self, LaunchError> {
        let mut args = Vec::new();
        let mut current = String::new();
        let mut in_token = false;
        let mut quoted = false;
        let mut in_quotes = false;
        let mut chars = command.chars().peekable();

        while let Some(c) = chars.next() {
            if in_quotes {
                match c {
                    '"' => in_quotes = false,
                    '\\' => match chars.peek() {
                        Some(&next) if matches!(next, '"' | '`' | '$' | '\\') => {
                            current.push(next);
                            chars.next();
                        }
                        _ => current.push('\\'),
                    },
                    _ => current.push(c),
                }
                continue;
            }

            match c {
                '"' => {
                    in_quotes = true;
                    in_token = true;
                    quoted = true;
                }
                c if c.is_whitespace() => {
                    if in_token {
                        args.push(Arg {
                            text: std::mem::take(&mut current),
                            quoted,
                        });
                        in_token = false;
                        quoted = false;
                    }
                }
                _ => {
                    current.push(c);
                    in_token = true;
                }
            }
        }

        if in_quotes {
            return Err(LaunchError::UnterminatedQuote {
                command: command.to_string(),
            });
        }
        if in_token {
            args.push(Arg {
                text: current,
                quoted,
            });
        }
        if args.is_empty() {
            return Err(LaunchError::EmptyCommand);
        }

        Ok(Self {
            source: command.to_string(),
            args,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Whether the template has an unquoted `%f`, `%F`, `%u` or `%U`
    pub fn takes_target(&self) -> bool {
        self.args.iter().filter(|arg| !arg.quoted).any(|arg| {
            let mut chars = arg.text.chars();
            while let Some(c) = chars.next() {
                if c == '%' {
                    match chars.next() {
                        Some('f' | 'F' | 'u' | 'U') => return true,
                        _ => continue,
                    }
                }
            }
            false
        })
    }

    /// Expand into an argument vector
    ///
    /// The target replaces the first file/url code; later ones are removed, as
    /// are deprecated and icon/name codes. `%%` becomes `%`. An argument that
    /// consisted only of removed codes is dropped. When the template has no
    /// file/url code the target is appended.
    pub fn argv(&self, target: Option<&OsStr>) -> Vec<OsString> {
        let mut argv = Vec::with_capacity(self.args.len() + 1);
        let mut pending = target;

        for arg in &self.args {
            if arg.quoted {
                argv.push(OsString::from(&arg.text));
                continue;
            }
            if let Some(expanded) = expand(&arg.text, &mut pending) {
                argv.push(expanded);
            }
        }

        if let Some(target) = pending.filter(|_| !self.takes_target()) {
            argv.push(target.to_os_string());
        }

        argv
    }
}

impl std::fmt::Display for CommandTemplate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.source)
    }
}

/// Expand field codes in one unquoted argument; `None` drops the argument
fn expand(text: &str, target: &mut Option<&OsStr>) -> Option<OsString> {
    let mut out = OsString::new();
    let mut had_code = false;
    let mut chars = text.chars();

    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c.encode_utf8(&mut [0; 4]));
            continue;
        }
        match chars.next() {
            Some('%') => out.push("%"),
            Some('f' | 'F' | 'u' | 'U') => {
                had_code = true;
                if let Some(path) = target.take() {
                    out.push(path);
                }
            }
            Some('d' | 'D' | 'n' | 'N' | 'v' | 'm' | 'i' | 'c' | 'k') => had_code = true,
            Some(other) => {
                out.push("%");
                out.push(other.encode_utf8(&mut [0; 4]));
            }
            None => out.push("%"),
        }
    }

    if had_code && out.is_empty() {
        None
    } else {
        Some(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(template: &str, target: Option<&str>) -> Vec<String> {
        CommandTemplate::parse(template)
            .unwrap()
            .argv(target.map(OsStr::new))
            .into_iter()
            .map(|arg| arg.into_string().unwrap())
            .collect()
    }

    #[test]
    fn test_target_replaces_file_code() {
        assert_eq!(
            argv("xdg-open %f", Some("/tmp/a b.txt")),
            vec!["xdg-open", "/tmp/a b.txt"]
        );
        assert_eq!(
            argv("editor --file=%U", Some("/x")),
            vec!["editor", "--file=/x"]
        );
    }

    #[test]
    fn test_only_first_file_code_gets_target() {
        assert_eq!(argv("cmp %f %f", Some("/x")), vec!["cmp", "/x"]);
    }

    #[test]
    fn test_codes_removed_without_target() {
        assert_eq!(argv("gimp %U", None), vec!["gimp"]);
        assert_eq!(
            argv("app --name %c %i %k %d %D %n %N %v %m -x", None),
            vec!["app", "--name", "-x"]
        );
    }

    #[test]
    fn test_percent_escape() {
        assert_eq!(argv("printf 100%% %f", Some("/x")), vec!["printf", "100%", "/x"]);
    }

    #[test]
    fn test_unknown_code_kept() {
        assert_eq!(argv("tool %z 50%", None), vec!["tool", "%z", "50%"]);
    }

    #[test]
    fn test_quoted_arguments_are_verbatim() {
        assert_eq!(
            argv(r#"sh -c "echo %f \"done\" \$HOME" %f"#, Some("/x")),
            vec!["sh", "-c", r#"echo %f "done" $HOME"#, "/x"]
        );
    }

    #[test]
    fn test_target_appended_when_template_has_no_code() {
        assert_eq!(argv("code --reuse-window", Some("/x")), vec!["code", "--reuse-window", "/x"]);
        assert_eq!(argv(r#"sh -c "cat %f""#, Some("/x")), vec!["sh", "-c", "cat %f", "/x"]);
    }

    #[test]
    fn test_whitespace_and_empty_quotes() {
        assert_eq!(argv("  a\t b  \"\" ", None), vec!["a", "b", ""]);
        assert_eq!(argv(r#"a"b c"d"#, None), vec!["ab cd"]);
    }

    #[test]
    fn test_unterminated_quote() {
        assert!(matches!(
            CommandTemplate::parse(r#"open "unterminated"#),
            Err(LaunchError::UnterminatedQuote { .. })
        ));
    }

    #[test]
    fn test_empty_command() {
        assert!(matches!(CommandTemplate::parse("   "), Err(LaunchError::EmptyCommand)));
    }
}
