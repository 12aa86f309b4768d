//! Two-tier program detection: optional launcher peeling followed by
//! built-in / user-declared program matching.

use prompt_text::Token;
use regex::RegexBuilder;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MatchKind {
    Exact,
    Prefix,
    Suffix,
}

/// Built-in table of known compiler caches / wrappers and the subset of
/// their flags that consume a separate following argument.
const BUILTIN_LAUNCHERS: &[(&str, &[&str])] = &[
    ("ccache", &[]),
    ("distcc", &[]),
    ("sccache", &[]),
    ("icecc", &[]),
    ("colorgcc", &[]),
    (
        "scan-build",
        &["-o", "--use-analyzer", "-enable-checker", "-disable-checker"],
    ),
    ("bear", &["-o", "--output", "-a", "--append"]),
    ("time", &["-f", "-o", "--format", "--output"]),
    ("env", &[]),
    ("nice", &["-n", "--adjustment"]),
    ("ionice", &["-c", "-n", "-p"]),
];

/// Built-in canonical-program match patterns, checked in declaration order.
const BUILTIN_PROGRAMS: &[(&str, &[(MatchKind, &str)])] = &[
    (
        "gcc",
        &[
            (MatchKind::Suffix, "-gcc"),
            (MatchKind::Suffix, "-g++"),
            (MatchKind::Exact, "gcc"),
            (MatchKind::Exact, "g++"),
            (MatchKind::Exact, "cc"),
            (MatchKind::Exact, "c++"),
            (MatchKind::Prefix, "gcc-"),
            (MatchKind::Prefix, "g++-"),
        ],
    ),
    (
        "clang",
        &[
            (MatchKind::Suffix, "-clang"),
            (MatchKind::Suffix, "-clang++"),
            (MatchKind::Exact, "clang"),
            (MatchKind::Exact, "clang++"),
            (MatchKind::Prefix, "clang-"),
            (MatchKind::Prefix, "clang++-"),
        ],
    ),
    ("rustc", &[(MatchKind::Exact, "rustc")]),
    ("cargo", &[(MatchKind::Exact, "cargo")]),
    ("go", &[(MatchKind::Exact, "go")]),
    (
        "python",
        &[
            (MatchKind::Exact, "python"),
            (MatchKind::Exact, "python3"),
            (MatchKind::Prefix, "python3."),
            (MatchKind::Exact, "python2"),
        ],
    ),
    (
        "make",
        &[
            (MatchKind::Exact, "make"),
            (MatchKind::Exact, "gmake"),
            (MatchKind::Exact, "bmake"),
        ],
    ),
    ("cmake", &[(MatchKind::Exact, "cmake")]),
    ("ninja", &[(MatchKind::Exact, "ninja")]),
    (
        "ld",
        &[
            (MatchKind::Suffix, "-ld"),
            (MatchKind::Exact, "ld"),
            (MatchKind::Exact, "ld.lld"),
            (MatchKind::Exact, "ld.gold"),
            (MatchKind::Exact, "ld.bfd"),
        ],
    ),
    (
        "ar",
        &[
            (MatchKind::Suffix, "-ar"),
            (MatchKind::Exact, "ar"),
            (MatchKind::Exact, "llvm-ar"),
        ],
    ),
    ("as", &[(MatchKind::Suffix, "-as"), (MatchKind::Exact, "as")]),
];

/// Where a [`ProgramMatch`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgramSource {
    Builtin,
    Config,
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LauncherInfo {
    pub name: String,
    pub token_index: usize,
    pub args_end_index: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramMatch {
    pub canonical_name: String,
    pub matched_name: String,
    pub source: ProgramSource,
    pub token_index: usize,
    pub launcher: Option<LauncherInfo>,
}

/// A user-declared program and its aliases, as borrowed from configuration.
/// Kept independent of `prompt-config`'s schema types so this crate has no
/// dependency on configuration parsing.
#[derive(Debug, Clone, Copy)]
pub struct ProgramAlias<'a> {
    pub canonical_name: &'a str,
    pub aliases: &'a [String],
}

/// The four named ranges a command line decomposes into.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommandLineParts {
    pub launcher: String,
    pub launcher_parameters: String,
    pub program: String,
    pub program_parameters: String,
}

fn basename(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

fn match_builtin(name: &str) -> Option<&'static str> {
    let lower = name.to_ascii_lowercase();
    for (canonical, patterns) in BUILTIN_PROGRAMS {
        for (kind, pattern) in *patterns {
            let pattern_lower = pattern.to_ascii_lowercase();
            let hit = match kind {
                MatchKind::Exact => lower == pattern_lower,
                MatchKind::Prefix => lower.starts_with(&pattern_lower),
                MatchKind::Suffix => lower.ends_with(&pattern_lower),
            };
            if hit {
                return Some(canonical);
            }
        }
    }
    None
}

fn glob_match(name: &str, pattern: &str) -> bool {
    match glob::Pattern::new(pattern) {
        Ok(p) => p.matches_with(
            name,
            glob::MatchOptions {
                case_sensitive: false,
                require_literal_separator: false,
                require_literal_leading_dot: false,
            },
        ),
        Err(err) => {
            tracing::warn!(pattern, %err, "invalid program-alias glob, skipping");
            false
        }
    }
}

fn regexp_match_start(name: &str, pattern: &str) -> bool {
    let anchored = format!("^(?:{pattern})");
    match RegexBuilder::new(&anchored).case_insensitive(true).build() {
        Ok(re) => re.is_match(name),
        Err(err) => {
            tracing::warn!(pattern, %err, "invalid program-alias regexp, skipping");
            false
        }
    }
}

fn match_config(name: &str, programs: &[ProgramAlias<'_>]) -> Option<String> {
    for program in programs {
        if program.canonical_name.eq_ignore_ascii_case(name) {
            return Some(program.canonical_name.to_string());
        }
        for alias in program.aliases {
            if let Some(pattern) = alias.strip_prefix("glob:") {
                if glob_match(name, pattern) {
                    return Some(program.canonical_name.to_string());
                }
            } else if let Some(pattern) = alias.strip_prefix("regexp:") {
                if regexp_match_start(name, pattern) {
                    return Some(program.canonical_name.to_string());
                }
            } else if alias.eq_ignore_ascii_case(name) {
                return Some(program.canonical_name.to_string());
            }
        }
    }
    None
}

/// Detect a program from an executable basename, trying the built-in table
/// first and falling back to user-declared aliases, then the raw name.
pub fn detect_program(executable: &str, programs: &[ProgramAlias<'_>]) -> ProgramMatch {
    let name = basename(executable);

    if let Some(canonical) = match_builtin(name) {
        return ProgramMatch {
            canonical_name: canonical.to_string(),
            matched_name: name.to_string(),
            source: ProgramSource::Builtin,
            token_index: 0,
            launcher: None,
        };
    }

    if let Some(canonical) = match_config(name, programs) {
        return ProgramMatch {
            canonical_name: canonical,
            matched_name: name.to_string(),
            source: ProgramSource::Config,
            token_index: 0,
            launcher: None,
        };
    }

    ProgramMatch {
        canonical_name: name.to_string(),
        matched_name: name.to_string(),
        source: ProgramSource::Unknown,
        token_index: 0,
        launcher: None,
    }
}

fn launcher_flags(name: &str) -> Option<(&'static str, &'static [&'static str])> {
    let lower = name.to_ascii_lowercase();
    BUILTIN_LAUNCHERS
        .iter()
        .find(|(launcher, _)| launcher.eq_ignore_ascii_case(&lower))
        .map(|(launcher, flags)| (*launcher, *flags))
}

/// Scan a token stream for an optional launcher wrapper followed by the
/// invoked program, per the one-pass peeling rule in the matcher design.
pub fn find_program(tokens: &[Token], programs: &[ProgramAlias<'_>]) -> Option<ProgramMatch> {
    if tokens.is_empty() {
        return None;
    }

    let mut i = 0usize;
    let mut launcher_info: Option<LauncherInfo> = None;

    while i < tokens.len() {
        let candidate = basename(&tokens[i].value);

        if let Some((launcher_name, flags_with_args)) = launcher_flags(candidate) {
            let launcher_start = i;
            i += 1;

            while i < tokens.len() {
                let arg = tokens[i].value.as_str();
                if !arg.starts_with('-') {
                    break;
                }
                let takes_arg = flags_with_args
                    .iter()
                    .any(|flag| arg == *flag || arg.starts_with(&format!("{flag}=")));
                if takes_arg && !arg.contains('=') {
                    i += 2;
                } else {
                    i += 1;
                }
            }

            launcher_info = Some(LauncherInfo {
                name: launcher_name.to_string(),
                token_index: launcher_start,
                args_end_index: i,
            });
            continue;
        }

        let mut program_match = detect_program(&tokens[i].value, programs);
        program_match.token_index = i;
        program_match.launcher = launcher_info;
        return Some(program_match);
    }

    None
}

/// Derive the launcher / launcher-parameters / program / program-parameters
/// ranges given the detected program match (or lack of one).
pub fn command_line_parts(tokens: &[Token], program_match: Option<&ProgramMatch>) -> CommandLineParts {
    let Some(pm) = program_match else {
        return CommandLineParts::default();
    };

    let join = |slice: &[Token]| -> String {
        slice
            .iter()
            .map(|t| t.value.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    };

    let (launcher, launcher_parameters) = match &pm.launcher {
        Some(l) => {
            let launcher_text = tokens
                .get(l.token_index)
                .map(|t| t.value.clone())
                .unwrap_or_default();
            let params = if l.token_index + 1 <= pm.token_index.saturating_sub(1) {
                join(&tokens[l.token_index + 1..pm.token_index])
            } else {
                String::new()
            };
            (launcher_text, params)
        }
        None => (String::new(), String::new()),
    };

    let program = tokens
        .get(pm.token_index)
        .map(|t| t.value.clone())
        .unwrap_or_default();
    let program_parameters = if pm.token_index + 1 < tokens.len() {
        join(&tokens[pm.token_index + 1..])
    } else {
        String::new()
    };

    CommandLineParts {
        launcher,
        launcher_parameters,
        program,
        program_parameters,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prompt_text::tokenize;

    #[test]
    fn detects_gcc_directly() {
        let tokens = tokenize("gcc -I/tmp/foo -o test main.c");
        let pm = find_program(&tokens, &[]).unwrap();
        assert_eq!(pm.canonical_name, "gcc");
        assert_eq!(pm.source, ProgramSource::Builtin);
        assert_eq!(pm.token_index, 0);
        assert!(pm.launcher.is_none());
    }

    #[test]
    fn peels_ccache_launcher() {
        let tokens = tokenize("ccache gcc -O2 foo.c");
        let pm = find_program(&tokens, &[]).unwrap();
        assert_eq!(pm.canonical_name, "gcc");
        assert_eq!(pm.token_index, 1);
        let launcher = pm.launcher.unwrap();
        assert_eq!(launcher.name, "ccache");
        assert_eq!(launcher.token_index, 0);
        assert_eq!(launcher.args_end_index, 1);
    }

    #[test]
    fn cross_compiler_via_absolute_paths() {
        let tokens = tokenize("/usr/bin/ccache /usr/bin/arm-linux-gnueabihf-gcc -O2 foo.c");
        let pm = find_program(&tokens, &[]).unwrap();
        assert_eq!(pm.canonical_name, "gcc");
        assert_eq!(pm.matched_name, "arm-linux-gnueabihf-gcc");

        let parts = command_line_parts(&tokens, Some(&pm));
        assert_eq!(parts.launcher, "/usr/bin/ccache");
        assert_eq!(parts.launcher_parameters, "");
        assert_eq!(parts.program, "/usr/bin/arm-linux-gnueabihf-gcc");
        assert_eq!(parts.program_parameters, "-O2 foo.c");
    }

    #[test]
    fn launcher_argument_taking_flag_is_skipped_with_value() {
        let tokens = tokenize("scan-build -o /tmp/report gcc -c foo.c");
        let pm = find_program(&tokens, &[]).unwrap();
        assert_eq!(pm.canonical_name, "gcc");
        let launcher = pm.launcher.unwrap();
        assert_eq!(launcher.args_end_index, 3);
        for i in (launcher.token_index + 1)..launcher.args_end_index {
            assert!(tokens[i].value.starts_with('-') || i == launcher.token_index + 2);
        }
    }

    #[test]
    fn config_glob_alias_matches() {
        let aliases = vec!["glob:my-*-wrapper".to_string()];
        let programs = [ProgramAlias {
            canonical_name: "mytool",
            aliases: &aliases,
        }];
        let pm = detect_program("my-special-wrapper", &programs);
        assert_eq!(pm.canonical_name, "mytool");
        assert_eq!(pm.source, ProgramSource::Config);
    }

    #[test]
    fn config_regexp_alias_matches_case_insensitively() {
        let aliases = vec!["regexp:FOO.*".to_string()];
        let programs = [ProgramAlias {
            canonical_name: "footool",
            aliases: &aliases,
        }];
        let pm = detect_program("foobar", &programs);
        assert_eq!(pm.canonical_name, "footool");
    }

    #[test]
    fn unknown_program_falls_through() {
        let pm = detect_program("some-random-tool", &[]);
        assert_eq!(pm.source, ProgramSource::Unknown);
        assert_eq!(pm.canonical_name, "some-random-tool");
    }
}
