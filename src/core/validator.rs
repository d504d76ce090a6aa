// src/core/validator.rs

//! # Syntax Validator
//!
//! Decides whether a command string only uses the small subset of shell syntax we are
//! willing to run. The check happens twice: once on the raw text, before anything is
//! expanded, and once on the expanded text, because variable values can smuggle in
//! characters (`|`, `<`, `>`) that were not visible before.
//!
//! Rules are evaluated in table order and the first match is reported, so a command that
//! breaks several rules always fails with the same, predictable cause.

use crate::models::SyntaxPolicy;
use lazy_static::lazy_static;
use regex::Regex;
use std::fmt;
use thiserror::Error;

lazy_static! {
    static ref SUBCOMMAND: Regex = Regex::new(r"\$\(|`").expect("valid rule regex");
    static ref SEPARATOR: Regex = Regex::new(r";").expect("valid rule regex");
    static ref ANY_AMPERSAND: Regex = Regex::new(r"&").expect("valid rule regex");
    static ref TRAILING_AMPERSAND: Regex = Regex::new(r"&\s*$").expect("valid rule regex");
    static ref CONDITIONAL: Regex = Regex::new(r"[\[\]!]").expect("valid rule regex");
    static ref ASSIGNMENT: Regex = Regex::new(r"=").expect("valid rule regex");
    static ref REDIRECTION: Regex = Regex::new(r"[<>]").expect("valid rule regex");
    static ref PIPE: Regex = Regex::new(r"\|").expect("valid rule regex");
}

/// Characters that are accepted but may not behave like they would in a real shell.
const SPECIAL_CHARS: &[char] = &[
    '$', '=', '\\', '"', '\'', '#', '(', ')', '{', '}', '?', '*',
];

/// The disallowed-syntax rule that rejected a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyntaxRule {
    /// `$(...)` or backticks.
    Subcommand,
    /// `;`.
    Separator,
    /// `&`, or only a trailing `&` under the lenient policy.
    Background,
    /// `[`, `]` or `!`.
    Conditional,
    /// `=` under the strict policy.
    Assignment,
    /// `<` or `>`.
    Redirection,
    /// `|`, checked after expansion.
    Piping,
}

impl SyntaxRule {
    /// The human-readable reason attached to a rejected command.
    pub fn description(&self) -> &'static str {
        match self {
            Self::Subcommand => "subcommand substitution is prohibited",
            Self::Separator => "command separation is prohibited",
            Self::Background => "background execution is prohibited",
            Self::Conditional => "conditional and test syntax is prohibited",
            Self::Assignment => "variable assignment is prohibited",
            Self::Redirection => "I/O redirection is prohibited",
            Self::Piping => "piping is not implemented",
        }
    }
}

impl fmt::Display for SyntaxRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

/// A command rejected by one of the syntax rules.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unsupported syntax: {rule} in '{command}'")]
pub struct SyntaxViolation {
    /// The first rule in table order that matched.
    pub rule: SyntaxRule,
    /// The text that was checked: raw for the first pass, expanded for the second.
    pub command: String,
}

/// A non-blocking notice produced by the pre-expansion pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyntaxWarning {
    /// The command contains characters that may behave unexpectedly, in order of appearance.
    SpecialCharacters(Vec<char>),
    /// An `=` was found and tolerated under the lenient policy.
    Assignment,
}

impl fmt::Display for SyntaxWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SpecialCharacters(chars) => {
                let listed: String = chars.iter().collect();
                write!(
                    f,
                    "special characters [{}] may behave unexpectedly without a shell",
                    listed
                )
            }
            Self::Assignment => {
                write!(f, "'=' is passed through literally; assignments are not performed")
            }
        }
    }
}

/// Applies the rule table for one [`SyntaxPolicy`].
#[derive(Debug, Clone, Copy, Default)]
pub struct Validator {
    policy: SyntaxPolicy,
}

impl Validator {
    /// Creates a validator for `policy`.
    pub fn new(policy: SyntaxPolicy) -> Self {
        Self { policy }
    }

    /// Checks the raw command before expansion.
    ///
    /// Pipes are deliberately left alone here: the expander needs them to split the
    /// command into segments, and they are judged by [`Validator::post_expansion`].
    pub fn pre_expansion(&self, command: &str) -> Result<Vec<SyntaxWarning>, SyntaxViolation> {
        let background: &Regex = match self.policy {
            SyntaxPolicy::Strict => &*ANY_AMPERSAND,
            SyntaxPolicy::Lenient => &*TRAILING_AMPERSAND,
        };

        let mut rules: Vec<(SyntaxRule, &Regex)> = vec![
            (SyntaxRule::Subcommand, &*SUBCOMMAND),
            (SyntaxRule::Separator, &*SEPARATOR),
            (SyntaxRule::Background, background),
            (SyntaxRule::Conditional, &*CONDITIONAL),
        ];
        if self.policy == SyntaxPolicy::Strict {
            rules.push((SyntaxRule::Assignment, &*ASSIGNMENT));
        }
        rules.push((SyntaxRule::Redirection, &*REDIRECTION));

        check_rules(command, &rules)?;

        let mut warnings = Vec::new();
        if self.policy == SyntaxPolicy::Lenient && ASSIGNMENT.is_match(command) {
            warnings.push(SyntaxWarning::Assignment);
        }
        let specials = special_characters(command);
        if !specials.is_empty() {
            warnings.push(SyntaxWarning::SpecialCharacters(specials));
        }
        Ok(warnings)
    }

    /// Checks the expanded command for syntax that expansion may have introduced.
    pub fn post_expansion(&self, command: &str) -> Result<(), SyntaxViolation> {
        check_rules(
            command,
            &[
                (SyntaxRule::Piping, &*PIPE),
                (SyntaxRule::Redirection, &*REDIRECTION),
            ],
        )
    }
}

fn check_rules(command: &str, rules: &[(SyntaxRule, &Regex)]) -> Result<(), SyntaxViolation> {
    match rules.iter().find(|(_, pattern)| pattern.is_match(command)) {
        Some((rule, _)) => Err(SyntaxViolation {
            rule: *rule,
            command: command.to_string(),
        }),
        None => Ok(()),
    }
}

fn special_characters(command: &str) -> Vec<char> {
    let mut found = Vec::new();
    for c in command.chars() {
        if SPECIAL_CHARS.contains(&c) && !found.contains(&c) {
            found.push(c);
        }
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strict() -> Validator {
        Validator::new(SyntaxPolicy::Strict)
    }

    fn lenient() -> Validator {
        Validator::new(SyntaxPolicy::Lenient)
    }

    fn rejected_by(validator: &Validator, command: &str) -> SyntaxRule {
        validator
            .pre_expansion(command)
            .expect_err("command should have been rejected")
            .rule
    }

    #[test]
    fn test_each_rule_reports_its_own_cause() {
        let v = strict();
        assert_eq!(rejected_by(&v, "echo $(whoami)"), SyntaxRule::Subcommand);
        assert_eq!(rejected_by(&v, "echo `touch tmp.txt` `rm tmp.txt`"), SyntaxRule::Subcommand);
        assert_eq!(rejected_by(&v, "ls; rm -rf /"), SyntaxRule::Separator);
        assert_eq!(rejected_by(&v, "sleep 10 &"), SyntaxRule::Background);
        assert_eq!(rejected_by(&v, "[ -f foo ]"), SyntaxRule::Conditional);
        assert_eq!(rejected_by(&v, "test ! -d foo"), SyntaxRule::Conditional);
        assert_eq!(rejected_by(&v, "FOO=bar env"), SyntaxRule::Assignment);
        assert_eq!(rejected_by(&v, "cat < input.txt"), SyntaxRule::Redirection);
        assert_eq!(rejected_by(&v, "echo hi > out.txt"), SyntaxRule::Redirection);
    }

    #[test]
    fn test_first_matching_rule_wins() {
        let v = strict();
        // Matches subcommand, separator and redirection; subcommand is checked first.
        assert_eq!(rejected_by(&v, "echo $(date); cat > x"), SyntaxRule::Subcommand);
        assert_eq!(rejected_by(&v, "a; b &"), SyntaxRule::Separator);
        assert_eq!(rejected_by(&v, "FOO=1 cat < x"), SyntaxRule::Assignment);
    }

    #[test]
    fn test_violation_message_names_rule_and_command() {
        let err = strict().pre_expansion("ls; pwd").unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("command separation is prohibited"), "Message was: {}", msg);
        assert!(msg.contains("ls; pwd"), "Message was: {}", msg);
    }

    #[test]
    fn test_strict_rejects_any_ampersand() {
        assert_eq!(rejected_by(&strict(), "true && false"), SyntaxRule::Background);
    }

    #[test]
    fn test_lenient_only_rejects_trailing_ampersand() {
        let v = lenient();
        assert_eq!(rejected_by(&v, "sleep 1 &  "), SyntaxRule::Background);
        assert!(v.pre_expansion("echo a&b").is_ok());
    }

    #[test]
    fn test_lenient_warns_on_assignment() {
        let warnings = lenient().pre_expansion("env FOO=bar").unwrap();
        assert_eq!(warnings[0], SyntaxWarning::Assignment);
        assert_eq!(warnings[1], SyntaxWarning::SpecialCharacters(vec!['=']));
    }

    #[test]
    fn test_special_characters_warn_without_failing() {
        let warnings = strict().pre_expansion("ls -l ~/* \"$HOME\"").unwrap();
        assert_eq!(
            warnings,
            vec![SyntaxWarning::SpecialCharacters(vec!['*', '"', '$'])]
        );
    }

    #[test]
    fn test_plain_command_has_no_warnings() {
        assert!(strict().pre_expansion("ls -l").unwrap().is_empty());
    }

    #[test]
    fn test_pipe_passes_pre_expansion_but_not_post() {
        let v = strict();
        assert!(v.pre_expansion("echo foo | grep foo").is_ok());
        let err = v.post_expansion("echo foo | grep foo").unwrap_err();
        assert_eq!(err.rule, SyntaxRule::Piping);
        assert!(err.to_string().contains("piping is not implemented"));
    }

    #[test]
    fn test_post_expansion_catches_introduced_redirection() {
        let err = strict().post_expansion("echo a>b").unwrap_err();
        assert_eq!(err.rule, SyntaxRule::Redirection);
        assert!(strict().post_expansion("echo /home/kim").is_ok());
    }
}
