/// Trigger detection and command parsing for inbound chat text.
use crate::types::ParsedInput;

/// Split raw text into a command and its arguments.
///
/// The whole string is trimmed and lowercased first; tokens are separated by
/// runs of whitespace. Empty input yields an empty command, which callers
/// treat as a request for help.
pub fn parse(raw: &str) -> ParsedInput {
    let lowered = raw.trim().to_lowercase();
    let mut tokens = lowered.split_whitespace().map(str::to_string);
    let command = tokens.next().unwrap_or_default();
    ParsedInput {
        command,
        args: tokens.collect(),
    }
}

/// Outcome of checking a message against the trigger keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerMatch<'a> {
    /// The message does not start with the trigger.
    NotAddressed,
    /// The message is the trigger and nothing else.
    Bare,
    /// Text following the trigger, trimmed.
    Command(&'a str),
}

/// Match `text` against the case-sensitive `trigger` prefix.
///
/// The trigger must be followed by whitespace or the end of the message, so
/// `shart` does not fire on `sharty`.
pub fn match_trigger<'a>(text: &'a str, trigger: &str) -> TriggerMatch<'a> {
    let Some(rest) = text.strip_prefix(trigger) else {
        return TriggerMatch::NotAddressed;
    };
    if !trigger.is_empty() && !rest.is_empty() && !rest.starts_with(char::is_whitespace) {
        return TriggerMatch::NotAddressed;
    }
    match rest.trim() {
        "" => TriggerMatch::Bare,
        command => TriggerMatch::Command(command),
    }
}

/// Like [`match_trigger`], but for transports that only deliver text meant
/// for the bot (slash commands): the trigger is stripped when present and
/// otherwise not required.
pub fn match_optional_trigger<'a>(text: &'a str, trigger: &str) -> TriggerMatch<'a> {
    match match_trigger(text, trigger) {
        TriggerMatch::NotAddressed => match text.trim() {
            "" => TriggerMatch::Bare,
            command => TriggerMatch::Command(command),
        },
        matched => matched,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_is_first_lowercased_token() {
        let parsed = parse("  Search   Movie  The  Matrix ");
        assert_eq!(parsed.command, "search");
        assert_eq!(parsed.args, vec!["movie", "the", "matrix"]);
        assert_eq!(parsed.rest(), "movie the matrix");
    }

    #[test]
    fn empty_input_yields_empty_command() {
        for raw in ["", "   ", "\t\n"] {
            let parsed = parse(raw);
            assert!(parsed.is_empty());
            assert!(parsed.args.is_empty());
        }
    }

    #[test]
    fn command_only_has_no_args() {
        let parsed = parse("TEST");
        assert_eq!(parsed.command, "test");
        assert!(parsed.args.is_empty());
    }

    #[test]
    fn parse_matches_first_token_for_assorted_inputs() {
        let samples = [
            "add movie 157336",
            "Set-Quality show 4",
            " \tdiscover\tmovie",
            "ÜBER alles",
            "x",
        ];
        for raw in samples {
            let expected = raw.trim().split_whitespace().next().unwrap().to_lowercase();
            assert_eq!(parse(raw).command, expected);
        }
    }

    #[test]
    fn trigger_must_be_a_whole_word() {
        assert_eq!(
            match_trigger("shart search movie Interstellar", "shart"),
            TriggerMatch::Command("search movie Interstellar")
        );
        assert_eq!(match_trigger("shart", "shart"), TriggerMatch::Bare);
        assert_eq!(match_trigger("shart   ", "shart"), TriggerMatch::Bare);
        assert_eq!(match_trigger("sharty search", "shart"), TriggerMatch::NotAddressed);
        assert_eq!(match_trigger("hello shart", "shart"), TriggerMatch::NotAddressed);
    }

    #[test]
    fn trigger_is_case_sensitive() {
        assert_eq!(match_trigger("Shart test", "shart"), TriggerMatch::NotAddressed);
    }

    #[test]
    fn optional_trigger_accepts_plain_commands() {
        assert_eq!(
            match_optional_trigger("search movie heat", "shart"),
            TriggerMatch::Command("search movie heat")
        );
        assert_eq!(
            match_optional_trigger("shart search movie heat", "shart"),
            TriggerMatch::Command("search movie heat")
        );
        assert_eq!(match_optional_trigger("  ", "shart"), TriggerMatch::Bare);
    }

    #[test]
    fn scenario_trigger_then_parse() {
        let TriggerMatch::Command(rest) = match_trigger("shart search movie Interstellar", "shart") else {
            panic!("expected a command");
        };
        let parsed = parse(rest);
        assert_eq!(parsed.command, "search");
        assert_eq!(parsed.args, vec!["movie", "interstellar"]);
    }
}
