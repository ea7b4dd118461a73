// Response framing for interactive terminal transcripts.
//
// An interactive shell hands back one undifferentiated stream: the echo
// of the command we typed, the command's output, then the next prompt.
// These helpers carve the output back out of it.

use crate::error::Error;

/// Liveness probe sent before every command.
pub const PROBE_COMMAND: &str = "echo 1234";

/// What the probe must print back.
pub const PROBE_REPLY: &str = "1234";

/// Turn `\r\n` into `\n` and delete any remaining lone `\r`.
pub fn normalize(raw: &str) -> String {
    raw.replace("\r\n", "\n").replace('\r', "")
}

/// Drop the first line (command echo) and the last line (next prompt).
///
/// A transcript with two lines or fewer carries no output at all.
pub fn strip_echo_and_prompt(transcript: &str) -> String {
    let lines: Vec<&str> = transcript.split('\n').collect();
    match lines.len() {
        0..=2 => String::new(),
        n => lines[1..n - 1].join("\n"),
    }
}

/// Build the compound line that makes the exit status observable.
pub fn checked_command(command: &str) -> String {
    format!("{command}; echo $?")
}

/// Split framed output of a checked command into `(output, exit_code)`.
///
/// Everything before the final newline is the command's own output; the
/// final line is the status printed by `echo $?`. Output that itself ends
/// in a bare integer line cannot be told apart from the status line.
pub fn split_exit_status(body: &str) -> Result<(String, i32), Error> {
    let (output, status) = body.rsplit_once('\n').unwrap_or(("", body));
    let code = status
        .trim()
        .parse::<i32>()
        .map_err(|_| Error::ExitStatus {
            line: status.to_string(),
        })?;
    Ok((output.to_string(), code))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const PROMPT: &str = "root@OpenWrt:~# ";

    #[test]
    fn strips_echo_and_prompt_lines() {
        let transcript = format!("uname -m\nmips\n{PROMPT}");
        assert_eq!(strip_echo_and_prompt(&transcript), "mips");
    }

    #[test]
    fn keeps_inner_lines_verbatim() {
        let transcript = format!("cat f\n  a\n\nb  \n{PROMPT}");
        assert_eq!(strip_echo_and_prompt(&transcript), "  a\n\nb  ");
    }

    #[test]
    fn command_without_output_is_empty() {
        let transcript = format!("true\n{PROMPT}");
        assert_eq!(strip_echo_and_prompt(&transcript), "");
        assert_eq!(strip_echo_and_prompt(""), "");
    }

    #[test]
    fn normalizes_crlf() {
        assert_eq!(normalize("a\r\nb\rc\n"), "a\nbc\n");
    }

    #[test]
    fn lone_carriage_return_is_deleted_not_folded() {
        assert_eq!(normalize("50%\r100%\r\n"), "50%100%\n");
        assert_eq!(normalize("\r"), "");
    }

    #[test]
    fn splits_trailing_status() {
        let (out, code) = split_exit_status("line one\nline two\n0").unwrap();
        assert_eq!(out, "line one\nline two");
        assert_eq!(code, 0);
    }

    #[test]
    fn status_only_body_has_empty_output() {
        let (out, code) = split_exit_status("127").unwrap();
        assert_eq!(out, "");
        assert_eq!(code, 127);
    }

    #[test]
    fn non_numeric_status_is_an_error() {
        let err = split_exit_status("hello\nworld").unwrap_err();
        assert!(matches!(err, Error::ExitStatus { ref line } if line == "world"));
    }

    #[test]
    fn unterminated_numeric_output_merges_into_status() {
        // `printf 5; echo $?` prints `50` on a single line. Known limitation.
        let (out, code) = split_exit_status("50").unwrap();
        assert_eq!(out, "");
        assert_eq!(code, 50);
    }

    #[test]
    fn checked_command_appends_status_echo() {
        assert_eq!(checked_command("opkg update"), "opkg update; echo $?");
    }
}
